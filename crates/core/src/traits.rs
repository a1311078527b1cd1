//! Object store capability traits
//!
//! These traits are the only surface the core needs from an object store.
//! They are implemented by the S3 adapter and can be mocked for testing.

use async_trait::async_trait;

use crate::error::Result;

/// One entry of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Object key
    pub key: String,
}

impl ListEntry {
    /// Create an entry for a key
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// One page of a bucket listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Listed objects in store order
    pub entries: Vec<ListEntry>,

    /// Whether more pages remain
    pub truncated: bool,

    /// Continuation token for the next page
    pub next_token: Option<String>,
}

impl ListPage {
    /// A final page holding the given keys
    pub fn last<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: keys.into_iter().map(ListEntry::new).collect(),
            truncated: false,
            next_token: None,
        }
    }
}

/// Payload of an upload
#[derive(Debug)]
pub enum Body {
    /// Stream the content of an open file
    File(tokio::fs::File),
    /// Upload an in-memory buffer
    Bytes(Vec<u8>),
}

impl From<Vec<u8>> for Body {
    fn from(data: Vec<u8>) -> Self {
        Body::Bytes(data)
    }
}

impl From<tokio::fs::File> for Body {
    fn from(file: tokio::fs::File) -> Self {
        Body::File(file)
    }
}

/// Metadata operations on a bucket
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of the whole bucket, starting after `continuation_token`
    async fn list_page(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage>;

    /// Get object content as bytes
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Issue a delete for an object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Block until the store reports the object as absent
    async fn wait_until_absent(&self, bucket: &str, key: &str) -> Result<()>;
}

/// Byte transfer to and from a bucket
#[async_trait]
pub trait TransferManager: Send + Sync {
    /// Upload a body to `key`
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Body,
        content_type: Option<&str>,
    ) -> Result<()>;

    /// Download the object at `key` into `dest`, returning the byte count
    async fn download(&self, bucket: &str, key: &str, dest: &mut tokio::fs::File) -> Result<u64>;
}
