//! The Bucket entity
//!
//! A `Bucket` pairs the two capability traits with the name of one bucket.
//! Every operation targets that bucket only. Uploading and downloading whole
//! directory trees live in the `upload` and `download` submodules.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::SyncOptions;
use crate::error::{Error, Result};
use crate::traits::{Body, ObjectStore, TransferManager};

mod download;
mod upload;

#[cfg(test)]
pub(crate) mod fake;

pub use download::DownloadReport;
pub use upload::UploadReport;

/// An object taken from the front of a bucket listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingObject {
    /// Object key
    pub key: String,
    /// Full object content
    pub body: Vec<u8>,
}

impl PendingObject {
    /// The body as text
    pub fn body_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(&self.body)?)
    }
}

/// A named bucket bound to an object store
pub struct Bucket {
    store: Arc<dyn ObjectStore>,
    transfer: Arc<dyn TransferManager>,
    name: String,
    options: SyncOptions,
}

impl Bucket {
    /// Create a bucket from separate metadata and transfer capabilities
    pub fn new(
        name: impl Into<String>,
        store: Arc<dyn ObjectStore>,
        transfer: Arc<dyn TransferManager>,
    ) -> Self {
        Self {
            store,
            transfer,
            name: name.into(),
            options: SyncOptions::default(),
        }
    }

    /// Create a bucket from a client that provides both capabilities
    pub fn from_client<C>(name: impl Into<String>, client: Arc<C>) -> Self
    where
        C: ObjectStore + TransferManager + 'static,
    {
        Self::new(name, client.clone(), client)
    }

    /// Replace the sync options
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Bucket name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sync options in effect
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Read the first object of the bucket listing
    ///
    /// Only the first listing page is queried. Returns [`Error::NoFiles`]
    /// when the bucket is empty.
    pub async fn read_file(&self) -> Result<PendingObject> {
        debug!(bucket = %self.name, "Reading bucket");

        let page = self
            .store
            .list_page(&self.name, None)
            .await
            .inspect_err(|e| error!(bucket = %self.name, error = %e, "Unable to query bucket"))?;

        let Some(first) = page.entries.into_iter().next() else {
            return Err(Error::NoFiles(self.name.clone()));
        };

        debug!(bucket = %self.name, key = %first.key, "Reading file");

        let body = self
            .store
            .get_object(&self.name, &first.key)
            .await
            .inspect_err(|e| error!(key = %first.key, error = %e, "Failed to get the file"))?;

        Ok(PendingObject {
            key: first.key,
            body,
        })
    }

    /// Delete an object and wait until the store confirms it is gone
    pub async fn delete_object(&self, key: &str) -> Result<()> {
        self.store
            .delete_object(&self.name, key)
            .await
            .inspect_err(|e| error!(bucket = %self.name, key, error = %e, "Failed to delete"))?;

        self.store
            .wait_until_absent(&self.name, key)
            .await
            .inspect_err(|e| {
                error!(bucket = %self.name, key, error = %e, "Failed to confirm delete")
            })?;

        info!(bucket = %self.name, key, "Successfully deleted");
        Ok(())
    }

    /// Write a text body under the configured content prefix and suffix
    ///
    /// Returns the key that was written.
    pub async fn upload_content(&self, name: &str, body: impl Into<String>) -> Result<String> {
        let key = self.options.content_key(name);
        let body = Body::Bytes(body.into().into_bytes());

        self.transfer
            .upload(&self.name, &key, body, None)
            .await
            .inspect_err(|e| error!(bucket = %self.name, key = %key, error = %e, "Failed to upload"))?;

        debug!(bucket = %self.name, key = %key, "Uploaded content");
        Ok(key)
    }
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ListPage, MockObjectStore};
    use super::fake::FakeStore;

    fn bucket_with(store: MockObjectStore) -> Bucket {
        Bucket::new("TestBucket", Arc::new(store), Arc::new(FakeStore::default()))
    }

    #[tokio::test]
    async fn test_read_file_empty_bucket() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_page()
            .times(1)
            .returning(|_, _| Ok(ListPage::default()));
        store.expect_get_object().never();

        let err = bucket_with(store).read_file().await.unwrap_err();
        assert!(err.is_no_files());
        assert!(matches!(err, Error::NoFiles(ref name) if name == "TestBucket"));
    }

    #[tokio::test]
    async fn test_read_file_returns_first_key_and_body() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_page()
            .returning(|_, _| Ok(ListPage::last(["Object1", "Object2"])));
        store
            .expect_get_object()
            .withf(|bucket: &str, key: &str| bucket == "TestBucket" && key == "Object1")
            .times(1)
            .returning(|_, _| Ok(b"Hello".to_vec()));

        let pending = bucket_with(store).read_file().await.unwrap();
        assert_eq!(pending.key, "Object1");
        assert_eq!(pending.body_str().unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_read_file_ignores_truncation() {
        let store = FakeStore::paged(vec![vec!["first"], vec!["second"]]);
        let store = Arc::new(store);
        let bucket = Bucket::from_client("TestBucket", store.clone());

        let pending = bucket.read_file().await.unwrap();
        assert_eq!(pending.key, "first");
        assert_eq!(store.list_calls(), vec![None]);
    }

    #[tokio::test]
    async fn test_read_file_surfaces_get_error() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_page()
            .returning(|_, _| Ok(ListPage::last(["Object1"])));
        store
            .expect_get_object()
            .returning(|_, _| Err(Error::Network("connection reset".into())));

        let err = bucket_with(store).read_file().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_delete_object_deletes_then_waits() {
        let mut seq = mockall::Sequence::new();
        let mut store = MockObjectStore::new();
        store
            .expect_delete_object()
            .withf(|bucket: &str, key: &str| bucket == "TestBucket" && key == "k")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        store
            .expect_wait_until_absent()
            .withf(|bucket: &str, key: &str| bucket == "TestBucket" && key == "k")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        bucket_with(store).delete_object("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_object_failure_skips_wait() {
        let mut store = MockObjectStore::new();
        store
            .expect_delete_object()
            .times(1)
            .returning(|_, _| Err(Error::Auth("AccessDenied".into())));
        store.expect_wait_until_absent().never();

        let err = bucket_with(store).delete_object("k").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_delete_object_wait_failure() {
        let mut store = MockObjectStore::new();
        store.expect_delete_object().returning(|_, _| Ok(()));
        store
            .expect_wait_until_absent()
            .times(1)
            .returning(|_, _| Err(Error::Network("waiter timed out".into())));

        assert!(bucket_with(store).delete_object("k").await.is_err());
    }

    #[tokio::test]
    async fn test_upload_content_uses_configured_key() {
        let store = Arc::new(FakeStore::default());
        let bucket = Bucket::from_client("TestBucket", store.clone());

        let key = bucket.upload_content("TestFile", "Some content").await.unwrap();
        assert_eq!(key, "/content/post/TestFile.md");

        let uploads = store.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].bucket, "TestBucket");
        assert_eq!(uploads[0].key, "/content/post/TestFile.md");
        assert_eq!(uploads[0].body, b"Some content");
        assert!(uploads[0].content_type.is_none());
    }

    #[tokio::test]
    async fn test_upload_content_custom_prefix() {
        let store = Arc::new(FakeStore::default());
        let options = SyncOptions {
            content_prefix: "drafts/".into(),
            content_suffix: ".txt".into(),
            ..Default::default()
        };
        let bucket = Bucket::from_client("TestBucket", store.clone()).with_options(options);

        bucket.upload_content("note", "x").await.unwrap();
        assert_eq!(store.uploads()[0].key, "drafts/note.txt");
    }
}
