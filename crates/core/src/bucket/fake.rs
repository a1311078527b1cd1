//! In-memory store used by the bucket tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::traits::{Body, ListEntry, ListPage, ObjectStore, TransferManager};

#[derive(Debug, Clone)]
pub(crate) struct RecordedUpload {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Pages are served by index; page `n` hands out token `page-{n+1}`.
#[derive(Debug, Default)]
pub(crate) struct FakeStore {
    pages: Vec<ListPage>,
    objects: HashMap<String, Vec<u8>>,
    fail_upload_on: Option<String>,
    fail_download_on: Option<String>,
    list_calls: Mutex<Vec<Option<String>>>,
    uploads: Mutex<Vec<RecordedUpload>>,
    downloads: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn paged(pages: Vec<Vec<&str>>) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, keys)| {
                let more = i + 1 < count;
                ListPage {
                    entries: keys.into_iter().map(ListEntry::new).collect(),
                    truncated: more,
                    next_token: more.then(|| format!("page-{}", i + 1)),
                }
            })
            .collect();
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn with_page(mut self, page: ListPage) -> Self {
        self.pages.push(page);
        self
    }

    pub fn with_object(mut self, key: &str, body: &[u8]) -> Self {
        self.objects.insert(key.to_string(), body.to_vec());
        self
    }

    pub fn fail_upload_on(mut self, key: &str) -> Self {
        self.fail_upload_on = Some(key.to_string());
        self
    }

    pub fn fail_download_on(mut self, key: &str) -> Self {
        self.fail_download_on = Some(key.to_string());
        self
    }

    pub fn list_calls(&self) -> Vec<Option<String>> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads().into_iter().map(|u| u.key).collect()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    fn body_of(&self, key: &str) -> Vec<u8> {
        self.objects
            .get(key)
            .cloned()
            .unwrap_or_else(|| format!("content of {key}").into_bytes())
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn list_page(
        &self,
        _bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        self.list_calls
            .lock()
            .unwrap()
            .push(continuation_token.clone());

        let index = match continuation_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::Listing(format!("unknown token {token}")))?,
        };
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    async fn get_object(&self, _bucket: &str, key: &str) -> Result<Vec<u8>> {
        Ok(self.body_of(key))
    }

    async fn delete_object(&self, _bucket: &str, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn wait_until_absent(&self, _bucket: &str, _key: &str) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl TransferManager for FakeStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Body,
        content_type: Option<&str>,
    ) -> Result<()> {
        if self.fail_upload_on.as_deref() == Some(key) {
            return Err(Error::Network(format!("upload of {key} refused")));
        }

        let body = match body {
            Body::Bytes(data) => data,
            Body::File(mut file) => {
                let mut data = Vec::new();
                file.read_to_end(&mut data).await?;
                data
            }
        };

        self.uploads.lock().unwrap().push(RecordedUpload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
            content_type: content_type.map(str::to_string),
        });
        Ok(())
    }

    async fn download(&self, _bucket: &str, key: &str, dest: &mut tokio::fs::File) -> Result<u64> {
        if self.fail_download_on.as_deref() == Some(key) {
            return Err(Error::NotFound(key.to_string()));
        }

        let body = self.body_of(key);
        dest.write_all(&body).await?;
        self.downloads.lock().unwrap().push(key.to_string());
        Ok(body.len() as u64)
    }
}
