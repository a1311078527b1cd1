//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore and TransferManager
//! traits from bsync-core.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::client::Waiters;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tokio::io::AsyncWriteExt;

use bsync_core::{
    Body, Error, ListEntry, ListPage, ObjectStore, Result, StorageConfig, TransferManager,
};

/// S3 client wrapper
#[derive(Debug, Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    wait_timeout: Duration,
}

impl S3Client {
    /// Create a new S3 client from storage settings
    ///
    /// Credentials come from the SDK default provider chain.
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        // Validate before handing the raw string to the SDK
        config.endpoint_url()?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::debug!(
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            path_style = config.force_path_style,
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
        })
    }

    /// Wrap an already configured SDK client
    pub fn from_client(inner: aws_sdk_s3::Client, wait_timeout: Duration) -> Self {
        Self {
            inner,
            wait_timeout,
        }
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Maximum wait for a delete to be confirmed
    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }
}

/// Map an SDK error message onto the core error kinds
fn classify(message: String, target: impl FnOnce() -> String) -> Error {
    if message.contains("NotFound")
        || message.contains("NoSuchKey")
        || message.contains("NoSuchBucket")
    {
        Error::NotFound(target())
    } else if message.contains("AccessDenied")
        || message.contains("InvalidAccessKeyId")
        || message.contains("SignatureDoesNotMatch")
    {
        Error::Auth(message)
    } else {
        Error::Network(message)
    }
}

fn object_path(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_page(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        let mut request = self.inner.list_objects_v2().bucket(bucket);
        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|e| {
            classify(DisplayErrorContext(&e).to_string(), || {
                format!("Bucket not found: {bucket}")
            })
        })?;

        let entries = response
            .contents()
            .iter()
            .map(|object| ListEntry::new(object.key().unwrap_or_default()))
            .collect();

        Ok(ListPage {
            entries,
            truncated: response.is_truncated().unwrap_or(false),
            next_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                classify(DisplayErrorContext(&e).to_string(), || object_path(bucket, key))
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                classify(DisplayErrorContext(&e).to_string(), || object_path(bucket, key))
            })?;

        Ok(())
    }

    async fn wait_until_absent(&self, bucket: &str, key: &str) -> Result<()> {
        self.inner
            .wait_until_object_not_exists()
            .bucket(bucket)
            .key(key)
            .wait(self.wait_timeout)
            .await
            .map_err(|e| {
                classify(DisplayErrorContext(&e).to_string(), || object_path(bucket, key))
            })?;

        Ok(())
    }
}

#[async_trait]
impl TransferManager for S3Client {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Body,
        content_type: Option<&str>,
    ) -> Result<()> {
        let body = match body {
            Body::Bytes(data) => ByteStream::from(data),
            Body::File(file) => ByteStream::read_from()
                .file(file)
                .build()
                .await
                .map_err(|e| Error::General(format!("Failed to stream {key}: {e}")))?,
        };

        let mut request = self.inner.put_object().bucket(bucket).key(key).body(body);
        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request.send().await.map_err(|e| {
            classify(DisplayErrorContext(&e).to_string(), || {
                format!("Bucket not found: {bucket}")
            })
        })?;

        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str, dest: &mut tokio::fs::File) -> Result<u64> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                classify(DisplayErrorContext(&e).to_string(), || object_path(bucket, key))
            })?;

        let mut body = response.body;
        let mut written = 0u64;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
        {
            dest.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        dest.flush().await?;

        Ok(written)
    }
}
