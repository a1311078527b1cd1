//! Recursive directory upload
//!
//! Files are visited depth first, sorted by file name within each
//! directory, and uploaded one at a time. The first failure stops the walk;
//! anything uploaded before it stays in the bucket.

use std::path::Path;

use tracing::{debug, error, info};
use walkdir::WalkDir;

use super::Bucket;
use crate::error::{Error, Result};
use crate::path::object_key;
use crate::traits::Body;

/// Outcome of [`Bucket::upload`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Keys written, in upload order
    pub keys: Vec<String>,
}

impl UploadReport {
    /// Number of files uploaded
    pub fn uploaded(&self) -> usize {
        self.keys.len()
    }
}

impl Bucket {
    /// Upload every regular file under `local_path`
    ///
    /// With `include_root_dir` set, keys start with the final component of
    /// `local_path`: uploading `input/site` writes `site/index.html`.
    pub async fn upload(&self, local_path: impl AsRef<Path>) -> Result<UploadReport> {
        let root = local_path.as_ref();
        let base = if self.options.include_root_dir {
            root.parent().unwrap_or(root)
        } else {
            root
        };

        let mut report = UploadReport::default();

        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(walk_error)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let key = self.upload_path(base, entry.path()).await?;
            report.keys.push(key);
        }

        info!(
            bucket = %self.name,
            path = %root.display(),
            files = report.uploaded(),
            "Upload complete"
        );
        Ok(report)
    }

    async fn upload_path(&self, base: &Path, path: &Path) -> Result<String> {
        let key = object_key(base, path);
        let content_type = self.options.content_types.content_type_for(path);

        let file = tokio::fs::File::open(path).await.inspect_err(|e| {
            error!(path = %path.display(), error = %e, "Unable to open file to upload")
        })?;

        debug!(
            bucket = %self.name,
            key = %key,
            path = %path.display(),
            content_type = %content_type,
            "File being uploaded"
        );

        self.transfer
            .upload(&self.name, &key, Body::File(file), Some(&content_type))
            .await
            .inspect_err(|e| error!(key = %key, error = %e, "Unable to upload file"))?;

        Ok(key)
    }
}

fn walk_error(err: walkdir::Error) -> Error {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    error!(path = %path.display(), error = %err, "Failed to get file paths to upload");
    Error::PathInspection {
        path,
        source: err.into(),
    }
}
