//! Whole-bucket download
//!
//! Walks every listing page and mirrors objects into a local directory.
//! Files that already exist locally are left alone, so running the
//! download again only fetches objects that are new since the last run.

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs::{DirBuilder, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use super::Bucket;
use crate::error::{Error, Result};
use crate::path::{is_directory_marker, local_path};
use crate::traits::ListEntry;

/// Outcome of [`Bucket::download_all_objects`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Objects written to new local files
    pub downloaded: usize,
    /// Objects whose local file already existed
    pub skipped: usize,
    /// Listing pages consumed
    pub pages: usize,
    /// Bytes written
    pub bytes: u64,
}

impl Bucket {
    /// Download every object in the bucket into `dest_dir`
    ///
    /// `dest_dir` and each of `extra_dirs` under it are created first, even
    /// when the bucket is empty.
    pub async fn download_all_objects(
        &self,
        dest_dir: impl AsRef<Path>,
        extra_dirs: &[&str],
    ) -> Result<DownloadReport> {
        let dest = dest_dir.as_ref();

        create_dir(dest, self.options.dest_dir_mode).await?;
        for dir in extra_dirs {
            create_dir(&dest.join(dir), self.options.dest_dir_mode).await?;
        }

        let mut report = DownloadReport::default();
        let mut token: Option<String> = None;

        loop {
            let page = self
                .store
                .list_page(&self.name, token.take())
                .await
                .inspect_err(|e| error!(bucket = %self.name, error = %e, "Failed to list objects"))?;
            report.pages += 1;

            for entry in &page.entries {
                self.download_entry(dest, entry, &mut report).await?;
            }

            if !page.truncated {
                break;
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => {
                    return Err(Error::Listing(format!(
                        "bucket {} reported a truncated page without a continuation token",
                        self.name
                    )));
                }
            }
        }

        info!(
            bucket = %self.name,
            dest = %dest.display(),
            downloaded = report.downloaded,
            skipped = report.skipped,
            size = %humansize::format_size(report.bytes, humansize::BINARY),
            "Download complete"
        );
        Ok(report)
    }

    /// Download into the configured staging directory with the configured extra directories
    pub async fn download_to_staging(&self) -> Result<DownloadReport> {
        let extra: Vec<&str> = self.options.extra_dirs.iter().map(String::as_str).collect();
        self.download_all_objects(&self.options.staging_dir, &extra)
            .await
    }

    async fn download_entry(
        &self,
        dest: &Path,
        entry: &ListEntry,
        report: &mut DownloadReport,
    ) -> Result<()> {
        let target = local_path(dest, &entry.key);

        if is_directory_marker(&entry.key) {
            debug!(key = %entry.key, "Creating directory for marker object");
            return create_dir(&target, self.options.subdir_mode).await;
        }

        if target.as_path() == dest {
            warn!(key = %entry.key, "Skipping object with an empty key");
            return Ok(());
        }

        if let Some(parent) = target.parent() {
            create_dir(parent, self.options.subdir_mode).await?;
        }

        if tokio::fs::try_exists(&target).await? {
            debug!(path = %target.display(), "Local file exists, skipping");
            report.skipped += 1;
            return Ok(());
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                report.skipped += 1;
                return Ok(());
            }
            Err(e) => {
                error!(path = %target.display(), error = %e, "Failed to create file to download into");
                return Err(e.into());
            }
        };

        debug!(key = %entry.key, path = %target.display(), "Downloading object");

        let result = match self.transfer.download(&self.name, &entry.key, &mut file).await {
            Ok(bytes) => file.flush().await.map(|()| bytes).map_err(Error::from),
            Err(e) => Err(e),
        };
        drop(file);

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(key = %entry.key, path = %target.display(), error = %e, "Failed to download file");
                // A partial file would be skipped as complete on the next run
                if let Err(remove_err) = tokio::fs::remove_file(&target).await {
                    warn!(path = %target.display(), error = %remove_err, "Failed to remove partial file");
                }
                return Err(e);
            }
        };

        report.downloaded += 1;
        report.bytes += bytes;
        Ok(())
    }
}

/// Create a directory and its parents; an existing directory is fine
async fn create_dir(path: &Path, mode: u32) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path).await.inspect_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to create directory")
    })?;
    Ok(())
}
