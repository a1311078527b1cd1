//! bsync-core: Core library for bucket-sync
//!
//! This crate provides:
//! - The `Bucket` entity: directory upload, whole-bucket download,
//!   single-object read and confirmed delete
//! - Path translation between object keys and local paths
//! - Content type selection for uploads
//! - Configuration management
//! - ObjectStore and TransferManager traits for the storage backend
//!
//! This crate is independent of any specific S3 SDK; `bsync-s3` provides
//! the AWS implementation.

pub mod bucket;
pub mod config;
pub mod content_type;
pub mod error;
pub mod path;
pub mod traits;

pub use bucket::{Bucket, DownloadReport, PendingObject, UploadReport};
pub use config::{Config, ConfigManager, StorageConfig, SyncOptions};
pub use content_type::ContentTypePolicy;
pub use error::{Error, Result};
pub use traits::{Body, ListEntry, ListPage, ObjectStore, TransferManager};
