//! Path translation between object keys and local paths
//!
//! Keys are always `/` delimited and relative. Local paths use the platform
//! separator. Both directions drop empty, `.` and `..` segments, so a key
//! like `/posts//a` lands at `dest/posts/a` and never outside `dest`.

use std::path::{Component, Path, PathBuf};

/// Iterate the meaningful segments of an object key
pub fn key_segments(key: &str) -> impl Iterator<Item = &str> {
    key.split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
}

/// Whether a key names a zero-byte "folder" object
pub fn is_directory_marker(key: &str) -> bool {
    key.ends_with('/')
}

/// Build an object key for `file`, relative to `base`
///
/// If `file` is not under `base` the whole path is used.
pub fn object_key(base: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(base).unwrap_or(file);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    segments.join("/")
}

/// Map an object key to a path inside `dest`
pub fn local_path(dest: &Path, key: &str) -> PathBuf {
    let mut path = dest.to_path_buf();
    for segment in key_segments(key) {
        path.push(segment);
    }
    path
}
