//! Content type selection for uploads

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Fallback content type for anything unrecognized
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// How uploads pick a content type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypePolicy {
    /// `.css` is `text/css`, everything else is `text/html`
    #[default]
    Minimal,
    /// Look the extension up in the mime database
    Guess,
}

impl ContentTypePolicy {
    /// Content type for a local file or object key
    pub fn content_type_for(self, path: &Path) -> String {
        match self {
            ContentTypePolicy::Minimal => {
                let is_css = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("css"));
                let content_type = if is_css { "text/css" } else { DEFAULT_CONTENT_TYPE };
                content_type.to_string()
            }
            ContentTypePolicy::Guess => mime_guess::from_path(path)
                .first()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        }
    }
}
