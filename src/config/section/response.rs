//! `[response]` section configuration.
//!
//! Controls how the ajax envelope is framed for transport.
//!
//! # Example
//!
//! ```toml
//! [response]
//! encoding = "UTF-8"         # charset parameter of the content type
//! content_type = "legacy"    # "legacy" (text/xml) or "json" (application/json)
//! guard = true               # wrap the JSON in `if (false) ( ... )`
//! ```
//!
//! `legacy` keeps the historical `text/xml` type existing client runtimes
//! expect. `json` is accurate, but the body is only plain JSON when
//! `guard = false`.

use serde::{Deserialize, Serialize};

use crate::utils::mime::{types, with_charset};

/// Declared MIME type of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypeMode {
    #[default]
    Legacy,
    Json,
}

/// Envelope transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Response character encoding.
    pub encoding: String,

    /// Declared content type.
    pub content_type: ContentTypeMode,

    /// Wrap the payload so evaluating the raw body as a script is a no-op.
    pub guard: bool,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            content_type: ContentTypeMode::Legacy,
            guard: true,
        }
    }
}

impl ResponseConfig {
    /// Full `Content-Type` header value.
    pub fn content_type(&self) -> String {
        let mime = match self.content_type {
            ContentTypeMode::Legacy => types::XML,
            ContentTypeMode::Json => types::JSON,
        };
        with_charset(mime, &self.encoding)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ContentTypeMode, test_parse_config};

    #[test]
    fn test_response_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.response.content_type, ContentTypeMode::Legacy);
        assert_eq!(
            config.response.content_type(),
            "text/xml; charset=UTF-8"
        );
        assert!(config.response.guard);
    }

    #[test]
    fn test_response_config_json() {
        let config = test_parse_config(
            "[response]\ncontent_type = \"json\"\nencoding = \"ISO-8859-1\"\nguard = false",
        );
        assert_eq!(
            config.response.content_type(),
            "application/json; charset=ISO-8859-1"
        );
        assert!(!config.response.guard);
    }
}
