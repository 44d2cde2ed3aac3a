//! Update envelope wire format.
//!
//! # Wire Format
//!
//! ```text
//! { "redirect": "<url>" }
//!
//! { "header": "...",
//!   "components": [ { "componentId", "beforeReplaceJavascript",
//!                     "afterReplaceJavascript", "replaceJavascript", "markup" } ],
//!   "prependJavascript": [ { "async", "javascript" } ],
//!   "appendJavascript":  [ { "async", "javascript" } ] }
//! ```
//!
//! The JSON is wrapped in `if (false) ( ... )` so that evaluating the raw
//! body as a script does nothing. The body is built completely in memory
//! before anything is handed to the transport: a response is either a whole
//! envelope or nothing.

use serde::{Deserialize, Serialize};

use super::JavascriptEntry;
use crate::config::ResponseConfig;
use crate::error::Result;

/// Opening half of the script guard.
pub const GUARD_OPEN: &str = "if (false) (";
/// Closing half of the script guard.
pub const GUARD_CLOSE: &str = ")";

/// Cache-busting headers sent with every envelope.
pub const NO_CACHE_HEADERS: [(&str, &str); 3] = [
    ("Expires", "Mon, 26 Jul 1997 05:00:00 GMT"),
    ("Cache-Control", "no-cache, must-revalidate"),
    ("Pragma", "no-cache"),
];

// =============================================================================
// Envelope
// =============================================================================

/// The finished result of one partial-update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// Short-circuit: nothing else was rendered.
    Redirect { redirect: String },
    Update(UpdatePayload),
}

/// Rendered regions, header contributions and scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    /// Concatenated header contribution markup, possibly empty.
    pub header: String,
    pub components: Vec<RenderedComponent>,
    pub prepend_javascript: Vec<JavascriptEntry>,
    /// Dom-ready entries followed by appended entries.
    pub append_javascript: Vec<JavascriptEntry>,
}

/// One refreshed region as sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedComponent {
    pub component_id: String,
    pub before_replace_javascript: Option<String>,
    pub after_replace_javascript: Option<String>,
    pub replace_javascript: Option<String>,
    pub markup: String,
}

impl Envelope {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self::Redirect {
            redirect: url.into(),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Rendered regions (empty for a redirect).
    pub fn components(&self) -> &[RenderedComponent] {
        match self {
            Self::Update(payload) => &payload.components,
            Self::Redirect { .. } => &[],
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from a JSON string, or from a guarded response body.
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(unguard(s)).ok()
    }

    /// Frame the envelope for transport.
    pub fn into_response(&self, config: &ResponseConfig) -> Result<AjaxResponse> {
        let json = self.to_json()?;
        let body = if config.guard {
            let mut body = String::with_capacity(json.len() + GUARD_OPEN.len() + GUARD_CLOSE.len());
            body.push_str(GUARD_OPEN);
            body.push_str(&json);
            body.push_str(GUARD_CLOSE);
            body
        } else {
            json
        };

        Ok(AjaxResponse {
            content_type: config.content_type(),
            body,
        })
    }
}

/// Strip the script guard from a response body, if present.
pub fn unguard(body: &str) -> &str {
    let trimmed = body.trim();
    trimmed
        .strip_prefix(GUARD_OPEN)
        .and_then(|rest| rest.strip_suffix(GUARD_CLOSE))
        .unwrap_or(trimmed)
}

// =============================================================================
// Framed Response
// =============================================================================

/// A complete, framed envelope ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxResponse {
    pub content_type: String,
    pub body: String,
}

impl AjaxResponse {
    /// All response headers, content type first.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once(("Content-Type", self.content_type.as_str())).chain(NO_CACHE_HEADERS)
    }
}
