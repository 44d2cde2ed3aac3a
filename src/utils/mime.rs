//! MIME type constants.

/// Common MIME type constants.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    /// Historical ajax envelope type; the body is a guarded script, not xml.
    pub const XML: &str = "text/xml";
    pub const JSON: &str = "application/json";
}

/// Append a charset parameter to a bare MIME type.
pub fn with_charset(mime: &str, encoding: &str) -> String {
    format!("{mime}; charset={encoding}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_charset() {
        assert_eq!(with_charset(types::XML, "UTF-8"), "text/xml; charset=UTF-8");
    }
}
