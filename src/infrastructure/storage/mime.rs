use crate::domain::DEFAULT_MIME_TYPE;

/// Content type for an object: the store's own value when it has one, then a
/// guess from the key's extension, then `application/octet-stream`.
pub fn resolve_mime_type(key: &str, reported: Option<&str>) -> String {
    if let Some(content_type) = reported.map(str::trim).filter(|ct| !ct.is_empty()) {
        return content_type.to_string();
    }

    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}
