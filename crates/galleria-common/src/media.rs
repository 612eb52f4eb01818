//! Content-type detection for stored object keys.

/// Derive an image content type from a key's file extension.
///
/// Falls back to `image/jpeg` for unknown extensions, matching how the
/// serving layer treats everything it stores as an image.
pub fn content_type_for_key(key: &str) -> &'static str {
    let ext = key.rsplit('.').next().map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(content_type_for_key("a.png"), "image/png");
        assert_eq!(content_type_for_key("a.webp"), "image/webp");
        assert_eq!(content_type_for_key("a.gif"), "image/gif");
        assert_eq!(content_type_for_key("a.svg"), "image/svg+xml");
        assert_eq!(content_type_for_key("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for_key("a.jpeg"), "image/jpeg");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(content_type_for_key("1717430000000-CAT.PNG"), "image/png");
    }

    #[test]
    fn test_unknown_falls_back_to_jpeg() {
        assert_eq!(content_type_for_key("no-extension"), "image/jpeg");
        assert_eq!(content_type_for_key("archive.bin"), "image/jpeg");
    }
}
