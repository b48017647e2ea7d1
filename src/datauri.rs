//! `data:` URIs for uploaded icons and wallpapers.

use gtk4::{gio, glib};
use std::path::Path;

/// Build a base64 `data:` URI for `bytes`
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, glib::base64_encode(bytes))
}

/// Decode a base64 `data:` URI into its mime type and payload.
/// Returns None for anything that isn't a base64 data URI.
pub fn decode(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    if payload.is_empty() {
        return None;
    }
    let bytes = glib::base64_decode(payload.trim());
    if bytes.is_empty() {
        return None;
    }
    let mime = if mime.is_empty() { "application/octet-stream" } else { mime };
    Some((mime.to_string(), bytes))
}

pub fn is_data_uri(s: &str) -> bool {
    s.starts_with("data:")
}

/// Read an image file into a `data:` URI, guessing the mime type from the
/// name and content
pub fn from_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let (content_type, _uncertain) = gio::content_type_guess(Some(path), &bytes);
    let mime = gio::content_type_get_mime_type(&content_type)
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    log::debug!("Encoded {:?} as {} ({} bytes)", path, mime, bytes.len());
    Ok(encode(&mime, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png_header() {
        let uri = encode("image/png", &[0x89, b'P', b'N', b'G']);
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
        let (mime, bytes) = decode(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, [0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_decode_rejects_non_base64_uris() {
        assert!(decode("https://example.com/icon.png").is_none());
        assert!(decode("data:text/plain,hello").is_none());
        assert!(decode("data:image/png;base64,").is_none());
    }

    #[test]
    fn test_is_data_uri() {
        assert!(is_data_uri("data:image/png;base64,AA=="));
        assert!(!is_data_uri("https://picsum.photos/1920/1080"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.svg");
        std::fs::write(&path, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();

        let uri = from_file(&path).unwrap();
        let (_mime, bytes) = decode(&uri).unwrap();
        assert_eq!(bytes, std::fs::read(&path).unwrap());
    }
}
