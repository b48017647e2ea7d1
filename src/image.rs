//! Loading wallpapers and icons into textures, from the network or from
//! inline `data:` URIs.

use crate::datauri;
use crate::http::{FetchError, HttpClient};
use gtk4::{gdk, glib};
use url::Url;

#[derive(Debug)]
pub enum ImageError {
    /// Neither a data URI nor a fetchable URL
    InvalidSource(String),
    Fetch(FetchError),
    Decode(String),
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::InvalidSource(src) => write!(f, "Unusable image source: {}", src),
            ImageError::Fetch(e) => write!(f, "{}", e),
            ImageError::Decode(msg) => write!(f, "Could not decode image: {}", msg),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<FetchError> for ImageError {
    fn from(e: FetchError) -> Self {
        ImageError::Fetch(e)
    }
}

/// Where the image bytes come from
#[derive(Debug, PartialEq)]
pub enum ImageSource {
    Inline(Vec<u8>),
    Remote(Url),
}

impl ImageSource {
    pub fn parse(src: &str) -> Result<Self, ImageError> {
        let src = src.trim();
        if datauri::is_data_uri(src) {
            return datauri::decode(src)
                .map(|(_, bytes)| ImageSource::Inline(bytes))
                .ok_or_else(|| ImageError::InvalidSource("malformed data URI".into()));
        }
        match Url::parse(src) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(ImageSource::Remote(url)),
            _ => Err(ImageError::InvalidSource(src.chars().take(64).collect())),
        }
    }
}

/// Fetch or decode `src` into a texture
pub async fn load_texture(http: &HttpClient, src: &str) -> Result<gdk::Texture, ImageError> {
    let bytes = match ImageSource::parse(src)? {
        ImageSource::Inline(bytes) => bytes,
        ImageSource::Remote(url) => http.get_bytes(&url).await?,
    };
    gdk::Texture::from_bytes(&glib::Bytes::from_owned(bytes)).map_err(|e| ImageError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote() {
        assert_eq!(
            ImageSource::parse(" https://picsum.photos/1920/1080 ").unwrap(),
            ImageSource::Remote(Url::parse("https://picsum.photos/1920/1080").unwrap())
        );
    }

    #[test]
    fn test_parse_inline() {
        let uri = datauri::encode("image/png", &[1, 2, 3]);
        assert_eq!(ImageSource::parse(&uri).unwrap(), ImageSource::Inline(vec![1, 2, 3]));
    }

    #[test]
    fn test_parse_rejects_unusable_sources() {
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,"),
            Err(ImageError::InvalidSource(_))
        ));
        assert!(matches!(
            ImageSource::parse("file:///etc/passwd"),
            Err(ImageError::InvalidSource(_))
        ));
        assert!(matches!(ImageSource::parse("wallpaper"), Err(ImageError::InvalidSource(_))));
    }
}
