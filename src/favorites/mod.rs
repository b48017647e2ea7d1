//! Favorites grid: a thin registry over the favorites preference plus the
//! widgets that display and edit it.

mod dialog;
mod grid;
mod tile;

pub use dialog::{image_filter, AddFavoriteDialog, NewFavorite};
pub use grid::FavoritesGrid;

use crate::config;
use crate::preferences::{Favorite, Preferences};
use url::Url;

/// Why a favorite was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteError {
    EmptyName,
    EmptyUrl,
}

impl std::fmt::Display for FavoriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FavoriteError::EmptyName => write!(f, "A name is required"),
            FavoriteError::EmptyUrl => write!(f, "A URL is required"),
        }
    }
}

impl std::error::Error for FavoriteError {}

/// Add https:// unless the input already names http or https
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Favicon service URL for the origin of `site`, or None if `site` isn't a
/// usable URL
pub fn favicon_url(service: &str, site: &str) -> Option<Url> {
    let site = Url::parse(&normalize_url(site)).ok()?;
    site.host_str()?;
    let origin = site.origin().ascii_serialization();

    let mut url = Url::parse(service).ok()?;
    url.query_pairs_mut()
        .append_pair("client", "SOCIAL")
        .append_pair("type", "FAVICON")
        .append_pair("fallback_opts", "TYPE,SIZE,URL")
        .append_pair("url", &origin)
        .append_pair("size", &config::FAVICON_SIZE.to_string());
    Some(url)
}

/// Validating facade over the favorites stored in [`Preferences`]
pub struct FavoritesRegistry<'a> {
    prefs: &'a Preferences,
}

impl<'a> FavoritesRegistry<'a> {
    pub fn new(prefs: &'a Preferences) -> Self {
        Self { prefs }
    }

    /// Favorites in insertion order
    pub fn list(&self) -> Vec<Favorite> {
        self.prefs.favorites()
    }

    /// Validate and add a favorite
    pub fn add(&self, name: &str, url: &str, icon: Option<String>) -> Result<Favorite, FavoriteError> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() {
            return Err(FavoriteError::EmptyName);
        }
        if url.is_empty() {
            return Err(FavoriteError::EmptyUrl);
        }
        Ok(self.prefs.add_favorite(name, &normalize_url(url), icon))
    }

    /// Remove by id; removing an unknown id changes nothing
    pub fn remove(&self, id: i64) {
        self.prefs.remove_favorite(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Store;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url(" http://example.com "), "http://example.com");
        assert_eq!(normalize_url("https://example.com/a"), "https://example.com/a");
        assert_eq!(normalize_url("ftp.example.com"), "https://ftp.example.com");
    }

    #[test]
    fn test_add_validates_and_normalizes() {
        let prefs = Preferences::load(Store::in_memory());
        let registry = FavoritesRegistry::new(&prefs);

        assert_eq!(registry.add("  ", "example.com", None), Err(FavoriteError::EmptyName));
        assert_eq!(registry.add("Example", "   ", None), Err(FavoriteError::EmptyUrl));
        assert_eq!(registry.list().len(), 4);

        let added = registry.add(" Example ", "example.com", None).unwrap();
        assert_eq!(added.name, "Example");
        assert_eq!(added.url, "https://example.com");
        assert_eq!(registry.list().last(), Some(&added));
    }

    #[test]
    fn test_duplicates_are_allowed() {
        let prefs = Preferences::load(Store::in_memory());
        let registry = FavoritesRegistry::new(&prefs);

        let a = registry.add("Same", "same.example", None).unwrap();
        let b = registry.add("Same", "same.example", None).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(registry.list().len(), 6);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let prefs = Preferences::load(Store::in_memory());
        let registry = FavoritesRegistry::new(&prefs);

        let added = registry.add("Temp", "temp.example", None).unwrap();
        registry.remove(added.id);
        let after_first = registry.list();
        registry.remove(added.id);
        assert_eq!(registry.list(), after_first);
        assert_eq!(after_first.len(), 4);
    }

    #[test]
    fn test_favicon_url_uses_origin() {
        let url = favicon_url(config::FAVICON_URL, "github.com/rust-lang/rust").unwrap();
        assert!(url.as_str().starts_with("https://t2.google.com/faviconV2?"));
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("url".to_string(), "https://github.com".to_string())));
        assert!(pairs.contains(&("size".to_string(), "64".to_string())));
    }

    #[test]
    fn test_favicon_url_rejects_garbage() {
        assert!(favicon_url(config::FAVICON_URL, "not a url at all").is_none());
    }
}
