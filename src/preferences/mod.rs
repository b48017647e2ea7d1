//! User preferences: favorites, wallpaper, search engine, blur and weather city.
//!
//! Every field is persisted under its own key as soon as it changes. There is
//! no atomicity across fields; each one is meaningful on its own.

mod window;

pub use window::PreferencesDialog;

use crate::config;
use crate::storage::Store;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A bookmarked site shown in the favorites grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Custom icon as a `data:` URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A search engine from the fixed catalog. Stored by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEngine {
    pub name: String,
    /// Query prefix; the encoded query is appended to it
    pub url: String,
}

impl SearchEngine {
    /// All available engines, default first
    pub fn catalog() -> Vec<SearchEngine> {
        config::SEARCH_ENGINES
            .iter()
            .map(|(name, url)| SearchEngine {
                name: name.to_string(),
                url: url.to_string(),
            })
            .collect()
    }

    /// Look up a catalog engine by display name
    pub fn by_name(name: &str) -> Option<SearchEngine> {
        Self::catalog().into_iter().find(|e| e.name == name)
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        let (name, url) = config::SEARCH_ENGINES[0];
        SearchEngine {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Name of the wallpaper preset whose URL equals `url`, if any
pub fn wallpaper_preset_name(url: &str) -> Option<&'static str> {
    config::WALLPAPER_PRESETS
        .iter()
        .find(|(_, preset_url)| *preset_url == url)
        .map(|(name, _)| *name)
}

/// Identifies which preference changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    Favorites,
    Wallpaper,
    SearchEngine,
    Blur,
    UserCity,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 5] = [
        PreferenceKey::Favorites,
        PreferenceKey::Wallpaper,
        PreferenceKey::SearchEngine,
        PreferenceKey::Blur,
        PreferenceKey::UserCity,
    ];

    /// Storage key for this preference
    pub fn storage_key(&self) -> &'static str {
        match self {
            PreferenceKey::Favorites => config::KEY_FAVORITES,
            PreferenceKey::Wallpaper => config::KEY_WALLPAPER,
            PreferenceKey::SearchEngine => config::KEY_SEARCH_ENGINE,
            PreferenceKey::Blur => config::KEY_BLUR,
            PreferenceKey::UserCity => config::KEY_USER_CITY,
        }
    }
}

fn default_favorites() -> Vec<Favorite> {
    config::INITIAL_FAVORITES
        .iter()
        .map(|(id, name, url)| Favorite {
            id: *id,
            name: name.to_string(),
            url: url.to_string(),
            icon: None,
        })
        .collect()
}

fn clamp_blur(px: i32) -> i32 {
    px.clamp(config::MIN_BLUR, config::MAX_BLUR)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Pick an id that is unique within `existing` and greater than all of them.
/// Uses the wall clock so ids stay meaningful as creation times.
fn next_favorite_id(existing: &[Favorite], now_ms: i64) -> i64 {
    let max = existing.iter().map(|f| f.id).max().unwrap_or(0);
    now_ms.max(max.saturating_add(1))
}

/// In-memory preference state, written through to the store on every change.
pub struct Preferences {
    store: Store,
    favorites: RefCell<Vec<Favorite>>,
    wallpaper: RefCell<String>,
    search_engine: RefCell<SearchEngine>,
    blur: Cell<i32>,
    user_city: RefCell<String>,
    on_changed_callbacks: RefCell<Vec<Rc<dyn Fn(PreferenceKey)>>>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("favorites", &self.favorites.borrow().len())
            .field("search_engine", &self.search_engine.borrow().name)
            .field("blur", &self.blur.get())
            .field("user_city", &self.user_city.borrow())
            .finish_non_exhaustive()
    }
}

impl Preferences {
    /// Load every preference from `store`, using defaults for missing or
    /// corrupt values.
    pub fn load(store: Store) -> Self {
        let favorites = store.get(config::KEY_FAVORITES, default_favorites());
        let wallpaper = store.get(config::KEY_WALLPAPER, config::DEFAULT_WALLPAPER.to_string());
        let blur = clamp_blur(store.get(config::KEY_BLUR, config::DEFAULT_BLUR));
        let user_city = store.get(config::KEY_USER_CITY, String::new());

        let stored_engine: SearchEngine = store.get(config::KEY_SEARCH_ENGINE, SearchEngine::default());
        let search_engine = SearchEngine::by_name(&stored_engine.name).unwrap_or_else(|| {
            log::warn!("Unknown search engine '{}', using default", stored_engine.name);
            SearchEngine::default()
        });

        log::info!(
            "Preferences loaded: {} favorites, engine={}, blur={}px, city={:?}",
            favorites.len(),
            search_engine.name,
            blur,
            user_city
        );

        Self {
            store,
            favorites: RefCell::new(favorites),
            wallpaper: RefCell::new(wallpaper),
            search_engine: RefCell::new(search_engine),
            blur: Cell::new(blur),
            user_city: RefCell::new(user_city),
            on_changed_callbacks: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe to preference changes
    pub fn connect_changed<F: Fn(PreferenceKey) + 'static>(&self, callback: F) {
        self.on_changed_callbacks
            .borrow_mut()
            .push(Rc::new(callback));
    }

    fn notify_changed(&self, key: PreferenceKey) {
        // Callbacks may read preferences, so release the borrow first
        let callbacks: Vec<_> = self.on_changed_callbacks.borrow().iter().cloned().collect();
        for callback in callbacks {
            callback(key);
        }
    }

    pub fn favorites(&self) -> Vec<Favorite> {
        self.favorites.borrow().clone()
    }

    pub fn wallpaper(&self) -> String {
        self.wallpaper.borrow().clone()
    }

    pub fn search_engine(&self) -> SearchEngine {
        self.search_engine.borrow().clone()
    }

    pub fn blur(&self) -> i32 {
        self.blur.get()
    }

    pub fn user_city(&self) -> String {
        self.user_city.borrow().clone()
    }

    /// Append a favorite with a freshly generated id. Name and URL are taken
    /// as given; validation belongs to the favorites registry.
    pub fn add_favorite(&self, name: &str, url: &str, icon: Option<String>) -> Favorite {
        let favorite = {
            let mut favorites = self.favorites.borrow_mut();
            let favorite = Favorite {
                id: next_favorite_id(&favorites, now_millis()),
                name: name.to_string(),
                url: url.to_string(),
                icon,
            };
            favorites.push(favorite.clone());
            self.store.set(config::KEY_FAVORITES, &*favorites);
            favorite
        };

        log::info!("Added favorite '{}' (id={})", favorite.name, favorite.id);
        self.notify_changed(PreferenceKey::Favorites);
        favorite
    }

    /// Remove the favorite with `id`. Returns false if there was none.
    pub fn remove_favorite(&self, id: i64) -> bool {
        let removed = {
            let mut favorites = self.favorites.borrow_mut();
            let before = favorites.len();
            favorites.retain(|f| f.id != id);
            let removed = favorites.len() != before;
            if removed {
                self.store.set(config::KEY_FAVORITES, &*favorites);
            }
            removed
        };

        if removed {
            log::info!("Removed favorite id={}", id);
            self.notify_changed(PreferenceKey::Favorites);
        } else {
            log::debug!("No favorite with id={} to remove", id);
        }
        removed
    }

    /// Set the wallpaper: a preset URL, any image URL, or a `data:` URI
    pub fn set_wallpaper(&self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        *self.wallpaper.borrow_mut() = url.to_string();
        self.store.set(config::KEY_WALLPAPER, url);
        self.notify_changed(PreferenceKey::Wallpaper);
    }

    /// Select a catalog search engine. Engines outside the catalog are
    /// rejected and false is returned.
    pub fn set_search_engine(&self, engine: &SearchEngine) -> bool {
        let Some(engine) = SearchEngine::by_name(&engine.name) else {
            log::warn!("Ignoring unknown search engine '{}'", engine.name);
            return false;
        };
        self.store.set(config::KEY_SEARCH_ENGINE, &engine);
        *self.search_engine.borrow_mut() = engine;
        self.notify_changed(PreferenceKey::SearchEngine);
        true
    }

    /// Set the blur radius, clamped to the supported range
    pub fn set_blur(&self, px: i32) {
        let px = clamp_blur(px);
        if self.blur.replace(px) == px {
            return;
        }
        self.store.set(config::KEY_BLUR, &px);
        self.notify_changed(PreferenceKey::Blur);
    }

    /// Set the weather city. Empty means automatic location.
    pub fn set_user_city(&self, city: &str) {
        let city = city.trim();
        if *self.user_city.borrow() == city {
            return;
        }
        *self.user_city.borrow_mut() = city.to_string();
        self.store.set(config::KEY_USER_CITY, city);
        log::info!("Weather city set to {:?}", city);
        self.notify_changed(PreferenceKey::UserCity);
    }

    /// Forget every stored preference and go back to defaults
    pub fn reset(&self) {
        for key in PreferenceKey::ALL {
            self.store.remove(key.storage_key());
        }

        *self.favorites.borrow_mut() = default_favorites();
        *self.wallpaper.borrow_mut() = config::DEFAULT_WALLPAPER.to_string();
        *self.search_engine.borrow_mut() = SearchEngine::default();
        self.blur.set(config::DEFAULT_BLUR);
        self.user_city.borrow_mut().clear();

        log::info!("Preferences reset to defaults");
        for key in PreferenceKey::ALL {
            self.notify_changed(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueBackend, MemoryBackend};
    use std::collections::HashSet;

    fn prefs() -> Preferences {
        Preferences::load(Store::in_memory())
    }

    fn prefs_with(entries: &[(&str, &str)]) -> Preferences {
        let backend = MemoryBackend::new();
        for (key, value) in entries {
            backend.write(key, value).unwrap();
        }
        Preferences::load(Store::new(Box::new(backend)))
    }

    #[test]
    fn test_defaults() {
        let prefs = prefs();
        let names: Vec<_> = prefs.favorites().into_iter().map(|f| f.name).collect();
        assert_eq!(names, ["YouTube", "ChatGPT", "Gemini", "Google Drive"]);
        assert_eq!(prefs.wallpaper(), config::DEFAULT_WALLPAPER);
        assert_eq!(prefs.search_engine().name, "Google");
        assert_eq!(prefs.blur(), 12);
        assert_eq!(prefs.user_city(), "");
    }

    #[test]
    fn test_add_favorite_appends_with_unique_id() {
        let prefs = prefs();
        let before = prefs.favorites();

        let added = prefs.add_favorite("Rust", "https://rust-lang.org", None);
        let after = prefs.favorites();

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after.last(), Some(&added));
        assert!(before.iter().all(|f| f.id != added.id));
        assert_eq!(&after[..before.len()], &before[..]);
    }

    #[test]
    fn test_rapid_adds_never_collide() {
        let prefs = prefs();
        for i in 0..50 {
            prefs.add_favorite(&format!("Site {}", i), "https://example.com", None);
        }
        let favorites = prefs.favorites();
        let ids: HashSet<_> = favorites.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), favorites.len());
        assert!(favorites.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_next_id_skips_future_ids() {
        let existing = vec![Favorite {
            id: 5_000,
            name: "a".into(),
            url: "https://a.example".into(),
            icon: None,
        }];
        assert_eq!(next_favorite_id(&existing, 1_000), 5_001);
        assert_eq!(next_favorite_id(&existing, 9_000), 9_000);
        assert_eq!(next_favorite_id(&[], 42), 42);
    }

    #[test]
    fn test_next_id_saturates_at_max() {
        let existing = vec![Favorite {
            id: i64::MAX,
            name: "a".into(),
            url: "https://a.example".into(),
            icon: None,
        }];
        assert_eq!(next_favorite_id(&existing, 1_000), i64::MAX);
    }

    #[test]
    fn test_remove_favorite_keeps_order() {
        let prefs = prefs();
        assert!(prefs.remove_favorite(2));
        let ids: Vec<_> = prefs.favorites().iter().map(|f| f.id).collect();
        assert_eq!(ids, [1, 3, 4]);
    }

    #[test]
    fn test_remove_missing_favorite_is_noop() {
        let prefs = prefs();
        let before = prefs.favorites();
        assert!(!prefs.remove_favorite(999));
        assert!(!prefs.remove_favorite(999));
        assert_eq!(prefs.favorites(), before);
    }

    #[test]
    fn test_blur_is_clamped() {
        let prefs = prefs();
        prefs.set_blur(-5);
        assert_eq!(prefs.blur(), 0);
        prefs.set_blur(999);
        assert_eq!(prefs.blur(), 40);
        prefs.set_blur(25);
        assert_eq!(prefs.blur(), 25);
    }

    #[test]
    fn test_stored_blur_is_clamped_on_load() {
        let prefs = prefs_with(&[("backgroundBlur", "400")]);
        assert_eq!(prefs.blur(), 40);
        let prefs = prefs_with(&[("backgroundBlur", "-3")]);
        assert_eq!(prefs.blur(), 0);
    }

    #[test]
    fn test_corrupt_favorites_fall_back_to_defaults() {
        let prefs = prefs_with(&[("favorites", "[{\"id\": \"oops\"}]")]);
        assert_eq!(prefs.favorites().len(), config::INITIAL_FAVORITES.len());
    }

    #[test]
    fn test_favorites_without_icon_field_load() {
        let prefs = prefs_with(&[(
            "favorites",
            r#"[{"id":17,"name":"Docs","url":"https://docs.rs"}]"#,
        )]);
        let favorites = prefs.favorites();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].icon, None);
    }

    #[test]
    fn test_search_engine_must_be_in_catalog() {
        let prefs = prefs();
        let bogus = SearchEngine {
            name: "Evil".into(),
            url: "https://evil.example/?q=".into(),
        };
        assert!(!prefs.set_search_engine(&bogus));
        assert_eq!(prefs.search_engine().name, "Google");

        let ddg = SearchEngine::by_name("DuckDuckGo").unwrap();
        assert!(prefs.set_search_engine(&ddg));
        assert_eq!(prefs.search_engine(), ddg);
    }

    #[test]
    fn test_unknown_stored_engine_is_replaced() {
        let prefs = prefs_with(&[(
            "searchEngine",
            r#"{"name":"Evil","url":"https://evil.example/?q="}"#,
        )]);
        assert_eq!(prefs.search_engine(), SearchEngine::default());
    }

    #[test]
    fn test_stored_engine_takes_catalog_url() {
        let prefs = prefs_with(&[(
            "searchEngine",
            r#"{"name":"Bing","url":"https://stale.example/?q="}"#,
        )]);
        assert_eq!(prefs.search_engine().url, "https://www.bing.com/search?q=");
    }

    #[test]
    fn test_values_persist_through_store() {
        let prefs = prefs();
        prefs.set_wallpaper("https://example.com/bg.jpg");
        prefs.set_user_city("  Berlin ");
        prefs.set_blur(3);
        prefs.add_favorite("Docs", "https://docs.rs", Some("data:image/png;base64,AA==".into()));

        let Preferences { store, .. } = prefs;
        let reloaded = Preferences::load(store);
        assert_eq!(reloaded.wallpaper(), "https://example.com/bg.jpg");
        assert_eq!(reloaded.user_city(), "Berlin");
        assert_eq!(reloaded.blur(), 3);
        let last = reloaded.favorites().pop().unwrap();
        assert_eq!(last.name, "Docs");
        assert_eq!(last.icon.as_deref(), Some("data:image/png;base64,AA=="));
    }

    #[test]
    fn test_change_notifications() {
        let prefs = prefs();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        prefs.connect_changed(move |key| seen_clone.borrow_mut().push(key));

        prefs.set_user_city("Tokyo");
        prefs.set_user_city("Tokyo ");
        prefs.set_blur(12);
        prefs.set_blur(13);
        prefs.remove_favorite(12345);

        assert_eq!(*seen.borrow(), [PreferenceKey::UserCity, PreferenceKey::Blur]);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let prefs = prefs();
        prefs.set_user_city("Cairo");
        prefs.set_blur(30);
        prefs.remove_favorite(1);

        let count = Rc::new(Cell::new(0));
        let count_clone = Rc::clone(&count);
        prefs.connect_changed(move |_| count_clone.set(count_clone.get() + 1));

        prefs.reset();
        assert_eq!(prefs.user_city(), "");
        assert_eq!(prefs.blur(), config::DEFAULT_BLUR);
        assert_eq!(prefs.favorites().len(), 4);
        assert_eq!(count.get(), PreferenceKey::ALL.len());
    }

    #[test]
    fn test_wallpaper_preset_lookup() {
        assert_eq!(
            wallpaper_preset_name("https://picsum.photos/seed/coast/1920/1080"),
            Some("Coast")
        );
        assert_eq!(wallpaper_preset_name("https://example.com/bg.jpg"), None);
    }
}
