/// Application ID (reverse domain notation)
pub const APP_ID: &str = "dev.myyc.startpage";

/// Application name
pub const APP_NAME: &str = "startpage";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent string for outgoing requests (Nominatim rejects anonymous clients)
pub const USER_AGENT: &str = concat!("startpage/", env!("CARGO_PKG_VERSION"));

/// SQLite key-value database filename
pub const STORE_DB: &str = "startpage.db";

/// JSON key-value store filename
pub const STORE_JSON: &str = "preferences.json";

/// Runtime configuration filename (inside the XDG config directory)
pub const CONFIG_FILE: &str = "config.toml";

/// Default window size
pub const DEFAULT_WINDOW_WIDTH: i32 = 1200;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 800;

// ============================================================================
// Preferences
// ============================================================================

/// Storage keys, one per independently persisted preference
pub const KEY_FAVORITES: &str = "favorites";
pub const KEY_WALLPAPER: &str = "wallpaper";
pub const KEY_SEARCH_ENGINE: &str = "searchEngine";
pub const KEY_BLUR: &str = "backgroundBlur";
pub const KEY_USER_CITY: &str = "userCity";

/// Default wallpaper when none has been chosen
pub const DEFAULT_WALLPAPER: &str = "https://picsum.photos/1920/1080";

/// Blur radius bounds and default, in pixels
pub const MIN_BLUR: i32 = 0;
pub const MAX_BLUR: i32 = 40;
pub const DEFAULT_BLUR: i32 = 12;

/// Starter favorites: (id, name, url)
pub const INITIAL_FAVORITES: &[(i64, &str, &str)] = &[
    (1, "YouTube", "https://youtube.com"),
    (2, "ChatGPT", "https://chat.openai.com"),
    (3, "Gemini", "https://gemini.google.com"),
    (4, "Google Drive", "https://drive.google.com"),
];

// ============================================================================
// Search Engines
// ============================================================================

/// Available search engines: (display_name, query_prefix)
/// The first entry is the default.
pub const SEARCH_ENGINES: &[(&str, &str)] = &[
    ("Google", "https://www.google.com/search?q="),
    ("DuckDuckGo", "https://duckduckgo.com/?q="),
    ("Bing", "https://www.bing.com/search?q="),
    ("Perplexity", "https://www.perplexity.ai/search?q="),
];

// ============================================================================
// Wallpapers
// ============================================================================

/// Wallpaper presets: (name, url)
pub const WALLPAPER_PRESETS: &[(&str, &str)] = &[
    ("Mountains", "https://picsum.photos/seed/mountains/1920/1080"),
    ("Coast", "https://picsum.photos/seed/coast/1920/1080"),
    ("City", "https://picsum.photos/seed/city/1920/1080"),
    ("Forest", "https://picsum.photos/seed/forest/1920/1080"),
    ("Abstract", "https://picsum.photos/seed/abstract/1920/1080"),
];

// ============================================================================
// Weather
// ============================================================================

/// Open-Meteo forecast endpoint
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Open-Meteo geocoding endpoint
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Nominatim reverse geocoding endpoint
pub const REVERSE_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Location used when geolocation is denied or unavailable: (lat, lon, label)
pub const FALLBACK_LOCATION: (f64, f64, &str) = (40.71, -74.01, "New York");

/// City label when reverse geocoding yields nothing
pub const UNKNOWN_CITY_LABEL: &str = "Local Area";

/// Per-request network timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u32 = 10;

// ============================================================================
// Favicons
// ============================================================================

/// Favicon lookup service
pub const FAVICON_URL: &str = "https://t2.google.com/faviconV2";

/// Requested favicon size in pixels
pub const FAVICON_SIZE: u32 = 64;
