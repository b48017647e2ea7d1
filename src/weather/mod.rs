//! Weather for the configured city or the device's location.
//!
//! A resolution run goes: city → geocode, or no city → device location
//! (falling back to a fixed city), then current weather, then a reverse
//! lookup for the place name when it isn't known yet.

mod card;
mod controller;
mod geolocation;
mod services;

pub use card::WeatherCard;
pub use controller::{WeatherController, WeatherState};
pub use geolocation::DeviceLocator;
pub use services::OpenMeteoServices;

/// Controller wired to the real services
pub type SystemWeather = WeatherController<OpenMeteoServices, DeviceLocator>;

use crate::config;
use crate::http::FetchError;

/// A point on the globe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A geocoding match
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub coordinates: Coordinates,
    pub name: String,
}

/// Raw current conditions from the weather service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentWeather {
    pub temperature: f64,
    /// WMO weather interpretation code
    pub weather_code: i32,
}

/// Weather condition categories shown on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl WeatherIcon {
    /// Map a WMO weather interpretation code
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => WeatherIcon::Clear,
            1 => WeatherIcon::PartlyCloudy,
            2 | 3 => WeatherIcon::Overcast,
            45 | 48 => WeatherIcon::Fog,
            51 | 53 | 55 => WeatherIcon::Drizzle,
            61 | 63 | 65 | 80 | 81 | 82 => WeatherIcon::Rain,
            71 | 73 | 75 | 77 => WeatherIcon::Snow,
            95 | 96 | 99 => WeatherIcon::Thunderstorm,
            _ => WeatherIcon::Unknown,
        }
    }

    /// Symbolic icon from the freedesktop icon theme
    pub fn icon_name(&self) -> &'static str {
        match self {
            WeatherIcon::Clear => "weather-clear-symbolic",
            WeatherIcon::PartlyCloudy => "weather-few-clouds-symbolic",
            WeatherIcon::Overcast => "weather-overcast-symbolic",
            WeatherIcon::Fog => "weather-fog-symbolic",
            WeatherIcon::Drizzle => "weather-showers-scattered-symbolic",
            WeatherIcon::Rain => "weather-showers-symbolic",
            WeatherIcon::Snow => "weather-snow-symbolic",
            WeatherIcon::Thunderstorm => "weather-storm-symbolic",
            WeatherIcon::Unknown => "dialog-question-symbolic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WeatherIcon::Clear => "Clear",
            WeatherIcon::PartlyCloudy => "Partly cloudy",
            WeatherIcon::Overcast => "Overcast",
            WeatherIcon::Fog => "Fog",
            WeatherIcon::Drizzle => "Drizzle",
            WeatherIcon::Rain => "Rain",
            WeatherIcon::Snow => "Snow",
            WeatherIcon::Thunderstorm => "Thunderstorm",
            WeatherIcon::Unknown => "Unknown",
        }
    }
}

/// What the weather card displays
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temperature_c: i32,
    pub city: String,
    pub icon: WeatherIcon,
}

/// Outcome of one resolution run
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Success(WeatherReport),
    /// Weather resolved, but something along the way degraded
    Partial(WeatherReport, String),
    Failure(String),
}

impl Resolution {
    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            Resolution::Success(report) | Resolution::Partial(report, _) => Some(report),
            Resolution::Failure(_) => None,
        }
    }

    /// Warning or error text, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Resolution::Success(_) => None,
            Resolution::Partial(_, message) | Resolution::Failure(message) => Some(message),
        }
    }
}

/// Failure of an external lookup
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    NotFound,
    Transport(String),
    PermissionDenied,
    Unsupported,
    Corrupt(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::NotFound => write!(f, "Not found"),
            LookupError::Transport(msg) => write!(f, "Transport failure: {}", msg),
            LookupError::PermissionDenied => write!(f, "Permission denied"),
            LookupError::Unsupported => write!(f, "Unsupported"),
            LookupError::Corrupt(msg) => write!(f, "Corrupt response: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<FetchError> for LookupError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Decode(msg) => LookupError::Corrupt(msg),
            other => LookupError::Transport(other.to_string()),
        }
    }
}

/// External weather, geocoding and reverse geocoding lookups
#[allow(async_fn_in_trait)]
pub trait WeatherServices {
    /// Matches for a free-text city name, best first; empty when none
    async fn geocode(&self, city: &str) -> Result<Vec<Place>, LookupError>;

    async fn current_weather(&self, at: Coordinates) -> Result<CurrentWeather, LookupError>;

    /// Best-effort place name for a position
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Option<String>, LookupError>;
}

/// Source of the device's current position
#[allow(async_fn_in_trait)]
pub trait Geolocator {
    /// May wait on a permission prompt. Fails with `PermissionDenied` or
    /// `Unsupported`.
    async fn locate(&self) -> Result<Coordinates, LookupError>;
}

pub const MSG_GEOCODE_FAILED: &str = "Failed to find city.";
pub const MSG_WEATHER_FAILED: &str = "Failed to fetch weather data.";
pub const MSG_PERMISSION_DENIED: &str = "Location permission denied.";
pub const MSG_UNSUPPORTED: &str = "Geolocation is not supported.";
pub const MSG_REVERSE_FAILED: &str = "Could not determine city name.";

fn city_not_found(city: &str) -> String {
    format!("Could not find location for \"{}\".", city)
}

/// Nearest whole degree, halves towards positive infinity
fn round_half_up(celsius: f64) -> i32 {
    (celsius + 0.5).floor() as i32
}

/// Runs the fallback chain against a set of services
pub struct WeatherResolver<S, G> {
    services: S,
    locator: G,
}

impl<S: WeatherServices, G: Geolocator> WeatherResolver<S, G> {
    pub fn new(services: S, locator: G) -> Self {
        Self { services, locator }
    }

    /// Resolve weather for `city`, or for the device location when `city`
    /// is blank
    pub async fn resolve(&self, city: &str) -> Resolution {
        let city = city.trim();
        let mut warning: Option<String> = None;

        let (at, known_city) = if !city.is_empty() {
            match self.services.geocode(city).await {
                Ok(places) => match places.into_iter().next() {
                    Some(place) => (place.coordinates, Some(place.name)),
                    None => return Resolution::Failure(city_not_found(city)),
                },
                Err(LookupError::NotFound) => return Resolution::Failure(city_not_found(city)),
                Err(e) => {
                    log::warn!("Geocoding {:?} failed: {}", city, e);
                    return Resolution::Failure(MSG_GEOCODE_FAILED.to_string());
                }
            }
        } else {
            match self.locator.locate().await {
                Ok(at) => (at, None),
                Err(e) => {
                    log::info!("Device location unavailable ({}), using fallback", e);
                    let message = match e {
                        LookupError::PermissionDenied => MSG_PERMISSION_DENIED,
                        _ => MSG_UNSUPPORTED,
                    };
                    warning = Some(message.to_string());
                    let (lat, lon, label) = config::FALLBACK_LOCATION;
                    (Coordinates::new(lat, lon), Some(label.to_string()))
                }
            }
        };

        let current = match self.services.current_weather(at).await {
            Ok(current) => current,
            Err(e) => {
                log::warn!("Weather lookup for {:?} failed: {}", at, e);
                return Resolution::Failure(MSG_WEATHER_FAILED.to_string());
            }
        };

        let city_label = match known_city {
            Some(name) => name,
            None => match self.services.reverse_geocode(at).await {
                Ok(Some(name)) => name,
                Ok(None) => config::UNKNOWN_CITY_LABEL.to_string(),
                Err(e) => {
                    log::warn!("Reverse geocoding {:?} failed: {}", at, e);
                    warning.get_or_insert_with(|| MSG_REVERSE_FAILED.to_string());
                    config::UNKNOWN_CITY_LABEL.to_string()
                }
            },
        };

        let report = WeatherReport {
            temperature_c: round_half_up(current.temperature),
            city: city_label,
            icon: WeatherIcon::from_wmo_code(current.weather_code),
        };

        match warning {
            Some(warning) => Resolution::Partial(report, warning),
            None => Resolution::Success(report),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use futures::channel::oneshot;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted services. Weather temperature equals the latitude so tests
    /// can tell which place a report came from.
    #[derive(Default)]
    pub struct FakeServices {
        pub places: HashMap<String, Place>,
        pub geocode_fails: bool,
        pub weather_fails: bool,
        pub weather_code: i32,
        pub reverse_name: Option<String>,
        pub reverse_fails: bool,
        /// Geocoding for these cities waits until the sender fires
        pub gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeServices {
        pub fn with_place(mut self, name: &str, lat: f64, lon: f64) -> Self {
            self.places.insert(
                name.to_string(),
                Place {
                    coordinates: Coordinates::new(lat, lon),
                    name: name.to_string(),
                },
            );
            self
        }

        /// Hold geocoding of `city` until the returned sender is fired
        pub fn gate(&self, city: &str) -> oneshot::Sender<()> {
            let (sender, receiver) = oneshot::channel();
            self.gates.borrow_mut().insert(city.to_string(), receiver);
            sender
        }
    }

    impl WeatherServices for FakeServices {
        async fn geocode(&self, city: &str) -> Result<Vec<Place>, LookupError> {
            self.calls.borrow_mut().push(format!("geocode:{}", city));
            let gate = self.gates.borrow_mut().remove(city);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.geocode_fails {
                return Err(LookupError::Transport("503".into()));
            }
            Ok(self.places.get(city).cloned().into_iter().collect())
        }

        async fn current_weather(&self, at: Coordinates) -> Result<CurrentWeather, LookupError> {
            self.calls.borrow_mut().push("weather".to_string());
            if self.weather_fails {
                return Err(LookupError::Transport("timeout".into()));
            }
            Ok(CurrentWeather {
                temperature: at.latitude,
                weather_code: self.weather_code,
            })
        }

        async fn reverse_geocode(&self, _at: Coordinates) -> Result<Option<String>, LookupError> {
            self.calls.borrow_mut().push("reverse".to_string());
            if self.reverse_fails {
                return Err(LookupError::Transport("refused".into()));
            }
            Ok(self.reverse_name.clone())
        }
    }

    pub struct FakeLocator(pub Result<Coordinates, LookupError>);

    impl Geolocator for FakeLocator {
        async fn locate(&self) -> Result<Coordinates, LookupError> {
            self.0.clone()
        }
    }
}
