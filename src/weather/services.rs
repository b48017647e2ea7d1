//! Open-Meteo weather and geocoding, Nominatim reverse geocoding.

use super::{Coordinates, CurrentWeather, LookupError, Place, WeatherServices};
use crate::http::HttpClient;
use crate::user_config::ServicesConfig;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: ForecastCurrent,
}

#[derive(Debug, Deserialize)]
struct ForecastCurrent {
    temperature: f64,
    weathercode: i32,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: ReverseAddress,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

impl ReverseResponse {
    fn place_name(self) -> Option<String> {
        let ReverseAddress { city, town, village } = self.address;
        city.or(town)
            .or(village)
            .filter(|name| !name.trim().is_empty())
    }
}

fn endpoint(base: &str) -> Result<Url, LookupError> {
    Url::parse(base).map_err(|e| LookupError::Transport(format!("bad endpoint {}: {}", base, e)))
}

fn forecast_request(base: &str, at: Coordinates) -> Result<Url, LookupError> {
    let mut url = endpoint(base)?;
    url.query_pairs_mut()
        .append_pair("latitude", &at.latitude.to_string())
        .append_pair("longitude", &at.longitude.to_string())
        .append_pair("current_weather", "true");
    Ok(url)
}

fn geocoding_request(base: &str, city: &str) -> Result<Url, LookupError> {
    let mut url = endpoint(base)?;
    url.query_pairs_mut()
        .append_pair("name", city)
        .append_pair("count", "1");
    Ok(url)
}

fn reverse_request(base: &str, at: Coordinates) -> Result<Url, LookupError> {
    let mut url = endpoint(base)?;
    url.query_pairs_mut()
        .append_pair("format", "json")
        .append_pair("lat", &at.latitude.to_string())
        .append_pair("lon", &at.longitude.to_string());
    Ok(url)
}

/// Weather services backed by public HTTP APIs
#[derive(Debug, Clone)]
pub struct OpenMeteoServices {
    http: HttpClient,
    endpoints: ServicesConfig,
}

impl OpenMeteoServices {
    pub fn new(http: HttpClient, endpoints: ServicesConfig) -> Self {
        Self { http, endpoints }
    }
}

impl WeatherServices for OpenMeteoServices {
    async fn geocode(&self, city: &str) -> Result<Vec<Place>, LookupError> {
        let url = geocoding_request(&self.endpoints.geocoding_url, city)?;
        let response: GeocodingResponse = self.http.get_json(&url).await?;
        log::debug!("Geocoding {:?}: {} result(s)", city, response.results.len());
        Ok(response
            .results
            .into_iter()
            .map(|r| Place {
                coordinates: Coordinates::new(r.latitude, r.longitude),
                name: r.name,
            })
            .collect())
    }

    async fn current_weather(&self, at: Coordinates) -> Result<CurrentWeather, LookupError> {
        let url = forecast_request(&self.endpoints.forecast_url, at)?;
        let response: ForecastResponse = self.http.get_json(&url).await?;
        Ok(CurrentWeather {
            temperature: response.current_weather.temperature,
            weather_code: response.current_weather.weathercode,
        })
    }

    async fn reverse_geocode(&self, at: Coordinates) -> Result<Option<String>, LookupError> {
        let url = reverse_request(&self.endpoints.reverse_geocoding_url, at)?;
        let response: ReverseResponse = self.http.get_json(&url).await?;
        Ok(response.place_name())
    }
}
