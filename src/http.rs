//! Minimal HTTP GET client on top of libsoup.

use crate::config;
use serde::de::DeserializeOwned;
use soup::glib::translate::IntoGlib;
use soup::prelude::*;
use url::Url;

/// Errors that can occur while fetching a resource
#[derive(Debug)]
pub enum FetchError {
    /// The URL was rejected by libsoup
    InvalidUrl(String),
    /// Connection, DNS, TLS or timeout failure
    Transport(String),
    /// The server answered with a non-success status
    Status(String),
    /// The body couldn't be decoded
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            FetchError::Transport(msg) => write!(f, "Request failed: {}", msg),
            FetchError::Status(msg) => write!(f, "HTTP error: {}", msg),
            FetchError::Decode(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Shared libsoup session with a per-request timeout
#[derive(Clone)]
pub struct HttpClient {
    session: soup::Session,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(timeout_secs: u32) -> Self {
        let session = soup::Session::new();
        session.set_timeout(timeout_secs);
        session.set_user_agent(config::USER_AGENT);
        Self { session }
    }

    /// Fetch the body of `url`
    pub async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let message = soup::Message::new("GET", url.as_str())
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        log::debug!("GET {}", url);

        let bytes = self
            .session
            .send_and_read_future(&message, soup::glib::Priority::DEFAULT)
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = message.status();
        if !is_success(status.into_glib() as u32) {
            return Err(FetchError::Status(format!("{:?}", status)));
        }

        Ok(bytes.to_vec())
    }

    /// Fetch `url` and decode its body as JSON
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let bytes = self.get_bytes(url).await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_2xx_is_success() {
        for code in [200, 201, 203, 204, 205, 206, 299] {
            assert!(is_success(code), "{} should succeed", code);
        }
    }

    #[test]
    fn test_non_2xx_fails() {
        for code in [0, 101, 199, 300, 304, 404, 500] {
            assert!(!is_success(code), "{} should fail", code);
        }
    }
}
