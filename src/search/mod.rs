use crate::preferences::SearchEngine;
use url::Url;

/// Build a search URL for `query` with the given engine
pub fn build_search_url(engine: &SearchEngine, query: &str) -> Result<Url, url::ParseError> {
    let encoded = urlencoding::encode(query);
    Url::parse(&format!("{}{}", engine.url, encoded))
}

/// Resolve search bar input to the URL to open, if any.
///
/// Blank input does nothing. Anything else, including text that looks like
/// an address, is sent to the selected engine as typed.
pub fn resolve(engine: &SearchEngine, input: &str) -> Option<Url> {
    if input.trim().is_empty() {
        return None;
    }

    match build_search_url(engine, input) {
        Ok(url) => Some(url),
        Err(e) => {
            log::warn!("Invalid search URL for engine '{}': {}", engine.name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input() {
        assert!(resolve(&SearchEngine::default(), "").is_none());
        assert!(resolve(&SearchEngine::default(), " \t ").is_none());
    }

    #[test]
    fn test_search_url_uses_engine_prefix() {
        let ddg = SearchEngine::by_name("DuckDuckGo").unwrap();
        let url = build_search_url(&ddg, "hello world & more").unwrap();
        assert_eq!(url.as_str(), "https://duckduckgo.com/?q=hello%20world%20%26%20more");
    }

    #[test]
    fn test_query_with_default_engine() {
        let url = resolve(&SearchEngine::default(), "weather today").unwrap();
        assert_eq!(url.as_str(), "https://www.google.com/search?q=weather%20today");
    }

    #[test]
    fn test_domain_like_input_is_searched() {
        let url = resolve(&SearchEngine::default(), "node.js").unwrap();
        assert_eq!(url.as_str(), "https://www.google.com/search?q=node.js");
    }

    #[test]
    fn test_urls_go_to_the_selected_engine() {
        let ddg = SearchEngine::by_name("DuckDuckGo").unwrap();
        let url = resolve(&ddg, "file:///etc/passwd").unwrap();
        assert_eq!(url.as_str(), "https://duckduckgo.com/?q=file%3A%2F%2F%2Fetc%2Fpasswd");

        let url = resolve(&ddg, "localhost").unwrap();
        assert_eq!(url.as_str(), "https://duckduckgo.com/?q=localhost");
    }
}
