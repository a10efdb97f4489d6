//! HTTP client construction for the collectors.
//!
//! One pooled `reqwest::Client` serves many concurrent scans; it is the only
//! shared facility in the engine. API calls go out with a fixed identifying
//! user agent, page fetches rotate browser agents.

use reqwest::Client;
use std::time::Duration;

use crate::NetError;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Follow redirects up to this many hops
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_redirects: 5,
        }
    }
}

/// User agent for code-hosting API calls
pub const API_USER_AGENT: &str = "signal-rank/0.1";

/// Browser user agents for page fetches, rotated per request
const BROWSER_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random browser user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..BROWSER_USER_AGENTS.len());
    BROWSER_USER_AGENTS[idx]
}

/// Create the shared HTTP client used for API calls
pub fn create_api_client(config: &HttpConfig) -> Result<Client, NetError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(API_USER_AGENT)
        .build()
        .map_err(|e| NetError::ClientBuild(e.to_string()))
}

/// Create the shared HTTP client used for page fetches
pub fn create_page_client(config: &HttpConfig) -> Result<Client, NetError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(random_user_agent())
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .build()
        .map_err(|e| NetError::ClientBuild(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_random_user_agent() {
        let ua = random_user_agent();
        assert!(ua.contains("Mozilla"));
    }

    #[test]
    fn test_clients_build() {
        let config = HttpConfig::default();
        assert!(create_api_client(&config).is_ok());
        assert!(create_page_client(&config).is_ok());
    }
}
