//! Page retrieval: fetch a results page and decode it.
//!
//! Every failure is logged and turned into `None`; callers never see
//! transport errors.

use std::time::Duration;

use log::{debug, error, info};

use crate::config::DleConfig;
use crate::error::{DleError, Result};
use crate::logger;
use crate::search::SearchResult;

/// `<base>/<percent-encoded word>`
pub fn word_url(base: &str, word: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(word))
}

pub struct Client {
    http: reqwest::blocking::Client,
    config: DleConfig,
}

impl Client {
    /// Installs the logger at `config.log_level` when none is installed yet.
    pub fn new(config: DleConfig) -> Result<Self> {
        logger::ensure_init_at(config.log_level);
        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &DleConfig {
        &self.config
    }

    /// Only URLs under the configured base are fetched.
    pub fn check_url(&self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(DleError::InvalidUrl("no URL was specified".to_string()));
        }
        if !url.starts_with(self.config.base()) {
            return Err(DleError::InvalidUrl(format!(
                "'{url}' does not start with the known '{}' URL",
                self.config.base()
            )));
        }
        Ok(())
    }

    pub fn search_by_url(&self, url: &str) -> Option<SearchResult> {
        if let Err(e) = self.check_url(url) {
            error!("{e}");
            return None;
        }
        info!("Performing request to: '{url}'...");
        match self.fetch(url) {
            Ok(result) => Some(result),
            Err(e) => {
                error!("search for '{url}' failed: {e}");
                None
            }
        }
    }

    pub fn search_by_word(&self, word: &str) -> Option<SearchResult> {
        if word.is_empty() {
            error!("No word was specified.");
            return None;
        }
        self.search_by_url(&word_url(self.config.base(), word))
    }

    fn fetch(&self, url: &str) -> Result<SearchResult> {
        let response = self.http.get(url).send()?.error_for_status()?;
        debug!("Received response with status code {}.", response.status());
        let body = response.text()?;
        SearchResult::from_html(&body)
    }
}

/// Search with a default-configured client.
pub fn search_by_url(url: &str) -> Option<SearchResult> {
    match Client::new(DleConfig::default()) {
        Ok(client) => client.search_by_url(url),
        Err(e) => {
            error!("could not build the HTTP client: {e}");
            None
        }
    }
}

/// Search a word with a default-configured client.
pub fn search_by_word(word: &str) -> Option<SearchResult> {
    match Client::new(DleConfig::default()) {
        Ok(client) => client.search_by_word(word),
        Err(e) => {
            error!("could not build the HTTP client: {e}");
            None
        }
    }
}
