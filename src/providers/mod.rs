pub mod exchangerate_api;
pub mod open_er_api;

use crate::core::config::{ProviderConfig, ProviderKind};
use crate::core::rates::{FetchFailure, RateProvider};
use anyhow::Result;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "fxconv/0.1";

pub(crate) fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Fetches `url` and returns the body of a successful response.
pub(crate) async fn get_body(client: &reqwest::Client, url: &str) -> Result<String, FetchFailure> {
    debug!("Requesting rates from {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchFailure::Transport(format!("{e} URL: {url}")))?;

    if !response.status().is_success() {
        return Err(FetchFailure::Transport(format!(
            "HTTP error: {} URL: {url}",
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| FetchFailure::Transport(format!("Failed to read body: {e}")))
}

/// Creates the provider selected in the configuration.
pub fn from_config(config: &ProviderConfig) -> Result<Box<dyn RateProvider>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let provider: Box<dyn RateProvider> = match config.kind {
        ProviderKind::OpenErApi => Box::new(open_er_api::OpenErApiProvider::new(
            config.base_url(),
            timeout,
        )?),
        ProviderKind::ExchangerateApi => Box::new(
            exchangerate_api::ExchangerateApiProvider::new(config.base_url(), timeout)?,
        ),
    };
    Ok(provider)
}
