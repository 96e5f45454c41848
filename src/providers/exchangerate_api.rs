use crate::core::currency::CurrencyCode;
use crate::core::rates::{FetchError, FetchFailure, RateProvider, RateTable};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{build_client, get_body};

/// Client for the keyless exchangerate-api.com v4 endpoint, which
/// answers with a bare `rates` object.
pub struct ExchangerateApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangerateApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        Ok(ExchangerateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client(timeout)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateProvider for ExchangerateApiProvider {
    #[instrument(name = "ExchangerateApiFetch", skip(self), fields(base = %base))]
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, FetchError> {
        let url = format!("{}/v4/latest/{}", self.base_url, base);
        let body = get_body(&self.client, &url)
            .await
            .map_err(|e| FetchError::new(base, e))?;

        let data: LatestResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::new(
                base,
                FetchFailure::Malformed(format!("Failed to parse JSON response for {base}: {e}")),
            )
        })?;

        let table = RateTable::from_raw(base.clone(), Utc::now(), data.rates);
        debug!(count = table.len(), "Fetched rates");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(base: &str, template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v4/latest/{base}")))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_response = r#"{
            "base": "EUR",
            "date": "2024-05-02",
            "rates": {"EUR": 1, "USD": 1.07, "RUB": 98.4}
        }"#;
        let server = create_mock_server(
            "EUR",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;
        let provider = ExchangerateApiProvider::new(&server.uri(), Duration::from_secs(5)).unwrap();

        let eur: CurrencyCode = "EUR".parse().unwrap();
        let table = provider.fetch(&eur).await.unwrap();
        assert_eq!(table.base(), &eur);
        assert_eq!(table.get(&"RUB".parse().unwrap()), Some(98.4));
    }

    #[tokio::test]
    async fn test_missing_rates_is_malformed() {
        let server = create_mock_server(
            "EUR",
            ResponseTemplate::new(200).set_body_string(r#"{"base": "EUR"}"#),
        )
        .await;
        let provider = ExchangerateApiProvider::new(&server.uri(), Duration::from_secs(5)).unwrap();

        let err = provider.fetch(&"EUR".parse().unwrap()).await.unwrap_err();
        assert!(matches!(err.cause, FetchFailure::Malformed(_)));
    }

    #[tokio::test]
    async fn test_not_found_is_transport_failure() {
        let server = create_mock_server("EUR", ResponseTemplate::new(404)).await;
        let provider = ExchangerateApiProvider::new(&server.uri(), Duration::from_secs(5)).unwrap();

        let err = provider.fetch(&"EUR".parse().unwrap()).await.unwrap_err();
        assert!(matches!(err.cause, FetchFailure::Transport(_)));
        assert_eq!(err.to_string(), "Exchange rate provider unavailable for EUR");
    }
}
