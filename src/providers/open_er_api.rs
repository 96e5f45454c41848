use crate::core::currency::CurrencyCode;
use crate::core::rates::{FetchError, FetchFailure, RateProvider, RateTable};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{build_client, get_body};

/// Client for the open.er-api.com `latest` endpoint.
pub struct OpenErApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        Ok(OpenErApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client(timeout)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[async_trait]
impl RateProvider for OpenErApiProvider {
    #[instrument(name = "OpenErApiFetch", skip(self), fields(base = %base))]
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, FetchError> {
        let url = format!("{}/v6/latest/{}", self.base_url, base);
        let body = get_body(&self.client, &url)
            .await
            .map_err(|e| FetchError::new(base, e))?;

        let data: LatestResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::new(
                base,
                FetchFailure::Malformed(format!("Failed to parse JSON response for {base}: {e}")),
            )
        })?;

        if data.result != "success" {
            let reason = data.error_type.unwrap_or(data.result);
            return Err(FetchError::new(base, FetchFailure::Rejected(reason)));
        }

        let table = RateTable::from_raw(base.clone(), Utc::now(), data.rates);
        debug!(count = table.len(), "Fetched rates");
        Ok(table)
    }
}
