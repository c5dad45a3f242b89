// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{FetchError, Result};
use crate::models::FetchConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page body as text.
///
/// Non-success statuses are reported as network failures so the caller may
/// retry them.
pub async fn fetch_html(
    client: &reqwest::Client,
    url: &str,
) -> std::result::Result<String, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::network(format!("HTTP {status} from {url}")));
    }
    Ok(response.text().await?)
}
