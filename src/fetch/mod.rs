mod auth;
mod basic;
mod client;

pub use auth::BearerAuth;
pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;
use serde::de::DeserializeOwned;

/// GETs `url` and decodes the JSON body, failing on any non-2xx status.
pub async fn fetch_json<C: HttpClient + ?Sized, T: DeserializeOwned>(
    client: &C,
    url: reqwest::Url,
) -> Result<T> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client
        .execute(req)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send request: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("API returned status {}: {}", status, body));
    }

    resp.json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse response: {}", e))
}
