mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;

/// Sends `req` through `client` and decodes a JSON response body.
///
/// Non-success statuses become errors carrying the status and response body.
pub async fn execute_json<C, T>(client: &C, req: reqwest::Request) -> Result<T>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let method = req.method().clone();
    let endpoint = format!(
        "{}{}",
        req.url().origin().ascii_serialization(),
        req.url().path()
    );

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("Failed to send {method} {endpoint}"))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("{method} {endpoint} returned status {status}: {body}"));
    }

    resp.json::<T>()
        .await
        .with_context(|| format!("Failed to parse response of {method} {endpoint}"))
}
