use serde::{Deserialize, Serialize};

use super::error::TvdbError;

pub(crate) const BASE_URL: &str = "https://api.thetvdb.com";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    apikey: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Exchange an API key for a JWT. Tokens are valid for 24 hours.
pub async fn login(http: &reqwest::Client, api_key: &str) -> Result<TokenResponse, TvdbError> {
    let resp = http
        .post(format!("{BASE_URL}/login"))
        .json(&LoginRequest { apikey: api_key })
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status, "TVDB login failed");
        return Err(TvdbError::Auth(format!("status {status}: {body}")));
    }

    resp.json::<TokenResponse>()
        .await
        .map_err(|e| TvdbError::Auth(e.to_string()))
}
