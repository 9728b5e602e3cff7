use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tokio::time::Instant;

use animeta_core::file_spec::LocalFileSpec;
use animeta_core::models::CatalogSource;

use super::error::AnidbError;
use super::types::{parse_series, AnidbSeriesFileSpec};
use crate::traits::{CatalogClient, CatalogPayload};

const BASE_URL: &str = "http://api.anidb.net:9001/httpapi";

/// AniDB bans clients that ask more than once every two seconds.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(2);

/// AniDB HTTP API client.
///
/// AniDB has no search over HTTP; series are fetched by id only.
pub struct AnidbClient {
    client_name: String,
    client_version: u32,
    http: Client,
    last_request: Mutex<Option<Instant>>,
}

impl AnidbClient {
    /// `client_name`/`client_version` must be registered with AniDB.
    pub fn new(client_name: impl Into<String>, client_version: u32) -> Self {
        Self {
            client_name: client_name.into(),
            client_version,
            http: Client::new(),
            last_request: Mutex::new(None),
        }
    }

    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                let wait = MIN_REQUEST_INTERVAL - elapsed;
                tracing::debug!(?wait, "AniDB rate limit");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Fetch the raw `anime` document, suitable for caching as-is.
    pub async fn fetch_series_xml(&self, aid: u64) -> Result<String, AnidbError> {
        self.rate_limit().await;
        tracing::debug!(aid, "AniDB anime request");

        let aid = aid.to_string();
        let version = self.client_version.to_string();
        let resp = self
            .http
            .get(BASE_URL)
            .query(&[
                ("request", "anime"),
                ("client", self.client_name.as_str()),
                ("clientver", version.as_str()),
                ("protover", "1"),
                ("aid", aid.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "AniDB API error");
            return Err(AnidbError::Api {
                status,
                message: body,
            });
        }

        Ok(resp.text().await?)
    }
}

impl CatalogClient for AnidbClient {
    type Error = AnidbError;

    fn source(&self) -> CatalogSource {
        CatalogSource::AniDb
    }

    async fn fetch_series(&self, id: u64) -> Result<CatalogPayload, AnidbError> {
        let xml = self.fetch_series_xml(id).await?;
        parse_series(&xml, &AnidbSeriesFileSpec(id).relative_path())
    }
}
