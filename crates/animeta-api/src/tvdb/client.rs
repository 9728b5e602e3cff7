use reqwest::Client;

use animeta_core::file_spec::{decode_json, LocalFileSpec};
use animeta_core::models::CatalogSource;

use super::auth::{self, BASE_URL};
use super::error::TvdbError;
use super::types::{
    TvdbEpisode, TvdbEpisodesFileSpec, TvdbEpisodesResponse, TvdbSeriesFileSpec,
    TvdbSeriesResponse,
};
use crate::traits::{CatalogClient, CatalogPayload};

/// TVDB v2 JSON client.
pub struct TvdbClient {
    token: String,
    language: String,
    http: Client,
}

impl TvdbClient {
    pub fn new(token: String, language: String) -> Self {
        Self {
            token,
            language,
            http: Client::new(),
        }
    }

    /// Log in with an API key and build a client for `language`.
    pub async fn login(api_key: &str, language: impl Into<String>) -> Result<Self, TvdbError> {
        let http = Client::new();
        let token = auth::login(&http, api_key).await?.token;
        Ok(Self {
            token,
            language: language.into(),
            http,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, TvdbError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "TVDB API error");
            Err(TvdbError::Api {
                status,
                message: body,
            })
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
        spec: &impl LocalFileSpec,
    ) -> Result<T, TvdbError> {
        let resp = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept-Language", &self.language)
            .query(query)
            .send()
            .await?;
        let resp = Self::check_response(resp).await?;
        let bytes = resp.bytes().await?;
        Ok(decode_json(&bytes, &spec.relative_path())?)
    }

    pub async fn get_series(&self, id: u64) -> Result<TvdbSeriesResponse, TvdbError> {
        tracing::debug!(id, "TVDB series request");
        self.get_json(format!("{BASE_URL}/series/{id}"), &[], &TvdbSeriesFileSpec(id))
            .await
    }

    /// Fetch every episode page and merge them into one document.
    pub async fn get_episodes(&self, id: u64) -> Result<TvdbEpisodesResponse, TvdbError> {
        let spec = TvdbEpisodesFileSpec(id);
        let mut data: Vec<TvdbEpisode> = Vec::new();
        let mut page = 1;
        loop {
            tracing::debug!(id, page, "TVDB episodes request");
            let resp: TvdbEpisodesResponse = self
                .get_json(
                    format!("{BASE_URL}/series/{id}/episodes"),
                    &[("page", page.to_string())],
                    &spec,
                )
                .await?;
            data.extend(resp.data);
            match resp.links.and_then(|l| l.next) {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }
        Ok(TvdbEpisodesResponse { data, links: None })
    }
}

impl CatalogClient for TvdbClient {
    type Error = TvdbError;

    fn source(&self) -> CatalogSource {
        CatalogSource::Tvdb
    }

    async fn fetch_series(&self, id: u64) -> Result<CatalogPayload, TvdbError> {
        let series = self
            .get_series(id)
            .await?
            .data
            .into_record(&TvdbSeriesFileSpec(id).relative_path(), &self.language)?;
        let episodes = self.get_episodes(id).await?.into_records();
        Ok(CatalogPayload { series, episodes })
    }
}
