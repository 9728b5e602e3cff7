//! Shared interface for catalog clients.
//!
//! Both the AniDB and TVDB clients implement [`CatalogClient`] so the
//! runtime can fetch a series without caring which catalog it talks to.

use std::future::Future;

use animeta_core::models::{CatalogSource, EpisodeRecord, SeriesRecord};

/// A decoded series document with its episodes.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPayload {
    pub series: SeriesRecord,
    pub episodes: Vec<EpisodeRecord>,
}

pub trait CatalogClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn source(&self) -> CatalogSource;

    /// Fetch and decode one series by its catalog id.
    fn fetch_series(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<CatalogPayload, Self::Error>> + Send;
}

/// Parse `YYYY-MM-DD`. Partial or empty dates come back as `None`.
pub(crate) fn parse_date(s: Option<&str>) -> Option<chrono::NaiveDate> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}
