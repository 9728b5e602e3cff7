pub mod logging;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use animeta_api::anidb::{self, AnidbClient, AnidbError, AnidbSeriesFileSpec};
use animeta_api::traits::CatalogPayload;
use animeta_api::tvdb::{TvdbEpisodesFileSpec, TvdbSeriesFileSpec};
use animeta_core::config::PluginConfig;
use animeta_core::error::{AnimetaError, ParseError};
use animeta_core::file_spec::SeiyuuListFileSpec;
use animeta_core::mapping::{self, SeriesSources};
use animeta_core::message_log::{MessageLog, Severity};
use animeta_core::models::{EpisodeRecord, SeriesMetadata, SeriesRecord};

pub use store::FileStore;

const LOG_SOURCE: &str = "runtime";

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Metadata(#[from] AnimetaError),
}

impl From<ParseError> for RuntimeError {
    fn from(e: ParseError) -> Self {
        Self::Metadata(e.into())
    }
}

impl From<AnidbError> for RuntimeError {
    fn from(e: AnidbError) -> Self {
        match e {
            AnidbError::Parse(e) => e.into(),
            other => Self::Api(other.to_string()),
        }
    }
}

/// What the host holds for the plugin's lifetime.
pub struct Runtime {
    store: FileStore,
    config: Arc<RwLock<PluginConfig>>,
    config_path: Option<PathBuf>,
    anidb: Option<AnidbClient>,
}

impl Runtime {
    /// Build around an explicit data directory and config. Config changes
    /// are kept in memory only.
    pub fn new(data_dir: impl Into<PathBuf>, config: PluginConfig) -> Result<Self, RuntimeError> {
        config
            .validate()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        Ok(Self {
            store: FileStore::new(data_dir),
            config: Arc::new(RwLock::new(config)),
            config_path: None,
            anidb: None,
        })
    }

    /// Load the per-user config file and use the per-user data directory.
    pub fn load() -> Result<Self, RuntimeError> {
        let config = PluginConfig::load().map_err(|e| RuntimeError::Config(e.to_string()))?;
        let mut runtime = Self::new(PluginConfig::data_dir(), config)?;
        runtime.config_path = Some(PluginConfig::config_path());
        Ok(runtime)
    }

    /// Fetch AniDB documents that aren't cached yet through `client`.
    pub fn with_anidb_client(mut self, client: AnidbClient) -> Self {
        self.anidb = Some(client);
        self
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub async fn config(&self) -> PluginConfig {
        self.config.read().await.clone()
    }

    /// Replace the config. Invalid configs are rejected and the old one kept.
    pub async fn update_config(&self, new_config: PluginConfig) -> Result<(), RuntimeError> {
        new_config
            .validate()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        if let Some(path) = &self.config_path {
            new_config
                .save_to(path)
                .map_err(|e| RuntimeError::Config(e.to_string()))?;
        }
        *self.config.write().await = new_config;
        Ok(())
    }

    /// Gate for the host's refresh scheduler.
    pub async fn auto_updates_enabled(&self) -> bool {
        self.config.read().await.general.allow_automatic_metadata_updates
    }

    /// Resolve one library item from cached (or freshly fetched) catalog
    /// documents.
    #[tracing::instrument(name = "resolve_series", skip(self))]
    pub async fn resolve_series(
        &self,
        aid: u64,
        tvdb_id: Option<u64>,
    ) -> Result<(SeriesMetadata, MessageLog), RuntimeError> {
        let config = self.config().await;
        let mut log = MessageLog::new();

        let payload = self.anidb_payload(aid, &mut log).await?;
        self.update_seiyuu_list(&payload.series, &mut log).await?;

        let (tvdb_series, tvdb_episodes) = match tvdb_id {
            Some(id) => self
                .cached_tvdb(id, &config.general.metadata_language, &mut log)
                .await?,
            None => (None, Vec::new()),
        };

        let episodes = if tvdb_episodes.is_empty() || config.sources.use_anidb_ordering_with_seasons
        {
            payload.episodes
        } else {
            tvdb_episodes
        };

        let sources = SeriesSources {
            anidb: payload.series,
            tvdb: tvdb_series,
            episodes,
        };
        let (metadata, mapping_log) = mapping::normalize_logged(&sources, &config)?;
        log.extend(mapping_log);
        Ok((metadata, log))
    }

    async fn anidb_payload(
        &self,
        aid: u64,
        log: &mut MessageLog,
    ) -> Result<CatalogPayload, RuntimeError> {
        let spec = AnidbSeriesFileSpec(aid);
        let path = self.store.path_for(&spec);

        match self.store.read_raw(&spec).await? {
            Some(bytes) => {
                let xml = String::from_utf8(bytes)
                    .map_err(|e| ParseError::new(&path, "<document>", e.to_string()))?;
                log.log((), LOG_SOURCE, format!("read cached AniDB series {aid}"), Severity::Debug);
                Ok(anidb::parse_series(&xml, &path)?)
            }
            None => {
                let Some(client) = &self.anidb else {
                    return Err(RuntimeError::NotFound(format!(
                        "AniDB series {aid} is not cached at {}",
                        path.display()
                    )));
                };
                let xml = client.fetch_series_xml(aid).await?;
                self.cache_fetched(aid, &xml, log).await
            }
        }
    }

    /// Decode a freshly fetched document and cache it. Documents that don't
    /// decode are never written.
    async fn cache_fetched(
        &self,
        aid: u64,
        xml: &str,
        log: &mut MessageLog,
    ) -> Result<CatalogPayload, RuntimeError> {
        let spec = AnidbSeriesFileSpec(aid);
        let payload = anidb::parse_series(xml, &self.store.path_for(&spec))?;
        self.store.write_raw(&spec, xml.as_bytes()).await?;
        log.log((), LOG_SOURCE, format!("fetched AniDB series {aid}"), Severity::Info);
        Ok(payload)
    }

    async fn update_seiyuu_list(
        &self,
        series: &SeriesRecord,
        log: &mut MessageLog,
    ) -> Result<(), RuntimeError> {
        let mut list = self
            .store
            .load(&SeiyuuListFileSpec)
            .await?
            .unwrap_or_default();
        let changed = list.merge(series.seiyuu().cloned());
        if changed > 0 {
            self.store.save(&SeiyuuListFileSpec, &list).await?;
            log.log(
                (),
                LOG_SOURCE,
                format!("updated {changed} voice actors in seiyuu list"),
                Severity::Debug,
            );
        }
        Ok(())
    }

    /// TVDB documents are only read from the cache; a miss is logged and
    /// the item resolves from AniDB alone.
    async fn cached_tvdb(
        &self,
        id: u64,
        language: &str,
        log: &mut MessageLog,
    ) -> Result<(Option<SeriesRecord>, Vec<EpisodeRecord>), RuntimeError> {
        let series_spec = TvdbSeriesFileSpec(id);
        let series = match self.store.load(&series_spec).await? {
            Some(resp) => Some(
                resp.data
                    .into_record(&self.store.path_for(&series_spec), language)?,
            ),
            None => log.log(
                None,
                LOG_SOURCE,
                format!("TVDB series {id} is not cached"),
                Severity::Warn,
            ),
        };
        let episodes = self
            .store
            .load(&TvdbEpisodesFileSpec(id))
            .await?
            .map(|resp| resp.into_records())
            .unwrap_or_default();
        Ok((series, episodes))
    }
}
