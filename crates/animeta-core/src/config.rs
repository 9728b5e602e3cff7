use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::AnimetaError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// User-controlled normalization policy.
///
/// Loaded once per host session; the mapper only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub genres: GenreConfig,
    #[serde(default)]
    pub sources: SourceConfig,
}

/// Which title the mapper surfaces as the series name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitlePreference {
    /// The host's metadata language (`general.metadata_language`).
    Localized,
    /// Kanji/kana title (`ja`).
    Japanese,
    /// Romanized title (`x-jat`).
    JapaneseRomaji,
}

impl TitlePreference {
    /// Catalog language code this preference selects.
    pub fn language<'a>(&self, metadata_language: &'a str) -> &'a str {
        match self {
            Self::Localized => metadata_language,
            Self::Japanese => "ja",
            Self::JapaneseRomaji => "x-jat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub title_preference: TitlePreference,
    pub metadata_language: String,
    /// Read by the host's refresh scheduler; the mapper ignores it.
    pub allow_automatic_metadata_updates: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreConfig {
    pub tidy_genre_list: bool,
    pub max_genres: i64,
    pub move_excess_genres_to_tags: bool,
    pub add_anime_genre: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub use_anidb_ordering_with_seasons: bool,
    pub use_anidb_descriptions: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title_preference: TitlePreference::Localized,
            metadata_language: "en".into(),
            allow_automatic_metadata_updates: true,
        }
    }
}

impl Default for GenreConfig {
    fn default() -> Self {
        Self {
            tidy_genre_list: true,
            max_genres: 5,
            move_excess_genres_to_tags: true,
            add_anime_genre: true,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            use_anidb_ordering_with_seasons: false,
            use_anidb_descriptions: false,
        }
    }
}

impl GenreConfig {
    /// The genre cap as a count. Negative values are rejected, never clamped.
    pub fn max_genres(&self) -> Result<usize, AnimetaError> {
        usize::try_from(self.max_genres).map_err(|_| {
            AnimetaError::Config(format!(
                "genres.max_genres must be >= 0, got {}",
                self.max_genres
            ))
        })
    }
}

impl PluginConfig {
    /// Load config from the per-user config file, or the built-in defaults
    /// when no file exists yet.
    pub fn load() -> Result<Self, AnimetaError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate a config file. Missing keys fall back to defaults.
    pub fn load_from(path: &Path) -> Result<Self, AnimetaError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AnimetaError::Config(e.to_string()))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded plugin config");
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, AnimetaError> {
        let config: PluginConfig =
            toml::from_str(s).map_err(|e| AnimetaError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnimetaError> {
        self.genres.max_genres()?;
        Ok(())
    }

    /// Save to the per-user config file.
    pub fn save(&self) -> Result<(), AnimetaError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AnimetaError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AnimetaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Default root for cached catalog files when the host doesn't give one.
    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "animeta")
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = PluginConfig::default();
        assert_eq!(config.general.title_preference, TitlePreference::Localized);
        assert_eq!(config.general.metadata_language, "en");
        assert!(config.general.allow_automatic_metadata_updates);
        assert!(config.genres.tidy_genre_list);
        assert_eq!(config.genres.max_genres, 5);
        assert!(config.genres.move_excess_genres_to_tags);
        assert!(config.genres.add_anime_genre);
        assert!(!config.sources.use_anidb_ordering_with_seasons);
        assert!(!config.sources.use_anidb_descriptions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shipped_file_matches_section_defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.general, GeneralConfig::default());
        assert_eq!(config.genres, GenreConfig::default());
        assert_eq!(config.sources, SourceConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = PluginConfig::from_toml_str(
            "[general]\ntitle_preference = \"japanese_romaji\"\n\n[genres]\nmax_genres = 3\n",
        )
        .unwrap();
        assert_eq!(config.general.title_preference, TitlePreference::JapaneseRomaji);
        assert_eq!(config.general.metadata_language, "en");
        assert_eq!(config.genres.max_genres, 3);
        assert!(config.genres.add_anime_genre);
        assert!(!config.sources.use_anidb_descriptions);
    }

    #[test]
    fn test_negative_max_genres_rejected() {
        let err = PluginConfig::from_toml_str("[genres]\nmax_genres = -1\n").unwrap_err();
        assert!(matches!(err, AnimetaError::Config(_)));
        assert!(err.to_string().contains("max_genres"));

        let mut config = PluginConfig::default();
        config.genres.max_genres = -3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_preference_rejected() {
        let err = PluginConfig::from_toml_str("[general]\ntitle_preference = \"klingon\"\n");
        assert!(matches!(err, Err(AnimetaError::Config(_))));
    }

    #[test]
    fn test_title_preference_language() {
        assert_eq!(TitlePreference::Localized.language("de"), "de");
        assert_eq!(TitlePreference::Japanese.language("de"), "ja");
        assert_eq!(TitlePreference::JapaneseRomaji.language("de"), "x-jat");
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = PluginConfig::default();
        config.general.title_preference = TitlePreference::Japanese;
        config.sources.use_anidb_descriptions = true;
        config.save_to(&path).unwrap();

        let loaded = PluginConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_refuses_invalid() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = PluginConfig::default();
        config.genres.max_genres = -1;
        assert!(config.save_to(&path).is_err());
        assert!(!path.exists());
    }
}
