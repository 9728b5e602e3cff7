use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use animeta_core::error::ParseError;
use animeta_core::file_spec::{decode_json, FileFormat, LocalFileSpec};
use animeta_core::models::{
    CatalogSource, EpisodeRecord, RatingKind, RatingRecord, SeriesRecord, TitleRecord, TitleType,
};

use crate::traits::parse_date;

// ── v2 JSON responses ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvdbSeriesResponse {
    pub data: TvdbSeries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvdbSeries {
    pub id: u64,
    pub series_name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub overview: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    pub site_rating: Option<f32>,
    pub site_rating_count: Option<u32>,
    pub first_aired: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvdbEpisodesResponse {
    pub data: Vec<TvdbEpisode>,
    pub links: Option<TvdbLinks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvdbLinks {
    pub next: Option<u32>,
    pub last: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvdbEpisode {
    pub id: u64,
    pub aired_season: Option<u32>,
    pub aired_episode_number: Option<u32>,
    pub absolute_number: Option<u32>,
    pub episode_name: Option<String>,
    pub overview: Option<String>,
    pub first_aired: Option<String>,
    /// Unix seconds.
    pub last_updated: Option<i64>,
}

// ── Cached file locations ───────────────────────────────────────

/// `tvdb/<id>/series.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TvdbSeriesFileSpec(pub u64);

/// `tvdb/<id>/episodes.json`, every page merged into one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TvdbEpisodesFileSpec(pub u64);

impl LocalFileSpec for TvdbSeriesFileSpec {
    type Item = TvdbSeriesResponse;

    fn relative_path(&self) -> PathBuf {
        Path::new("tvdb").join(self.0.to_string()).join("series.json")
    }

    fn format(&self) -> FileFormat {
        FileFormat::Json
    }
}

impl LocalFileSpec for TvdbEpisodesFileSpec {
    type Item = TvdbEpisodesResponse;

    fn relative_path(&self) -> PathBuf {
        Path::new("tvdb").join(self.0.to_string()).join("episodes.json")
    }

    fn format(&self) -> FileFormat {
        FileFormat::Json
    }
}

// ── Decoding ────────────────────────────────────────────────────

/// Decode `/series/{id}`. Names are in `language`, the language the
/// client asked TVDB for.
pub fn parse_series(json: &[u8], path: &Path, language: &str) -> Result<SeriesRecord, ParseError> {
    let resp: TvdbSeriesResponse = decode_json(json, path)?;
    resp.data.into_record(path, language)
}

/// Decode one `/series/{id}/episodes` page. Returns the next page number
/// when there is one.
pub fn parse_episodes(
    json: &[u8],
    path: &Path,
) -> Result<(Vec<EpisodeRecord>, Option<u32>), ParseError> {
    let resp: TvdbEpisodesResponse = decode_json(json, path)?;
    let next = resp.links.as_ref().and_then(|l| l.next);
    Ok((resp.into_records(), next))
}

impl TvdbSeries {
    pub fn into_record(self, path: &Path, language: &str) -> Result<SeriesRecord, ParseError> {
        let mut series = SeriesRecord::new(CatalogSource::Tvdb, self.id);

        series.titles = self
            .series_name
            .into_iter()
            .map(|n| (n, TitleType::Official))
            .chain(self.aliases.into_iter().map(|a| (a, TitleType::Synonym)))
            .filter(|(n, _)| !n.trim().is_empty())
            .map(|(n, kind)| TitleRecord::new(language, n.trim(), kind))
            .collect();

        // TVDB reports 0 for "no votes yet".
        if let Some(value) = self.site_rating.filter(|v| *v > 0.0) {
            let rating = RatingRecord {
                value,
                votes: self.site_rating_count.unwrap_or(0),
                kind: RatingKind::Permanent,
            };
            if !rating.is_in_range() {
                return Err(ParseError::new(
                    path,
                    "siteRating",
                    format!("{value} is outside 0-{}", RatingRecord::MAX_VALUE),
                ));
            }
            series.ratings.push(rating);
        }

        series.description = self
            .overview
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());
        series.genres = self.genre;
        series.start_date = parse_date(self.first_aired.as_deref());
        Ok(series)
    }
}

impl TvdbEpisodesResponse {
    pub fn into_records(self) -> Vec<EpisodeRecord> {
        self.data.into_iter().map(TvdbEpisode::into_record).collect()
    }
}

impl TvdbEpisode {
    pub fn into_record(self) -> EpisodeRecord {
        let mut record = EpisodeRecord::new(CatalogSource::Tvdb, self.id);
        record.name = self.episode_name.filter(|n| !n.trim().is_empty());
        record.absolute_number = self.absolute_number;
        record.aired_season = self.aired_season;
        record.aired_episode_number = self.aired_episode_number;
        record.overview = self.overview.filter(|o| !o.trim().is_empty());
        record.air_date = parse_date(self.first_aired.as_deref());
        record.last_updated = self
            .last_updated
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES_JSON: &str = r#"{
      "data": {
        "id": 76885,
        "seriesName": "Cowboy Bebop",
        "aliases": ["Cowboy Bebop: The Series", ""],
        "overview": "  Bounty hunters in space.  ",
        "genre": ["Action", "Animation", "Science Fiction"],
        "siteRating": 9.1,
        "siteRatingCount": 3100,
        "firstAired": "1998-10-24",
        "status": "Ended",
        "network": "TV Tokyo"
      }
    }"#;

    const EPISODES_JSON: &str = r#"{
      "links": {"first": 1, "last": 2, "next": 2, "prev": null},
      "data": [
        {
          "id": 201,
          "airedSeason": 1,
          "airedEpisodeNumber": 1,
          "absoluteNumber": 1,
          "episodeName": "Asteroid Blues",
          "overview": "Spike and Jet chase Asimov.",
          "firstAired": "1998-10-24",
          "lastUpdated": 1500000000
        },
        {
          "id": 202,
          "airedSeason": 0,
          "airedEpisodeNumber": 1,
          "absoluteNumber": null,
          "episodeName": "",
          "firstAired": "",
          "lastUpdated": null
        }
      ]
    }"#;

    #[test]
    fn test_cache_locations() {
        assert_eq!(
            TvdbSeriesFileSpec(76885).relative_path(),
            Path::new("tvdb").join("76885").join("series.json")
        );
        assert_eq!(TvdbEpisodesFileSpec(1).format(), FileFormat::Json);
    }

    #[test]
    fn test_parses_series() {
        let path = TvdbSeriesFileSpec(76885).relative_path();
        let s = parse_series(SERIES_JSON.as_bytes(), &path, "en").unwrap();
        assert_eq!(s.source, CatalogSource::Tvdb);
        assert_eq!(s.id, 76885);
        assert_eq!(s.titles.len(), 2);
        assert_eq!(s.titles[0].kind, TitleType::Official);
        assert_eq!(s.titles[1].kind, TitleType::Synonym);
        assert_eq!(s.titles[0].language, "en");
        assert_eq!(s.description.as_deref(), Some("Bounty hunters in space."));
        assert_eq!(s.genres.len(), 3);
        assert_eq!(s.rating(RatingKind::Permanent).map(|r| r.votes), Some(3100));
        assert_eq!(s.start_date, chrono::NaiveDate::from_ymd_opt(1998, 10, 24));
    }

    #[test]
    fn test_zero_rating_means_unrated() {
        let json = SERIES_JSON.replace("9.1", "0");
        let s = parse_series(json.as_bytes(), Path::new("s.json"), "en").unwrap();
        assert!(s.ratings.is_empty());
    }

    #[test]
    fn test_out_of_range_rating_names_field() {
        let json = SERIES_JSON.replace("9.1", "91");
        let err = parse_series(json.as_bytes(), Path::new("s.json"), "en").unwrap_err();
        assert_eq!(err.field, "siteRating");
    }

    #[test]
    fn test_missing_id_names_field() {
        let err = parse_series(br#"{"data": {"seriesName": "x"}}"#, Path::new("s.json"), "en")
            .unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.path, Path::new("s.json"));
    }

    #[test]
    fn test_parses_episode_page() {
        let path = TvdbEpisodesFileSpec(76885).relative_path();
        let (eps, next) = parse_episodes(EPISODES_JSON.as_bytes(), &path).unwrap();
        assert_eq!(next, Some(2));
        assert_eq!(eps.len(), 2);

        assert_eq!(eps[0].aired_season, Some(1));
        assert_eq!(eps[0].absolute_number, Some(1));
        assert_eq!(eps[0].name.as_deref(), Some("Asteroid Blues"));
        assert_eq!(
            eps[0].last_updated,
            DateTime::<Utc>::from_timestamp(1_500_000_000, 0)
        );

        assert_eq!(eps[1].aired_season, Some(0));
        assert_eq!(eps[1].name, None);
        assert_eq!(eps[1].air_date, None);
        assert_eq!(eps[1].last_updated, None);
    }

    #[test]
    fn test_wrong_type_names_field() {
        let json = r#"{"data": [{"id": 1, "airedSeason": "one"}], "links": null}"#;
        let err = parse_episodes(json.as_bytes(), Path::new("e.json")).unwrap_err();
        assert_eq!(err.field, "airedSeason");
        assert_eq!(err.path, Path::new("e.json"));
    }
}
