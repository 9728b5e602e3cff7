use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

use animeta_core::error::ParseError;
use animeta_core::file_spec::{decode_xml, FileFormat, LocalFileSpec};
use animeta_core::models::{
    CatalogSource, CharacterRecord, CreatorRecord, EpisodeRecord, RatingKind, RatingRecord,
    SeiyuuRecord, SeriesRecord, TitleRecord, TitleType,
};

use super::error::AnidbError;
use crate::traits::{parse_date, CatalogPayload};

/// Tags at or above this weight are treated as genres.
pub const GENRE_TAG_WEIGHT: u32 = 400;

// ── HTTP API `anime` document ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "anime")]
pub struct AnidbAnime {
    #[serde(rename = "@id")]
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub episodecount: Option<u32>,
    #[serde(default)]
    pub startdate: Option<String>,
    #[serde(default)]
    pub enddate: Option<String>,
    #[serde(default)]
    pub titles: AnidbTitles,
    #[serde(default)]
    pub creators: AnidbCreators,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ratings: AnidbRatings,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub tags: AnidbTags,
    #[serde(default)]
    pub characters: AnidbCharacters,
    #[serde(default)]
    pub episodes: AnidbEpisodes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnidbTitles {
    #[serde(rename = "title", default)]
    pub titles: Vec<AnidbTitle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnidbTitle {
    #[serde(rename = "@xml:lang")]
    pub lang: String,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnidbCreators {
    #[serde(rename = "name", default)]
    pub names: Vec<AnidbCreator>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnidbCreator {
    #[serde(rename = "@id")]
    pub id: u64,
    #[serde(rename = "@type", default)]
    pub role: String,
    #[serde(rename = "$text", default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnidbRatings {
    #[serde(default)]
    pub permanent: Option<AnidbRating>,
    #[serde(default)]
    pub temporary: Option<AnidbRating>,
    #[serde(default)]
    pub review: Option<AnidbRating>,
}

/// Kept as text so a bad value can be reported against its field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnidbRating {
    #[serde(rename = "@count", default)]
    pub count: u32,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnidbTags {
    #[serde(rename = "tag", default)]
    pub tags: Vec<AnidbTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnidbTag {
    #[serde(rename = "@id")]
    pub id: u64,
    #[serde(rename = "@weight", default)]
    pub weight: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnidbCharacters {
    #[serde(rename = "character", default)]
    pub characters: Vec<AnidbCharacter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnidbCharacter {
    #[serde(rename = "@id")]
    pub id: u64,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub name: String,
    #[serde(default)]
    pub seiyuu: Vec<AnidbSeiyuu>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnidbSeiyuu {
    #[serde(rename = "@id")]
    pub id: u64,
    #[serde(rename = "@picture", default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(rename = "$text", default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnidbEpisodes {
    #[serde(rename = "episode", default)]
    pub episodes: Vec<AnidbEpisode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnidbEpisode {
    #[serde(rename = "@id")]
    pub id: u64,
    #[serde(rename = "@update", default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
    pub epno: AnidbEpno,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub airdate: Option<String>,
    #[serde(rename = "title", default)]
    pub titles: Vec<AnidbTitle>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// `type`: 1 regular, 2 special, 3 credit, 4 trailer, 5 parody, 6 other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnidbEpno {
    #[serde(rename = "@type")]
    pub kind: u8,
    #[serde(rename = "$text")]
    pub value: String,
}

const EPNO_REGULAR: u8 = 1;
const EPNO_SPECIAL: u8 = 2;

// ── Cached file location ────────────────────────────────────────

/// `anidb/series/<aid>/series.xml`, the raw API document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnidbSeriesFileSpec(pub u64);

impl LocalFileSpec for AnidbSeriesFileSpec {
    type Item = AnidbAnime;

    fn relative_path(&self) -> PathBuf {
        Path::new("anidb")
            .join("series")
            .join(self.0.to_string())
            .join("series.xml")
    }

    fn format(&self) -> FileFormat {
        FileFormat::Xml
    }
}

// ── Decoding ────────────────────────────────────────────────────

/// Decode an AniDB `anime` document into core records.
///
/// `path` names the document in errors: the cache file, or the cache
/// location the fetched document is destined for.
pub fn parse_series(xml: &str, path: &Path) -> Result<CatalogPayload, AnidbError> {
    if root_element(xml).as_deref() == Some("error") {
        let message = decode_xml::<AnidbErrorDoc>(xml, path)
            .map(|e| e.message)
            .unwrap_or_default();
        return Err(AnidbError::Refused(message.trim().to_string()));
    }
    let anime: AnidbAnime = decode_xml(xml, path)?;
    Ok(anime.into_payload(path)?)
}

#[derive(Debug, Deserialize)]
struct AnidbErrorDoc {
    #[serde(rename = "$text", default)]
    message: String,
}

fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

impl AnidbAnime {
    pub fn into_payload(self, path: &Path) -> Result<CatalogPayload, ParseError> {
        let mut series = SeriesRecord::new(CatalogSource::AniDb, self.id);

        series.titles = self
            .titles
            .titles
            .into_iter()
            .map(|t| {
                let kind = TitleType::from_anidb(t.kind.as_deref().unwrap_or_default());
                TitleRecord::new(t.lang, t.value.trim(), kind)
            })
            .collect();

        series.ratings = [
            (RatingKind::Permanent, self.ratings.permanent),
            (RatingKind::Temporary, self.ratings.temporary),
            (RatingKind::Review, self.ratings.review),
        ]
        .into_iter()
        .filter_map(|(kind, raw)| raw.map(|r| convert_rating(kind, r, path)))
        .collect::<Result<_, _>>()?;

        series.creators = self
            .creators
            .names
            .into_iter()
            .map(|c| CreatorRecord {
                id: c.id,
                name: c.name.trim().to_string(),
                role: c.role,
            })
            .collect();

        series.characters = self
            .characters
            .characters
            .into_iter()
            .map(|c| CharacterRecord {
                id: c.id,
                name: c.name.trim().to_string(),
                role: c.role,
                seiyuu: c.seiyuu.into_iter().next().map(|s| SeiyuuRecord {
                    id: s.id,
                    name: s.name.trim().to_string(),
                    picture_file_name: s.picture.filter(|p| !p.trim().is_empty()),
                }),
            })
            .collect();

        let (genres, tags) = split_tags(self.tags.tags);
        series.genres = genres;
        series.tags = tags;

        series.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        series.start_date = parse_date(self.startdate.as_deref());
        series.end_date = parse_date(self.enddate.as_deref());
        series.episode_count = self.episodecount;
        series.picture = self.picture.filter(|p| !p.trim().is_empty());

        let mut episodes = Vec::with_capacity(self.episodes.episodes.len());
        for ep in self.episodes.episodes {
            if let Some(record) = convert_episode(ep, path)? {
                episodes.push(record);
            }
        }

        Ok(CatalogPayload { series, episodes })
    }
}

fn convert_rating(
    kind: RatingKind,
    raw: AnidbRating,
    path: &Path,
) -> Result<RatingRecord, ParseError> {
    let field = format!("ratings.{}", kind.as_str());
    let value: f32 = raw
        .value
        .trim()
        .parse()
        .map_err(|e| ParseError::new(path, &field, format!("{:?}: {e}", raw.value)))?;
    let rating = RatingRecord {
        value,
        votes: raw.count,
        kind,
    };
    if !rating.is_in_range() {
        return Err(ParseError::new(
            path,
            field,
            format!("{value} is outside 0-{}", RatingRecord::MAX_VALUE),
        ));
    }
    Ok(rating)
}

/// Heavy tags become genres (heaviest first, ties in document order);
/// the rest stay tags.
fn split_tags(mut tags: Vec<AnidbTag>) -> (Vec<String>, Vec<String>) {
    tags.sort_by(|a, b| b.weight.cmp(&a.weight));
    let (heavy, light): (Vec<AnidbTag>, Vec<AnidbTag>) = tags
        .into_iter()
        .partition(|t| t.weight >= GENRE_TAG_WEIGHT);
    let genres = heavy.into_iter().map(|t| title_case(t.name.trim())).collect();
    let tags = light.into_iter().map(|t| t.name.trim().to_string()).collect();
    (genres, tags)
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Regular episodes keep their absolute number; specials become season 0.
/// Credits, trailers and the like are not episodes for the host.
fn convert_episode(ep: AnidbEpisode, path: &Path) -> Result<Option<EpisodeRecord>, ParseError> {
    let raw = ep.epno.value.trim();
    let digits = match ep.epno.kind {
        EPNO_REGULAR => raw,
        EPNO_SPECIAL => raw.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        _ => return Ok(None),
    };
    let number: u32 = digits
        .parse()
        .map_err(|e| ParseError::new(path, "episode.epno", format!("{raw:?}: {e}")))?;

    let mut record = EpisodeRecord::new(CatalogSource::AniDb, ep.id);
    if ep.epno.kind == EPNO_REGULAR {
        record.absolute_number = Some(number);
    } else {
        record.aired_season = Some(0);
        record.aired_episode_number = Some(number);
    }
    record.name = episode_name(&ep.titles);
    record.overview = ep.summary.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    record.air_date = parse_date(ep.airdate.as_deref());
    record.last_updated = parse_date(ep.update.as_deref())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt));
    Ok(Some(record))
}

fn episode_name(titles: &[AnidbTitle]) -> Option<String> {
    ["en", "x-jat"]
        .iter()
        .find_map(|lang| titles.iter().find(|t| t.lang == *lang))
        .or_else(|| titles.first())
        .map(|t| t.value.trim().to_string())
        .filter(|t| !t.is_empty())
}
