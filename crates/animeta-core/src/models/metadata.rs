use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A rendered cross-reference to a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    pub source: String,
    pub key: String,
    pub id: u64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonKind {
    Actor,
    Director,
    Writer,
    Producer,
    Composer,
    Other,
}

impl PersonKind {
    /// Classify an AniDB creator role such as "Direction" or "Music".
    pub fn from_role(role: &str) -> Self {
        let role = role.to_lowercase();
        if role.contains("direction") || role.contains("director") {
            Self::Director
        } else if role.contains("music") || role.contains("composer") {
            Self::Composer
        } else if role.contains("original work")
            || role.contains("series composition")
            || role.contains("script")
        {
            Self::Writer
        } else if role.contains("producer") || role.contains("animation work") {
            Self::Producer
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonMetadata {
    pub name: String,
    pub role: Option<String>,
    pub kind: PersonKind,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub name: Option<String>,
    pub season: u32,
    pub number: u32,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub external_ids: Vec<ExternalReference>,
}

/// The canonical record handed back to the host for one library item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub name: String,
    pub original_title: Option<String>,
    /// Romanized main title, for sorting.
    pub sort_name: Option<String>,
    pub overview: Option<String>,
    pub community_rating: Option<f32>,
    pub vote_count: Option<u32>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub people: Vec<PersonMetadata>,
    pub premiere_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub episodes: Vec<EpisodeMetadata>,
    pub external_ids: Vec<ExternalReference>,
}
