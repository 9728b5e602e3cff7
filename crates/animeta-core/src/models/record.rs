use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Base URL for AniDB artwork; picture file names are appended verbatim.
pub const ANIDB_IMAGE_BASE: &str = "http://img7.anidb.net/pics/anime/";

/// Which external catalog a record was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogSource {
    AniDb,
    Tvdb,
}

impl CatalogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AniDb => "AniDB",
            Self::Tvdb => "TheTVDB",
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleType {
    Main,
    Official,
    Synonym,
    Short,
    Other,
}

impl TitleType {
    /// AniDB's `type` attribute on `<title>`.
    pub fn from_anidb(s: &str) -> Self {
        match s {
            "main" => Self::Main,
            "official" => Self::Official,
            "syn" | "synonym" => Self::Synonym,
            "short" => Self::Short,
            _ => Self::Other,
        }
    }

    /// Main titles are the catalog's own canonical name, so they rank with
    /// official ones.
    pub fn is_official(&self) -> bool {
        matches!(self, Self::Main | Self::Official)
    }

    pub(crate) fn rank(&self) -> u8 {
        match self {
            Self::Main | Self::Official => 0,
            Self::Synonym => 1,
            Self::Short => 2,
            Self::Other => 3,
        }
    }
}

/// A localized or alternate name for a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub language: String,
    pub title: String,
    pub kind: TitleType,
}

impl TitleRecord {
    pub fn new(language: impl Into<String>, title: impl Into<String>, kind: TitleType) -> Self {
        Self {
            language: language.into(),
            title: title.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingKind {
    Permanent,
    Temporary,
    Review,
}

impl RatingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::Temporary => "temporary",
            Self::Review => "review",
        }
    }
}

/// A vote aggregate. `value` is on the catalog's 0–10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub value: f32,
    pub votes: u32,
    pub kind: RatingKind,
}

impl RatingRecord {
    pub const MAX_VALUE: f32 = 10.0;

    pub fn is_in_range(&self) -> bool {
        (0.0..=Self::MAX_VALUE).contains(&self.value)
    }
}

/// A staff credit (director, music, original work, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorRecord {
    pub id: u64,
    pub name: String,
    pub role: String,
}

/// A voice actor. The picture URL is derived from the file name on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeiyuuRecord {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PictureFileName", default, skip_serializing_if = "Option::is_none")]
    pub picture_file_name: Option<String>,
}

impl SeiyuuRecord {
    pub fn picture_url(&self) -> Option<String> {
        self.picture_file_name
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .map(|f| format!("{ANIDB_IMAGE_BASE}{f}"))
    }
}

/// The cached voice-actor document, `anidb/seiyuu.xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "SeiyuuList")]
pub struct SeiyuuList {
    #[serde(rename = "Seiyuu", default)]
    pub seiyuu: Vec<SeiyuuRecord>,
}

impl SeiyuuList {
    /// Upsert by id. Newer records replace older ones; the list stays sorted
    /// by id so the file is stable across runs.
    ///
    /// A list read from an unsorted or duplicated file is put in order first,
    /// and that counts as a change.
    pub fn merge<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = SeiyuuRecord>,
    {
        let mut changed = self.sort_and_dedup();
        for record in records {
            match self.seiyuu.binary_search_by_key(&record.id, |s| s.id) {
                Ok(i) => {
                    if self.seiyuu[i] != record {
                        self.seiyuu[i] = record;
                        changed += 1;
                    }
                }
                Err(i) => {
                    self.seiyuu.insert(i, record);
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn get(&self, id: u64) -> Option<&SeiyuuRecord> {
        self.seiyuu.iter().find(|s| s.id == id)
    }

    /// Returns 0 when the list was already strictly ordered by id.
    fn sort_and_dedup(&mut self) -> usize {
        if self.seiyuu.windows(2).all(|w| w[0].id < w[1].id) {
            return 0;
        }
        let before = self.seiyuu.len();
        self.seiyuu.sort_by_key(|s| s.id);
        self.seiyuu.dedup_by_key(|s| s.id);
        (before - self.seiyuu.len()).max(1)
    }
}

/// A credited character and the voice actor playing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: u64,
    pub name: String,
    pub role: Option<String>,
    pub seiyuu: Option<SeiyuuRecord>,
}

/// One external catalog's view of a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub source: CatalogSource,
    pub id: u64,
    pub titles: Vec<TitleRecord>,
    pub description: Option<String>,
    pub ratings: Vec<RatingRecord>,
    pub creators: Vec<CreatorRecord>,
    pub characters: Vec<CharacterRecord>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub episode_count: Option<u32>,
    pub picture: Option<String>,
}

impl SeriesRecord {
    /// An empty record for `id`; decoders fill in what the payload has.
    pub fn new(source: CatalogSource, id: u64) -> Self {
        Self {
            source,
            id,
            titles: Vec::new(),
            description: None,
            ratings: Vec::new(),
            creators: Vec::new(),
            characters: Vec::new(),
            genres: Vec::new(),
            tags: Vec::new(),
            start_date: None,
            end_date: None,
            episode_count: None,
            picture: None,
        }
    }

    pub fn rating(&self, kind: RatingKind) -> Option<&RatingRecord> {
        self.ratings.iter().find(|r| r.kind == kind)
    }

    /// Every voice actor credited on the series, in credit order.
    pub fn seiyuu(&self) -> impl Iterator<Item = &SeiyuuRecord> {
        self.characters.iter().filter_map(|c| c.seiyuu.as_ref())
    }
}

/// One episode. Numbers are relative to the catalog that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub source: CatalogSource,
    pub id: u64,
    pub name: Option<String>,
    pub absolute_number: Option<u32>,
    pub aired_season: Option<u32>,
    pub aired_episode_number: Option<u32>,
    pub overview: Option<String>,
    pub air_date: Option<NaiveDate>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl EpisodeRecord {
    pub fn new(source: CatalogSource, id: u64) -> Self {
        Self {
            source,
            id,
            name: None,
            absolute_number: None,
            aired_season: None,
            aired_episode_number: None,
            overview: None,
            air_date: None,
            last_updated: None,
        }
    }
}
