//! Turns decoded catalog records into the host's canonical metadata.
//!
//! Everything here is a pure function of its inputs: no clock, no I/O.

mod description;
mod genres;
mod title;

pub use description::{clean_anidb_description, select_description};
pub use genres::{apply_genre_policy, merge_unique, tidy_genres, TidiedGenres, ANIME_GENRE};
pub use title::{japanese_title, romaji_title, select_title};

use crate::config::PluginConfig;
use crate::error::AnimetaError;
use crate::external_id::{AnidbEpisodeId, AnidbSeriesId, ExternalId, TvdbEpisodeId, TvdbSeriesId};
use crate::message_log::{MessageLog, Severity};
use crate::models::{
    CatalogSource, EpisodeMetadata, EpisodeRecord, ExternalReference, PersonKind, PersonMetadata,
    RatingKind, RatingRecord, SeriesMetadata, SeriesRecord, ANIDB_IMAGE_BASE,
};

const LOG_SOURCE: &str = "mapping";

/// Everything fetched for one library item.
#[derive(Debug, Clone)]
pub struct SeriesSources {
    pub anidb: SeriesRecord,
    pub tvdb: Option<SeriesRecord>,
    pub episodes: Vec<EpisodeRecord>,
}

impl SeriesSources {
    pub fn new(anidb: SeriesRecord) -> Self {
        Self {
            anidb,
            tvdb: None,
            episodes: Vec::new(),
        }
    }
}

pub fn normalize(
    sources: &SeriesSources,
    config: &PluginConfig,
) -> Result<SeriesMetadata, AnimetaError> {
    normalize_logged(sources, config).map(|(metadata, _)| metadata)
}

/// Like [`normalize`], also returning what the mapper noted along the way.
pub fn normalize_logged(
    sources: &SeriesSources,
    config: &PluginConfig,
) -> Result<(SeriesMetadata, MessageLog), AnimetaError> {
    config.validate()?;
    let mut log = MessageLog::new();
    let anidb = &sources.anidb;
    let tvdb = sources.tvdb.as_ref();

    // 1. Title
    let titles = anidb
        .titles
        .iter()
        .chain(tvdb.into_iter().flat_map(|t| t.titles.iter()));
    let language = config
        .general
        .title_preference
        .language(&config.general.metadata_language);
    let Some(title) = select_title(titles.clone(), language) else {
        return Err(log.log(
            AnimetaError::NoUsableTitle {
                catalog: anidb.source.to_string(),
                series_id: anidb.id,
            },
            LOG_SOURCE,
            format!("series {} has no usable title", anidb.id),
            Severity::Error,
        ));
    };
    let name = log.log(
        title.title.trim().to_string(),
        LOG_SOURCE,
        format!(
            "selected {:?} title in {:?} for preference {language:?}",
            title.kind, title.language
        ),
        Severity::Debug,
    );
    let original_title = japanese_title(titles)
        .map(|t| t.title.trim().to_string())
        .filter(|t| *t != name);
    let sort_name = romaji_title(&anidb.titles).map(|t| t.title.trim().to_string());

    // 2. Description
    let overview = select_description(
        anidb.description.as_deref(),
        tvdb.and_then(|t| t.description.as_deref()),
        config.sources.use_anidb_descriptions,
    );

    // 3. Genres and tags
    let merged = merge_unique(
        anidb
            .genres
            .iter()
            .chain(tvdb.into_iter().flat_map(|t| t.genres.iter()))
            .cloned(),
    );
    let tidied = apply_genre_policy(merged, &config.genres)?;
    if !tidied.moved_to_tags.is_empty() {
        log.log(
            (),
            LOG_SOURCE,
            format!("moved {} excess genres to tags", tidied.moved_to_tags.len()),
            Severity::Debug,
        );
    }
    if !tidied.dropped.is_empty() {
        log.log(
            (),
            LOG_SOURCE,
            format!("dropped {} excess genres", tidied.dropped.len()),
            Severity::Debug,
        );
    }
    let tags = merge_unique(
        anidb
            .tags
            .iter()
            .chain(tvdb.into_iter().flat_map(|t| t.tags.iter()))
            .cloned()
            .chain(tidied.moved_to_tags),
    );

    // 4. Derived fields
    let rating = pick_rating(anidb, tvdb, &mut log);
    let people = people(anidb);
    let image_url = anidb
        .picture
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("{ANIDB_IMAGE_BASE}{p}"));

    let mut external_ids = vec![series_reference(anidb)];
    external_ids.extend(tvdb.map(series_reference));

    let episodes = sources
        .episodes
        .iter()
        .filter_map(|ep| map_episode(ep, config.sources.use_anidb_ordering_with_seasons, &mut log))
        .collect();

    let metadata = SeriesMetadata {
        name,
        original_title,
        sort_name,
        overview,
        community_rating: rating.map(|r| r.value),
        vote_count: rating.map(|r| r.votes),
        genres: tidied.genres,
        tags,
        people,
        premiere_date: anidb.start_date.or(tvdb.and_then(|t| t.start_date)),
        end_date: anidb.end_date.or(tvdb.and_then(|t| t.end_date)),
        image_url,
        episodes,
        external_ids,
    };
    Ok((metadata, log))
}

/// AniDB permanent, then AniDB temporary, then TVDB's site rating.
fn pick_rating<'a>(
    anidb: &'a SeriesRecord,
    tvdb: Option<&'a SeriesRecord>,
    log: &mut MessageLog,
) -> Option<&'a RatingRecord> {
    let candidates = [
        anidb.rating(RatingKind::Permanent),
        anidb.rating(RatingKind::Temporary),
        tvdb.and_then(|t| t.rating(RatingKind::Permanent)),
    ];
    candidates.into_iter().flatten().find(|r| {
        r.is_in_range()
            || log.log(
                false,
                LOG_SOURCE,
                format!("ignoring out-of-range {} rating {}", r.kind.as_str(), r.value),
                Severity::Warn,
            )
    })
}

fn people(series: &SeriesRecord) -> Vec<PersonMetadata> {
    let staff = series.creators.iter().map(|c| PersonMetadata {
        name: c.name.clone(),
        role: Some(c.role.clone()),
        kind: PersonKind::from_role(&c.role),
        image_url: None,
    });
    let cast = series.characters.iter().filter_map(|c| {
        c.seiyuu.as_ref().map(|s| PersonMetadata {
            name: s.name.clone(),
            role: Some(c.name.clone()),
            kind: PersonKind::Actor,
            image_url: s.picture_url(),
        })
    });
    cast.chain(staff).collect()
}

fn series_reference(series: &SeriesRecord) -> ExternalReference {
    match series.source {
        CatalogSource::AniDb => AnidbSeriesId.reference(series.id),
        CatalogSource::Tvdb => TvdbSeriesId.reference(series.id),
    }
}

fn episode_reference(episode: &EpisodeRecord) -> ExternalReference {
    match episode.source {
        CatalogSource::AniDb => AnidbEpisodeId.reference(episode.id),
        CatalogSource::Tvdb => TvdbEpisodeId.reference(episode.id),
    }
}

/// Pick (season, number) for an episode.
///
/// AniDB ordering treats the series as season 1 numbered absolutely;
/// otherwise aired numbering wins when the record has it.
fn episode_numbering(episode: &EpisodeRecord, use_anidb_ordering: bool) -> Option<(u32, u32)> {
    let absolute = episode.absolute_number.map(|n| (1, n));
    let aired = episode.aired_season.zip(episode.aired_episode_number);
    if use_anidb_ordering {
        absolute.or(aired)
    } else {
        aired.or(absolute)
    }
}

fn map_episode(
    episode: &EpisodeRecord,
    use_anidb_ordering: bool,
    log: &mut MessageLog,
) -> Option<EpisodeMetadata> {
    let Some((season, number)) = episode_numbering(episode, use_anidb_ordering) else {
        return log.log(
            None,
            LOG_SOURCE,
            format!("skipping {} episode {} without numbering", episode.source, episode.id),
            Severity::Warn,
        );
    };
    Some(EpisodeMetadata {
        name: episode.name.clone(),
        season,
        number,
        overview: episode.overview.clone(),
        air_date: episode.air_date,
        external_ids: vec![episode_reference(episode)],
    })
}
