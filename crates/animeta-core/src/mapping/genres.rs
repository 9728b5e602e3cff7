use std::collections::HashSet;

use crate::config::GenreConfig;
use crate::error::AnimetaError;

pub const ANIME_GENRE: &str = "Anime";

/// Result of applying the genre policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TidiedGenres {
    pub genres: Vec<String>,
    /// Genres past the cap, in their original order, destined for tags.
    pub moved_to_tags: Vec<String>,
    /// Genres past the cap that were discarded.
    pub dropped: Vec<String>,
}

/// Concatenate and de-duplicate case-insensitively, keeping the first
/// spelling of each entry and skipping blanks.
pub fn merge_unique<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

/// Order-preserving truncation to `max_genres` when tidying is on.
pub fn tidy_genres(genres: &[String], config: &GenreConfig) -> Result<TidiedGenres, AnimetaError> {
    let max = config.max_genres()?;
    Ok(split_at_cap(genres, max, config))
}

fn split_at_cap(genres: &[String], max: usize, config: &GenreConfig) -> TidiedGenres {
    if !config.tidy_genre_list || genres.len() <= max {
        return TidiedGenres {
            genres: genres.to_vec(),
            ..Default::default()
        };
    }

    let (kept, excess) = genres.split_at(max);
    let mut tidied = TidiedGenres {
        genres: kept.to_vec(),
        ..Default::default()
    };
    if config.move_excess_genres_to_tags {
        tidied.moved_to_tags = excess.to_vec();
    } else {
        tidied.dropped = excess.to_vec();
    }
    tidied
}

/// Full genre policy: tidy, then append the anime label.
///
/// The label takes the last slot under the cap, so a tidied list never
/// exceeds `max_genres`. With a cap of zero there is no slot and the label
/// is left out. An existing anime label (any casing) is set aside first and
/// re-appended with its original spelling, so running this on its own
/// output changes nothing.
pub fn apply_genre_policy(
    genres: Vec<String>,
    config: &GenreConfig,
) -> Result<TidiedGenres, AnimetaError> {
    let max = config.max_genres()?;
    if !config.add_anime_genre {
        return Ok(split_at_cap(&genres, max, config));
    }

    let (anime, rest): (Vec<String>, Vec<String>) = genres
        .into_iter()
        .partition(|g| g.eq_ignore_ascii_case(ANIME_GENRE));

    if config.tidy_genre_list && max == 0 {
        return Ok(split_at_cap(&rest, 0, config));
    }

    let mut tidied = split_at_cap(&rest, max.saturating_sub(1), config);
    tidied.genres.push(
        anime
            .into_iter()
            .next()
            .unwrap_or_else(|| ANIME_GENRE.to_string()),
    );
    Ok(tidied)
}
