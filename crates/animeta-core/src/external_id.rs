//! Stable cross-references from host entities back to catalog pages.

use crate::models::ExternalReference;

/// Host entity kinds an external id can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Series,
    Episode,
}

/// Describes one (catalog, entity kind) reference the host can render.
pub trait ExternalId: Send + Sync {
    /// Display name of the catalog.
    fn source_name(&self) -> &'static str;

    /// Key the host stores the numeric id under.
    fn key(&self) -> &'static str;

    fn entity_kind(&self) -> EntityKind;

    /// URL with a `{0}` placeholder for the id.
    fn url_template(&self) -> &'static str;

    fn url_for(&self, id: u64) -> String {
        self.url_template().replace("{0}", &id.to_string())
    }

    fn reference(&self, id: u64) -> ExternalReference {
        ExternalReference {
            source: self.source_name().to_string(),
            key: self.key().to_string(),
            id,
            url: self.url_for(id),
        }
    }
}

pub struct AnidbSeriesId;
pub struct AnidbEpisodeId;
pub struct TvdbSeriesId;
pub struct TvdbEpisodeId;

impl ExternalId for AnidbSeriesId {
    fn source_name(&self) -> &'static str {
        "AniDB"
    }
    fn key(&self) -> &'static str {
        "AniDB"
    }
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Series
    }
    fn url_template(&self) -> &'static str {
        "http://anidb.net/perl-bin/animedb.pl?show=anime&aid={0}"
    }
}

impl ExternalId for AnidbEpisodeId {
    fn source_name(&self) -> &'static str {
        "AniDB"
    }
    fn key(&self) -> &'static str {
        "AniDB"
    }
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Episode
    }
    fn url_template(&self) -> &'static str {
        "http://anidb.net/perl-bin/animedb.pl?show=ep&eid={0}"
    }
}

impl ExternalId for TvdbSeriesId {
    fn source_name(&self) -> &'static str {
        "TheTVDB"
    }
    fn key(&self) -> &'static str {
        "Tvdb"
    }
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Series
    }
    fn url_template(&self) -> &'static str {
        "https://thetvdb.com/?tab=series&id={0}"
    }
}

impl ExternalId for TvdbEpisodeId {
    fn source_name(&self) -> &'static str {
        "TheTVDB"
    }
    fn key(&self) -> &'static str {
        "Tvdb"
    }
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Episode
    }
    fn url_template(&self) -> &'static str {
        "https://thetvdb.com/?tab=episode&id={0}"
    }
}

/// Every external id this plugin exposes, for host registration.
pub fn all_external_ids() -> Vec<&'static dyn ExternalId> {
    vec![&AnidbSeriesId, &AnidbEpisodeId, &TvdbSeriesId, &TvdbEpisodeId]
}
