mod metadata;
mod record;

pub use metadata::{EpisodeMetadata, ExternalReference, PersonKind, PersonMetadata, SeriesMetadata};
pub use record::{
    CatalogSource, CharacterRecord, CreatorRecord, EpisodeRecord, RatingKind, RatingRecord,
    SeiyuuList, SeiyuuRecord, SeriesRecord, TitleRecord, TitleType, ANIDB_IMAGE_BASE,
};
