pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use client::TvdbClient;
pub use error::TvdbError;
pub use types::{parse_episodes, parse_series, TvdbEpisodesFileSpec, TvdbSeriesFileSpec};
