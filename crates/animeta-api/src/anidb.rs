pub mod client;
pub mod error;
pub mod types;

pub use client::AnidbClient;
pub use error::AnidbError;
pub use types::{parse_series, AnidbSeriesFileSpec};
