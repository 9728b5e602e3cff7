pub mod anidb;
pub mod traits;
pub mod tvdb;
