pub mod config;
pub mod error;
pub mod external_id;
pub mod file_spec;
pub mod mapping;
pub mod message_log;
pub mod models;
