/// Database connection and schema creation
pub mod database;

/// Application settings loaded from `shopdesk.toml` and the environment
pub mod settings;
