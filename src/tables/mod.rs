//! Tier tables loaded from data files, overriding the built-in ones

pub mod loader;

pub use loader::{load_tier_table, LoadedTables, DEFAULT_TABLES_PATH};
