pub mod config;
pub mod sqlite_pragma;
pub mod stats_core;
pub mod store;
