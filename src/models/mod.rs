//! Storage records and runtime configuration.

#[cfg(feature = "server")]
pub mod config;
pub mod trainer_data;
