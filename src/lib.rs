//! Core library exports for the trainer data dashboard.
//!
//! The `data` feature builds the domain, the category registry, the scoring
//! engine and the Diesel-backed store. `server` adds forms, services, routes
//! and the tone-analysis client used by the Actix-web dashboard.

#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod tone;
