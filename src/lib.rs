//! # Milonga API Library
//!
//! Listings of Argentine-music artists and events in Berlin, the soft-delete
//! lifecycle for events and the session-based auth gate in front of it.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod images;
pub mod lifecycle;
pub mod listing;
pub mod locale;
pub mod models;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub use migration;
