//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM operations
//! for database entities.

pub mod artist;
pub mod event;
pub mod user;

pub use artist::ArtistRepository;
pub use event::EventRepository;
pub use user::{NewUser, SyncOutcome, UserRepository};
