//! # Data Models
//!
//! This module contains all the data models used throughout the Milonga API.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

pub mod artist;
pub mod event;
pub mod user;

pub use artist::Entity as Artist;
pub use event::Entity as Event;
pub use user::Entity as User;
pub use user::{UserRole, UserStatus};

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "milonga-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Image hosted at the external image service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Image {
    /// Public delivery URL
    pub url: String,
    /// Identifier at the image host, needed to delete the asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

impl Image {
    /// Decodes a JSON array of images, skipping entries that do not match.
    pub fn list_from_json(value: &JsonValue) -> Vec<Image> {
        value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Reads a JSON array of strings, skipping non-string entries.
pub(crate) fn string_list(value: &JsonValue) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
