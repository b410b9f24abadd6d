//! # Name and Genre Filtering
//!
//! Pure filtering shared by the artist and event listings. The output is a
//! new, name-sorted sequence; the input is never modified.

use std::cmp::Ordering;

use serde::Deserialize;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use utoipa::IntoParams;

use crate::models::{artist, event};

/// Filter criteria parsed from the listing query string
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the display name
    pub name: Option<String>,
    /// Genre tag the item must carry
    pub genre: Option<String>,
}

impl FilterCriteria {
    pub fn new(name: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            genre: Some(genre.into()),
        }
    }

    fn name_needle(&self) -> Option<String> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
    }

    fn genre_needle(&self) -> Option<&str> {
        self.genre
            .as_deref()
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
    }
}

/// Anything that can be listed with a display name and genre tags
pub trait Filterable {
    fn display_name(&self) -> &str;
    fn genre_tags(&self) -> Vec<String>;
}

impl Filterable for artist::Model {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn genre_tags(&self) -> Vec<String> {
        artist::Model::genre_tags(self)
    }
}

impl Filterable for event::Model {
    fn display_name(&self) -> &str {
        &self.title
    }

    fn genre_tags(&self) -> Vec<String> {
        vec![self.genre.clone()]
    }
}

/// Items whose name contains `criteria.name` (ignoring case) and whose tags
/// include `criteria.genre`, sorted ascending by name. Empty criteria fields
/// do not restrict.
pub fn filter_and_sort<T>(items: &[T], criteria: &FilterCriteria) -> Vec<T>
where
    T: Filterable + Clone,
{
    let name = criteria.name_needle();
    let genre = criteria.genre_needle().map(str::to_lowercase);

    let mut matched: Vec<T> = items
        .iter()
        .filter(|item| {
            name.as_deref()
                .is_none_or(|needle| item.display_name().to_lowercase().contains(needle))
        })
        .filter(|item| {
            genre.as_deref().is_none_or(|needle| {
                item.genre_tags()
                    .iter()
                    .any(|tag| tag.trim().to_lowercase() == needle)
            })
        })
        .cloned()
        .collect();

    matched.sort_by(|a, b| compare_names(a.display_name(), b.display_name()));
    matched
}

/// Collation used for display ordering.
///
/// Names compare on their accent-stripped lowercase form first so that
/// "Ángel" sorts next to "Angel" rather than after "Zeta". Ties fall back to
/// the raw string to keep the order total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
