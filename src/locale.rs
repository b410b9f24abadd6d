//! # Locale Resolution and Date Formatting
//!
//! The site is published in Spanish, English and German. Event dates are
//! rendered server-side in the locale resolved for the request.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Supported presentation locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Es,
    En,
    De,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Es => "es",
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    fn chrono_locale(self) -> chrono::Locale {
        match self {
            Locale::Es => chrono::Locale::es_ES,
            Locale::En => chrono::Locale::en_US,
            Locale::De => chrono::Locale::de_DE,
        }
    }

    fn long_date_pattern(self) -> &'static str {
        match self {
            Locale::Es => "%A, %-d de %B de %Y",
            Locale::En => "%A, %B %-d, %Y",
            Locale::De => "%A, %-d. %B %Y",
        }
    }

    /// Long weekday/day/month/year rendering of `date`.
    pub fn format_date(self, date: NaiveDate) -> String {
        date.and_time(NaiveTime::MIN)
            .and_utc()
            .format_localized(self.long_date_pattern(), self.chrono_locale())
            .to_string()
    }

    /// Picks the locale for a request: explicit `lang` query value first, then
    /// the first supported `Accept-Language` entry, then `fallback`.
    pub fn resolve(lang: Option<&str>, accept_language: Option<&str>, fallback: Locale) -> Locale {
        lang.and_then(|lang| lang.parse().ok())
            .or_else(|| accept_language.and_then(from_accept_language))
            .unwrap_or(fallback)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for unsupported locale codes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale '{0}'")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    /// Accepts bare codes and region-qualified tags such as `de-AT`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let primary = value
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "es" => Ok(Locale::Es),
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            _ => Err(UnsupportedLocale(value.to_string())),
        }
    }
}

/// First supported language of an `Accept-Language` header, in q-value order.
fn from_accept_language(header: &str) -> Option<Locale> {
    let mut ranges: Vec<(f32, usize, &str)> = header
        .split(',')
        .enumerate()
        .filter_map(|(position, entry)| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            (!tag.is_empty() && quality > 0.0).then_some((quality, position, tag))
        })
        .collect();

    ranges.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    ranges.into_iter().find_map(|(_, _, tag)| tag.parse().ok())
}

/// `?lang=` query parameter
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LangQuery {
    /// Presentation locale (`es`, `en` or `de`)
    pub lang: Option<String>,
}
