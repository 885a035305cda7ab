//! Common types shared across all models.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Full-date formats accepted from data sources.
const FULL_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"];

/// Release date structure.
///
/// Not all fields may be available; year is always present when known,
/// but month and day may be unknown. Use [`ReleaseDate::sort_key`] to
/// order dates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ReleaseDate {
    /// Year of release.
    pub year: i32,

    /// Month of release (1-12), if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    /// Day of release (1-31), if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl ReleaseDate {
    /// Create a year-only release date.
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    /// Create a full release date.
    pub fn full(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
        }
    }

    /// Resolve a source date string into a sortable release date.
    ///
    /// Accepts `YYYY-MM-DD`, `Month D, YYYY`, `Month YYYY`, `YYYY-MM` and
    /// `YYYY`. Placeholders such as `0000-00-00` or an empty string
    /// resolve to `None`.
    pub fn parse(date_str: &str) -> Option<Self> {
        let date_str = date_str.trim();
        if date_str.is_empty() {
            return None;
        }

        for format in FULL_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
                return Self::from_naive(date);
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", date_str), "%d %B %Y") {
            return Self::known_year(date.year()).map(|d| Self {
                month: Some(date.month()),
                ..d
            });
        }

        let parts: Vec<&str> = date_str.split('-').collect();
        match parts.as_slice() {
            [year] => Self::known_year(parse_year(year)?),
            [year, month] => {
                let month: u32 = month.parse().ok().filter(|m| (1..=12).contains(m))?;
                Self::known_year(parse_year(year)?).map(|d| Self {
                    month: Some(month),
                    ..d
                })
            }
            _ => None,
        }
    }

    fn from_naive(date: NaiveDate) -> Option<Self> {
        Self::known_year(date.year()).map(|_| Self::full(date.year(), date.month(), date.day()))
    }

    fn known_year(year: i32) -> Option<Self> {
        (year > 0).then(|| Self::year(year))
    }

    /// Chronological sort key. Unknown month and day count as the first,
    /// so `2001` and `2001-01-01` sort together.
    pub fn sort_key(&self) -> (i32, u32, u32) {
        (self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }
}

fn parse_year(s: &str) -> Option<i32> {
    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}
