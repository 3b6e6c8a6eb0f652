//! Release heading shown at the top of the rendered document.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Text shown when no release name is configured.
pub const NAME_PLACEHOLDER: &str = "XXXX";

/// Text shown when no release date is configured.
pub const DATE_PLACEHOLDER: &str = "XX/XX/XXXX";

/// Release name and date for the document heading.
///
/// Both parts are optional. Missing parts render as literal placeholders so
/// the document can be finished by hand before it goes out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseHeading {
    /// Release name or version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Planned release date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl ReleaseHeading {
    /// Creates a heading with both parts left as placeholders.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Sets the release name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the release date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Release name, or [`NAME_PLACEHOLDER`].
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NAME_PLACEHOLDER)
    }

    /// Release date as `MM/DD/YYYY`, or [`DATE_PLACEHOLDER`].
    pub fn display_date(&self) -> String {
        self.date
            .map(|d| d.format("%m/%d/%Y").to_string())
            .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
    }
}
