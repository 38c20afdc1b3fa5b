//! The fixed catalogue of Sales Funnel lists and searchable fields

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One of the SharePoint lists backing the Sales Funnel
///
/// Variants are declared in query order: the aggregate list first, then
/// the year lists from newest to oldest. Results are merged in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SalesFunnelList {
    Aggregate,
    Y2026,
    Y2025,
    Y2024,
    Y2023,
    Y2022,
    Y2021,
    Y2020,
}

impl SalesFunnelList {
    /// Every list, in query order
    pub const ALL: [Self; 8] = [
        Self::Aggregate,
        Self::Y2026,
        Self::Y2025,
        Self::Y2024,
        Self::Y2023,
        Self::Y2022,
        Self::Y2021,
        Self::Y2020,
    ];

    /// SharePoint list title
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aggregate => "Aggregate Sales Funnel",
            Self::Y2026 => "2026",
            Self::Y2025 => "2025",
            Self::Y2024 => "2024",
            Self::Y2023 => "2023",
            Self::Y2022 => "2022",
            Self::Y2021 => "2021",
            Self::Y2020 => "2020",
        }
    }

    /// Badge colour as RGB, used to tag result cards with their list
    pub fn badge_rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Aggregate => (0, 120, 212),
            Self::Y2026 => (16, 124, 16),
            Self::Y2025 => (135, 100, 184),
            Self::Y2024 => (202, 80, 16),
            Self::Y2023 => (0, 153, 188),
            Self::Y2022 => (196, 49, 75),
            Self::Y2021 => (121, 119, 117),
            Self::Y2020 => (152, 111, 11),
        }
    }

    /// Path-safe form of the list title, as used in list URLs
    pub fn url_encoded(&self) -> String {
        urlencoding::encode(self.as_str()).into_owned()
    }
}

impl fmt::Display for SalesFunnelList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesFunnelList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|list| list.as_str().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("aggregate").then_some(Self::Aggregate))
            .ok_or_else(|| Error::UnknownList(s.to_string()))
    }
}

impl Serialize for SalesFunnelList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SalesFunnelList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Column the query text is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchField {
    #[default]
    All,
    Title,
    Project,
    Owner,
    Estimator,
    City,
    Status,
    Bid2WinId,
    BusinessArea,
    Segment,
}

impl SearchField {
    /// Every selectable field, in selector order
    pub const ALL: [Self; 10] = [
        Self::All,
        Self::Title,
        Self::Project,
        Self::Owner,
        Self::Estimator,
        Self::City,
        Self::Status,
        Self::Bid2WinId,
        Self::BusinessArea,
        Self::Segment,
    ];

    /// Selector key; for everything except `All` this is the SharePoint column name
    pub fn key(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Title => "Title",
            Self::Project => "Project",
            Self::Owner => "Owner",
            Self::Estimator => "Estimator",
            Self::City => "City",
            Self::Status => "Status",
            Self::Bid2WinId => "Bid2WinID",
            Self::BusinessArea => "BusinessArea",
            Self::Segment => "Segment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Fields",
            Self::Title => "Title",
            Self::Project => "Project",
            Self::Owner => "Owner",
            Self::Estimator => "Estimator",
            Self::City => "City",
            Self::Status => "Status",
            Self::Bid2WinId => "Bid2Win ID",
            Self::BusinessArea => "Business Area",
            Self::Segment => "Segment",
        }
    }

    /// The next field in selector order, wrapping around
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SearchField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}
