//! Raw list records and the normalized search result item

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::lists::SalesFunnelList;

/// Placeholder title for items with neither a title nor a project
pub const NO_TITLE: &str = "(No Title)";

/// Response envelope of an `odata=nometadata` items query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListItemsResponse {
    #[serde(default)]
    pub value: Vec<RawListItem>,
}

/// One list record as SharePoint returns it; every column may be absent
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawListItem {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub project: Option<String>,
    pub owner: Option<String>,
    pub estimator: Option<String>,
    pub business_area: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub status: Option<String>,
    pub bid_date: Option<String>,
    pub award_date: Option<String>,
    pub estimated_value: Option<f64>,
    pub segment: Option<String>,
    pub prime_or_sub: Option<String>,
    pub low_bidder_name: Option<String>,
    #[serde(rename = "Bid2WinID")]
    pub bid2win_id: Option<String>,
    pub plant: Option<String>,
    pub place: Option<String>,
    #[serde(rename = "PISStatus")]
    pub pis_status: Option<String>,
}

/// A list entry matched by a search, normalized for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesFunnelItem {
    pub id: i64,
    pub title: String,
    pub project: String,
    pub owner: String,
    pub estimator: String,
    pub business_area: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub status: String,
    pub bid_date: String,
    pub award_date: String,
    pub estimated_value: f64,
    pub segment: String,
    pub prime_or_sub: String,
    pub low_bidder_name: String,
    pub bid2win_id: String,
    pub plant: String,
    pub place: String,
    pub pis_status: String,
    pub source_list: SalesFunnelList,
    pub item_url: String,
}

impl SalesFunnelItem {
    /// Normalize a raw record fetched from `list` on `site_url`
    pub fn from_raw(raw: RawListItem, list: SalesFunnelList, site_url: &str) -> Self {
        let id = raw.id.unwrap_or_default();
        let project = text(raw.project);
        let title = non_empty(raw.title)
            .or_else(|| (!project.is_empty()).then(|| project.clone()))
            .unwrap_or_else(|| NO_TITLE.to_string());

        Self {
            id,
            title,
            project,
            owner: text(raw.owner),
            estimator: text(raw.estimator),
            business_area: text(raw.business_area),
            city: text(raw.city),
            county: text(raw.county),
            state: text(raw.state),
            status: text(raw.status),
            bid_date: raw.bid_date.as_deref().map(format_date).unwrap_or_default(),
            award_date: raw.award_date.as_deref().map(format_date).unwrap_or_default(),
            estimated_value: raw.estimated_value.unwrap_or(0.0),
            segment: text(raw.segment),
            prime_or_sub: text(raw.prime_or_sub),
            low_bidder_name: text(raw.low_bidder_name),
            bid2win_id: text(raw.bid2win_id),
            plant: text(raw.plant),
            place: text(raw.place),
            pis_status: text(raw.pis_status),
            source_list: list,
            item_url: item_url(site_url, list, id),
        }
    }

    /// Card headline: the project name when there is one
    pub fn headline(&self) -> &str {
        if !self.project.is_empty() {
            &self.project
        } else if !self.title.is_empty() {
            &self.title
        } else {
            NO_TITLE
        }
    }

    /// City, county and state joined, skipping the blank ones
    pub fn location(&self) -> String {
        [&self.city, &self.county, &self.state]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn status_tone(&self) -> StatusTone {
        StatusTone::classify(&self.status)
    }
}

/// Deep link to an item's display form
pub fn item_url(site_url: &str, list: SalesFunnelList, id: i64) -> String {
    format!(
        "{}/Lists/{}/DispForm.aspx?ID={}",
        site_url.trim_end_matches('/'),
        list.url_encoded(),
        id
    )
}

/// Colour class of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Won,
    Lost,
    Pending,
    Cancelled,
    Default,
}

impl StatusTone {
    /// Classify free-text status by keyword; first match wins
    pub fn classify(status: &str) -> Self {
        let s = status.to_lowercase();
        if s.is_empty() {
            Self::Default
        } else if s.contains("won") || s.contains("award") {
            Self::Won
        } else if s.contains("lost") || s.contains("no award") {
            Self::Lost
        } else if s.contains("pending") || s.contains("active") || s.contains("bid") {
            Self::Pending
        } else if s.contains("cancel") {
            Self::Cancelled
        } else {
            Self::Default
        }
    }
}

/// Whole-dollar US currency, or an empty string for zero
pub fn format_currency(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return String::new();
    }

    let rounded = value.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Render an ISO-8601 date as the UTC `M/D/YYYY`; unparseable input is kept as is
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d")
        });

    match date {
        Ok(d) => format!("{}/{}/{}", d.month(), d.day(), d.year()),
        Err(_) => raw.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}
