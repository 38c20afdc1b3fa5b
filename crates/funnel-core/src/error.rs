//! Error types for Funnel

use thiserror::Error;

/// Result type alias using Funnel's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Funnel error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // List errors (E100-E199)
    #[error("List '{list}' returned HTTP {status}. The list may not exist or you may lack access.")]
    ListUnavailable { list: String, status: u16 },

    #[error("Network error: {0}. Check your connection to the SharePoint site.")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response from SharePoint: {0}")]
    InvalidResponse(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    // Input errors (E200-E299)
    #[error("Unknown list '{0}'. Run `funnel lists` to see all lists.")]
    UnknownList(String),

    #[error("Unknown search field '{0}'. Run `funnel fields` to see all fields.")]
    UnknownField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Config errors (E300-E399)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No SharePoint site URL configured. Set one with `funnel config set web_part.site_url <url>`.")]
    MissingSiteUrl,

    // Generic errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::ListUnavailable { .. } => "E100",
            Self::NetworkError(_) => "E101",
            Self::InvalidResponse(_) => "E102",
            Self::SearchFailed(_) => "E103",
            Self::UnknownList(_) => "E200",
            Self::UnknownField(_) => "E201",
            Self::InvalidInput(_) => "E202",
            Self::ConfigError(_) => "E300",
            Self::MissingSiteUrl => "E301",
            Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ListUnavailable { list, .. } => {
                Some(format!("Check that the '{}' list exists on the site", list))
            }
            Self::NetworkError(_) => Some("Check network connection".to_string()),
            Self::UnknownList(_) => Some("funnel lists".to_string()),
            Self::UnknownField(_) => Some("funnel fields".to_string()),
            Self::ConfigError(_) => Some("funnel config list".to_string()),
            Self::MissingSiteUrl => {
                Some("funnel config set web_part.site_url <url>".to_string())
            }
            _ => None,
        }
    }
}
