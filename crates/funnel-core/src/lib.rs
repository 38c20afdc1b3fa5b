//! Funnel Core Library
//!
//! This crate provides the core functionality for Funnel, a federated search
//! over the Sales Funnel SharePoint lists, including:
//! - The fixed list and search field catalogues
//! - OData filter and request construction
//! - SharePoint REST transport
//! - Parallel multi-list search with per-list failure containment
//! - The search box state machine (debounce, tabs, stale response guard)
//! - Configuration and error types

pub mod config;
pub mod error;
pub mod item;
pub mod lists;
pub mod odata;
pub mod search;
pub mod sharepoint;
pub mod view;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::item::SalesFunnelItem;
    pub use crate::lists::{SalesFunnelList, SearchField};
    pub use crate::search::{FederatedSearch, SearchService};
    pub use crate::sharepoint::{ListSource, SharePointClient};
    pub use crate::view::{ListTab, SearchPhase, SearchState, SearchView};
}
