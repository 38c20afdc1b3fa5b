//! Federated search across the Sales Funnel lists
//!
//! Fans a query out to every list concurrently, normalizes what comes back,
//! and concatenates the per-list results in list order. A list that fails
//! contributes nothing; it never fails the search as a whole.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::item::SalesFunnelItem;
use crate::lists::{SalesFunnelList, SearchField};
use crate::odata::{DEFAULT_PAGE_SIZE, build_filter};
use crate::sharepoint::ListSource;

/// Queries shorter than this (after trimming) never reach the network
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Searcher the view drives; implemented by `SearchService`
#[async_trait]
pub trait FederatedSearch: Send + Sync {
    /// Search every list and return the merged results
    async fn search_all(&self, query: &str, field: SearchField) -> Result<Vec<SalesFunnelItem>>;
}

/// Service running searches over a `ListSource`
#[derive(Clone)]
pub struct SearchService {
    source: Arc<dyn ListSource>,
    page_size: u32,
    min_query_len: usize,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("site_url", &self.source.site_url())
            .field("page_size", &self.page_size)
            .field("min_query_len", &self.min_query_len)
            .finish()
    }
}

impl SearchService {
    /// Create a new search service
    pub fn new(source: Arc<dyn ListSource>) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }

    /// Set the per-list result cap
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the minimum trimmed query length
    pub fn with_min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len;
        self
    }

    /// Site the underlying lists live on
    pub fn site_url(&self) -> &str {
        self.source.site_url()
    }

    /// Search all lists in parallel; unavailable lists are skipped
    pub async fn search_all(&self, query: &str, field: SearchField) -> Vec<SalesFunnelItem> {
        let Some(query) = self.accept_query(query) else {
            return Vec::new();
        };

        let started = Instant::now();
        let filter = build_filter(query, field);

        let per_list = join_all(
            SalesFunnelList::ALL
                .into_iter()
                .map(|list| self.query_list(list, &filter)),
        )
        .await;

        let results: Vec<SalesFunnelItem> = per_list.into_iter().flatten().collect();

        info!(
            query = %query,
            field = %field,
            results = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Federated search complete"
        );

        results
    }

    /// Search a single list; an unavailable list yields no results
    pub async fn search_list(
        &self,
        list: SalesFunnelList,
        query: &str,
        field: SearchField,
    ) -> Vec<SalesFunnelItem> {
        let Some(query) = self.accept_query(query) else {
            return Vec::new();
        };

        self.query_list(list, &build_filter(query, field)).await
    }

    /// Trimmed query, or `None` when it is too short to search
    fn accept_query<'q>(&self, query: &'q str) -> Option<&'q str> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.min_query_len {
            debug!(query = %query, "Query too short, skipping search");
            None
        } else {
            Some(trimmed)
        }
    }

    async fn query_list(&self, list: SalesFunnelList, filter: &str) -> Vec<SalesFunnelItem> {
        match self.source.fetch_items(list, filter, self.page_size).await {
            Ok(raw) => {
                let site_url = self.source.site_url();
                debug!(list = %list, items = raw.len(), "List query succeeded");
                raw.into_iter()
                    .map(|item| SalesFunnelItem::from_raw(item, list, site_url))
                    .collect()
            }
            Err(e) => {
                warn!(list = %list, code = e.code(), error = %e, "List unavailable, skipping");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl FederatedSearch for SearchService {
    async fn search_all(&self, query: &str, field: SearchField) -> Result<Vec<SalesFunnelItem>> {
        Ok(SearchService::search_all(self, query, field).await)
    }
}
