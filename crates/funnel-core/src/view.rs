//! Search view state machine
//!
//! `SearchView` owns the UI state of the search box: query text, loading
//! and error flags, the selected search field and the active list tab.
//! Hosting layers drive it through `handle_input`, `submit`, `clear`,
//! `set_field` and `set_active_tab`, and re-render from `subscribe()`.
//!
//! Every search start and every reset bumps a generation counter. A search
//! response is applied only while its generation is still current, so a
//! slow response can never overwrite the result of a newer search.
//!
//! All operations must be called from within a Tokio runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::Error;
use crate::item::SalesFunnelItem;
use crate::lists::{SalesFunnelList, SearchField};
use crate::search::FederatedSearch;

/// The only failure text ever shown to the user
pub const SEARCH_FAILED_MESSAGE: &str =
    "Search failed. Please check your permissions and try again.";

/// Which slice of the fetched results is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListTab {
    #[default]
    All,
    List(SalesFunnelList),
}

impl ListTab {
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Results",
            Self::List(list) => list.as_str(),
        }
    }

    fn matches(&self, item: &SalesFunnelItem) -> bool {
        match self {
            Self::All => true,
            Self::List(list) => item.source_list == *list,
        }
    }
}

/// Coarse state derived from `SearchState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// No search attempted since the last reset
    Idle,
    /// A request is in flight
    Searching,
    Results,
    NoResults,
    Error,
}

/// Snapshot of the search box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    /// Last completed result set; kept while a newer search is loading
    pub results: Vec<SalesFunnelItem>,
    pub is_loading: bool,
    pub has_searched: bool,
    pub error_message: Option<String>,
    pub active_tab: ListTab,
    pub search_field: SearchField,
}

impl SearchState {
    pub fn phase(&self) -> SearchPhase {
        if self.is_loading {
            SearchPhase::Searching
        } else if self.error_message.is_some() {
            SearchPhase::Error
        } else if !self.has_searched {
            SearchPhase::Idle
        } else if self.results.is_empty() {
            SearchPhase::NoResults
        } else {
            SearchPhase::Results
        }
    }

    /// Results belonging to the active tab
    pub fn filtered_results(&self) -> Vec<&SalesFunnelItem> {
        self.results
            .iter()
            .filter(|item| self.active_tab.matches(item))
            .collect()
    }

    pub fn count_for(&self, tab: ListTab) -> usize {
        match tab {
            ListTab::All => self.results.len(),
            ListTab::List(_) => self.results.iter().filter(|item| tab.matches(item)).count(),
        }
    }

    /// `All` followed by every list that has at least one result
    pub fn tabs(&self) -> Vec<ListTab> {
        std::iter::once(ListTab::All)
            .chain(
                SalesFunnelList::ALL
                    .into_iter()
                    .map(ListTab::List)
                    .filter(|tab| self.count_for(*tab) > 0),
            )
            .collect()
    }

    /// Result count line shown above the cards
    pub fn summary(&self) -> String {
        let shown = self.filtered_results().len();
        let plural = if shown == 1 { "" } else { "s" };
        match self.active_tab {
            ListTab::All => format!("Showing {} result{} across all lists", shown, plural),
            ListTab::List(list) => format!("Showing {} result{} in {}", shown, plural, list),
        }
    }
}

/// Timing and gating knobs of the view
#[derive(Debug, Clone, Copy)]
pub struct ViewSettings {
    pub debounce: Duration,
    pub min_query_len: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        SearchConfig::default().into()
    }
}

impl From<SearchConfig> for ViewSettings {
    fn from(config: SearchConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            min_query_len: config.min_query_len,
        }
    }
}

/// Pending debounce timer; `seq` changes whenever the timer is replaced or
/// cancelled, so a timer that already woke up can tell it is stale
#[derive(Default)]
struct Debounce {
    seq: u64,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    searcher: Arc<dyn FederatedSearch>,
    state: watch::Sender<SearchState>,
    generation: AtomicU64,
    debounce: Mutex<Debounce>,
    settings: ViewSettings,
}

/// The search box state machine
pub struct SearchView {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SearchView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchView")
            .field("phase", &self.phase())
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .field("settings", &self.inner.settings)
            .finish()
    }
}

impl SearchView {
    pub fn new(searcher: Arc<dyn FederatedSearch>) -> Self {
        Self::with_settings(searcher, ViewSettings::default())
    }

    pub fn with_settings(searcher: Arc<dyn FederatedSearch>, settings: ViewSettings) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(Inner {
                searcher,
                state,
                generation: AtomicU64::new(0),
                debounce: Mutex::new(Debounce::default()),
                settings,
            }),
        }
    }

    /// Snapshot of the current state
    pub fn current_state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn phase(&self) -> SearchPhase {
        self.inner.state.borrow().phase()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Query text changed; searches after the debounce delay if long enough
    pub fn handle_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.cancel_debounce();

        let searchable = self.inner.is_searchable(&text);
        self.inner.state.send_modify(|state| state.query = text.clone());

        if searchable {
            Inner::schedule_search(&self.inner, text);
        } else {
            self.inner.abandon_in_flight();
            self.inner.state.send_modify(|state| {
                state.results.clear();
                state.has_searched = false;
                state.is_loading = false;
                state.error_message = None;
            });
        }
    }

    /// Search now, skipping the debounce; a blank query is ignored
    pub fn submit(&self) {
        self.inner.cancel_debounce();

        let query = self.inner.state.borrow().query.clone();
        if query.trim().is_empty() {
            return;
        }
        Inner::start_search(&self.inner, query);
    }

    /// Reset to idle, discarding query text and results
    pub fn clear(&self) {
        self.inner.cancel_debounce();
        self.inner.abandon_in_flight();
        self.inner.state.send_modify(|state| {
            *state = SearchState {
                search_field: state.search_field,
                ..SearchState::default()
            };
        });
    }

    /// Change the searched column; re-runs a searchable query at once
    pub fn set_field(&self, field: SearchField) {
        self.inner.state.send_modify(|state| state.search_field = field);

        let query = self.inner.state.borrow().query.clone();
        if self.inner.is_searchable(&query) {
            self.inner.cancel_debounce();
            Inner::start_search(&self.inner, query);
        }
    }

    /// Change the displayed slice of the results; never searches
    pub fn set_active_tab(&self, tab: ListTab) {
        self.inner.state.send_if_modified(|state| {
            let changed = state.active_tab != tab;
            state.active_tab = tab;
            changed
        });
    }
}

impl Drop for SearchView {
    fn drop(&mut self) {
        self.inner.cancel_debounce();
    }
}

impl Inner {
    fn is_searchable(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.settings.min_query_len
    }

    fn lock_debounce(&self) -> MutexGuard<'_, Debounce> {
        self.debounce.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a search for `query` once the debounce delay passes
    fn schedule_search(inner: &Arc<Self>, query: String) {
        let mut slot = inner.lock_debounce();
        slot.seq += 1;
        let seq = slot.seq;

        let task_inner = Arc::clone(inner);
        let delay = inner.settings.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Inner::fire_debounce(&task_inner, seq, query);
        });

        if let Some(previous) = slot.handle.replace(handle) {
            previous.abort();
        }
    }

    /// Timer expiry; the search starts under the debounce lock so a
    /// concurrent cancel either sees it started or stops it here
    fn fire_debounce(inner: &Arc<Self>, seq: u64, query: String) {
        let mut slot = inner.lock_debounce();
        if slot.seq != seq {
            debug!(query = %query, "Debounce superseded, not searching");
            return;
        }
        slot.seq += 1;
        slot.handle = None;
        Inner::start_search(inner, query);
    }

    fn cancel_debounce(&self) {
        let mut slot = self.lock_debounce();
        slot.seq += 1;
        if let Some(handle) = slot.handle.take() {
            handle.abort();
        }
    }

    /// Invalidate any outstanding response
    fn abandon_in_flight(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn start_search(inner: &Arc<Self>, query: String) {
        let query = query.trim().to_string();
        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut field = SearchField::All;
        inner.state.send_modify(|state| {
            field = state.search_field;
            state.is_loading = true;
            state.error_message = None;
            state.has_searched = true;
        });

        debug!(query = %query, field = %field, generation, "Starting search");

        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            let searcher = Arc::clone(&inner.searcher);
            let task_query = query.clone();
            let outcome = tokio::spawn(async move { searcher.search_all(&task_query, field).await })
                .await
                .unwrap_or_else(|e| Err(Error::SearchFailed(format!("search task ended: {}", e))));

            let applied = inner.state.send_if_modified(|state| {
                if inner.generation.load(Ordering::SeqCst) != generation {
                    return false;
                }
                state.is_loading = false;
                match outcome {
                    Ok(results) => state.results = results,
                    Err(e) => {
                        warn!(query = %query, code = e.code(), error = %e, "Search failed");
                        state.results.clear();
                        state.error_message = Some(SEARCH_FAILED_MESSAGE.to_string());
                    }
                }
                true
            });

            if !applied {
                debug!(query = %query, generation, "Discarding stale search response");
            }
        });
    }
}
