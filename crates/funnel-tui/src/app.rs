//! Key handling for the search screen

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use funnel_core::view::{SearchState, SearchView};

/// Rows moved by PageUp/PageDown
const PAGE_ROWS: usize = 10;

pub struct App {
    pub view: SearchView,
    pub title: String,
    pub placeholder: String,
    pub scroll: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(view: SearchView, title: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            view,
            title: title.into(),
            placeholder: placeholder.into(),
            scroll: 0,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('f') if ctrl => self.cycle_field(),
            KeyCode::BackTab => self.cycle_field(),
            KeyCode::Esc => {
                self.view.clear();
                self.scroll = 0;
            }
            KeyCode::Enter => {
                self.view.submit();
                self.scroll = 0;
            }
            KeyCode::Backspace => {
                let mut query = self.view.current_state().query;
                query.pop();
                self.edit_query(query);
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                let mut query = self.view.current_state().query;
                query.push(c);
                self.edit_query(query);
            }
            KeyCode::Left => self.step_tab(-1),
            KeyCode::Right => self.step_tab(1),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(PAGE_ROWS),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(PAGE_ROWS),
            _ => {}
        }
    }

    fn edit_query(&mut self, query: String) {
        self.view.handle_input(query);
        self.scroll = 0;
    }

    fn cycle_field(&mut self) {
        let next = self.view.current_state().search_field.next();
        self.view.set_field(next);
        self.scroll = 0;
    }

    /// Move the active tab left or right among the tabs on offer
    fn step_tab(&mut self, delta: isize) {
        let state = self.view.current_state();
        if !tabs_visible(&state) {
            return;
        }

        let tabs = state.tabs();
        let current = tabs
            .iter()
            .position(|tab| *tab == state.active_tab)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(tabs.len() as isize) as usize;

        self.view.set_active_tab(tabs[next]);
        self.scroll = 0;
    }
}

/// Tabs only show once a search has produced results
pub fn tabs_visible(state: &SearchState) -> bool {
    state.has_searched && !state.results.is_empty()
}

/// Index of the active tab among `state.tabs()`, if it is on offer
pub fn active_tab_index(state: &SearchState) -> Option<usize> {
    state.tabs().iter().position(|tab| *tab == state.active_tab)
}
