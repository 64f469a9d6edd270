use crate::app::MenuItem;
use cricket_api::{Category, Match, MatchDetail, RefreshState};

// ---------------------------------------------------------------------------
// Per-tab list selection
// ---------------------------------------------------------------------------

/// Cursor into one category's match list. Follows the selected match by id so
/// a refresh that reorders or inserts matches does not move the highlight.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MatchList {
    pub selected: usize,
    pub selected_id: Option<String>,
}

impl MatchList {
    pub fn reconcile(&mut self, matches: &[Match]) {
        if let Some(id) = &self.selected_id
            && let Some(index) = matches.iter().position(|m| &m.id == id)
        {
            self.selected = index;
            return;
        }
        self.selected = self.selected.min(matches.len().saturating_sub(1));
        self.selected_id = matches.get(self.selected).map(|m| m.id.clone());
    }

    pub fn select_next(&mut self, matches: &[Match]) {
        if matches.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(matches.len() - 1);
        self.selected_id = Some(matches[self.selected].id.clone());
    }

    pub fn select_prev(&mut self, matches: &[Match]) {
        if matches.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1).min(matches.len() - 1);
        self.selected_id = Some(matches[self.selected].id.clone());
    }
}

#[derive(Debug, Default, Clone)]
pub struct MatchLists {
    pub live: MatchList,
    pub upcoming: MatchList,
    pub past: MatchList,
}

impl MatchLists {
    pub fn get(&self, category: Category) -> &MatchList {
        match category {
            Category::Live => &self.live,
            Category::Upcoming => &self.upcoming,
            Category::Past => &self.past,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut MatchList {
        match category {
            Category::Live => &mut self.live,
            Category::Upcoming => &mut self.upcoming,
            Category::Past => &mut self.past,
        }
    }
}

// ---------------------------------------------------------------------------
// Expanded match detail
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
pub enum DetailState {
    #[default]
    Idle,
    Loading,
    Loaded(MatchDetail),
    Failed(String),
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    /// Last state published by the refresh scheduler.
    pub refresh: RefreshState,
    pub lists: MatchLists,
    /// Id of the expanded match. Survives refreshes while the match stays live.
    pub expanded: Option<String>,
    pub detail: DetailState,
    /// One-shot hint shown in the status line until the next key press.
    pub notice: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            refresh: RefreshState { loading: true, ..Default::default() },
            ..Self::default()
        }
    }
}
