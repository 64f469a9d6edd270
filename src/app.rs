use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, DetailState};
use cricket_api::{Category, Match, MatchDetail, RefreshState};
use log::debug;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Live,
    Upcoming,
    Past,
    Help,
}

impl MenuItem {
    pub fn category(&self) -> Option<Category> {
        match self {
            MenuItem::Live => Some(Category::Live),
            MenuItem::Upcoming => Some(Category::Upcoming),
            MenuItem::Past => Some(Category::Past),
            MenuItem::Help => None,
        }
    }

    pub fn from_category(category: Category) -> Self {
        match category {
            Category::Live => MenuItem::Live,
            Category::Upcoming => MenuItem::Upcoming,
            Category::Past => MenuItem::Past,
        }
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self { state: AppState::new(), settings };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Scheduler and network handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    /// Take a freshly published refresh state. The expanded match stays
    /// expanded only while it is still listed as live.
    pub fn on_refresh(&mut self, refresh: RefreshState) {
        self.state.refresh = refresh;

        if let Some(id) = self.state.expanded.as_deref() {
            let still_live = self.state.refresh.find(id).is_some_and(Match::is_live);
            if !still_live {
                debug!("match {id} is no longer live, collapsing");
                self.collapse();
            }
        }

        for category in Category::ALL {
            self.state
                .lists
                .get_mut(category)
                .reconcile(self.state.refresh.matches(category));
        }
    }

    pub fn on_detail_loaded(&mut self, detail: MatchDetail) {
        if !self.is_expanded(&detail.id) {
            debug!("dropping detail for collapsed match {}", detail.id);
            return;
        }
        self.state.detail = DetailState::Loaded(detail);
    }

    pub fn on_detail_failed(&mut self, match_id: &str, message: String) {
        if !self.is_expanded(match_id) {
            debug!("dropping detail error for collapsed match {match_id}");
            return;
        }
        self.state.detail = DetailState::Failed(message);
    }

    /// Record the outcome of a manual refresh request.
    pub fn on_refresh_requested(&mut self, started: bool) {
        if !started {
            self.state.notice = Some("Refresh already in progress".to_string());
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn next_tab(&mut self) {
        self.step_tab(1);
    }

    pub fn prev_tab(&mut self) {
        self.step_tab(Category::ALL.len() - 1);
    }

    fn step_tab(&mut self, by: usize) {
        let current = self.active_category().unwrap_or_default();
        let index = Category::ALL.iter().position(|c| *c == current).unwrap_or(0);
        let next = Category::ALL[(index + by) % Category::ALL.len()];
        self.update_tab(MenuItem::from_category(next));
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn active_category(&self) -> Option<Category> {
        self.state.active_tab.category()
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn clear_notice(&mut self) {
        self.state.notice = None;
    }

    // -----------------------------------------------------------------------
    // Match list navigation
    // -----------------------------------------------------------------------

    pub fn select_next(&mut self) {
        if let Some(category) = self.active_category() {
            self.state
                .lists
                .get_mut(category)
                .select_next(self.state.refresh.matches(category));
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(category) = self.active_category() {
            self.state
                .lists
                .get_mut(category)
                .select_prev(self.state.refresh.matches(category));
        }
    }

    pub fn selected_match(&self) -> Option<&Match> {
        let category = self.active_category()?;
        let index = self.state.lists.get(category).selected;
        self.state.refresh.matches(category).get(index)
    }

    /// Expand or collapse the selected match. Returns the id whose detail
    /// should be fetched when a live match was just expanded.
    pub fn toggle_expanded(&mut self) -> Option<String> {
        let selected = self.selected_match()?;
        if self.is_expanded(&selected.id) {
            self.collapse();
            return None;
        }
        if !selected.is_live() {
            self.state.notice = Some("Details are only available for live matches".to_string());
            return None;
        }

        let match_id = selected.id.clone();
        self.state.expanded = Some(match_id.clone());
        self.state.detail = DetailState::Loading;
        Some(match_id)
    }

    pub fn collapse(&mut self) {
        self.state.expanded = None;
        self.state.detail = DetailState::Idle;
    }

    pub fn is_expanded(&self, match_id: &str) -> bool {
        self.state.expanded.as_deref() == Some(match_id)
    }

    /// The expanded match, if it is in the list currently on screen.
    pub fn expanded_match(&self) -> Option<&Match> {
        let category = self.active_category()?;
        let id = self.state.expanded.as_deref()?;
        self.state.refresh.matches(category).iter().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_api::client::ApiConfig;
    use cricket_api::{MatchPayload, MatchResult, Score, TeamRef};
    use std::time::Duration;

    fn app() -> App {
        App::new(AppSettings {
            full_screen: false,
            log_level: None,
            api: ApiConfig::flat("k"),
            refresh_interval: Duration::from_secs(60),
        })
    }

    fn live(id: &str) -> Match {
        Match {
            id: id.into(),
            team1: TeamRef::named("A"),
            team2: TeamRef::named("B"),
            match_type: "T20".into(),
            venue: "Oval".into(),
            series: None,
            payload: MatchPayload::Live {
                current_score: Score { runs: 120, wickets: 3, overs: 15.2 },
            },
        }
    }

    fn finished(id: &str) -> Match {
        Match {
            payload: MatchPayload::Completed {
                result: MatchResult { winner: "A".into(), margin: None, summary: None },
                date: "2024-03-01".into(),
            },
            ..live(id)
        }
    }

    fn refresh(live: Vec<Match>, past: Vec<Match>) -> RefreshState {
        RefreshState { live, past, ..Default::default() }
    }

    fn detail(id: &str) -> MatchDetail {
        MatchDetail { id: id.into(), ..Default::default() }
    }

    #[test]
    fn starts_loading_on_live_tab() {
        let app = app();
        assert!(app.state.refresh.loading);
        assert_eq!(app.active_category(), Some(Category::Live));
        assert!(app.selected_match().is_none());
    }

    #[test]
    fn expanding_a_live_match_requests_detail() {
        let mut app = app();
        app.on_refresh(refresh(vec![live("1"), live("2")], vec![]));
        app.select_next();

        assert_eq!(app.toggle_expanded(), Some("2".to_string()));
        assert_eq!(app.state.detail, DetailState::Loading);

        app.on_detail_loaded(detail("2"));
        assert_eq!(app.state.detail, DetailState::Loaded(detail("2")));
        assert_eq!(app.expanded_match().map(|m| m.id.as_str()), Some("2"));

        assert_eq!(app.toggle_expanded(), None);
        assert_eq!(app.state.expanded, None);
        assert_eq!(app.state.detail, DetailState::Idle);
    }

    #[test]
    fn finished_matches_do_not_expand() {
        let mut app = app();
        app.on_refresh(refresh(vec![], vec![finished("9")]));
        app.update_tab(MenuItem::Past);

        assert_eq!(app.toggle_expanded(), None);
        assert_eq!(app.state.expanded, None);
        assert!(app.state.notice.is_some());
    }

    #[test]
    fn expansion_survives_refresh_while_live() {
        let mut app = app();
        app.on_refresh(refresh(vec![live("1")], vec![]));
        app.toggle_expanded();
        app.on_detail_loaded(detail("1"));

        app.on_refresh(refresh(vec![live("0"), live("1")], vec![]));
        assert!(app.is_expanded("1"));
        assert_eq!(app.state.detail, DetailState::Loaded(detail("1")));
        // Selection followed the match to its new position.
        assert_eq!(app.selected_match().map(|m| m.id.as_str()), Some("1"));
    }

    #[test]
    fn expansion_is_dropped_when_match_finishes() {
        let mut app = app();
        app.on_refresh(refresh(vec![live("1")], vec![]));
        app.toggle_expanded();

        app.on_refresh(refresh(vec![], vec![finished("1")]));
        assert_eq!(app.state.expanded, None);
        assert_eq!(app.state.detail, DetailState::Idle);
    }

    #[test]
    fn late_detail_for_collapsed_match_is_ignored() {
        let mut app = app();
        app.on_refresh(refresh(vec![live("1")], vec![]));
        app.toggle_expanded();
        app.collapse();

        app.on_detail_loaded(detail("1"));
        app.on_detail_failed("1", "boom".into());
        assert_eq!(app.state.detail, DetailState::Idle);
    }

    #[test]
    fn selection_clamps_when_list_shrinks() {
        let mut app = app();
        app.on_refresh(refresh(vec![live("1"), live("2"), live("3")], vec![]));
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.state.lists.live.selected, 2);

        app.on_refresh(refresh(vec![live("1")], vec![]));
        assert_eq!(app.state.lists.live.selected, 0);
        assert_eq!(app.selected_match().map(|m| m.id.as_str()), Some("1"));
    }

    #[test]
    fn tabs_cycle_and_help_returns() {
        let mut app = app();
        app.next_tab();
        assert_eq!(app.state.active_tab, MenuItem::Upcoming);
        app.prev_tab();
        app.prev_tab();
        assert_eq!(app.state.active_tab, MenuItem::Past);

        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Past);
    }

    #[test]
    fn coalesced_refresh_leaves_a_notice() {
        let mut app = app();
        app.on_refresh_requested(true);
        assert!(app.state.notice.is_none());
        app.on_refresh_requested(false);
        assert!(app.state.notice.is_some());
        app.clear_notice();
        assert!(app.state.notice.is_none());
    }
}
