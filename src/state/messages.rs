use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use cricket_api::MatchDetail;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadMatchDetail { match_id: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    DetailLoaded { detail: MatchDetail },
    DetailFailed { match_id: String, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    /// Once a second, keeps the "updated Ns ago" line current.
    Tick,
}
