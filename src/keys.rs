use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use cricket_api::client::Fetcher;
use cricket_api::scheduler::RefreshScheduler;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings<F: Fetcher>(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    scheduler: &RefreshScheduler<F>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    guard.clear_notice();

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            scheduler.stop();
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Live),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Upcoming),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Past),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),
        (_, KeyCode::Tab | KeyCode::Right | Char('l'), _) => guard.next_tab(),
        (_, KeyCode::BackTab | KeyCode::Left | Char('h'), _) => guard.prev_tab(),

        // Match list
        (_, Char('j') | KeyCode::Down, _) => guard.select_next(),
        (_, Char('k') | KeyCode::Up, _) => guard.select_prev(),
        (_, KeyCode::Esc, _) => guard.collapse(),
        (_, KeyCode::Enter, _) => {
            if let Some(match_id) = guard.toggle_expanded() {
                drop(guard);
                let _ = network_requests
                    .send(NetworkRequest::LoadMatchDetail { match_id })
                    .await;
            }
        }

        // Global
        (_, Char('r'), _) => {
            let started = scheduler.refresh_now();
            guard.on_refresh_requested(started);
        }
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
