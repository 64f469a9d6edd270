mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use cricket_api::RefreshState;
use cricket_api::client::CricketApi;
use cricket_api::repository::MatchRepository;
use cricket_api::scheduler::RefreshScheduler;
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    let app = App::new(AppSettings::load());
    let period = app.settings.refresh_interval;

    // Refresh scheduler: one cycle now, then every `period`
    let client = CricketApi::new(app.settings.api.clone());
    info!("fetching from {}", client.config().base_url);
    let shape = client.shape();
    let repository = MatchRepository::new(client, shape);
    info!("normalizing {} responses", repository.shape().name());
    let scheduler = Arc::new(RefreshScheduler::start(repository, period));
    let refreshes = scheduler.subscribe();

    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Detail fetch thread
    let network_worker = NetworkWorker::new(scheduler.clone(), network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Status line clock
    let tick_tx = ui_event_tx.clone();
    let tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            if tick_tx.send(UiEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    main_ui_loop(
        terminal,
        app,
        &scheduler,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
        refreshes,
    )
    .await;

    scheduler.stop();
    input_handler.abort();
    network_task.abort();
    tick_task.abort();
    cleanup_terminal();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("crictui {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "crictui - live cricket scores in the terminal

Usage:
  crictui
  crictui --help
  crictui --version

Environment:
  CRICTUI_API_KEY       Vendor API key (RapidAPI key for cricbuzz)
  CRICTUI_SOURCE        Response shape: cricbuzz (default) or flat
  CRICTUI_API_BASE      Override the vendor base URL
  CRICTUI_REFRESH_SECS  Seconds between refreshes (default 60)
  CRICTUI_LOG           Log level: error, warn, info, debug, trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    scheduler: &RefreshScheduler<CricketApi>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    mut refreshes: watch::Receiver<RefreshState>,
) {
    let mut loading = LoadingState::default();

    {
        // A cycle may already have landed before we subscribed.
        let state = refreshes.borrow_and_update().clone();
        let mut app_guard = app.lock().await;
        app_guard.on_refresh(state);
        draw::draw(&mut terminal, &mut app_guard, loading);
    }

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw =
                    handle_ui_event(ui_event, &app, scheduler, &network_requests).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Ok(()) = refreshes.changed() => {
                let state = refreshes.borrow_and_update().clone();
                let mut app_guard = app.lock().await;
                app_guard.on_refresh(state);
                draw::draw(&mut terminal, &mut app_guard, loading);
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    scheduler: &RefreshScheduler<CricketApi>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, scheduler, network_requests).await;
            true
        }
        UiEvent::Resize | UiEvent::Tick => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
        }
        NetworkResponse::DetailLoaded { detail } => {
            let mut guard = app.lock().await;
            guard.on_detail_loaded(detail);
        }
        NetworkResponse::DetailFailed { match_id, message } => {
            error!("Detail fetch failed: {message}");
            let mut guard = app.lock().await;
            guard.on_detail_failed(&match_id, message);
        }
    }
    true
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where there is nobody to
/// report a failure to.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
