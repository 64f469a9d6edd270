use crate::state::messages::{NetworkRequest, NetworkResponse};
use cricket_api::client::Fetcher;
use cricket_api::scheduler::RefreshScheduler;
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Serves on-demand detail requests from the UI. Runs beside the refresh
/// scheduler and shares nothing with it but the match id.
pub struct NetworkWorker<F: Fetcher> {
    scheduler: Arc<RefreshScheduler<F>>,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl<F: Fetcher> NetworkWorker<F> {
    pub fn new(
        scheduler: Arc<RefreshScheduler<F>>,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            scheduler,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let response = match request {
                NetworkRequest::LoadMatchDetail { match_id } => {
                    self.handle_load_match_detail(match_id).await
                }
            };

            debug!("network request complete");
            let is_ok = !matches!(response, NetworkResponse::DetailFailed { .. });
            self.stop_loading_animation(is_ok).await;

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_match_detail(&self, match_id: String) -> NetworkResponse {
        debug!("loading detail for match {match_id}");
        match self.scheduler.fetch_detail(&match_id).await {
            Ok(detail) => NetworkResponse::DetailLoaded { detail },
            Err(err) => {
                warn!("{err}");
                NetworkResponse::DetailFailed { match_id, message: err.to_string() }
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_api::client::{FetchResult, TransportError};
    use cricket_api::normalize::SourceShape;
    use cricket_api::repository::MatchRepository;
    use serde_json::{Value, json};

    /// Answers every endpoint with the same canned result.
    struct CannedFetcher(Result<Value, u16>);

    impl Fetcher for CannedFetcher {
        async fn fetch(&self, endpoint: &str, _params: &[(String, String)]) -> FetchResult<Value> {
            self.0
                .clone()
                .map_err(|code| TransportError::Status(code, endpoint.to_owned()))
        }
    }

    async fn answer_for(fetcher: CannedFetcher, match_id: &str) -> NetworkResponse {
        let repo = MatchRepository::new(fetcher, SourceShape::Flat);
        let scheduler = Arc::new(RefreshScheduler::start(repo, Duration::from_secs(600)));
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        tokio::spawn(NetworkWorker::new(scheduler.clone(), req_rx, resp_tx).run());

        req_tx
            .send(NetworkRequest::LoadMatchDetail { match_id: match_id.to_owned() })
            .await
            .unwrap();

        loop {
            match resp_rx.recv().await.unwrap() {
                NetworkResponse::LoadingStateChanged { .. } => continue,
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn detail_request_yields_loaded_detail() {
        let response = answer_for(CannedFetcher(Ok(json!({}))), "42").await;
        match response {
            NetworkResponse::DetailLoaded { detail } => assert_eq!(detail.id, "42"),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn detail_failure_keeps_match_id() {
        let response = answer_for(CannedFetcher(Err(503)), "42").await;
        match response {
            NetworkResponse::DetailFailed { match_id, message } => {
                assert_eq!(match_id, "42");
                assert!(message.contains("503"), "{message}");
            }
            other => panic!("unexpected response {other:?}"),
        }
    }
}
