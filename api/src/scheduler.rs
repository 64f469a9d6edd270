use crate::client::Fetcher;
use crate::repository::{DetailFetchError, MatchRepository};
use crate::{MatchDetail, RefreshState};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Refresh period when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Drives `refresh_all` on a fixed period and publishes each result.
///
/// Refreshes are single-flight: a timer tick or [`refresh_now`] that arrives
/// while a refresh is outstanding is dropped, not queued. After [`stop`] no
/// new refresh starts and the result of one still in flight is discarded.
///
/// [`refresh_now`]: RefreshScheduler::refresh_now
/// [`stop`]: RefreshScheduler::stop
pub struct RefreshScheduler<F: Fetcher> {
    shared: Arc<Shared<F>>,
    timer: JoinHandle<()>,
}

struct Shared<F> {
    repository: MatchRepository<F>,
    state: watch::Sender<RefreshState>,
    in_flight: AtomicBool,
    stopped: AtomicBool,
}

impl<F: Fetcher> RefreshScheduler<F> {
    /// Start refreshing right away, then every `period`.
    /// Must be called from within a Tokio runtime.
    pub fn start(repository: MatchRepository<F>, period: Duration) -> Self {
        let (state, _) = watch::channel(RefreshState { loading: true, ..Default::default() });
        let shared = Arc::new(Shared {
            repository,
            state,
            in_flight: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        });
        let timer = tokio::spawn(run_timer(shared.clone(), period));
        Self { shared, timer }
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> RefreshState {
        self.shared.state.borrow().clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    pub fn repository(&self) -> &MatchRepository<F> {
        &self.shared.repository
    }

    /// Request an immediate refresh. Returns `false` when the request was
    /// coalesced into one already running, or the scheduler is stopped.
    pub fn refresh_now(&self) -> bool {
        Shared::begin(&self.shared)
    }

    /// On-demand detail for a live match. Runs independently of the refresh
    /// cycle and never touches the published state.
    pub async fn fetch_detail(&self, match_id: &str) -> Result<MatchDetail, DetailFetchError> {
        self.shared.repository.fetch_detail(match_id).await
    }

    /// Cancel the timer. Idempotent.
    pub fn stop(&self) {
        // Flip the flag under the state lock so a finishing refresh either
        // lands before this point or sees the flag and drops its result.
        self.shared.state.send_modify(|state| {
            self.shared.stopped.store(true, Ordering::SeqCst);
            state.loading = false;
        });
        self.timer.abort();
    }
}

impl<F: Fetcher> Drop for RefreshScheduler<F> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<F: Fetcher> Shared<F> {
    /// Claim the in-flight slot and spawn one refresh cycle.
    fn begin(shared: &Arc<Self>) -> bool {
        if shared.stopped.load(Ordering::SeqCst) {
            return false;
        }
        if shared
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("refresh already in flight, request coalesced");
            return false;
        }

        shared.state.send_modify(|state| state.loading = true);
        tokio::spawn(run_cycle(shared.clone()));
        true
    }
}

async fn run_timer<F: Fetcher>(shared: Arc<Shared<F>>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // First tick completes immediately: that is the startup refresh.
        ticker.tick().await;
        if shared.stopped.load(Ordering::SeqCst) {
            break;
        }
        Shared::begin(&shared);
    }
}

async fn run_cycle<F: Fetcher>(shared: Arc<Shared<F>>) {
    let _slot = InFlightSlot(&shared.in_flight);
    let next = shared.repository.refresh_all().await;

    let applied = shared.state.send_if_modified(|state| {
        if shared.stopped.load(Ordering::SeqCst) {
            return false;
        }
        *state = next;
        true
    });
    if !applied {
        debug!("scheduler stopped, discarding refresh result");
    }
}

/// Releases the single-flight slot even if the cycle is cancelled or panics.
struct InFlightSlot<'a>(&'a AtomicBool);

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::SourceShape;
    use crate::repository::tests::{StubFetcher, live_body};
    use tokio::time::sleep;

    const MINUTE: Duration = Duration::from_secs(60);

    fn scheduler(fetcher: StubFetcher) -> RefreshScheduler<StubFetcher> {
        let repo = MatchRepository::new(
            fetcher.with("/matches/live", Ok(live_body())),
            SourceShape::Flat,
        );
        RefreshScheduler::start(repo, MINUTE)
    }

    fn shared_fetcher<F: Fetcher>(s: &RefreshScheduler<Arc<F>>) -> Arc<F> {
        s.repository().fetcher().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_immediately_then_every_interval() {
        let s = scheduler(StubFetcher::default());
        assert!(s.snapshot().loading);

        sleep(Duration::from_millis(10)).await;
        assert_eq!(s.repository().fetcher().call_count(), 3);
        let state = s.snapshot();
        assert!(!state.loading);
        assert_eq!(state.live.len(), 1);

        sleep(MINUTE).await;
        assert_eq!(s.repository().fetcher().call_count(), 6);

        sleep(MINUTE).await;
        assert_eq!(s.repository().fetcher().call_count(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_refresh_while_in_flight_is_a_no_op() {
        let s = scheduler(StubFetcher::default().delayed(Duration::from_secs(10)));

        sleep(Duration::from_millis(1)).await;
        assert!(s.is_refreshing());
        assert!(!s.refresh_now());
        assert!(!s.refresh_now());

        sleep(Duration::from_secs(10)).await;
        assert!(!s.is_refreshing());
        assert_eq!(s.repository().fetcher().call_count(), 3);
        assert_eq!(s.snapshot().live.len(), 1);

        assert!(s.refresh_now());
        assert!(s.snapshot().loading);
        sleep(Duration::from_secs(11)).await;
        assert_eq!(s.repository().fetcher().call_count(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_during_a_slow_refresh_are_skipped() {
        let s = scheduler(StubFetcher::default().delayed(Duration::from_secs(90)));

        // Tick at 60s lands while the first refresh (0s..90s) is outstanding.
        sleep(Duration::from_secs(100)).await;
        assert_eq!(s.repository().fetcher().call_count(), 3);

        // Next tick at 120s starts a fresh cycle.
        sleep(Duration::from_secs(21)).await;
        assert_eq!(s.repository().fetcher().call_count(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn no_fetch_after_stop() {
        let s = scheduler(StubFetcher::default());
        sleep(Duration::from_millis(1)).await;
        assert_eq!(s.repository().fetcher().call_count(), 3);

        s.stop();
        assert!(s.is_stopped());
        assert!(!s.refresh_now());

        sleep(MINUTE * 5).await;
        assert_eq!(s.repository().fetcher().call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_result_is_discarded_after_stop() {
        let s = scheduler(StubFetcher::default().delayed(Duration::from_secs(10)));
        let mut rx = s.subscribe();
        sleep(Duration::from_millis(1)).await;
        assert!(s.is_refreshing());

        s.stop();
        let _ = rx.borrow_and_update();
        sleep(Duration::from_secs(20)).await;

        assert!(!rx.has_changed().unwrap_or(false));
        let state = s.snapshot();
        assert!(state.live.is_empty());
        assert!(!state.loading);
        assert!(state.updated_at.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scheduler_stops_the_timer() {
        let fetcher = Arc::new(StubFetcher::default().with("/matches/live", Ok(live_body())));
        let s = RefreshScheduler::start(MatchRepository::new(fetcher, SourceShape::Flat), MINUTE);
        sleep(Duration::from_millis(1)).await;
        let fetcher = shared_fetcher(&s);
        assert_eq!(fetcher.call_count(), 3);

        drop(s);
        sleep(MINUTE * 3).await;
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_each_completed_cycle() {
        let s = scheduler(StubFetcher::default());
        let mut rx = s.subscribe();

        rx.wait_for(|state| !state.loading).await.unwrap();
        assert_eq!(rx.borrow().live[0].id, "7");
        assert!(rx.borrow().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn detail_fetch_leaves_refresh_state_alone() {
        let s = scheduler(StubFetcher::default().with("/matches/7", Ok(serde_json::json!({}))));
        sleep(Duration::from_millis(1)).await;
        let before = s.snapshot();

        let detail = s.fetch_detail("7").await.unwrap();
        assert_eq!(detail.id, "7");
        assert_eq!(s.snapshot(), before);
    }
}
