use crate::client::{Fetcher, TransportError};
use crate::normalize::{self, NormalizationError, SourceShape};
use crate::{Category, Match, MatchDetail, RefreshState};
use chrono::Utc;
use log::{debug, warn};
use std::fmt;

pub const ALL_FAILED_MESSAGE: &str =
    "Failed to fetch matches. Please check your API configuration.";

/// Vendor paths for the three categories plus the detail template.
/// `{id}` in `detail` is replaced by the match id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub live: String,
    pub upcoming: String,
    pub past: String,
    pub detail: String,
}

impl Endpoints {
    pub fn for_shape(shape: SourceShape) -> Self {
        match shape {
            SourceShape::Cricbuzz => Self {
                live: "/matches/v1/live".into(),
                upcoming: "/matches/v1/upcoming".into(),
                past: "/matches/v1/recent".into(),
                detail: "/matches/v1/{id}/commentary".into(),
            },
            SourceShape::Flat => Self {
                live: "/matches/live".into(),
                upcoming: "/matches/upcoming".into(),
                past: "/matches/completed".into(),
                detail: "/matches/{id}".into(),
            },
        }
    }

    pub fn category(&self, category: Category) -> &str {
        match category {
            Category::Live => &self.live,
            Category::Upcoming => &self.upcoming,
            Category::Past => &self.past,
        }
    }

    pub fn detail(&self, match_id: &str) -> String {
        self.detail.replace("{id}", match_id)
    }
}

/// Why a single category came back empty.
#[derive(Debug)]
pub enum CategoryError {
    Transport(TransportError),
    Normalization(NormalizationError),
}

impl fmt::Display for CategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryError::Transport(e) => write!(f, "{e}"),
            CategoryError::Normalization(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CategoryError {}

impl From<TransportError> for CategoryError {
    fn from(e: TransportError) -> Self {
        CategoryError::Transport(e)
    }
}

impl From<NormalizationError> for CategoryError {
    fn from(e: NormalizationError) -> Self {
        CategoryError::Normalization(e)
    }
}

/// Failure loading one match's detail. Only ever shown next to that match.
#[derive(Debug)]
pub enum DetailFetchError {
    Transport(String, TransportError),
    Normalization(String, NormalizationError),
}

impl DetailFetchError {
    pub fn match_id(&self) -> &str {
        match self {
            DetailFetchError::Transport(id, _) | DetailFetchError::Normalization(id, _) => id,
        }
    }
}

impl fmt::Display for DetailFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailFetchError::Transport(id, e) => write!(f, "Detail for match {id}: {e}"),
            DetailFetchError::Normalization(id, e) => write!(f, "Detail for match {id}: {e}"),
        }
    }
}

impl std::error::Error for DetailFetchError {}

/// Fetch-and-normalize orchestration over a [`Fetcher`].
///
/// Stateless between calls: every `refresh_all` is a full re-fetch.
#[derive(Debug, Clone)]
pub struct MatchRepository<F> {
    fetcher: F,
    shape: SourceShape,
    endpoints: Endpoints,
}

impl<F: Fetcher> MatchRepository<F> {
    pub fn new(fetcher: F, shape: SourceShape) -> Self {
        Self { fetcher, shape, endpoints: Endpoints::for_shape(shape) }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn shape(&self) -> SourceShape {
        self.shape
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch all three categories concurrently.
    ///
    /// A failing category is logged and comes back as an empty list. Only
    /// when every category fails does the state carry an error, and then
    /// just one message.
    pub async fn refresh_all(&self) -> RefreshState {
        let (live, upcoming, past) = tokio::join!(
            self.fetch_category(Category::Live),
            self.fetch_category(Category::Upcoming),
            self.fetch_category(Category::Past),
        );

        let all_failed = live.is_err() && upcoming.is_err() && past.is_err();
        let settle = |category: Category, result: Result<Vec<Match>, CategoryError>| {
            result.unwrap_or_else(|e| {
                warn!("{} matches unavailable: {e}", category.label());
                Vec::new()
            })
        };

        RefreshState {
            live: settle(Category::Live, live),
            upcoming: settle(Category::Upcoming, upcoming),
            past: settle(Category::Past, past),
            loading: false,
            error: all_failed.then(|| ALL_FAILED_MESSAGE.to_owned()),
            updated_at: Some(Utc::now()),
        }
    }

    pub async fn fetch_category(&self, category: Category) -> Result<Vec<Match>, CategoryError> {
        let endpoint = self.endpoints.category(category);
        debug!("fetching {} matches from {endpoint}", category.label());
        let raw = self.fetcher.fetch(endpoint, &[]).await?;
        let matches = normalize::normalize_matches(&raw, category.status(), self.shape)?;
        debug!("{} {} matches", matches.len(), category.label());
        Ok(matches)
    }

    /// Fetch the live detail for one match.
    ///
    /// Only meaningful for matches in `Live` status: callers must not invoke
    /// it for upcoming or completed matches. The vendor's commentary endpoint
    /// returns nothing useful for them.
    pub async fn fetch_detail(&self, match_id: &str) -> Result<MatchDetail, DetailFetchError> {
        let endpoint = self.endpoints.detail(match_id);
        debug!("loading match detail for {match_id}");
        let raw = self
            .fetcher
            .fetch(&endpoint, &[])
            .await
            .map_err(|e| DetailFetchError::Transport(match_id.to_owned(), e))?;
        normalize::normalize_match_detail(&raw, match_id, self.shape)
            .map_err(|e| DetailFetchError::Normalization(match_id.to_owned(), e))
    }

    /// [`fetch_detail`](Self::fetch_detail) keyed by a match snapshot; checks
    /// the live-only precondition in debug builds.
    pub async fn fetch_detail_for(&self, m: &Match) -> Result<MatchDetail, DetailFetchError> {
        debug_assert!(m.is_live(), "detail requested for non-live match {}", m.id);
        self.fetch_detail(&m.id).await
    }
}
