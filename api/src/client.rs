use crate::normalize::SourceShape;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;

pub type FetchResult<T> = Result<T, TransportError>;

pub const CRICBUZZ_BASE: &str = "https://cricbuzz-cricket.p.rapidapi.com";
const CRICBUZZ_HOST: &str = "cricbuzz-cricket.p.rapidapi.com";
pub const FLAT_BASE: &str = "https://api.cricapi.com/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can GET a vendor endpoint and hand back parsed JSON.
///
/// `endpoint` is a path relative to the configured base URL. Implementations
/// do not retry; retry policy belongs to the caller.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = FetchResult<Value>> + Send;
}

#[derive(Debug)]
pub enum TransportError {
    /// DNS failure, refused/reset connection, timeout.
    Network(reqwest::Error, String),
    /// Non-2xx status code.
    Status(u16, String),
    /// 2xx response whose body is not JSON.
    Decode(reqwest::Error, String),
    InvalidUrl(String),
}

impl TransportError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status(code, _) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            TransportError::Status(code, url) => write!(f, "HTTP {code} for {url}"),
            TransportError::Decode(e, url) => write!(f, "Invalid JSON from {url}: {e}"),
            TransportError::InvalidUrl(msg) => write!(f, "Invalid URL: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Network(e, _) | TransportError::Decode(e, _) => Some(e),
            _ => None,
        }
    }
}

/// How the vendor expects the API credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    /// Sent as request headers (RapidAPI style).
    Headers(Vec<(String, String)>),
    /// Appended to every query string as `param=value`.
    QueryKey { param: String, value: String },
}

/// Connection settings for one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth: Auth,
    pub shape: SourceShape,
}

impl ApiConfig {
    /// Cricbuzz through RapidAPI: key and host headers, nested response tree.
    pub fn cricbuzz(api_key: impl Into<String>) -> Self {
        Self {
            base_url: CRICBUZZ_BASE.to_owned(),
            auth: Auth::Headers(vec![
                ("X-RapidAPI-Key".to_owned(), api_key.into()),
                ("X-RapidAPI-Host".to_owned(), CRICBUZZ_HOST.to_owned()),
            ]),
            shape: SourceShape::Cricbuzz,
        }
    }

    /// Flat `matches[]` vendor with an `apikey` query parameter.
    pub fn flat(api_key: impl Into<String>) -> Self {
        Self {
            base_url: FLAT_BASE.to_owned(),
            auth: Auth::QueryKey { param: "apikey".to_owned(), value: api_key.into() },
            shape: SourceShape::Flat,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// reqwest-backed [`Fetcher`] for a configured vendor.
#[derive(Debug, Clone)]
pub struct CricketApi {
    client: Client,
    config: ApiConfig,
    headers: HeaderMap,
    timeout: Duration,
}

impl CricketApi {
    pub fn new(config: ApiConfig) -> Self {
        let headers = match &config.auth {
            Auth::Headers(pairs) => build_headers(pairs),
            _ => HeaderMap::new(),
        };
        Self {
            client: Client::builder()
                .user_agent(concat!("crictui/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            config,
            headers,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn shape(&self) -> SourceShape {
        self.config.shape
    }

    /// Base + endpoint + encoded query params (credential included when the
    /// vendor takes it in the query string).
    pub fn build_url(&self, endpoint: &str, params: &[(String, String)]) -> FetchResult<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        let raw = format!("{base}/{path}");

        let mut query: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        if let Auth::QueryKey { param, value } = &self.config.auth {
            query.push((param.as_str(), value.as_str()));
        }

        let url = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        url.map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))
    }

    async fn get(&self, endpoint: &str, params: &[(String, String)]) -> FetchResult<Value> {
        let url = self.build_url(endpoint, params)?;
        // Never log the query string, it may carry the key.
        let display_url = format!("{}{}", url.origin().ascii_serialization(), url.path());

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.without_url(), display_url.clone()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16(), display_url));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.without_url(), display_url))
    }
}

impl Fetcher for CricketApi {
    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> FetchResult<Value> {
        self.get(endpoint, params).await
    }
}

impl<T: Fetcher> Fetcher for std::sync::Arc<T> {
    fn fetch(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = FetchResult<Value>> + Send {
        (**self).fetch(endpoint, params)
    }
}

fn build_headers(pairs: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(mut value)) => {
                value.set_sensitive(true);
                headers.insert(name, value);
            }
            _ => log::warn!("skipping invalid auth header '{name}'"),
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn no_params() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn vendor_presets_pick_their_shape() {
        let api = CricketApi::new(ApiConfig::flat("k"));
        assert_eq!(api.shape(), SourceShape::Flat);
        assert_eq!(api.config().base_url, FLAT_BASE);
        assert_eq!(CricketApi::new(ApiConfig::cricbuzz("k")).shape(), SourceShape::Cricbuzz);
    }

    #[test]
    fn url_joins_base_and_endpoint_once() {
        let api = CricketApi::new(ApiConfig::cricbuzz("k").with_base_url("https://host/api/"));
        let url = api.build_url("/matches/v1/live", &no_params()).unwrap();
        assert_eq!(url.as_str(), "https://host/api/matches/v1/live");
    }

    #[test]
    fn url_encodes_params_and_query_key() {
        let api = CricketApi::new(ApiConfig::flat("s3cr&t").with_base_url("https://host"));
        let params = vec![("offset".to_owned(), "0".to_owned()), ("q".to_owned(), "a b".to_owned())];
        let url = api.build_url("matches/live", &params).unwrap();
        assert_eq!(url.as_str(), "https://host/matches/live?offset=0&q=a+b&apikey=s3cr%26t");
    }

    #[test]
    fn bad_base_url_is_a_transport_error() {
        let api = CricketApi::new(ApiConfig::flat("k").with_base_url("not a url"));
        let err = api.build_url("matches/live", &no_params()).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn fetch_sends_rapidapi_headers_and_parses_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/matches/v1/live")
            .match_header("x-rapidapi-key", "test-key")
            .match_header("x-rapidapi-host", CRICBUZZ_HOST)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"typeMatches": []}"#)
            .create_async()
            .await;

        let api = CricketApi::new(ApiConfig::cricbuzz("test-key").with_base_url(server.url()));
        let body = api.fetch("/matches/v1/live", &no_params()).await.unwrap();

        assert_eq!(body, json!({"typeMatches": []}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_sends_query_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/matches/upcoming")
            .match_query(Matcher::UrlEncoded("apikey".into(), "abc".into()))
            .with_status(200)
            .with_body(r#"{"matches": []}"#)
            .create_async()
            .await;

        let api = CricketApi::new(ApiConfig::flat("abc").with_base_url(server.url()));
        api.fetch("/matches/upcoming", &no_params()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_code() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/matches/v1/recent")
            .with_status(429)
            .with_body(r#"{"message": "Too many requests"}"#)
            .create_async()
            .await;

        let api = CricketApi::new(ApiConfig::cricbuzz("k").with_base_url(server.url()));
        let err = api.fetch("/matches/v1/recent", &no_params()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(429));
        assert!(!err.to_string().contains("apikey"));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/matches/live")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let api = CricketApi::new(ApiConfig::flat("k").with_base_url(server.url()));
        let err = api.fetch("/matches/live", &no_params()).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(..)), "{err}");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let api = CricketApi::new(ApiConfig::flat("k").with_base_url("http://127.0.0.1:9"))
            .with_timeout(Duration::from_secs(2));
        let err = api.fetch("/matches/live", &no_params()).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(..)), "{err}");
        assert!(!err.to_string().contains("apikey=k"));
    }
}
