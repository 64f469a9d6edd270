use cricket_api::client::ApiConfig;
use cricket_api::normalize::SourceShape;
use cricket_api::scheduler::DEFAULT_INTERVAL;
use log::{LevelFilter, warn};
use std::time::Duration;

pub const ENV_API_KEY: &str = "CRICTUI_API_KEY";
pub const ENV_SOURCE: &str = "CRICTUI_SOURCE";
pub const ENV_API_BASE: &str = "CRICTUI_API_BASE";
pub const ENV_REFRESH_SECS: &str = "CRICTUI_REFRESH_SECS";
pub const ENV_LOG: &str = "CRICTUI_LOG";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api: ApiConfig,
    pub refresh_interval: Duration,
}

impl AppSettings {
    /// Read the `CRICTUI_*` environment once at startup.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let shape = match get(ENV_SOURCE) {
            Some(raw) => raw.parse::<SourceShape>().unwrap_or_else(|err| {
                warn!("{ENV_SOURCE}: {err}, using {}", SourceShape::default().name());
                SourceShape::default()
            }),
            None => SourceShape::default(),
        };

        let key = get(ENV_API_KEY).unwrap_or_else(|| {
            warn!("{ENV_API_KEY} is not set, requests will likely be rejected");
            String::new()
        });
        let mut api = match shape {
            SourceShape::Cricbuzz => ApiConfig::cricbuzz(key),
            SourceShape::Flat => ApiConfig::flat(key),
        };
        if let Some(base) = get(ENV_API_BASE) {
            api = api.with_base_url(base);
        }

        let refresh_interval = match get(ENV_REFRESH_SECS).map(|raw| raw.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
            Some(_) => {
                warn!("{ENV_REFRESH_SECS} must be a positive number of seconds");
                DEFAULT_INTERVAL
            }
            None => DEFAULT_INTERVAL,
        };

        let log_level = get(ENV_LOG).and_then(|raw| match raw.parse::<LevelFilter>() {
            Ok(level) => Some(level),
            Err(_) => {
                warn!("{ENV_LOG}: unknown level '{raw}'");
                None
            }
        });

        Self { full_screen: false, log_level, api, refresh_interval }
    }
}
