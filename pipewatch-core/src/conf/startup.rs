use crate::conf::error::ConfigError;
use crate::ingest::constants::LIVE_LOGS_PATH;
use crate::ingest::{NameMap, ReplaySource};
use tracing::debug;
use url::Url;

/// Where the simulation page is served from by default.
pub const DEFAULT_PAGE_URL: &str = "http://127.0.0.1:8080/";

/// Values given directly on the command line. Single-valued keys replace the
/// page's, repeated keys are appended after the page's.
#[derive(Debug, Clone, Default)]
pub struct StartupOverrides {
    pub replay: Option<String>,
    pub ws: Option<String>,
    pub client_ids: Vec<String>,
    pub player_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceSelection {
    Live { endpoint: Url },
    Replay { source: ReplaySource },
}

/// Everything read once at startup.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub source: SourceSelection,
    pub names: NameMap,
}

impl StartupOptions {
    /// Read `replay`, `ws`, `client-ids` and `player-names` from the page's
    /// query string, then apply `overrides`.
    pub fn resolve(page: &Url, overrides: &StartupOverrides) -> Result<Self, ConfigError> {
        let mut replay = None;
        let mut ws = None;
        let mut ids = Vec::new();
        let mut names = Vec::new();

        for (key, value) in page.query_pairs() {
            match key.as_ref() {
                "replay" => replay = Some(value.into_owned()),
                "ws" => ws = Some(value.into_owned()),
                "client-ids" => ids.push(value.into_owned()),
                "player-names" => names.push(value.into_owned()),
                other => debug!(key = other, "ignoring page parameter"),
            }
        }

        if let Some(value) = &overrides.replay {
            replay = Some(value.clone());
        }
        if let Some(value) = &overrides.ws {
            ws = Some(value.clone());
        }
        ids.extend(overrides.client_ids.iter().cloned());
        names.extend(overrides.player_names.iter().cloned());

        let source = match replay {
            Some(value) => SourceSelection::Replay {
                source: replay_source(page, &value)?,
            },
            None => SourceSelection::Live {
                endpoint: live_endpoint(page, ws.as_deref())?,
            },
        };

        Ok(Self {
            source,
            names: NameMap::from_pairs(ids, names),
        })
    }
}

/// Resolve the live log endpoint for `page`.
///
/// An explicit override is used as given. Otherwise a secure page gets a secure
/// socket, and the endpoint sits at `/logs` on the page's own host and port.
pub fn live_endpoint(page: &Url, ws_override: Option<&str>) -> Result<Url, ConfigError> {
    if let Some(value) = ws_override {
        let url = Url::parse(value).map_err(|e| ConfigError::invalid_url(value, e))?;
        return match url.scheme() {
            "ws" | "wss" => Ok(url),
            _ => Err(ConfigError::InvalidLiveEndpoint {
                value: value.to_string(),
            }),
        };
    }

    // Url::scheme() is the bare name without the trailing ':'.
    let scheme = if page.scheme() == "https" { "wss" } else { "ws" };
    let host = page.host_str().ok_or_else(|| ConfigError::MissingHost {
        page: page.to_string(),
    })?;
    let authority = match page.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let raw = format!("{scheme}://{authority}{LIVE_LOGS_PATH}");
    Url::parse(&raw).map_err(|e| ConfigError::invalid_url(raw.clone(), e))
}

/// Replay URLs resolve against the page, so relative paths work as they would
/// in a browser.
pub fn replay_source(page: &Url, value: &str) -> Result<ReplaySource, ConfigError> {
    let url = page
        .join(value)
        .map_err(|e| ConfigError::invalid_url(value, e))?;
    ReplaySource::from_url(url).map_err(|url| ConfigError::UnsupportedReplaySource {
        value: url.to_string(),
    })
}
