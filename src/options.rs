use std::{fmt, sync::Arc};

use crate::{AuthTokenProvider, Hooks, OfflineCheck};

pub const DEFAULT_BASE_URL: &str = "https://client.warpcast.com";
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_MUTATE_TIMEOUT_MS: u64 = 20_000;

/// Configures base URL, timeouts and timeout decay.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Prefix for every relative request path.
    pub base_url: String,
    /// Timeout for `GET` requests in milliseconds.
    pub read_timeout_ms: u64,
    /// Timeout for mutating requests in milliseconds.
    pub mutate_timeout_ms: u64,
    /// Per-call shrink increment for repeated reads; `None` disables decay.
    pub timeout_retry_decay_factor: Option<f64>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            mutate_timeout_ms: DEFAULT_MUTATE_TIMEOUT_MS,
            timeout_retry_decay_factor: None,
        }
    }
}

/// Partial configuration applied at runtime; `None` fields keep the current value.
///
/// The decay factor is fixed when the client is built and cannot be updated.
#[derive(Clone, Default)]
pub struct OptionsUpdate {
    pub base_url: Option<String>,
    pub read_timeout_ms: Option<u64>,
    pub mutate_timeout_ms: Option<u64>,
    /// Merged per hook: only hooks set here replace the current ones.
    pub hooks: Hooks,
    pub auth_token_provider: Option<Arc<dyn AuthTokenProvider>>,
    pub offline_check: Option<Arc<dyn OfflineCheck>>,
    pub http_client: Option<reqwest::Client>,
}

impl fmt::Debug for OptionsUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsUpdate")
            .field("base_url", &self.base_url)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .field("mutate_timeout_ms", &self.mutate_timeout_ms)
            .field("hooks", &self.hooks)
            .field("auth_token_provider", &self.auth_token_provider.is_some())
            .field("offline_check", &self.offline_check.is_some())
            .field("http_client", &self.http_client.is_some())
            .finish()
    }
}

impl ClientOptions {
    /// Returns a copy with the plain-data fields of `update` applied.
    pub fn merged(&self, update: &OptionsUpdate) -> Self {
        Self {
            base_url: update
                .base_url
                .clone()
                .unwrap_or_else(|| self.base_url.clone()),
            read_timeout_ms: update.read_timeout_ms.unwrap_or(self.read_timeout_ms),
            mutate_timeout_ms: update.mutate_timeout_ms.unwrap_or(self.mutate_timeout_ms),
            timeout_retry_decay_factor: self.timeout_retry_decay_factor,
        }
    }
}
