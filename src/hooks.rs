//! Synchronous lifecycle callbacks used for telemetry.
//!
//! Hooks run inline on the request path and must not panic.

use std::{fmt, sync::Arc};

use crate::{FetchError, RequestMethod, ResponseBody};

/// Description of an outgoing call shared with every hook.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestInfo {
    pub absolute_url: String,
    pub body: Option<String>,
    pub endpoint_name: &'static str,
    pub method: RequestMethod,
    pub relative_url: String,
}

#[derive(Debug)]
pub struct FetchStartEvent<'a> {
    pub request_info: &'a RequestInfo,
}

#[derive(Debug)]
pub struct SuccessEvent<'a> {
    pub request_info: &'a RequestInfo,
    pub response_data: &'a ResponseBody,
    pub response_status: u16,
}

#[derive(Debug)]
pub struct ErrorEvent<'a> {
    pub request_info: &'a RequestInfo,
    pub error: &'a FetchError,
    pub response_status: Option<u16>,
}

#[derive(Debug)]
pub struct TimeoutEvent<'a> {
    pub request_info: &'a RequestInfo,
    pub time_since_request_start_ms: u64,
}

pub type OnFetchStart = Arc<dyn Fn(&FetchStartEvent<'_>) + Send + Sync>;
pub type OnSuccess = Arc<dyn Fn(&SuccessEvent<'_>) + Send + Sync>;
pub type OnError = Arc<dyn Fn(&ErrorEvent<'_>) + Send + Sync>;
pub type OnTimeout = Arc<dyn Fn(&TimeoutEvent<'_>) + Send + Sync>;

/// Optional lifecycle callbacks.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_fetch_start: Option<OnFetchStart>,
    pub on_success: Option<OnSuccess>,
    pub on_error: Option<OnError>,
    pub on_timeout: Option<OnTimeout>,
}

impl Hooks {
    pub fn on_fetch_start(
        mut self,
        hook: impl Fn(&FetchStartEvent<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_fetch_start = Some(Arc::new(hook));
        self
    }

    pub fn on_success(mut self, hook: impl Fn(&SuccessEvent<'_>) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&ErrorEvent<'_>) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn on_timeout(mut self, hook: impl Fn(&TimeoutEvent<'_>) + Send + Sync + 'static) -> Self {
        self.on_timeout = Some(Arc::new(hook));
        self
    }

    /// Hooks set in `update` replace the current ones; the rest are kept.
    pub fn merged(&self, update: &Hooks) -> Self {
        Self {
            on_fetch_start: update
                .on_fetch_start
                .clone()
                .or_else(|| self.on_fetch_start.clone()),
            on_success: update.on_success.clone().or_else(|| self.on_success.clone()),
            on_error: update.on_error.clone().or_else(|| self.on_error.clone()),
            on_timeout: update.on_timeout.clone().or_else(|| self.on_timeout.clone()),
        }
    }

    pub(crate) fn fetch_start(&self, request_info: &RequestInfo) {
        if let Some(hook) = &self.on_fetch_start {
            hook(&FetchStartEvent { request_info });
        }
    }

    pub(crate) fn success(&self, request_info: &RequestInfo, data: &ResponseBody, status: u16) {
        if let Some(hook) = &self.on_success {
            hook(&SuccessEvent {
                request_info,
                response_data: data,
                response_status: status,
            });
        }
    }

    pub(crate) fn error(&self, request_info: &RequestInfo, error: &FetchError) {
        if let Some(hook) = &self.on_error {
            hook(&ErrorEvent {
                request_info,
                error,
                response_status: error.status(),
            });
        }
    }

    pub(crate) fn timeout(&self, request_info: &RequestInfo, elapsed_ms: u64) {
        if let Some(hook) = &self.on_timeout {
            hook(&TimeoutEvent {
                request_info,
                time_since_request_start_ms: elapsed_ms,
            });
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_fetch_start", &self.on_fetch_start.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_timeout", &self.on_timeout.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::{Hooks, RequestInfo};
    use crate::{RequestMethod, ResponseBody};

    fn info() -> RequestInfo {
        RequestInfo {
            absolute_url: "https://x/api/mint-info".to_owned(),
            body: None,
            endpoint_name: "getFeaturedMint",
            method: RequestMethod::Get,
            relative_url: "/api/mint-info".to_owned(),
        }
    }

    #[test]
    fn merge_keeps_unset_hooks() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let first_hits = first.clone();
        let second_hits = second.clone();

        let current = Hooks::default()
            .on_fetch_start(move |_| {
                first_hits.fetch_add(1, Ordering::SeqCst);
            })
            .on_success(|_| {});
        let update = Hooks::default().on_fetch_start(move |_| {
            second_hits.fetch_add(1, Ordering::SeqCst);
        });
        let merged = current.merged(&update);

        merged.fetch_start(&info());
        merged.success(&info(), &ResponseBody::Text(String::new()), 200);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert!(merged.on_success.is_some());
        assert!(merged.on_error.is_none());
    }
}
