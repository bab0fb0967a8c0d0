use crate::{ApiErrorResponse, BoxError, RequestMethod, ResponseBody, ResponseSnapshot};

/// Messages browsers and fetch polyfills use for connection-level failures.
const NETWORK_ERROR_MESSAGES: [&str; 5] = [
    "Failed to fetch",                                 // Chrome
    "NetworkError when attempting to fetch resource.", // Firefox
    "The Internet connection appears to be offline.",  // Safari 16
    "Load failed",                                     // Safari 17+
    "Network request failed",                          // cross-fetch
];

/// Safari 17+ uses this generic message for several failures; only the
/// stackless form is a network error.
const SAFARI_GENERIC_MESSAGE: &str = "Load failed";

/// Whether `message` names a network-level fetch failure.
pub fn is_network_error_message(message: &str, has_stack: bool) -> bool {
    let message = message.trim().trim_start_matches("TypeError: ");
    if message == SAFARI_GENERIC_MESSAGE {
        return !has_stack;
    }
    NETWORK_ERROR_MESSAGES.contains(&message)
}

/// Underlying reason a call failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchCause {
    #[error("Offline")]
    Offline,
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// The deadline fired before the call settled.
    #[error("The operation was aborted due to timeout")]
    Timeout,
    /// Response body could not be parsed or decoded.
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),
    /// The request could not be built (path, headers).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("authorization failed: {0}")]
    Authorization(#[source] BoxError),
    /// Status >= 400 without a structured error body.
    #[error("unexpected error response with status {status}")]
    MalformedErrorResponse { status: u16 },
    /// Status >= 400 with a structured error body.
    #[error("api responded with status {status}")]
    Api { status: u16 },
}

impl FetchCause {
    /// Whether this cause is a recognized connection-level failure.
    pub fn is_network_failure(&self) -> bool {
        match self {
            Self::Transport(err) => is_network_transport_error(err),
            _ => false,
        }
    }
}

fn is_network_transport_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return false;
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() || err.is_request() {
        return true;
    }

    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        if is_network_error_message(&current.to_string(), false) {
            return true;
        }
        source = current.source();
    }
    false
}

/// Distinguishes structured API failures from everything else.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchErrorKind {
    /// Status >= 400 with a structured `{errors: [...]}` body.
    Handled {
        status: u16,
        response: ApiErrorResponse,
    },
    /// Offline, network failure, timeout, malformed response, or any other failure.
    Unhandled,
}

/// Everything needed to reconstruct a failing call.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchErrorContext {
    pub endpoint_name: &'static str,
    pub method: RequestMethod,
    pub relative_url: String,
    pub absolute_url: String,
    /// Serialized request body.
    pub body: Option<String>,
    /// Explicit per-call timeout, if one was given.
    pub timeout_ms: Option<u64>,
    /// Timeout the call actually ran with.
    pub resolved_timeout_ms: u64,
    pub response: Option<ResponseSnapshot>,
    pub response_data: Option<ResponseBody>,
    pub has_timed_out: bool,
    pub is_network_error: bool,
    pub is_offline: bool,
}

impl FetchErrorContext {
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|response| response.status)
    }
}

/// Error returned by every request.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
    kind: FetchErrorKind,
    context: Box<FetchErrorContext>,
    #[source]
    cause: FetchCause,
}

impl FetchError {
    /// Builds an unhandled error; the network flag is derived from `cause`.
    pub fn unhandled(mut context: FetchErrorContext, cause: FetchCause) -> Self {
        context.is_network_error = cause.is_network_failure();
        context.is_offline = context.is_offline || matches!(cause, FetchCause::Offline);
        Self {
            message: cause.to_string(),
            kind: FetchErrorKind::Unhandled,
            context: Box::new(context),
            cause,
        }
    }

    /// Builds a handled error for a structured API error body.
    pub fn handled(
        mut context: FetchErrorContext,
        status: u16,
        response: ApiErrorResponse,
    ) -> Self {
        context.is_network_error = false;
        let message = format!(
            "{} {status} - {}",
            context.endpoint_name,
            response.joined_messages()
        );
        Self {
            message,
            kind: FetchErrorKind::Handled { status, response },
            context: Box::new(context),
            cause: FetchCause::Api { status },
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &FetchErrorKind {
        &self.kind
    }

    pub fn context(&self) -> &FetchErrorContext {
        &self.context
    }

    pub fn cause(&self) -> &FetchCause {
        &self.cause
    }

    pub fn is_handled(&self) -> bool {
        matches!(self.kind, FetchErrorKind::Handled { .. })
    }

    /// Structured API errors, for handled failures only.
    pub fn api_errors(&self) -> Option<&ApiErrorResponse> {
        match &self.kind {
            FetchErrorKind::Handled { response, .. } => Some(response),
            FetchErrorKind::Unhandled => None,
        }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            FetchErrorKind::Handled { status, .. } => Some(*status),
            FetchErrorKind::Unhandled => self.context.status(),
        }
    }

    pub fn response_data(&self) -> Option<&ResponseBody> {
        self.context.response_data.as_ref()
    }

    pub fn has_timed_out(&self) -> bool {
        self.context.has_timed_out
    }

    pub fn is_network_error(&self) -> bool {
        self.context.is_network_error
    }

    pub fn is_offline(&self) -> bool {
        self.context.is_offline
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{is_network_error_message, FetchCause, FetchError, FetchErrorContext};
    use crate::{ApiError, ApiErrorResponse, RequestMethod, ResponseBody};

    fn context() -> FetchErrorContext {
        FetchErrorContext {
            endpoint_name: "getFeaturedMint",
            method: RequestMethod::Get,
            relative_url: "/api/mint-info".to_owned(),
            absolute_url: "https://x/api/mint-info".to_owned(),
            body: None,
            timeout_ms: None,
            resolved_timeout_ms: 20_000,
            response: None,
            response_data: None,
            has_timed_out: false,
            is_network_error: false,
            is_offline: false,
        }
    }

    #[test]
    fn recognizes_browser_network_messages() {
        assert!(is_network_error_message("Failed to fetch", true));
        assert!(is_network_error_message("TypeError: Failed to fetch", true));
        assert!(is_network_error_message(
            "NetworkError when attempting to fetch resource.",
            true
        ));
        assert!(is_network_error_message("Network request failed", false));
        assert!(!is_network_error_message("signal is aborted without reason", false));
    }

    #[test]
    fn safari_generic_message_requires_missing_stack() {
        assert!(is_network_error_message("Load failed", false));
        assert!(!is_network_error_message("Load failed", true));
    }

    #[test]
    fn handled_error_joins_messages_and_carries_status() {
        let response = ApiErrorResponse {
            errors: vec![
                ApiError {
                    message: "not found".to_owned(),
                    reason: None,
                },
                ApiError {
                    message: "gone".to_owned(),
                    reason: Some("expired".to_owned()),
                },
            ],
        };
        let mut ctx = context();
        ctx.response_data = Some(ResponseBody::Json(json!({"errors": []})));
        let err = FetchError::handled(ctx, 404, response);

        assert!(err.is_handled());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "getFeaturedMint 404 - not found,gone");
        assert_eq!(err.to_string(), err.message());
        assert_eq!(
            err.api_errors().map(|api| api.errors[0].message.as_str()),
            Some("not found")
        );
    }

    #[test]
    fn offline_error_is_flagged() {
        let err = FetchError::unhandled(context(), FetchCause::Offline);
        assert!(!err.is_handled());
        assert!(err.is_offline());
        assert!(!err.is_network_error());
        assert_eq!(err.message(), "Offline");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn source_chain_exposes_cause() {
        let err = FetchError::unhandled(context(), FetchCause::Timeout);
        let source = std::error::Error::source(&err).expect("cause must be exposed");
        assert_eq!(source.to_string(), "The operation was aborted due to timeout");
    }
}
