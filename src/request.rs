use std::fmt;

use crate::QueryParams;

/// HTTP method supported by the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Only `GET` is treated as idempotent; every other method carries an
    /// idempotency key.
    pub fn is_idempotent(self) -> bool {
        matches!(self, Self::Get)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a named API operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: &'static str,
    pub method: RequestMethod,
    pub path: &'static str,
}

/// Per-call options accepted by the executor.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchOptions {
    /// Name reported in errors, hooks and logs.
    pub endpoint_name: &'static str,
    pub method: RequestMethod,
    pub params: Option<QueryParams>,
    /// JSON body; serialized once per call.
    pub body: Option<serde_json::Value>,
    /// Extra headers; they override defaults of the same name.
    pub headers: Vec<(String, String)>,
    /// Explicit timeout, bypassing per-method defaults and decay.
    pub timeout_ms: Option<u64>,
    /// Overrides the configured base URL for this call.
    pub base_url: Option<String>,
    /// Resolve a bearer token from the configured provider.
    pub requires_auth: bool,
}

impl FetchOptions {
    pub fn new(endpoint_name: &'static str) -> Self {
        Self {
            endpoint_name,
            method: RequestMethod::Get,
            params: None,
            body: None,
            headers: Vec::new(),
            timeout_ms: None,
            base_url: None,
            requires_auth: false,
        }
    }

    /// Options pre-filled from an endpoint's name and method.
    pub fn for_endpoint(endpoint: EndpointDescriptor) -> Self {
        Self::new(endpoint.name).method(endpoint.method)
    }

    pub fn method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    pub fn params(mut self, params: impl Into<QueryParams>) -> Self {
        self.params = Some(params.into());
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn authorized(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Applies facade-level per-call overrides.
    pub fn with_request_options(mut self, request: RequestOptions) -> Self {
        self.headers.extend(request.headers);
        if request.timeout_ms.is_some() {
            self.timeout_ms = request.timeout_ms;
        }
        self
    }
}

/// Caller overrides forwarded unchanged by facade methods.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub timeout_ms: Option<u64>,
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// Successful response: decoded data and HTTP status.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchResponse<T> {
    pub data: T,
    pub status: u16,
}
