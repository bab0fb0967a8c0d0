use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

#[cfg(target_arch = "wasm32")]
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::{
    clock::now_ms,
    deadline::{self, Deadline},
    decay::{cache_key, DecayTracker},
    wire::DEFAULT_CONTENT_TYPE,
    ApiErrorResponse, AuthTokenProvider, ClientOptions, FetchCause, FetchError,
    FetchErrorContext, FetchOptions, FetchResponse, Hooks, OfflineCheck, OptionsUpdate,
    RequestInfo, RequestMethod, ResponseBody, ResponseSnapshot, Result,
};

/// Header carrying the per-call de-duplication token on mutating requests.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Configuration snapshot; each call keeps the one current when it started.
#[derive(Clone)]
pub struct ClientConfig {
    pub options: ClientOptions,
    pub hooks: Hooks,
    pub auth_token_provider: Option<Arc<dyn AuthTokenProvider>>,
    pub offline_check: Option<Arc<dyn OfflineCheck>>,
    /// Underlying fetch primitive.
    pub http: reqwest::Client,
}

impl ClientConfig {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            hooks: Hooks::default(),
            auth_token_provider: None,
            offline_check: None,
            http: reqwest::Client::new(),
        }
    }

    /// Shallow merge: only fields set in `update` are replaced.
    pub fn merged(&self, update: &OptionsUpdate) -> Self {
        Self {
            options: self.options.merged(update),
            hooks: self.hooks.merged(&update.hooks),
            auth_token_provider: update
                .auth_token_provider
                .clone()
                .or_else(|| self.auth_token_provider.clone()),
            offline_check: update
                .offline_check
                .clone()
                .or_else(|| self.offline_check.clone()),
            http: update.http_client.clone().unwrap_or_else(|| self.http.clone()),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("options", &self.options)
            .field("hooks", &self.hooks)
            .field("auth_token_provider", &self.auth_token_provider.is_some())
            .field("offline_check", &self.offline_check.is_some())
            .finish()
    }
}

/// Executes every endpoint call: URL building, timeouts, auth, hooks and error classification.
///
/// Clones share configuration and decay state. The `with_*` builders give
/// the returned executor its own configuration; [`RequestExecutor::update_options`]
/// is seen by every clone.
#[derive(Clone)]
pub struct RequestExecutor {
    config: Arc<RwLock<Arc<ClientConfig>>>,
    decay: Option<Arc<DecayTracker>>,
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config())
            .field("decay", &self.decay)
            .finish()
    }
}

impl Default for RequestExecutor {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

impl RequestExecutor {
    pub fn new(options: ClientOptions) -> Self {
        let decay = DecayTracker::from_config(options.timeout_retry_decay_factor).map(Arc::new);
        Self {
            config: Arc::new(RwLock::new(Arc::new(ClientConfig::new(options)))),
            decay,
        }
    }

    /// Replaces options wholesale and rebuilds the decay tracker.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.decay = DecayTracker::from_config(options.timeout_retry_decay_factor).map(Arc::new);
        self.replace_config(|config| config.options = options)
    }

    pub fn with_hooks(self, hooks: Hooks) -> Self {
        self.replace_config(|config| config.hooks = hooks)
    }

    pub fn with_auth_token_provider(self, provider: impl AuthTokenProvider + 'static) -> Self {
        self.replace_config(|config| config.auth_token_provider = Some(Arc::new(provider)))
    }

    pub fn with_offline_check(self, check: impl OfflineCheck + 'static) -> Self {
        self.replace_config(|config| config.offline_check = Some(Arc::new(check)))
    }

    pub fn with_http_client(self, http: reqwest::Client) -> Self {
        self.replace_config(|config| config.http = http)
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<ClientConfig> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merges `update` into the configuration. Calls already in flight keep
    /// their snapshot.
    pub fn update_options(&self, update: OptionsUpdate) {
        let mut current = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(current.merged(&update));
    }

    pub fn decay_tracker(&self) -> Option<&DecayTracker> {
        self.decay.as_deref()
    }

    // Builders detach from clones; only `update_options` writes through.
    fn replace_config(mut self, apply: impl FnOnce(&mut ClientConfig)) -> Self {
        let mut next = ClientConfig::clone(&self.config());
        apply(&mut next);
        self.config = Arc::new(RwLock::new(Arc::new(next)));
        self
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        relative_url: &str,
        options: FetchOptions,
    ) -> Result<FetchResponse<T>> {
        self.execute(relative_url, options.method(RequestMethod::Get))
            .await
    }

    pub async fn authed_get<T: DeserializeOwned>(
        &self,
        relative_url: &str,
        options: FetchOptions,
    ) -> Result<FetchResponse<T>> {
        self.execute(relative_url, options.method(RequestMethod::Get).authorized())
            .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        relative_url: &str,
        options: FetchOptions,
    ) -> Result<FetchResponse<T>> {
        self.execute(relative_url, options.method(RequestMethod::Post).authorized())
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        relative_url: &str,
        options: FetchOptions,
    ) -> Result<FetchResponse<T>> {
        self.execute(relative_url, options.method(RequestMethod::Put).authorized())
            .await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        relative_url: &str,
        options: FetchOptions,
    ) -> Result<FetchResponse<T>> {
        self.execute(relative_url, options.method(RequestMethod::Patch).authorized())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        relative_url: &str,
        options: FetchOptions,
    ) -> Result<FetchResponse<T>> {
        self.execute(relative_url, options.method(RequestMethod::Delete).authorized())
            .await
    }

    /// Sends one request and decodes the response into `T`.
    ///
    /// `relative_url` must start with `/`. Every failure is returned as a
    /// [`FetchError`] after the `on_error` hook has seen it.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        relative_url: &str,
        options: FetchOptions,
    ) -> Result<FetchResponse<T>> {
        let config = self.config();
        let mut call = self.prepare(&config, relative_url, &options);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            endpoint = call.info.endpoint_name,
            method = %call.info.method,
            url = %call.info.absolute_url,
            timeout_ms = call.resolved_timeout_ms,
            "fetch start"
        );

        match self.run(&config, &mut call, &options).await {
            Ok(response) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    endpoint = call.info.endpoint_name,
                    status = response.status,
                    "fetch succeeded"
                );
                Ok(response)
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    endpoint = call.info.endpoint_name,
                    status = ?error.status(),
                    handled = error.is_handled(),
                    timed_out = error.has_timed_out(),
                    "fetch failed: {error}"
                );
                config.hooks.error(&call.info, &error);
                Err(error)
            }
        }
    }

    /// Derives URL, body and timeout. Records the call with the decay
    /// tracker before anything is awaited.
    fn prepare(
        &self,
        config: &ClientConfig,
        relative_url: &str,
        options: &FetchOptions,
    ) -> RequestContext {
        let query = options
            .params
            .as_ref()
            .map(|params| params.to_query_string())
            .unwrap_or_default();
        let base_url = options
            .base_url
            .as_deref()
            .unwrap_or(&config.options.base_url);
        let absolute_url = build_url(base_url, relative_url, &query);

        let decay_factor = match (&self.decay, options.method) {
            (Some(tracker), RequestMethod::Get) => {
                tracker.factor_for(&cache_key(&absolute_url, options.params.as_ref()))
            }
            _ => 1.0,
        };

        RequestContext {
            info: RequestInfo {
                absolute_url,
                body: options.body.as_ref().map(|body| body.to_string()),
                endpoint_name: options.endpoint_name,
                method: options.method,
                relative_url: relative_url.to_owned(),
            },
            timeout_ms: options.timeout_ms,
            resolved_timeout_ms: resolve_timeout(
                &config.options,
                options.method,
                options.timeout_ms,
                decay_factor,
            ),
            response: None,
            response_data: None,
            has_timed_out: false,
        }
    }

    async fn run<T: DeserializeOwned>(
        &self,
        config: &ClientConfig,
        call: &mut RequestContext,
        options: &FetchOptions,
    ) -> Result<FetchResponse<T>> {
        if !call.info.relative_url.starts_with('/') {
            return Err(call.fail(FetchCause::InvalidRequest(format!(
                "relative url must start with '/': {}",
                call.info.relative_url
            ))));
        }

        if let Some(check) = &config.offline_check {
            if check.is_offline().await {
                return Err(call.fail(FetchCause::Offline));
            }
        }

        let headers = match build_headers(config, options).await {
            Ok(headers) => headers,
            Err(cause) => return Err(call.fail(cause)),
        };

        config.hooks.fetch_start(&call.info);

        let mut request = config
            .http
            .request(call.info.method.to_reqwest(), &call.info.absolute_url)
            .headers(headers);
        if let Some(body) = &call.info.body {
            request = request.body(body.clone());
        }
        #[cfg(target_arch = "wasm32")]
        if call.resolved_timeout_ms > 0 {
            request = request.timeout(Duration::from_millis(call.resolved_timeout_ms));
        }

        let started_at = now_ms();
        let exchange = async move {
            let response = request.send().await?;
            let snapshot = ResponseSnapshot::from_response(&response);
            let text = response.text().await;
            Ok::<_, reqwest::Error>((snapshot, text))
        };

        let (snapshot, text) = match deadline::race(call.resolved_timeout_ms, exchange).await {
            Deadline::Settled(Ok(exchanged)) => exchanged,
            Deadline::Settled(Err(err)) => {
                return Err(transport_failure(config, call, err, started_at));
            }
            Deadline::Expired => {
                mark_timed_out(config, call, started_at);
                return Err(call.fail(FetchCause::Timeout));
            }
        };

        let status = snapshot.status;
        let content_type = snapshot.content_type().map(str::to_owned);
        call.response = Some(snapshot);

        let text = match text {
            Ok(text) => text,
            Err(err) => return Err(transport_failure(config, call, err, started_at)),
        };
        let body = ResponseBody::parse(content_type.as_deref(), text)
            .map_err(|err| call.fail(FetchCause::Decode(err)))?;
        call.response_data = Some(body.clone());

        if status >= 400 {
            return Err(match body.api_errors() {
                Some(api_errors) => call.fail_handled(status, api_errors),
                None => call.fail(FetchCause::MalformedErrorResponse { status }),
            });
        }

        let data = body
            .decode::<T>()
            .map_err(|err| call.fail(FetchCause::Decode(err)))?;

        config.hooks.success(&call.info, &body, status);
        Ok(FetchResponse { data, status })
    }
}

/// Per-call state, owned by the single in-flight call.
struct RequestContext {
    info: RequestInfo,
    timeout_ms: Option<u64>,
    resolved_timeout_ms: u64,
    response: Option<ResponseSnapshot>,
    response_data: Option<ResponseBody>,
    has_timed_out: bool,
}

impl RequestContext {
    fn error_context(&self) -> FetchErrorContext {
        FetchErrorContext {
            endpoint_name: self.info.endpoint_name,
            method: self.info.method,
            relative_url: self.info.relative_url.clone(),
            absolute_url: self.info.absolute_url.clone(),
            body: self.info.body.clone(),
            timeout_ms: self.timeout_ms,
            resolved_timeout_ms: self.resolved_timeout_ms,
            response: self.response.clone(),
            response_data: self.response_data.clone(),
            has_timed_out: self.has_timed_out,
            is_network_error: false,
            is_offline: false,
        }
    }

    fn fail(&self, cause: FetchCause) -> FetchError {
        FetchError::unhandled(self.error_context(), cause)
    }

    fn fail_handled(&self, status: u16, api_errors: ApiErrorResponse) -> FetchError {
        FetchError::handled(self.error_context(), status, api_errors)
    }
}

fn mark_timed_out(config: &ClientConfig, call: &mut RequestContext, started_at: u64) {
    call.has_timed_out = true;
    let elapsed_ms = now_ms().saturating_sub(started_at);

    #[cfg(feature = "tracing")]
    tracing::warn!(
        endpoint = call.info.endpoint_name,
        elapsed_ms,
        timeout_ms = call.resolved_timeout_ms,
        "fetch timed out"
    );

    config.hooks.timeout(&call.info, elapsed_ms);
}

fn transport_failure(
    config: &ClientConfig,
    call: &mut RequestContext,
    err: reqwest::Error,
    started_at: u64,
) -> FetchError {
    if err.is_timeout() {
        mark_timed_out(config, call, started_at);
    }
    call.fail(FetchCause::Transport(err))
}

async fn build_headers(
    config: &ClientConfig,
    options: &FetchOptions,
) -> std::result::Result<HeaderMap, FetchCause> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    for (name, value) in &options.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| FetchCause::InvalidRequest(format!("invalid header name '{name}'")))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            FetchCause::InvalidRequest(format!("invalid value for header '{name}'"))
        })?;
        headers.insert(header_name, header_value);
    }

    if options.requires_auth && !headers.contains_key(AUTHORIZATION) {
        if let Some(provider) = &config.auth_token_provider {
            let token = provider
                .auth_token()
                .await
                .map_err(FetchCause::Authorization)?;
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.secret))
                .map_err(|_| {
                    FetchCause::InvalidRequest("auth token is not a valid header value".to_owned())
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
    }

    if !options.method.is_idempotent() {
        let key = HeaderValue::from_str(&generate_idempotency_key()).map_err(|_| {
            FetchCause::InvalidRequest("idempotency key is not a valid header value".to_owned())
        })?;
        headers.insert(HeaderName::from_static(IDEMPOTENCY_KEY_HEADER), key);
    }

    Ok(headers)
}

fn build_url(base_url: &str, relative_url: &str, query: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    if query.is_empty() {
        format!("{base_url}{relative_url}")
    } else {
        format!("{base_url}{relative_url}?{query}")
    }
}

/// An explicit timeout wins; otherwise the per-method default scaled by the
/// decay factor.
fn resolve_timeout(
    options: &ClientOptions,
    method: RequestMethod,
    explicit_ms: Option<u64>,
    decay_factor: f64,
) -> u64 {
    if let Some(timeout_ms) = explicit_ms {
        return timeout_ms;
    }
    let base_ms = if method == RequestMethod::Get {
        options.read_timeout_ms
    } else {
        options.mutate_timeout_ms
    };
    let resolved = (base_ms as f64 * decay_factor).round() as u64;
    // A decayed deadline never collapses to 0, which would disable it.
    if base_ms > 0 {
        resolved.max(1)
    } else {
        resolved
    }
}

/// Random RFC 4122-shaped token; for server-side de-duplication only.
pub fn generate_idempotency_key() -> String {
    uuid::Uuid::new_v4().to_string()
}
