use std::fmt;

use serde::de::DeserializeOwned;

use crate::{
    AuthTokenProvider, ClientOptions, EndpointDescriptor, FeaturedMintParams,
    FeaturedMintResponse, FeaturedMintTransactionParams, FeaturedMintTransactionResponse,
    FetchOptions, FetchResponse, Hooks, OfflineCheck, OptionsUpdate, QueryParams,
    RequestExecutor, RequestMethod, RequestOptions, Result,
};

#[cfg(not(target_arch = "wasm32"))]
use crate::StaticToken;

/// `GET /api/mint-info`
pub const GET_FEATURED_MINT: EndpointDescriptor = EndpointDescriptor {
    name: "getFeaturedMint",
    method: RequestMethod::Get,
    path: "/api/mint-info",
};

/// `GET /api/transaction-calldata`
pub const GET_FEATURED_MINT_TRANSACTION: EndpointDescriptor = EndpointDescriptor {
    name: "getFeaturedMintTransaction",
    method: RequestMethod::Get,
    path: "/api/transaction-calldata",
};

/// Typed client for the featured-mint API.
#[derive(Clone, Default)]
pub struct MintApiClient {
    executor: RequestExecutor,
}

impl fmt::Debug for MintApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintApiClient")
            .field("executor", &self.executor)
            .finish()
    }
}

impl MintApiClient {
    /// Creates a client for `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_executor(RequestExecutor::new(ClientOptions {
            base_url: base_url.into(),
            ..ClientOptions::default()
        }))
    }

    /// Wraps an existing executor; clones share its configuration and decay state.
    pub fn from_executor(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `MINT_API_BASE_URL`: API origin (e.g. `https://frame.example.com`)
    /// - `MINT_API_TOKEN`: optional bearer token for authorized calls
    ///
    /// Returns an error if the base URL is missing or empty.
    ///
    /// **Not available on `wasm32` targets**; environment variables do not
    /// exist in browser runtimes.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> std::result::Result<Self, String> {
        let base_url = std::env::var("MINT_API_BASE_URL")
            .map_err(|_| "missing MINT_API_BASE_URL environment variable".to_owned())?;
        if base_url.trim().is_empty() {
            return Err("MINT_API_BASE_URL is set but empty".to_owned());
        }

        let client = Self::new(base_url.trim());
        match std::env::var("MINT_API_TOKEN") {
            Ok(token) if !token.trim().is_empty() => {
                Ok(client.with_auth_token_provider(StaticToken::new(token.trim())))
            }
            _ => Ok(client),
        }
    }

    /// Applies base URL, timeouts and decay settings.
    pub fn with_options(self, opts: ClientOptions) -> Self {
        Self::from_executor(self.executor.with_options(opts))
    }

    pub fn with_hooks(self, hooks: Hooks) -> Self {
        Self::from_executor(self.executor.with_hooks(hooks))
    }

    pub fn with_auth_token_provider(self, provider: impl AuthTokenProvider + 'static) -> Self {
        Self::from_executor(self.executor.with_auth_token_provider(provider))
    }

    pub fn with_offline_check(self, check: impl OfflineCheck + 'static) -> Self {
        Self::from_executor(self.executor.with_offline_check(check))
    }

    /// Replaces the underlying `reqwest` client.
    pub fn with_http_client(self, http: reqwest::Client) -> Self {
        Self::from_executor(self.executor.with_http_client(http))
    }

    /// Merges `update` into the live configuration; later calls see it.
    pub fn update_options(&self, update: OptionsUpdate) {
        self.executor.update_options(update);
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Fetches the featured mint, optionally filtered by collection.
    pub async fn get_featured_mint(
        &self,
        params: Option<FeaturedMintParams>,
        request: RequestOptions,
    ) -> Result<FetchResponse<FeaturedMintResponse>> {
        self.call(GET_FEATURED_MINT, params.map(Into::into), request)
            .await
    }

    /// Fetches the mint transaction for `params.address`.
    pub async fn get_featured_mint_transaction(
        &self,
        params: FeaturedMintTransactionParams,
        request: RequestOptions,
    ) -> Result<FetchResponse<FeaturedMintTransactionResponse>> {
        self.call(GET_FEATURED_MINT_TRANSACTION, Some(params.into()), request)
            .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: EndpointDescriptor,
        params: Option<QueryParams>,
        request: RequestOptions,
    ) -> Result<FetchResponse<T>> {
        let mut options = FetchOptions::for_endpoint(endpoint).with_request_options(request);
        options.params = params;
        self.executor.execute(endpoint.path, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::{MintApiClient, GET_FEATURED_MINT, GET_FEATURED_MINT_TRANSACTION};
    use crate::StaticToken;

    #[test]
    fn endpoints_are_relative_reads() {
        for endpoint in [GET_FEATURED_MINT, GET_FEATURED_MINT_TRANSACTION] {
            assert!(endpoint.path.starts_with('/'));
            assert!(endpoint.method.is_idempotent());
        }
    }

    #[test]
    fn new_sets_base_url() {
        let client = MintApiClient::new("https://frame.example.com");
        assert_eq!(
            client.executor().config().options.base_url,
            "https://frame.example.com"
        );
    }

    #[test]
    fn debug_redacts_auth_provider() {
        let client = MintApiClient::new("https://frame.example.com")
            .with_auth_token_provider(StaticToken::new("secret-token"));
        let debug = format!("{client:?}");
        assert!(debug.contains("auth_token_provider: true"));
        assert!(!debug.contains("secret-token"));
    }
}
