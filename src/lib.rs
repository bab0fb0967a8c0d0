//! `mint-frame-client` is an async typed HTTP client for the featured-mint API
//! used by the mint frame.
//!
//! [`MintApiClient`] exposes the named endpoints:
//! - [`MintApiClient::get_featured_mint`]
//! - [`MintApiClient::get_featured_mint_transaction`]
//!
//! Both run through a shared [`RequestExecutor`] that applies timeouts (with
//! decay for repeated reads), lifecycle hooks and the [`FetchError`] taxonomy.

mod client;
mod clock;
mod deadline;
mod decay;
mod error;
mod executor;
mod hooks;
mod options;
mod params;
mod providers;
mod request;
mod types;
mod wire;

pub use client::{MintApiClient, GET_FEATURED_MINT, GET_FEATURED_MINT_TRANSACTION};
pub use decay::{DecayTracker, DEFAULT_DECAY_FACTOR, RESET_INTERVAL_MS};
pub use error::{
    is_network_error_message, FetchCause, FetchError, FetchErrorContext, FetchErrorKind,
};
pub use executor::{
    generate_idempotency_key, ClientConfig, RequestExecutor, IDEMPOTENCY_KEY_HEADER,
};
pub use hooks::{
    ErrorEvent, FetchStartEvent, Hooks, OnError, OnFetchStart, OnSuccess, OnTimeout, RequestInfo,
    SuccessEvent, TimeoutEvent,
};
pub use options::{
    ClientOptions, OptionsUpdate, DEFAULT_BASE_URL, DEFAULT_MUTATE_TIMEOUT_MS,
    DEFAULT_READ_TIMEOUT_MS,
};
pub use params::{QueryParams, QueryValue, Scalar};
pub use providers::{
    AuthToken, AuthTokenProvider, BoxError, BoxFuture, MaybeSend, OfflineCheck, StaticToken,
};
pub use request::{EndpointDescriptor, FetchOptions, FetchResponse, RequestMethod, RequestOptions};
pub use types::{
    Chain, FeaturedMint, FeaturedMintParams, FeaturedMintResponse, FeaturedMintResult,
    FeaturedMintTransaction, FeaturedMintTransactionParams, FeaturedMintTransactionResponse,
    FeaturedMintTransactionResult, Pfp, UserMinimal,
};
pub use wire::{ApiError, ApiErrorResponse, ResponseBody, ResponseSnapshot, DEFAULT_CONTENT_TYPE};

pub type Result<T> = std::result::Result<T, FetchError>;
