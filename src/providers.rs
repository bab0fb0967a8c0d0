//! Async collaborators consulted by the executor: the authorization token
//! provider and the offline check.

use std::{fmt, future::Future, pin::Pin};

/// Boxed error returned by collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// Browser futures (e.g. `JsFuture`) are not `Send`.
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

/// Bearer credential returned by an [`AuthTokenProvider`].
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub secret: String,
    /// Expiry as Unix milliseconds.
    pub expires_at: u64,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Resolves the bearer token attached to authorized requests.
pub trait AuthTokenProvider: Send + Sync {
    fn auth_token(&self) -> BoxFuture<'_, Result<AuthToken, BoxError>>;
}

impl<F, Fut> AuthTokenProvider for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<AuthToken, BoxError>> + MaybeSend + 'static,
{
    fn auth_token(&self) -> BoxFuture<'_, Result<AuthToken, BoxError>> {
        Box::pin(self())
    }
}

/// Provider that always hands out the same token.
#[derive(Clone, Debug)]
pub struct StaticToken(AuthToken);

impl StaticToken {
    /// Wraps a non-expiring secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(AuthToken {
            secret: secret.into(),
            expires_at: u64::MAX,
        })
    }
}

impl AuthTokenProvider for StaticToken {
    fn auth_token(&self) -> BoxFuture<'_, Result<AuthToken, BoxError>> {
        let token = self.0.clone();
        Box::pin(async move { Ok(token) })
    }
}

/// Reports whether the host is offline; checked before any network I/O.
pub trait OfflineCheck: Send + Sync {
    fn is_offline(&self) -> BoxFuture<'_, bool>;
}

impl<F, Fut> OfflineCheck for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = bool> + MaybeSend + 'static,
{
    fn is_offline(&self) -> BoxFuture<'_, bool> {
        Box::pin(self())
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthToken, AuthTokenProvider, StaticToken};

    #[test]
    fn debug_redacts_secret() {
        let token = AuthToken {
            secret: "secret-token".to_owned(),
            expires_at: 1,
        };
        let debug = format!("{token:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }

    #[tokio::test]
    async fn static_token_resolves_secret() {
        let provider = StaticToken::new("abc");
        let token = provider.auth_token().await.expect("static token");
        assert_eq!(token.secret, "abc");
    }
}
