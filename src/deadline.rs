use std::future::Future;

/// Outcome of racing a call against its deadline.
#[cfg_attr(target_arch = "wasm32", allow(dead_code))]
pub(crate) enum Deadline<T> {
    Settled(T),
    Expired,
}

/// Runs `call` until it settles or `timeout_ms` elapses, dropping (and so
/// cancelling) it on expiry. The timer is released when this returns.
/// A zero timeout arms no deadline.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn race<F: Future>(timeout_ms: u64, call: F) -> Deadline<F::Output> {
    if timeout_ms == 0 {
        return Deadline::Settled(call.await);
    }
    match tokio::time::timeout(std::time::Duration::from_millis(timeout_ms), call).await {
        Ok(output) => Deadline::Settled(output),
        Err(_) => Deadline::Expired,
    }
}

// tokio timers are unavailable in the browser; the request carries its own
// reqwest timeout there (AbortController under the hood).
#[cfg(target_arch = "wasm32")]
pub(crate) async fn race<F: Future>(_timeout_ms: u64, call: F) -> Deadline<F::Output> {
    Deadline::Settled(call.await)
}
