//! Per-call Timeout Guard
//!
//! Bounds a provider call by the configured request timeout. Expiry becomes a
//! provider error, so callers handle it exactly like an upstream failure.
//!
//! ```ignore
//! let response = with_timeout(
//!     Duration::from_secs(30),
//!     provider.generate(&messages, params),
//!     "deepseek",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{NovelError, Result};

/// Execute an async provider call with a timeout
///
/// Returns `NovelError::Provider` naming `provider` if the call doesn't
/// complete within `timeout`.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, provider: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(NovelError::timeout(provider, timeout)),
    }
}
