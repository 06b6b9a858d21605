//! Retry with exponential backoff for transient catalog failures
//!
//! Transport-level failures (timeouts, connection faults, 5xx) are worth a
//! few retries before the engine records a per-path failure; auth errors,
//! missing records, and conflicts are not. Backoff schedule: 1s, 2s, 4s.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use savesync_core::ports::catalog::CatalogError;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (1 second)
const BASE_DELAY_SECS: u64 = 1;

/// Executes an async catalog operation with exponential backoff retry.
///
/// Only [`CatalogError::is_transient`] failures are retried; everything
/// else is returned immediately.
pub async fn with_retry<F, Fut, T>(operation: &str, f: F) -> Result<T, CatalogError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut last_error: Option<CatalogError> = None;

    for attempt in 0..=MAX_RETRIES {
        match f().await {
            Ok(value) => {
                if attempt > 0 {
                    info!(operation, attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if attempt < MAX_RETRIES && err.is_transient() {
                    let delay_secs = BASE_DELAY_SECS << attempt;
                    warn!(
                        operation,
                        attempt,
                        delay_secs,
                        error = %err,
                        "transient error, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                    last_error = Some(err);
                } else {
                    return Err(err);
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| CatalogError::Transport(format!("retry exhausted for {operation}"))))
}
