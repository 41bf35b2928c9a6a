//! Async try/finally over schema operations.

use std::future::Future;

use crate::error::Result;

/// Run `step`, then `cleanup` whatever the outcome of `step`.
///
/// The error of `step` wins if only it fails; a failing `cleanup` is never dropped,
/// and is combined with the error of `step` when both fail.
pub async fn with_finally<T, S, C>(step: S, cleanup: C) -> Result<T>
where
    S: Future<Output = Result<T>>,
    C: Future<Output = Result<()>>,
{
    let outcome = step.await;
    let cleaned = cleanup.await;

    match (outcome, cleaned) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), Ok(())) => Err(e),
        (Ok(_), Err(cleanup_error)) => Err(cleanup_error),
        (Err(e), Err(cleanup_error)) => Err(e.with_cleanup_failure(cleanup_error)),
    }
}
