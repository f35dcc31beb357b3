//! Bounded retry for transient database failures.
//!
//! Postgres aborts one of two conflicting transactions with a serialization
//! failure (SQLSTATE 40001) or a deadlock (40P01). Idempotent operations such
//! as a balance recompute can simply be re-run; this module provides the
//! bounded re-run loop. Non-idempotent operations must not be retried here.

use std::future::Future;

use sea_orm::DbErr;

/// Returns true when the error is a transient conflict that a re-run of the
/// same transaction can resolve.
#[must_use]
pub fn is_transient(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains("40001")
        || message.contains("40P01")
        || message.contains("serialization failure")
        || message.contains("deadlock detected")
}

/// Runs `operation` up to `max_attempts` times, re-running only while
/// `is_retryable` holds for the error. The final error is returned as-is.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or immediately for a
/// non-retryable error.
pub async fn with_retry<T, E, F, Fut, P>(
    max_attempts: u32,
    is_retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && is_retryable(&err) => {
                tracing::warn!(attempt, max_attempts, "transient database conflict, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_returns_first_success() {
        let calls = Cell::new(0u32);
        let result: Result<u32, DbErr> = with_retry(3, |_| true, || {
            calls.set(calls.get() + 1);
            async { Ok(42) }
        })
        .await;
        assert_eq!(result.ok(), Some(42));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = Cell::new(0u32);
        let result: Result<u32, DbErr> = with_retry(3, |_| true, || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(DbErr::Custom("serialization failure".into()))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.ok(), Some(7));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Cell::new(0u32);
        let result: Result<u32, DbErr> = with_retry(2, |_| true, || {
            calls.set(calls.get() + 1);
            async { Err(DbErr::Custom("40001".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = Cell::new(0u32);
        let result: Result<u32, DbErr> = with_retry(5, is_transient, || {
            calls.set(calls.get() + 1);
            async { Err(DbErr::Custom("constraint violation".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_transient_detection() {
        assert!(is_transient(&DbErr::Custom(
            "ERROR: could not serialize access (SQLSTATE 40001)".into()
        )));
        assert!(is_transient(&DbErr::Custom("deadlock detected".into())));
        assert!(!is_transient(&DbErr::Custom(
            "duplicate key value violates unique constraint".into()
        )));
    }
}
