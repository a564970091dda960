//! Per-call deadlines for external collaborators

use crate::errors::{DispatchError, Result};
use std::future::Future;
use std::time::Duration;

/// Run `future` under `limit`, mapping expiry to `DispatchError::Timeout`
pub async fn with_deadline<T, F>(operation: &str, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(DispatchError::Timeout {
            operation: operation.to_string(),
            duration_ms: limit.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let value = with_deadline("op", Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_expiry_is_timeout() {
        let result: Result<()> = with_deadline("mail delivery", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(DispatchError::Timeout {
                operation,
                duration_ms,
            }) => {
                assert_eq!(operation, "mail delivery");
                assert_eq!(duration_ms, 10);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_inner_error_passes_through() {
        let result: Result<()> = tokio_test::block_on(with_deadline(
            "database fetch",
            Duration::from_secs(1),
            async { Err(DispatchError::Database("locked".into())) },
        ));
        assert!(matches!(result, Err(DispatchError::Database(_))));
    }
}
