use super::error::ResolveError;
use super::ResolveResult;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Races `future` against the token. Cancellation wins ties and drops the
/// in-flight future.
pub async fn cancellable<F, T>(cancel: &CancellationToken, future: F) -> ResolveResult<T>
where
    F: Future<Output = ResolveResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ResolveError::Canceled),
        result = future => result,
    }
}

/// Returns `Canceled` when the token has already fired.
pub fn ensure_not_canceled(cancel: &CancellationToken) -> ResolveResult<()> {
    if cancel.is_cancelled() {
        Err(ResolveError::Canceled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completes_when_not_canceled() {
        let cancel = CancellationToken::new();
        let value = cancellable(&cancel, async { Ok::<_, ResolveError>(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_cancel_abandons_slow_future() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let result = cancellable(&cancel, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, ResolveError>(())
        })
        .await;
        assert!(result.unwrap_err().is_canceled());
    }

    #[tokio::test]
    async fn test_already_canceled_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = cancellable(&cancel, async { Ok::<_, ResolveError>(1) }).await;
        assert!(result.unwrap_err().is_canceled());
        assert!(ensure_not_canceled(&cancel).is_err());
    }
}
