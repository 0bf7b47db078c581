use std::{future::Future, time::Duration};

use tokio::time::Instant;

use crate::error::{Error, Result};

/// Per-call deadline passed into every store operation.
///
/// Dropping the returned future cancels the call; the deadline bounds how
/// long the store may take before failing with
/// [`Error::DeadlineExceeded`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context with no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive `fut` to completion unless the deadline passes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| Error::DeadlineExceeded)?,
            None => fut.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_never_times_out() {
        let ctx = CallContext::background();
        assert!(ctx.deadline().is_none());
        let value = ctx.run(async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn expired_deadline_fails() {
        let ctx = CallContext::with_timeout(Duration::from_millis(10));
        let result: Result<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(Error::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn inner_error_passes_through() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let result: Result<()> =
            ctx.run(async { Err(Error::QueryEmpty) }).await;
        assert!(matches!(result, Err(Error::QueryEmpty)));
    }
}
