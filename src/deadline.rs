//! Shared, cancellable deadline for a batch of requests.

// Roughly 30 years. Stands in for durations that overflow `Instant`.
const FAR_FUTURE: std::time::Duration = std::time::Duration::from_secs(86400 * 365 * 30);

#[derive(Debug, Clone)]
pub(crate) struct Deadline {
    at: tokio::time::Instant,
    token: tokio_util::sync::CancellationToken,
}

impl Deadline {
    #[cfg(test)]
    pub(crate) fn after(duration: std::time::Duration) -> Self {
        Self::with_token(duration, tokio_util::sync::CancellationToken::new())
    }

    /// Like `after`, but also expires when `parent` is cancelled.
    pub(crate) fn after_or_cancelled(
        duration: std::time::Duration,
        parent: &tokio_util::sync::CancellationToken,
    ) -> Self {
        Self::with_token(duration, parent.child_token())
    }

    fn with_token(
        duration: std::time::Duration,
        token: tokio_util::sync::CancellationToken,
    ) -> Self {
        let now = tokio::time::Instant::now();
        Self {
            at: now
                .checked_add(duration)
                .unwrap_or_else(|| now + FAR_FUTURE),
            token,
        }
    }

    #[cfg(test)]
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// Cheap, non-blocking check used before starting any network call.
    pub(crate) fn is_expired(&self) -> bool {
        self.token.is_cancelled() || tokio::time::Instant::now() >= self.at
    }

    /// Runs `fut` until it completes, the deadline passes or the deadline is cancelled.
    /// The last two both surface as `Error::Timeout`.
    pub(crate) async fn bound<T, F>(&self, fut: F) -> Result<T, crate::error::Error>
    where
        F: std::future::Future<Output = Result<T, crate::error::Error>>,
    {
        tokio::select! {
            _ = self.token.cancelled() => Err(crate::error::Error::Timeout),
            res = tokio::time::timeout_at(self.at, fut) => {
                res.unwrap_or(Err(crate::error::Error::Timeout))
            }
        }
    }
}
