//! Fans out one fetch + decode per article and merges the results into a
//! fixed-size, position-stable result set.

enum Outcome {
    Stored,
    Failed,
    Abandoned,
}

/// Fetches the first `min(count, ids.len())` articles concurrently.
///
/// The returned vector always has exactly that many slots, in request order. A slot whose
/// fetch or decode failed, or which was abandoned because the deadline had already passed,
/// holds `ArticleRecord::default()`. Failures are logged, never returned.
pub(crate) async fn aggregate<F: crate::hn_api::Fetcher>(
    fetcher: std::sync::Arc<F>,
    endpoints: &crate::hn_api::Endpoints,
    ids: &[crate::article::ArticleId],
    count: usize,
    deadline: &crate::deadline::Deadline,
) -> Vec<crate::article::ArticleRecord> {
    // Handles the case when there are not enough articles available
    let effective = count.min(ids.len());

    let results = std::sync::Arc::new(std::sync::Mutex::new(vec![
        crate::article::ArticleRecord::default();
        effective
    ]));

    let mut join_set: tokio::task::JoinSet<Outcome> = tokio::task::JoinSet::new();

    for (index, &id) in ids[..effective].iter().enumerate() {
        let fetcher = fetcher.clone();
        let results = results.clone();
        let deadline = deadline.clone();
        let url = endpoints.item(id);

        join_set.spawn(async move {
            if deadline.is_expired() {
                tracing::debug!(id = %id, "Deadline passed, not fetching story");
                return Outcome::Abandoned;
            }

            let article = deadline
                .bound(fetcher.fetch(&url, &deadline))
                .await
                .and_then(|body| crate::article::decode(&body));

            match article {
                Ok(article) => {
                    results
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)[index] = article;
                    Outcome::Stored
                }
                Err(e) => {
                    tracing::warn!(error =? e, id = %id, url = url, "Error getting story");
                    Outcome::Failed
                }
            }
        });
    }

    let (mut succeeded, mut failed, mut abandoned) = (0, 0, 0);
    while let Some(res) = join_set.join_next().await {
        match res {
            Ok(Outcome::Stored) => succeeded += 1,
            Ok(Outcome::Failed) => failed += 1,
            Ok(Outcome::Abandoned) => abandoned += 1,
            Err(e) => {
                tracing::error!(error =? e, "Story task did not complete");
                failed += 1;
            }
        }
    }

    tracing::info!(
        requested = count,
        effective = effective,
        succeeded = succeeded,
        failed = failed,
        abandoned = abandoned,
        "Finished fetching stories"
    );

    // Every task has been joined, so this is the last reference.
    match std::sync::Arc::try_unwrap(results) {
        Ok(results) => results
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner),
        Err(results) => results
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone(),
    }
}
