pub(crate) const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// A single GET bound to a deadline. No retries, one attempt is reported as is.
pub(crate) trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &str,
        deadline: &crate::deadline::Deadline,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, crate::error::Error>> + Send;
}

/// Fetches over the shared `reqwest` client.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct HttpFetcher;

impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        deadline: &crate::deadline::Deadline,
    ) -> Result<Vec<u8>, crate::error::Error> {
        deadline
            .bound(async {
                let response = crate::CLIENT.get(url).send().await?;

                let status = response.status();
                if !status.is_success() {
                    return Err(crate::error::Error::HttpStatus(status.as_u16()));
                }

                Ok(response.bytes().await?.to_vec())
            })
            .await
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    pub(crate) base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub(crate) fn top_stories(&self) -> String {
        format!("{}/topstories.json", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn item(&self, id: crate::article::ArticleId) -> String {
        format!("{}/item/{}.json", self.base_url.trim_end_matches('/'), id)
    }
}

pub(crate) async fn fetch_top_story_ids<F: Fetcher>(
    fetcher: &F,
    endpoints: &Endpoints,
    deadline: &crate::deadline::Deadline,
) -> Result<Vec<crate::article::ArticleId>, crate::error::Error> {
    let body = fetcher.fetch(&endpoints.top_stories(), deadline).await?;
    let ids: Vec<crate::article::ArticleId> = serde_json::from_slice(&body)?;

    tracing::info!(num_stories = ids.len(), "Got top stories");

    Ok(ids)
}
