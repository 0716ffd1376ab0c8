/// Failures of a single fetch, decode or ranking step.
///
/// Everything except `EmptyInput` is local to one article and gets logged by the
/// aggregator rather than returned to its caller.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP request failed with code: {0}")]
    HttpStatus(u16),

    #[error("deadline elapsed before the request completed")]
    Timeout,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("'{0}' key is missing or has the wrong type")]
    Field(&'static str),

    #[error("no articles to rank")]
    EmptyInput,
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedPayload(e.to_string())
    }
}
