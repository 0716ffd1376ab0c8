/// Identifier of a Hacker News item. Only ever used to build the item URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub(crate) struct ArticleId(pub(crate) u64);

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One slot of the result set. The default value is the placeholder left behind
/// by a failed fetch or decode.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub(crate) struct ArticleRecord {
    pub(crate) title: String,
    pub(crate) url: String,

    // Only used for ranking, never serialized.
    #[serde(skip_serializing)]
    pub(crate) score: f64,
}

impl ArticleRecord {
    pub(crate) fn is_placeholder(&self) -> bool {
        self.title.is_empty() && self.url.is_empty() && self.score == 0.0
    }
}

/// Decodes an item payload. Either all of `title` and `score` decode or nothing is
/// returned. `url` may be absent (text-only posts) but not of the wrong type.
pub(crate) fn decode(bytes: &[u8]) -> Result<ArticleRecord, crate::error::Error> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let Some(object) = value.as_object() else {
        return Err(crate::error::Error::MalformedPayload(
            "expected a JSON object".to_string(),
        ));
    };

    let title = object
        .get("title")
        .and_then(serde_json::Value::as_str)
        .ok_or(crate::error::Error::Field("title"))?;

    let score = object
        .get("score")
        .and_then(serde_json::Value::as_f64)
        .ok_or(crate::error::Error::Field("score"))?;

    let url = match object.get("url") {
        None | Some(serde_json::Value::Null) => "",
        Some(serde_json::Value::String(url)) => url.as_str(),
        Some(_) => return Err(crate::error::Error::Field("url")),
    };

    Ok(ArticleRecord {
        title: title.to_string(),
        url: url.to_string(),
        score,
    })
}
