//! Everything the user sees: filtering, the three output modes and the selection prompt.

pub(crate) const GREETING: &str = "Hello Hackers News!";

/// What `main` still has to do once the articles were shown.
#[derive(Debug, PartialEq)]
pub(crate) enum Outcome {
    Done,
    Open(String),
    /// The user picked nothing usable. Reported, exit status 1.
    InvalidSelection,
}

/// Drops placeholder slots and keeps titles containing `filter`.
pub(crate) fn prepare(
    results: Vec<crate::article::ArticleRecord>,
    filter: Option<&str>,
) -> Vec<crate::article::ArticleRecord> {
    let num_results = results.len();
    let articles: Vec<_> = results
        .into_iter()
        .filter(|a| !a.is_placeholder())
        .filter(|a| filter.is_none_or(|keyword| a.title.contains(keyword)))
        .collect();

    tracing::info!(
        num_results = num_results,
        num_articles = articles.len(),
        filter =? filter,
        "Prepared articles for display"
    );

    articles
}

pub(crate) fn present<R: std::io::BufRead, W: std::io::Write>(
    mode: crate::config::OutputMode,
    articles: &[crate::article::ArticleRecord],
    input: R,
    out: &mut W,
) -> anyhow::Result<Outcome> {
    match mode {
        crate::config::OutputMode::Plain => {
            for article in articles {
                writeln!(out, "{} ~ {}", article.title, article.url)?;
            }
            Ok(Outcome::Done)
        }
        crate::config::OutputMode::Json => {
            writeln!(out, "{}", serde_json::to_string(articles)?)?;
            Ok(Outcome::Done)
        }
        crate::config::OutputMode::Interactive => interactive(articles, input, out),
    }
}

fn interactive<R: std::io::BufRead, W: std::io::Write>(
    articles: &[crate::article::ArticleRecord],
    mut input: R,
    out: &mut W,
) -> anyhow::Result<Outcome> {
    let highest_index = match crate::ranker::index_of_max(articles) {
        Ok(index) => index,
        Err(crate::error::Error::EmptyInput) => {
            writeln!(out, "No articles found 🧐")?;
            return Ok(Outcome::Done);
        }
        Err(e) => return Err(e.into()),
    };

    for (index, article) in articles.iter().enumerate() {
        if index == highest_index {
            writeln!(out, "{}: {} ⭐", index + 1, article.title)?;
        } else {
            writeln!(out, "{}: {}", index + 1, article.title)?;
        }
    }

    write!(out, "🔗:")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let Ok(number) = line.trim().parse::<i64>() else {
        writeln!(out, "Could not get URL of the article 😞")?;
        return Ok(Outcome::InvalidSelection);
    };

    let selected = usize::try_from(number)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| articles.get(i));
    let Some(article) = selected else {
        writeln!(out, "There is no such article 🤦")?;
        return Ok(Outcome::InvalidSelection);
    };

    if article.url.is_empty() {
        writeln!(out, "This is a text-only post without a link.")?;
        return Ok(Outcome::Done);
    }

    writeln!(out, "{}", article.url)?;
    Ok(Outcome::Open(article.url.clone()))
}

/// Launches `browser` with the url and waits for it. Failure is logged only.
pub(crate) fn open_in_browser(browser: &str, url: &str) {
    match std::process::Command::new(browser).arg(url).status() {
        Ok(status) if status.success() => {
            tracing::info!(browser = browser, url = url, "Opened article")
        }
        Ok(status) => {
            tracing::warn!(browser = browser, status =? status, "Browser exited with failure")
        }
        Err(e) => tracing::error!(error =? e, browser = browser, "Could not launch browser"),
    }
}
