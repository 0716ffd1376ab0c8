use tracing_subscriber::util::SubscriberInitExt;

pub(crate) mod aggregator;
pub(crate) mod article;
pub(crate) mod config;
pub(crate) mod deadline;
pub(crate) mod error;
pub(crate) mod hn_api;
pub(crate) mod presentation;
pub(crate) mod ranker;

pub(crate) static CLIENT: std::sync::LazyLock<reqwest::Client> =
    std::sync::LazyLock::new(reqwest::Client::new);

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Args {
    #[arg(short, long, default_value = "10")]
    #[arg(help = "Number of articles to display")]
    number: usize,

    #[arg(short, long)]
    #[arg(help = "Filter articles with specific keyword")]
    filter: Option<String>,

    #[arg(long, default_value = "false")]
    #[arg(help = "Do not wait for user input, can be used for scripting")]
    no_input: bool,

    #[arg(long, default_value = "false")]
    #[arg(help = "Output in json format")]
    json: bool,

    #[arg(short, long, default_value = "10")]
    #[arg(help = "Maximum time in seconds to wait for articles")]
    max_time: u64,

    #[arg(short, long, default_value = "false")]
    #[arg(help = "Log to console")]
    log_to_console: bool,
}

/// Ctrl-C handling for one invocation. The first interrupt while stories are being fetched
/// abandons the outstanding requests, any later one ends the process.
#[derive(Debug, Clone, Default)]
pub(crate) struct Interrupts {
    fetching: tokio_util::sync::CancellationToken,
    fetched: tokio_util::sync::CancellationToken,
}

impl Interrupts {
    /// Resolves once the process should exit.
    async fn listen<F, Fut>(self, mut next_interrupt: F)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::io::Result<()>>,
    {
        loop {
            if let Err(e) = next_interrupt().await {
                tracing::error!(error =? e, "Could not listen for Ctrl-C");
                return std::future::pending().await;
            }

            if self.fetching.is_cancelled() || self.fetched.is_cancelled() {
                tracing::warn!("Interrupted, exiting");
                return;
            }

            tracing::warn!("Interrupted, abandoning outstanding stories");
            self.fetching.cancel();
        }
    }
}

async fn get_top_stories<F, R, W>(
    config: &config::Config,
    fetcher: std::sync::Arc<F>,
    interrupts: &Interrupts,
    input: R,
    out: &mut W,
) -> anyhow::Result<std::process::ExitCode>
where
    F: hn_api::Fetcher,
    R: std::io::BufRead,
    W: std::io::Write,
{
    // Shown while the stories load.
    if config.output == config::OutputMode::Interactive {
        writeln!(out, "{}", presentation::GREETING)?;
        out.flush()?;
    }

    let ids = hn_api::fetch_top_story_ids(
        fetcher.as_ref(),
        &config.endpoints,
        &deadline::Deadline::after_or_cancelled(config.max_time, &interrupts.fetching),
    )
    .await?;

    let deadline = deadline::Deadline::after_or_cancelled(config.max_time, &interrupts.fetching);
    let results =
        aggregator::aggregate(fetcher, &config.endpoints, &ids, config.count, &deadline).await;
    interrupts.fetched.cancel();

    let articles = presentation::prepare(results, config.filter.as_deref());

    match presentation::present(config.output, &articles, input, out)? {
        presentation::Outcome::Done => Ok(std::process::ExitCode::SUCCESS),
        presentation::Outcome::Open(url) => {
            presentation::open_in_browser(&config.browser, &url);
            Ok(std::process::ExitCode::SUCCESS)
        }
        presentation::Outcome::InvalidSelection => Ok(std::process::ExitCode::FAILURE),
    }
}

async fn run<F, R, W>(
    config: &config::Config,
    fetcher: std::sync::Arc<F>,
    interrupts: &Interrupts,
    input: R,
    out: &mut W,
) -> std::process::ExitCode
where
    F: hn_api::Fetcher,
    R: std::io::BufRead,
    W: std::io::Write,
{
    match get_top_stories(config, fetcher, interrupts, input, out).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error =? e, "Error when getting top stories");
            eprintln!("Error: {:#}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    use tracing_subscriber::layer::Layer;
    use tracing_subscriber::layer::SubscriberExt;

    use clap::Parser;
    let args = Args::parse();

    let config = match config::Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "hn_top.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer();
    let file_layer = file_layer
        .with_writer(non_blocking)
        .json()
        .with_filter(tracing::level_filters::LevelFilter::INFO)
        .boxed();

    // stdout carries the article list and json output.
    let pretty_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_filter(tracing::level_filters::LevelFilter::INFO)
        .boxed();

    let registry = tracing_subscriber::registry().with(file_layer);

    if config.log_to_console {
        registry.with(pretty_layer).init();
    } else {
        registry.init();
    };

    tracing::info!(config =? config, args =? args, "Starting hn-top");

    let interrupts = Interrupts::default();
    let listener = interrupts.clone();
    tokio::spawn(async move {
        listener.listen(tokio::signal::ctrl_c).await;
        std::process::exit(130);
    });

    run(
        &config,
        std::sync::Arc::new(hn_api::HttpFetcher),
        &interrupts,
        std::io::stdin().lock(),
        &mut std::io::stdout(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        use clap::Parser;
        let args = Args::parse_from(["hn-top"]);

        assert_eq!(args.number, 10);
        assert_eq!(args.max_time, 10);
        assert_eq!(args.filter, None);
        assert!(!args.no_input);
        assert!(!args.json);
        assert!(!args.log_to_console);
    }

    #[test]
    fn test_args_short_flags() {
        use clap::Parser;
        let args = Args::parse_from(["hn-top", "-n", "5", "-f", "Rust", "-m", "2", "-l"]);

        assert_eq!(args.number, 5);
        assert_eq!(args.filter.as_deref(), Some("Rust"));
        assert_eq!(args.max_time, 2);
        assert!(args.log_to_console);
    }

    #[test]
    fn test_huge_max_time_does_not_panic() {
        use clap::Parser;
        let args = Args::parse_from(["hn-top", "--max-time", "18446744073709551615"]);
        let config = config::Config::from_lookup(&args, |_| None).unwrap();

        let interrupts = Interrupts::default();
        let deadline =
            deadline::Deadline::after_or_cancelled(config.max_time, &interrupts.fetching);
        assert!(!deadline.is_expired());
    }

    type Interrupt =
        std::pin::Pin<Box<dyn std::future::Future<Output = std::io::Result<()>> + Send>>;

    /// Every message sent on the returned channel counts as one Ctrl-C.
    fn interrupt_source() -> (
        tokio::sync::mpsc::UnboundedSender<()>,
        impl FnMut() -> Interrupt,
    ) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<()>();
        let rx = std::sync::Arc::new(tokio::sync::Mutex::new(rx));
        let next = move || {
            let rx = rx.clone();
            Box::pin(async move {
                rx.lock().await.recv().await;
                Ok(())
            }) as Interrupt
        };
        (tx, next)
    }

    #[tokio::test]
    async fn test_first_interrupt_abandons_fetch_second_exits() {
        let interrupts = Interrupts::default();
        let (tx, next) = interrupt_source();
        let handle = tokio::spawn(interrupts.clone().listen(next));

        tx.send(()).unwrap();
        tokio::time::timeout(
            std::time::Duration::from_secs(1),
            interrupts.fetching.cancelled(),
        )
        .await
        .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        tx.send(()).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_interrupt_after_fetching_exits() {
        let interrupts = Interrupts::default();
        interrupts.fetched.cancel();
        let (tx, next) = interrupt_source();
        let handle = tokio::spawn(interrupts.clone().listen(next));

        tx.send(()).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!interrupts.fetching.is_cancelled());
    }

    fn config_for(server: &wiremock::MockServer, flags: &[&str]) -> config::Config {
        use clap::Parser;
        let args = Args::parse_from(std::iter::once("hn-top").chain(flags.iter().copied()));
        config::Config::from_lookup(&args, |key| {
            (key == "HN_API_BASE_URL").then(|| server.uri())
        })
        .unwrap()
    }

    async fn mount(
        server: &wiremock::MockServer,
        route: &str,
        response: wiremock::ResponseTemplate,
    ) {
        use wiremock::matchers::{method, path};
        wiremock::Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    async fn hacker_news() -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;
        mount(
            &server,
            "/topstories.json",
            wiremock::ResponseTemplate::new(200).set_body_string("[1, 2, 3]"),
        )
        .await;
        mount(
            &server,
            "/item/1.json",
            wiremock::ResponseTemplate::new(200)
                .set_body_string(r#"{"title":"One","url":"https://one.example","score":10}"#),
        )
        .await;
        mount(&server, "/item/2.json", wiremock::ResponseTemplate::new(500)).await;
        mount(
            &server,
            "/item/3.json",
            wiremock::ResponseTemplate::new(200).set_body_string(r#"{"title":"Three","score":30}"#),
        )
        .await;
        server
    }

    #[tokio::test]
    async fn test_run_json() {
        let server = hacker_news().await;
        let config = config_for(&server, &["--json"]);
        let interrupts = Interrupts::default();
        let mut out = Vec::new();

        let code = run(
            &config,
            std::sync::Arc::new(hn_api::HttpFetcher),
            &interrupts,
            "".as_bytes(),
            &mut out,
        )
        .await;

        assert_eq!(code, std::process::ExitCode::SUCCESS);
        assert!(interrupts.fetched.is_cancelled());

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"title": "One", "url": "https://one.example"},
                {"title": "Three", "url": ""},
            ])
        );
    }

    #[tokio::test]
    async fn test_run_top_stories_failure() {
        let server = wiremock::MockServer::start().await;
        mount(&server, "/topstories.json", wiremock::ResponseTemplate::new(500)).await;
        let config = config_for(&server, &["--json"]);
        let mut out = Vec::new();

        let code = run(
            &config,
            std::sync::Arc::new(hn_api::HttpFetcher),
            &Interrupts::default(),
            "".as_bytes(),
            &mut out,
        )
        .await;

        assert_eq!(code, std::process::ExitCode::FAILURE);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_interactive() {
        let server = hacker_news().await;
        let config = config_for(&server, &["--number", "2"]);
        let mut out = Vec::new();

        let code = run(
            &config,
            std::sync::Arc::new(hn_api::HttpFetcher),
            &Interrupts::default(),
            "7\n".as_bytes(),
            &mut out,
        )
        .await;

        let out = String::from_utf8(out).unwrap();
        assert_eq!(code, std::process::ExitCode::FAILURE);
        assert_eq!(
            out,
            "Hello Hackers News!\n1: One ⭐\n🔗:There is no such article 🤦\n"
        );
    }

    #[test]
    fn test_args_reject_negative_number() {
        use clap::Parser;
        assert!(Args::try_parse_from(["hn-top", "--number", "-3"]).is_err());
    }
}
