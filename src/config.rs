/// How the fetched articles are handed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputMode {
    /// `title ~ url` lines, no prompt. Meant for scripting.
    Plain,
    Json,
    /// Numbered list followed by a selection prompt.
    Interactive,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) count: usize,
    pub(crate) max_time: std::time::Duration,
    pub(crate) filter: Option<String>,
    pub(crate) output: OutputMode,
    pub(crate) log_to_console: bool,

    pub(crate) endpoints: crate::hn_api::Endpoints,
    pub(crate) browser: String,
    pub(crate) log_dir: std::path::PathBuf,
}

impl Config {
    /// Combines the command line with the environment. A `.env` file is read when present.
    pub(crate) fn load(args: &crate::Args) -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(anyhow::anyhow!("Failed to load .env file: {}", e));
            }
        }

        Self::from_lookup(args, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        args: &crate::Args,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let output = if args.no_input {
            OutputMode::Plain
        } else if args.json {
            OutputMode::Json
        } else {
            OutputMode::Interactive
        };

        let env_log_to_console = match lookup("LOG_TO_CONSOLE") {
            Some(value) => value
                .parse::<bool>()
                .map_err(|e| anyhow::anyhow!("LOG_TO_CONSOLE={:?}: {}", value, e))?,
            None => false,
        };

        Ok(Self {
            count: args.number,
            max_time: std::time::Duration::from_secs(args.max_time),
            filter: args.filter.clone().filter(|f| !f.is_empty()),
            output,
            log_to_console: env_log_to_console || args.log_to_console,
            endpoints: crate::hn_api::Endpoints {
                base_url: lookup("HN_API_BASE_URL")
                    .unwrap_or_else(|| crate::hn_api::DEFAULT_BASE_URL.to_string()),
            },
            browser: lookup("HN_BROWSER").unwrap_or_else(|| "firefox".to_string()),
            log_dir: lookup("HN_LOG_DIR")
                .unwrap_or_else(|| "./log".to_string())
                .into(),
        })
    }
}
