pub mod domain;
pub mod error;
pub mod llm;
pub mod service;

pub use error::AnalyzeError;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_PORT: u16 = 3001;
    pub const DEFAULT_API_URL: &str = "http://localhost:3001";

    // Left in older .env templates; never a usable credential.
    const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub anthropic_api_key: Option<String>,
        pub anthropic_base_url: Option<String>,
        pub anthropic_timeout_secs: Option<u64>,
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
        pub api_url: Option<String>,
        pub data_dir: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let port = parse_var("PORT", non_empty_var("PORT"))?;
            let anthropic_timeout_secs =
                parse_var("ANTHROPIC_TIMEOUT_SECS", non_empty_var("ANTHROPIC_TIMEOUT_SECS"))?;

            Ok(Self {
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                anthropic_base_url: non_empty_var("ANTHROPIC_BASE_URL"),
                anthropic_timeout_secs,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                port,
                api_url: non_empty_var("EQUITY_API_URL"),
                data_dir: non_empty_var("EQUITY_DATA_DIR"),
            })
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty() && *k != PLACEHOLDER_API_KEY)
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn listen_port(&self) -> u16 {
            self.port.unwrap_or(DEFAULT_PORT)
        }

        pub fn api_url(&self) -> &str {
            self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    fn parse_var<T>(key: &str, raw: Option<String>) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        raw.map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value (got {raw})"))
        })
        .transpose()
    }

}
