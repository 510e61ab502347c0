use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equity_client::dashboard::{AnalysisOutcome, Dashboard, FallbackPolicy, ViewMode};
use equity_client::history::HistoryStore;
use equity_client::proxy::ProxyClient;
use equity_client::render;

#[derive(Debug, Parser)]
#[command(name = "equity_client", about = "Terminal dashboard for the equity research proxy")]
struct Args {
    /// Backend base URL. Defaults to EQUITY_API_URL, then http://localhost:3001.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding the analysis history file. Defaults to EQUITY_DATA_DIR, then `.`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a new analysis for a ticker.
    Analyze {
        ticker: String,

        /// Fail instead of showing placeholder data when the backend errors.
        #[arg(long)]
        strict: bool,

        /// Show the detailed report instead of the executive summary.
        #[arg(long)]
        detailed: bool,
    },
    /// List recent analyses, newest first.
    History,
    /// Show a past analysis from history.
    Show {
        id: i64,

        #[arg(long)]
        detailed: bool,
    },
    /// Check that the backend is up.
    Health,
}

fn view_mode(detailed: bool) -> ViewMode {
    if detailed {
        ViewMode::Detailed
    } else {
        ViewMode::Summary
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = equity_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let api_url = args.api_url.as_deref().unwrap_or(settings.api_url());
    let data_dir = args
        .data_dir
        .or_else(|| settings.data_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let backend = ProxyClient::new(api_url)?;
    let store = HistoryStore::in_dir(&data_dir);

    let fallback = match &args.command {
        Command::Analyze { strict: true, .. } => FallbackPolicy::Surface,
        _ => FallbackPolicy::Placeholder,
    };
    let mut dashboard = Dashboard::new(backend, Some(store), fallback);

    match args.command {
        Command::Analyze {
            ticker, detailed, ..
        } => {
            let Some(outcome) = dashboard.run_analysis(&ticker).await else {
                anyhow::bail!("ticker must not be empty");
            };
            if let Some(err) = outcome.error() {
                tracing::warn!(error = %err, "backend analysis failed");
            }
            if let AnalysisOutcome::Failed(err) = outcome {
                let err = anyhow::Error::new(err).context("analysis failed");
                sentry_anyhow::capture_anyhow(&err);
                return Err(err);
            }
            if let AnalysisOutcome::Degraded { error, .. } = &outcome {
                eprintln!("warning: {error}; showing placeholder analysis");
            }
            if let Some(result) = outcome.result() {
                print!("{}", render::render_analysis(result, view_mode(detailed)));
            }
        }
        Command::History => {
            print!(
                "{}",
                render::render_history(dashboard.history(), dashboard.selected())
            );
        }
        Command::Show { id, detailed } => {
            dashboard.select_history_item(id)?;
            dashboard.set_view_mode(view_mode(detailed));
            if let Some(result) = dashboard.display_analysis() {
                print!("{}", render::render_analysis(result, dashboard.view_mode()));
            }
        }
        Command::Health => {
            let status = dashboard.health().await?;
            println!("{status}");
        }
    }

    Ok(())
}

fn init_sentry(settings: &equity_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
