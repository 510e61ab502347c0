use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equity_core::llm::anthropic::AnthropicClient;
use equity_core::llm::CompletionClient;
use equity_core::service::AnalysisService;

mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = equity_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let client: Option<Arc<dyn CompletionClient>> = match AnthropicClient::from_settings(&settings)
    {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "upstream client unavailable; /api/analyze will reject requests");
            None
        }
    };

    let state = routes::AppState {
        service: AnalysisService::new(client),
    };
    let app = routes::router(state);

    let port = settings.listen_port();
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(
        %addr,
        api_key_configured = settings.require_anthropic_api_key().is_ok(),
        "api listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
