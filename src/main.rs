use std::sync::Arc;

use anyhow::Context;

use modmail_highlight::config::{RedditConfig, ServerConfig};
use modmail_highlight::highlight::HighlightEvaluator;
use modmail_highlight::modmail::{ModMailService, RedditClient};
use modmail_highlight::settings::{EnvSettings, JsonFileSettings, SettingsStore};
use modmail_highlight::triggers::trigger_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let server_config = ServerConfig::from_env().context("invalid server configuration")?;
    let reddit_config = RedditConfig::from_env().context("invalid Reddit configuration")?;

    eprintln!("Modmail Highlight v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Subreddit: r/{}", reddit_config.subreddit);
    eprintln!("   Trigger: http://{}/triggers/modmail", server_config.bind_addr);

    let settings: Arc<dyn SettingsStore> = match &server_config.settings_path {
        Some(path) => {
            eprintln!("   Settings: {}", path.display());
            Arc::new(JsonFileSettings::new(path.clone()))
        }
        None => {
            eprintln!("   Settings: HIGHLIGHT_* environment variables");
            Arc::new(EnvSettings::new())
        }
    };

    let modmail: Arc<dyn ModMailService> =
        Arc::new(RedditClient::new(reddit_config).context("failed to build Reddit client")?);
    let evaluator = Arc::new(HighlightEvaluator::new(modmail));

    let app = trigger_routes(evaluator, settings);
    let listener = tokio::net::TcpListener::bind(server_config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", server_config.bind_addr))?;
    tracing::info!(addr = %server_config.bind_addr, "Trigger server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
