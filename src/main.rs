use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ferret::analysis::TokenAnalyzer;
use ferret::cache::DiskCache;
use ferret::client::HeliusClient;
use ferret::config::AnalyzerConfig;
use ferret::util::display;

const CONFIG_PATH: &str = "ferret.toml";
const DEFAULT_WINDOW_MINUTES: u64 = 5;

fn init_tracing() -> Result<()> {
    // Create logs directory if it doesn't exist
    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "ferret.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .json()
        .with_current_span(false)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Leak the guard to prevent the file appender from being dropped
    std::mem::forget(_guard);

    Ok(())
}

fn usage() -> ! {
    eprintln!("Usage: ferret <token-mint> [minutes]");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let mut args = std::env::args().skip(1);
    let Some(mint) = args.next() else { usage() };
    let minutes = match args.next() {
        Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| usage()),
        None => DEFAULT_WINDOW_MINUTES,
    };

    info!("🦫 Ferret Token Activity Analyzer");
    info!("=================================");

    let config = AnalyzerConfig::load_or_default(CONFIG_PATH)
        .with_context(|| format!("failed to load {}", CONFIG_PATH))?;

    let client = match HeliusClient::new(None) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize API client: {}", e);
            return Err(e.into());
        }
    };

    // Metadata is decoration for the report header, never fatal
    let metadata = client.get_token_metadata(&mint).await.unwrap_or_default();

    let cache = DiskCache::new(&config.fetch.cache_dir)
        .with_context(|| format!("failed to open cache dir {}", config.fetch.cache_dir))?;

    let analyzer = TokenAnalyzer::new(client, cache, config);

    match analyzer.analyze(&mint, minutes).await {
        Some(report) => {
            display::print_analysis_report(&report, metadata.as_ref());
            info!(
                "✅ Analysis complete: {} transactions, {} wallets",
                report.transaction_count, report.active_wallets
            );
        }
        None => display::print_no_data(&mint, minutes),
    }

    Ok(())
}
