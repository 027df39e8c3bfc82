use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screener_engine::api_client::ScreenerClient;
use screener_engine::config::Config;
use screener_engine::roster::view::ViewParams;
use screener_engine::state::Engine;

/// Non-interactive shell around the roster engine: one load, a summary, and
/// an optional CSV export.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{target}={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener engine v{}", env!("CARGO_PKG_VERSION"));

    let api = Arc::new(ScreenerClient::new(&config));
    let export_path = config.export_path.clone();
    let engine = Engine::new(config, api);

    engine.load().await?;
    let stats = engine.stats();
    info!(
        "Roster loaded: {} candidates ({} selected, {} rejected, {} processing)",
        stats.total, stats.selected, stats.rejected, stats.processing
    );
    info!(
        "Average scores: overall {:.1}, skills {:.1}, experience {:.1}, education {:.1}",
        stats.avg_overall_score,
        stats.avg_skills_score,
        stats.avg_experience_score,
        stats.avg_education_score
    );

    let params = ViewParams::default();
    for candidate in screener_engine::roster::view::derive_view(&engine.snapshot(), &params)
        .iter()
        .take(10)
    {
        info!(
            "  {:>5.1}  {:<12}  {}",
            candidate.overall_score,
            format!("{:?}", candidate.recommendation),
            candidate.name
        );
    }

    if let Some(path) = export_path {
        let csv = engine.export_view(&params);
        std::fs::write(&path, &csv)?;
        info!("Exported {} bytes of CSV to {path}", csv.len());
    }

    Ok(())
}
