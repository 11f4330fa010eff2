use scribe_config::ScribeConfig;
use scribe_engine::ScribeEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => ScribeConfig::load(path)?,
        None => ScribeConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(?config, "scribe starting");

    let report = ScribeEngine::new(config).run()?;

    info!(
        submitted = report.submitted,
        dropped = report.dropped,
        drained = report.drained,
        "scribe finished"
    );

    Ok(())
}
