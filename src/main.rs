//! skycast - runs the six orchestration walkthroughs in order.

use std::sync::Arc;

use skycast::{Config, StdoutSink, WeatherStation};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // The walkthroughs rely on cooperative single-threaded scheduling: tasks
    // interleave only at suspension points.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skycast=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let station = WeatherStation::new(config, Arc::new(StdoutSink));

    info!("fire-and-forget readings");
    station.broadcast_readings().await;

    info!("value-returning readings");
    station.report_inline().await;

    info!("nested scope composition");
    station.report_composed().await;

    info!("scope-level fault recovery");
    station.report_with_fallback().await;

    info!("task-level fault recovery");
    station.report_with_partial_data().await;

    info!("explicit cancellation");
    station.report_latest_available().await;

    Ok(())
}
