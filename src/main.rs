use aircycle_control::ControlLoop;
use aircycle_core::Config;
use aircycle_device::DeviceApiClient;
use aircycle_weather::WeatherLookup;
use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            aircycle_core::init("info")?;
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e);
        }
    };

    aircycle_core::init(&config.logging.level)?;
    config.ensure_valid().context("Configuration rejected")?;
    tracing::info!(
        dsn = %config.device.dsn,
        interval_secs = config.louver.interval_secs,
        weather = config.weather.enabled,
        "aircycle starting"
    );

    let positions = config
        .louver
        .positions()
        .context("Invalid louver position list")?;

    let device =
        DeviceApiClient::new(config.device.clone()).context("Failed to build device client")?;

    let weather = if config.weather.enabled {
        if !config.weather.has_location() {
            tracing::warn!("Weather control enabled without a location; checks will be skipped");
        }
        Some(WeatherLookup::from_config(&config.weather).context("Failed to build weather client")?)
    } else {
        None
    };

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone());

    let control = ControlLoop::new(device, weather, positions, config.louver.interval(), cancel)?;
    control.run().await.context("Control loop failed")?;

    tracing::info!("aircycle stopped");
    Ok(())
}

fn spawn_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown().await;
        tracing::info!("Shutdown requested");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable; listening for Ctrl-C only");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Ctrl-C handler failed");
            }
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Ctrl-C handler failed");
    }
}
