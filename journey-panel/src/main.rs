use std::process::ExitCode;

use journey_panel::art::FolderImageSource;
use journey_panel::config::AppConfig;
use journey_panel::controller::{DisplayController, SystemClock};
use journey_panel::device::{DeviceError, PreviewDevice};
use journey_panel::logging;
use journey_panel::skanetrafiken::{JourneyClient, JourneySource, MockJourneySource};
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = logging::init(&config.logging);
    info!(
        routes = config.routes.len(),
        width = config.display.width,
        height = config.display.height,
        "starting journey panel"
    );
    for warning in config.warnings() {
        warn!("{warning}");
    }

    let result = match config.api.mock_dir.clone() {
        Some(dir) => match MockJourneySource::from_dir(&dir) {
            Ok(source) => {
                info!(dir = %dir.display(), routes = source.len(), "using canned journeys");
                serve(config, source).await
            }
            Err(e) => {
                error!(error = %e, "failed to load canned journeys");
                return ExitCode::FAILURE;
            }
        },
        None => match JourneyClient::new(config.api.client_config()) {
            Ok(client) => serve(config, client).await,
            Err(e) => {
                error!(error = %e, "failed to create journey client");
                return ExitCode::FAILURE;
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "failed to open display");
            ExitCode::FAILURE
        }
    }
}

async fn serve<S: JourneySource>(config: AppConfig, source: S) -> Result<(), DeviceError> {
    let device = PreviewDevice::new(
        &config.preview.dir,
        config.display.width,
        config.display.height,
    )?;
    info!(dir = %config.preview.dir.display(), "writing frames as PNG previews");

    let images = FolderImageSource::new(&config.art.folder);
    let mut controller = DisplayController::new(config, device, source, images, SystemClock);
    controller.run(shutdown_signal()).await;
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
            _ = terminate.recv() => info!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received Ctrl-C");
    }
}
