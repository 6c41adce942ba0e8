use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use reproject_png::cli::{Args, Config};
use reproject_png::logger::{self, Logger};
use reproject_png::manager::OperationManager;
use reproject_png::operation::OperationState;
use reproject_png::progress::TerminalProgress;
use reproject_png::surface::{self, RasterSurfaces};

/// Exit status for a run stopped by Ctrl-C.
const EXIT_ABORTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = match args.validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    Logger::init(config.verbosity, config.no_color);

    match run(config).await {
        Ok(OperationState::Completed) => ExitCode::SUCCESS,
        Ok(OperationState::Aborted) => ExitCode::from(EXIT_ABORTED),
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            logger::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<OperationState> {
    let source = surface::load(&config.input)
        .with_context(|| format!("Failed to read image {}", config.input.display()))?;
    logger::info(&format!(
        "Reprojecting {} ({}x{}) to {}",
        config.input.display(),
        source.width(),
        source.height(),
        config.projection
    ));

    let image = Arc::new(Mutex::new(source));
    let manager = OperationManager::new();
    let sink = TerminalProgress::new(config.projection.name(), logger::is_quiet());
    let mut conversion = manager.start(
        &image,
        config.projection_config(),
        config.options,
        RasterSurfaces,
        Box::new(sink),
    )?;

    let handle = conversion.abort_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::warn("Interrupted, aborting reprojection");
            // Losing the race against completion is fine
            handle.abort().ok();
        }
    });

    let state = manager.drive(&mut conversion).await;
    interrupt.abort();

    match state {
        OperationState::Completed => {
            let path = config.output_path();
            let output = image
                .lock()
                .map_err(|_| anyhow!("image lock poisoned"))?
                .clone();
            logger::debug(&format!("Writing {}x{} PNG", output.width(), output.height()));
            surface::save_png(&output, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            logger::output(&path.display().to_string());
        }
        OperationState::Failed => {
            if let Some(err) = conversion.operation().error() {
                logger::error(&err.to_string());
            }
        }
        OperationState::Aborted => logger::warn("Reprojection aborted, nothing written"),
        OperationState::InProgress => {}
    }

    Ok(state)
}
