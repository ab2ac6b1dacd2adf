//! Video Generator command-line host.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use vgen_core::config::{default_config_path, ConfigManager, ConfigSection};
use vgen_core::logging::init_logging;
use vgen_core::pipeline::{CancelHandle, GenerationPipeline};
use vgen_core::progress;
use vgen_core::GenerationResult;

use cli::CliArgs;

#[tokio::main]
async fn main() -> ExitCode {
    match run(CliArgs::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<bool> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut config = ConfigManager::new(&config_path);
    if let Err(e) = config.load_or_create() {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
    }
    args.apply_to(config.settings_mut());

    if let Err(e) = config.ensure_dirs_exist() {
        eprintln!("Warning: Failed to create directories: {}", e);
    }
    let _log_guard = init_logging(config.settings().logging.level, &config.logs_folder());

    tracing::info!("Video Generator starting");
    tracing::info!("Config: {}", config_path.display());
    tracing::info!("Core version: {}", vgen_core::version());

    let request = config
        .settings()
        .request_builder(&args.prompt)?
        .input_image(args.image.clone().unwrap_or_default())
        .build()
        .context("Invalid generation parameters")?;

    let mut runner_config = config.settings().runner_config();
    if args.show_output {
        runner_config = runner_config.with_output_mirror(Arc::new(|line: &str| eprintln!("{}", line)));
    }
    let pipeline = GenerationPipeline::with_runner_config(runner_config);

    match args.model_path(config.settings()) {
        Some(model) => {
            if pipeline.load_model(&model) {
                config.settings_mut().model.model_path = model.to_string_lossy().into_owned();
            } else {
                eprintln!("Failed to load model from {}", model.display());
            }
        }
        None => eprintln!("No model selected. Pass --model <path>."),
    }

    let (listener, mut events) = progress::channel(64);
    pipeline.set_progress_listener(listener);
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            eprintln!("[{:>3.0}%] {}", event.percentage().min(100.0), event.message);
        }
    });

    let cancel = CancelHandle::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Cancelling...");
                cancel.cancel();
            }
        })
    };

    let result = pipeline.generate_video(&request, &cancel).await;

    ctrl_c.abort();
    pipeline.clear_progress_listener();
    let _ = printer.await;

    report(&result);
    remember(&mut config, &args);

    Ok(result.is_success())
}

fn report(result: &GenerationResult) {
    match (result.is_success(), result.video_path()) {
        (true, Some(path)) => println!(
            "Video saved to {} ({:.1} MB in {:.1}s)",
            path.display(),
            result.file_size_bytes() as f64 / (1024.0 * 1024.0),
            result.processing_time().as_secs_f64()
        ),
        _ => eprintln!(
            "Generation failed: {}",
            result.error_message().unwrap_or("unknown error")
        ),
    }
}

/// Persist the model and generation sections.
fn remember(config: &mut ConfigManager, args: &CliArgs) {
    let generation = &mut config.settings_mut().generation;
    generation.add_recent_prompt(&args.prompt);
    if let Some(image) = &args.image {
        generation.last_input_image_path = image.to_string_lossy().into_owned();
    }

    for section in [ConfigSection::Model, ConfigSection::Generation] {
        if let Err(e) = config.update_section(section) {
            tracing::warn!("Failed to save {} settings: {}", section.table_name(), e);
        }
    }
}
