//! QuizForge - Assessment builder with OCR text capture
//!
//! Teachers author tests and questions, and can fill any question field by
//! photographing printed material and reviewing the recognized text.

mod app;
mod assessment;
mod capture;
mod config;
mod dashboard;
mod insertion;
mod recognition;
mod shared;

use anyhow::{bail, Context, Result};
use clap::Parser;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::capture::accept_image_path;
use crate::config::{AppConfig, OcrBackend};
use crate::recognition::{create_engine, JobOptions, RecognitionEventKind, RecognitionService};
use crate::shared::SharedAppState;

/// Upper bound for a headless recognition job
const HEADLESS_TIMEOUT: Duration = Duration::from_secs(120);

/// QuizForge - Assessment builder with OCR capture
#[derive(Parser, Debug)]
#[command(name = "quizforge")]
#[command(about = "Build tests and fill question fields from photographed text")]
struct Args {
    /// Recognize one image, print its text and exit
    #[arg(long, value_name = "IMAGE")]
    ocr: Option<PathBuf>,

    /// Override the configured OCR backend
    #[arg(long, value_enum)]
    backend: Option<OcrBackend>,

    /// Override the configured OCR language (e.g. "eng")
    #[arg(long)]
    language: Option<String>,

    /// Use this config file instead of the platform default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config_path = args.config.clone().or_else(|| config::default_config_path().ok());
    let mut config = load_or_create_config(config_path.as_deref());
    if let Some(backend) = args.backend {
        config.ocr.backend = backend;
    }
    if let Some(language) = &args.language {
        config.ocr.language = language.clone();
    }

    if let Some(image) = &args.ocr {
        return run_headless_ocr(image, &config);
    }

    info!("QuizForge starting...");
    let shared_state = Arc::new(RwLock::new(SharedAppState::new(config, config_path)));

    // Run the dashboard (blocking)
    if let Err(e) = dashboard::app::run_dashboard(shared_state) {
        tracing::error!("Dashboard error: {}", e);
    }

    info!("QuizForge shutdown complete");
    Ok(())
}

/// Load configuration from file or fall back to defaults
fn load_or_create_config(path: Option<&Path>) -> AppConfig {
    if let Some(path) = path {
        if path.exists() {
            match config::load_config(path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    return config;
                }
                Err(e) => warn!("Ignoring invalid configuration {:?}: {:#}", path, e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Recognize a single image without opening a window
fn run_headless_ocr(path: &Path, config: &AppConfig) -> Result<()> {
    let uploaded = accept_image_path(path, config.ocr.preview_max_edge)
        .with_context(|| format!("Cannot use {:?} for OCR", path))?;

    let service = RecognitionService::new(create_engine(&config.ocr), JobOptions::from_settings(&config.ocr))?;
    info!(
        "Recognizing {} with {} ({})",
        uploaded.original.name,
        service.engine_name(),
        config.ocr.language
    );

    let job = service.start(uploaded.original);
    loop {
        let event = service
            .events()
            .recv_timeout(HEADLESS_TIMEOUT)
            .context("Timed out waiting for recognition")?;
        if event.job != job.id() {
            continue;
        }
        match event.kind {
            RecognitionEventKind::Progress(percent) => tracing::debug!("Progress {}%", percent),
            RecognitionEventKind::Completed(text) => {
                println!("{}", text);
                return Ok(());
            }
            RecognitionEventKind::Failed(message) => bail!("Text extraction failed: {}", message),
            RecognitionEventKind::Cancelled => bail!("Recognition was cancelled"),
        }
    }
}
