//! Recognition Engine Adapter
//!
//! Wraps an external OCR capability behind two small async traits and runs
//! one recognition job per uploaded image. Supported backends:
//! - `tesseract` command line tool
//! - Demo engine returning canned text

pub mod demo;
pub mod progress;
pub mod service;
pub mod tesseract;

pub use demo::DemoEngine;
pub use progress::SyntheticProgress;
pub use service::{JobHandle, JobOptions, RecognitionEvent, RecognitionEventKind, RecognitionService};
pub use tesseract::TesseractEngine;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::capture::acquisition::ImageFile;
use crate::config::{OcrBackend, OcrSettings};

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("recognition failed: {0}")]
    Engine(String),
    #[error("OCR engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Identifies one recognition job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell jobs apart in logs
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// An OCR capability that can spin up workers for a language model
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Backend name for logs and the dashboard
    fn name(&self) -> &str;

    /// Initialize a worker for `language`
    async fn start(&self, language: &str) -> Result<Box<dyn OcrWorker>, RecognitionError>;
}

/// A started engine instance. Must be terminated after use.
#[async_trait]
pub trait OcrWorker: Send {
    /// Transcribe the image to plain text
    async fn recognize(&mut self, image: &ImageFile) -> Result<String, RecognitionError>;

    /// Release engine resources
    async fn terminate(&mut self);
}

/// Build the engine selected in settings
pub fn create_engine(settings: &OcrSettings) -> Arc<dyn OcrEngine> {
    match settings.backend {
        OcrBackend::Tesseract => Arc::new(TesseractEngine::new(&settings.tesseract_path)),
        OcrBackend::Demo => Arc::new(DemoEngine::new(
            settings.demo_text.clone(),
            Duration::from_millis(settings.demo_delay_ms),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_engine_follows_backend() {
        let mut settings = OcrSettings::default();
        assert_eq!(create_engine(&settings).name(), "tesseract");

        settings.backend = OcrBackend::Demo;
        assert_eq!(create_engine(&settings).name(), "demo");
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 8);
    }
}
