//! Demo OCR backend
//!
//! Returns a fixed transcription after a delay. Lets the capture flow run on
//! machines without an OCR engine installed.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{OcrEngine, OcrWorker, RecognitionError};
use crate::capture::acquisition::ImageFile;

pub struct DemoEngine {
    text: String,
    delay: Duration,
}

impl DemoEngine {
    pub fn new(text: impl Into<String>, delay: Duration) -> Self {
        Self {
            text: text.into(),
            delay,
        }
    }
}

#[async_trait]
impl OcrEngine for DemoEngine {
    fn name(&self) -> &str {
        "demo"
    }

    async fn start(&self, language: &str) -> Result<Box<dyn OcrWorker>, RecognitionError> {
        debug!("Demo OCR worker started ({})", language);
        Ok(Box::new(DemoWorker {
            text: self.text.clone(),
            delay: self.delay,
        }))
    }
}

struct DemoWorker {
    text: String,
    delay: Duration,
}

#[async_trait]
impl OcrWorker for DemoWorker {
    async fn recognize(&mut self, image: &ImageFile) -> Result<String, RecognitionError> {
        debug!("Demo OCR recognizing {}", image.name);
        tokio::time::sleep(self.delay).await;
        Ok(self.text.clone())
    }

    async fn terminate(&mut self) {
        debug!("Demo OCR worker terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::acquisition::{accept_image, tests::png_bytes};

    #[tokio::test]
    async fn test_demo_returns_configured_text() {
        let engine = DemoEngine::new("Mitochondria", Duration::from_millis(5));
        let image = accept_image("photo.png", png_bytes(2, 2), 64).unwrap().original;

        let mut worker = engine.start("eng").await.unwrap();
        let text = worker.recognize(&image).await.unwrap();
        worker.terminate().await;

        assert_eq!(text, "Mitochondria");
    }
}
