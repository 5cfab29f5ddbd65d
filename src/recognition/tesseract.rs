//! Tesseract OCR backend
//!
//! Drives the `tesseract` command line tool. Image bytes go in on stdin and
//! the transcription comes back on stdout, so no temporary files are needed.
//! Child processes are killed if the recognition future is dropped.

use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::{OcrEngine, OcrWorker, RecognitionError};
use crate::capture::acquisition::ImageFile;

/// OCR engine wrapping the `tesseract` CLI tool
pub struct TesseractEngine {
    binary: String,
}

impl TesseractEngine {
    /// `binary` is a path or a name looked up on `PATH`
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn start(&self, language: &str) -> Result<Box<dyn OcrWorker>, RecognitionError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                RecognitionError::EngineUnavailable(format!("cannot run {}: {}", self.binary, e))
            })?;
        check_for_command_failure(&self.binary, &output)
            .map_err(|e| RecognitionError::EngineUnavailable(e.to_string()))?;

        // Older releases print the version on stderr
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        let version = String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        info!("Starting tesseract worker ({}, language {})", version, language);

        Ok(Box::new(TesseractWorker {
            binary: self.binary.clone(),
            language: language.to_string(),
        }))
    }
}

struct TesseractWorker {
    binary: String,
    language: String,
}

#[async_trait]
impl OcrWorker for TesseractWorker {
    async fn recognize(&mut self, image: &ImageFile) -> Result<String, RecognitionError> {
        debug!("tesseract: {} ({} bytes)", image.name, image.bytes.len());

        let mut child = Command::new(&self.binary)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RecognitionError::EngineUnavailable(format!("cannot run {}: {}", self.binary, e))
            })?;

        // Fed while stdout and stderr are drained, so a child that exits
        // early cannot hide its stderr behind a broken pipe
        let stdin = child.stdin.take();
        let bytes = image.bytes.clone();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&bytes).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output?;
        check_for_command_failure(&self.binary, &output)?;
        fed?;

        Ok(clean_transcription(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn terminate(&mut self) {
        // Each recognition runs in its own process, nothing is left running here
        debug!("tesseract worker ({}) terminated", self.language);
    }
}

fn check_for_command_failure(binary: &str, output: &Output) -> Result<(), RecognitionError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(RecognitionError::Engine(format!(
        "{} exited with {}: {}",
        binary,
        output.status,
        stderr.trim()
    )))
}

/// Drop the trailing page break and blank lines tesseract emits
fn clean_transcription(raw: &str) -> String {
    raw.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_transcription_strips_page_break() {
        assert_eq!(clean_transcription("Mitochondria\n\n\u{c}"), "Mitochondria");
        assert_eq!(clean_transcription("  indented\nsecond\n"), "  indented\nsecond");
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let engine = TesseractEngine::new("/nonexistent/bin/tesseract-missing");
        let result = engine.start("eng").await;
        assert!(matches!(result, Err(RecognitionError::EngineUnavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_stderr_wins_over_unread_stdin() {
        use image::ImageFormat;
        use std::os::unix::fs::PermissionsExt;
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("tesseract");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             if [ \"$1\" = \"--version\" ]; then echo \"tesseract 5.3.0\"; exit 0; fi\n\
             echo \"Failed loading language 'xyz'\" >&2\n\
             exit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let engine = TesseractEngine::new(script.to_str().unwrap());
        let mut worker = engine.start("xyz").await.unwrap();

        // Far more than a pipe buffer; the script never reads it
        let image = ImageFile {
            name: "scan.png".to_string(),
            format: ImageFormat::Png,
            bytes: Arc::from(vec![0u8; 2 * 1024 * 1024]),
        };
        let result = worker.recognize(&image).await;
        worker.terminate().await;

        match result {
            Err(RecognitionError::Engine(message)) => {
                assert!(message.contains("Failed loading language 'xyz'"), "{}", message)
            }
            other => panic!("expected engine error, got {:?}", other),
        }
    }
}
