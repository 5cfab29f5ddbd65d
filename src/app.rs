//! Capture Workbench
//!
//! Coordinates the single open OCR capture session with the recognition
//! service and the shared assessment state. Used by both the dashboard and
//! the headless `--ocr` mode.

use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::capture::{
    accept_image, accept_image_path, AcquisitionError, CapturePhase, CaptureSession, SessionError,
    UploadedImage,
};
use crate::insertion::{apply_insertion, InsertionError, InsertionMode, InsertionTarget};
use crate::recognition::service::RepaintNotifier;
use crate::recognition::{
    create_engine, JobHandle, JobOptions, OcrEngine, RecognitionEvent, RecognitionEventKind,
    RecognitionService,
};
use crate::shared::{LastRecognition, SharedAppState};

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("no capture is open")]
    NoCapture,
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Insertion(#[from] InsertionError),
}

/// An open capture modal and its in-flight job
struct ActiveCapture {
    session: CaptureSession,
    job: Option<JobHandle>,
}

impl ActiveCapture {
    fn cancel_job(&mut self) {
        if let Some(job) = self.job.take() {
            debug!("Cancelling recognition job {}", job.id());
            job.cancel();
        }
    }
}

/// Main capture coordinator
pub struct Workbench {
    /// Shared state with the dashboard views
    shared_state: Arc<RwLock<SharedAppState>>,
    recognition: RecognitionService,
    capture: Option<ActiveCapture>,
}

impl Workbench {
    /// Create a workbench using the engine selected in the config
    pub fn new(shared_state: Arc<RwLock<SharedAppState>>) -> anyhow::Result<Self> {
        let settings = shared_state.read().config.ocr.clone();
        Self::with_engine(shared_state, create_engine(&settings))
    }

    /// Create a workbench with an explicit engine
    pub fn with_engine(
        shared_state: Arc<RwLock<SharedAppState>>,
        engine: Arc<dyn OcrEngine>,
    ) -> anyhow::Result<Self> {
        let options = JobOptions::from_settings(&shared_state.read().config.ocr);
        let recognition = RecognitionService::new(engine, options)?;
        info!("Workbench ready (OCR engine: {})", recognition.engine_name());

        Ok(Self {
            shared_state,
            recognition,
            capture: None,
        })
    }

    /// Get current shared state
    pub fn state(&self) -> Arc<RwLock<SharedAppState>> {
        self.shared_state.clone()
    }

    pub fn engine_name(&self) -> &str {
        self.recognition.engine_name()
    }

    pub fn set_repaint_notifier(&mut self, notifier: RepaintNotifier) {
        self.recognition.set_notifier(notifier);
    }

    /// Rebuild the engine after OCR settings changed
    pub fn reload_engine(&mut self) {
        let settings = self.shared_state.read().config.ocr.clone();
        self.recognition
            .set_engine(create_engine(&settings), JobOptions::from_settings(&settings));
    }

    /// Open the capture modal for `target`, closing any previous one
    pub fn open_capture(&mut self, target: InsertionTarget) {
        self.close_capture();
        info!("Opening OCR capture for {}", target);
        self.capture = Some(ActiveCapture {
            session: CaptureSession::new(target),
            job: None,
        });
    }

    /// Close the modal, cancelling any running recognition
    pub fn close_capture(&mut self) {
        if let Some(mut active) = self.capture.take() {
            active.cancel_job();
            debug!("Closed OCR capture for {}", active.session.target());
        }
    }

    pub fn capture(&self) -> Option<&CaptureSession> {
        self.capture.as_ref().map(|a| &a.session)
    }

    pub fn capture_mut(&mut self) -> Option<&mut CaptureSession> {
        self.capture.as_mut().map(|a| &mut a.session)
    }

    fn preview_max_edge(&self) -> u32 {
        self.shared_state.read().config.ocr.preview_max_edge
    }

    /// Accept dropped or picked image bytes and start recognizing them
    pub fn submit_image_bytes(&mut self, name: &str, bytes: impl Into<Arc<[u8]>>) -> Result<(), WorkbenchError> {
        if self.capture.is_none() {
            return Err(WorkbenchError::NoCapture);
        }
        let uploaded = accept_image(name, bytes, self.preview_max_edge())?;
        self.submit_uploaded(uploaded)
    }

    /// Accept an image file from disk and start recognizing it
    pub fn submit_image_path(&mut self, path: &Path) -> Result<(), WorkbenchError> {
        if self.capture.is_none() {
            return Err(WorkbenchError::NoCapture);
        }
        let uploaded = accept_image_path(path, self.preview_max_edge())?;
        self.submit_uploaded(uploaded)
    }

    fn submit_uploaded(&mut self, uploaded: UploadedImage) -> Result<(), WorkbenchError> {
        let active = self.capture.as_mut().ok_or(WorkbenchError::NoCapture)?;
        active.cancel_job();
        let original = uploaded.original.clone();
        active.session.load_image(uploaded)?;

        let handle = self.recognition.start(original);
        active.session.begin_recognition(handle.id())?;
        active.job = Some(handle);
        self.shared_state.write().runtime.jobs_started += 1;
        Ok(())
    }

    /// Recognize the loaded image again after a failure
    pub fn retry_recognition(&mut self) -> Result<(), WorkbenchError> {
        let active = self.capture.as_mut().ok_or(WorkbenchError::NoCapture)?;
        let original = active
            .session
            .image()
            .map(|image| image.original.clone())
            .ok_or(SessionError::NoImage)?;
        if active.session.running_job().is_some() {
            return Err(SessionError::AlreadyRecognizing.into());
        }

        let handle = self.recognition.start(original);
        active.session.begin_recognition(handle.id())?;
        active.job = Some(handle);
        self.shared_state.write().runtime.jobs_started += 1;
        Ok(())
    }

    /// Drop the loaded image and start over
    pub fn discard_image(&mut self) {
        if let Some(active) = self.capture.as_mut() {
            active.cancel_job();
            active.session.discard_image();
        }
    }

    /// Apply all pending job events. Returns how many were received.
    pub fn pump_events(&mut self) -> usize {
        let events: Vec<RecognitionEvent> = self.recognition.events().try_iter().collect();
        let count = events.len();
        for event in events {
            self.handle_event(event);
        }
        count
    }

    fn handle_event(&mut self, event: RecognitionEvent) {
        let Some(active) = self.capture.as_mut() else {
            debug!("Dropping event for job {}: no capture open", event.job);
            return;
        };
        if !active.session.apply_event(&event) {
            debug!("Ignoring event for stale job {}", event.job);
            return;
        }

        let outcome = match &event.kind {
            RecognitionEventKind::Progress(_) => return,
            RecognitionEventKind::Completed(_) => LastRecognition::Succeeded,
            RecognitionEventKind::Failed(_) => LastRecognition::Failed,
            RecognitionEventKind::Cancelled => LastRecognition::Cancelled,
        };
        active.job = None;

        let mut state = self.shared_state.write();
        state.runtime.last_recognition = Some(outcome);
        if let RecognitionEventKind::Failed(message) = &event.kind {
            state.runtime.set_error(format!("Text extraction failed: {}", message));
        }
    }

    /// Block until the open capture stops recognizing or `timeout` passes
    pub fn wait_for_capture(&mut self, timeout: Duration) -> Option<CapturePhase> {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump_events();
            let phase = self.capture().map(|s| s.phase());
            if phase != Some(CapturePhase::Recognizing) {
                return phase;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return phase;
            }
            if let Ok(event) = self.recognition.events().recv_timeout(remaining) {
                self.handle_event(event);
            }
        }
    }

    /// Write the reviewed text into the session's target and close the modal.
    ///
    /// If the target no longer exists the modal stays open with the error shown.
    pub fn commit(&mut self, mode: InsertionMode) -> Result<(), WorkbenchError> {
        let active = self.capture.as_mut().ok_or(WorkbenchError::NoCapture)?;
        let request = active.session.prepare_commit(mode)?;

        let mut state = self.shared_state.write();
        match apply_insertion(&state.assessment, &request.target, request.mode, &request.text) {
            Ok(next) => {
                state.commit_assessment(next);
                state.runtime.insertions += 1;
                state.runtime.set_notice(format!("Inserted text into {}", request.target.describe()));
                drop(state);

                info!("Committed OCR text to {} ({:?})", request.target, request.mode);
                active.session.mark_committed();
                self.capture = None;
                Ok(())
            }
            Err(e) => {
                warn!("Dropping OCR commit: {}", e);
                active.session.set_error(format!("Cannot insert text: {}", e));
                state.runtime.set_error(e.to_string());
                Err(e.into())
            }
        }
    }
}

impl Drop for Workbench {
    fn drop(&mut self) {
        self.close_capture();
    }
}
