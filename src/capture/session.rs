//! OCR capture modal state
//!
//! `Empty -> ImageLoaded -> Recognizing -> TextReady -> Committed`, with a
//! failed recognition falling back to `ImageLoaded`. The phase is derived from
//! what the session holds, so it can never disagree with the data.

use thiserror::Error;
use tracing::debug;

use super::acquisition::UploadedImage;
use super::review::TextReview;
use crate::insertion::{InsertionMode, InsertionTarget};
use crate::recognition::{JobId, RecognitionEvent, RecognitionEventKind};

/// Where the modal is in the capture flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Empty,
    ImageLoaded,
    Recognizing,
    TextReady,
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    Running,
    Done,
    Failed,
}

/// The session's view of its recognition job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionJob {
    pub id: JobId,
    /// 0-100
    pub progress: u8,
    pub status: JobStatus,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no image loaded")]
    NoImage,
    #[error("recognition is already running")]
    AlreadyRecognizing,
    #[error("no recognized text to commit")]
    NothingToCommit,
    #[error("capture already committed")]
    AlreadyCommitted,
}

/// Text ready to be written into the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub target: InsertionTarget,
    pub mode: InsertionMode,
    pub text: String,
}

/// State of one open capture modal
#[derive(Debug)]
pub struct CaptureSession {
    target: InsertionTarget,
    image: Option<UploadedImage>,
    job: Option<RecognitionJob>,
    review: Option<TextReview>,
    last_error: Option<String>,
    committed: bool,
}

impl CaptureSession {
    /// Open a session writing into `target`
    pub fn new(target: InsertionTarget) -> Self {
        Self {
            target,
            image: None,
            job: None,
            review: None,
            last_error: None,
            committed: false,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        if self.committed {
            CapturePhase::Committed
        } else if self.review.is_some() {
            CapturePhase::TextReady
        } else if self.running_job().is_some() {
            CapturePhase::Recognizing
        } else if self.image.is_some() {
            CapturePhase::ImageLoaded
        } else {
            CapturePhase::Empty
        }
    }

    pub fn target(&self) -> &InsertionTarget {
        &self.target
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn job(&self) -> Option<&RecognitionJob> {
        self.job.as_ref()
    }

    pub fn review(&self) -> Option<&TextReview> {
        self.review.as_ref()
    }

    pub fn review_mut(&mut self) -> Option<&mut TextReview> {
        self.review.as_mut()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Id of the job still in flight, if any
    pub fn running_job(&self) -> Option<JobId> {
        self.job
            .as_ref()
            .filter(|j| j.status == JobStatus::Running)
            .map(|j| j.id)
    }

    /// Replace the current image, dropping preview, text and job.
    ///
    /// Returns the job this invalidated so the caller can cancel it.
    pub fn load_image(&mut self, image: UploadedImage) -> Result<Option<JobId>, SessionError> {
        if self.committed {
            return Err(SessionError::AlreadyCommitted);
        }
        let invalidated = self.reset();
        debug!("Capture image loaded: {}", image.original.name);
        self.image = Some(image);
        Ok(invalidated)
    }

    /// Record that `job` is now recognizing the loaded image
    pub fn begin_recognition(&mut self, job: JobId) -> Result<(), SessionError> {
        if self.committed {
            return Err(SessionError::AlreadyCommitted);
        }
        if self.image.is_none() {
            return Err(SessionError::NoImage);
        }
        if self.running_job().is_some() {
            return Err(SessionError::AlreadyRecognizing);
        }
        self.review = None;
        self.last_error = None;
        self.job = Some(RecognitionJob {
            id: job,
            progress: 0,
            status: JobStatus::Running,
        });
        Ok(())
    }

    /// Fold a job event into the session. Returns false for events of other jobs.
    pub fn apply_event(&mut self, event: &RecognitionEvent) -> bool {
        let Some(job) = self.job.as_mut() else {
            return false;
        };
        if job.id != event.job || job.status != JobStatus::Running {
            return false;
        }

        match &event.kind {
            RecognitionEventKind::Progress(percent) => {
                job.progress = job.progress.max((*percent).min(100));
            }
            RecognitionEventKind::Completed(text) => {
                job.status = JobStatus::Done;
                job.progress = 100;
                self.review = Some(TextReview::new(text.clone()));
            }
            RecognitionEventKind::Failed(message) => {
                job.status = JobStatus::Failed;
                self.last_error = Some(format!("Text extraction failed: {}", message));
            }
            RecognitionEventKind::Cancelled => {
                job.status = JobStatus::Idle;
                job.progress = 0;
            }
        }
        true
    }

    /// Drop the image and everything derived from it
    pub fn discard_image(&mut self) -> Option<JobId> {
        self.reset()
    }

    /// Package the reviewed text for insertion. The session stays open until
    /// `mark_committed`, so a failed insertion can be retried or copied.
    pub fn prepare_commit(&self, mode: InsertionMode) -> Result<CommitRequest, SessionError> {
        if self.committed {
            return Err(SessionError::AlreadyCommitted);
        }
        let review = self.review.as_ref().ok_or(SessionError::NothingToCommit)?;
        Ok(CommitRequest {
            target: self.target.clone(),
            mode,
            text: review.text().to_string(),
        })
    }

    pub fn mark_committed(&mut self) {
        self.committed = true;
    }

    fn reset(&mut self) -> Option<JobId> {
        let invalidated = self.running_job();
        self.image = None;
        self.job = None;
        self.review = None;
        self.last_error = None;
        invalidated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::acquisition::{accept_image, tests::png_bytes};

    fn target() -> InsertionTarget {
        InsertionTarget::QuestionText {
            question_id: "q-bio-3".to_string(),
        }
    }

    fn image(name: &str) -> UploadedImage {
        accept_image(name, png_bytes(2, 2), 64).unwrap()
    }

    fn event(job: JobId, kind: RecognitionEventKind) -> RecognitionEvent {
        RecognitionEvent { job, kind }
    }

    #[test]
    fn test_happy_path_phases() {
        let mut session = CaptureSession::new(target());
        assert_eq!(session.phase(), CapturePhase::Empty);

        assert_eq!(session.load_image(image("photo.png")), Ok(None));
        assert_eq!(session.phase(), CapturePhase::ImageLoaded);

        let job = JobId::new();
        session.begin_recognition(job).unwrap();
        assert_eq!(session.phase(), CapturePhase::Recognizing);

        assert!(session.apply_event(&event(job, RecognitionEventKind::Progress(30))));
        assert_eq!(session.job().unwrap().progress, 30);

        assert!(session.apply_event(&event(job, RecognitionEventKind::Completed("Mitochondria".into()))));
        assert_eq!(session.phase(), CapturePhase::TextReady);
        assert_eq!(session.job().unwrap().progress, 100);
        assert_eq!(session.review().unwrap().text(), "Mitochondria");

        let request = session.prepare_commit(InsertionMode::Append).unwrap();
        assert_eq!(request.text, "Mitochondria");
        assert_eq!(request.target, target());

        session.mark_committed();
        assert_eq!(session.phase(), CapturePhase::Committed);
        assert_eq!(session.prepare_commit(InsertionMode::Replace), Err(SessionError::AlreadyCommitted));
    }

    #[test]
    fn test_new_image_clears_previous_result() {
        let mut session = CaptureSession::new(target());
        session.load_image(image("first.png")).unwrap();
        let first = JobId::new();
        session.begin_recognition(first).unwrap();
        session.apply_event(&event(first, RecognitionEventKind::Completed("old".into())));

        session.load_image(image("second.png")).unwrap();

        assert!(session.review().is_none());
        assert!(session.job().is_none());
        assert_eq!(session.image().unwrap().original.name, "second.png");
        assert_eq!(session.phase(), CapturePhase::ImageLoaded);
    }

    #[test]
    fn test_new_image_invalidates_running_job() {
        let mut session = CaptureSession::new(target());
        session.load_image(image("first.png")).unwrap();
        let first = JobId::new();
        session.begin_recognition(first).unwrap();

        assert_eq!(session.load_image(image("second.png")), Ok(Some(first)));

        let second = JobId::new();
        session.begin_recognition(second).unwrap();
        assert!(!session.apply_event(&event(first, RecognitionEventKind::Completed("stale".into()))));
        assert!(session.review().is_none());
        assert_eq!(session.running_job(), Some(second));
    }

    #[test]
    fn test_failure_keeps_image_and_allows_retry() {
        let mut session = CaptureSession::new(target());
        session.load_image(image("photo.png")).unwrap();
        let job = JobId::new();
        session.begin_recognition(job).unwrap();

        session.apply_event(&event(job, RecognitionEventKind::Failed("engine crashed".into())));

        assert_eq!(session.phase(), CapturePhase::ImageLoaded);
        assert!(session.image().is_some());
        assert_eq!(session.job().unwrap().status, JobStatus::Failed);
        assert!(session.last_error().unwrap().contains("engine crashed"));
        assert_eq!(session.prepare_commit(InsertionMode::Replace), Err(SessionError::NothingToCommit));

        let retry = JobId::new();
        session.begin_recognition(retry).unwrap();
        assert!(session.last_error().is_none());
        assert_eq!(session.phase(), CapturePhase::Recognizing);
    }

    #[test]
    fn test_cannot_recognize_without_image_or_twice() {
        let mut session = CaptureSession::new(target());
        assert_eq!(session.begin_recognition(JobId::new()), Err(SessionError::NoImage));

        session.load_image(image("photo.png")).unwrap();
        session.begin_recognition(JobId::new()).unwrap();
        assert_eq!(
            session.begin_recognition(JobId::new()),
            Err(SessionError::AlreadyRecognizing)
        );
    }

    #[test]
    fn test_discard_returns_to_empty() {
        let mut session = CaptureSession::new(target());
        session.load_image(image("photo.png")).unwrap();
        let job = JobId::new();
        session.begin_recognition(job).unwrap();

        assert_eq!(session.discard_image(), Some(job));
        assert_eq!(session.phase(), CapturePhase::Empty);
        assert!(!session.apply_event(&event(job, RecognitionEventKind::Progress(50))));
    }

    #[test]
    fn test_progress_never_goes_backwards() {
        let mut session = CaptureSession::new(target());
        session.load_image(image("photo.png")).unwrap();
        let job = JobId::new();
        session.begin_recognition(job).unwrap();

        session.apply_event(&event(job, RecognitionEventKind::Progress(60)));
        session.apply_event(&event(job, RecognitionEventKind::Progress(20)));
        assert_eq!(session.job().unwrap().progress, 60);
    }

    #[test]
    fn test_cancelled_job_returns_to_image_loaded() {
        let mut session = CaptureSession::new(target());
        session.load_image(image("photo.png")).unwrap();
        let job = JobId::new();
        session.begin_recognition(job).unwrap();

        session.apply_event(&event(job, RecognitionEventKind::Cancelled));
        assert_eq!(session.phase(), CapturePhase::ImageLoaded);
        assert_eq!(session.job().unwrap().status, JobStatus::Idle);
    }

    #[test]
    fn test_committed_session_rejects_new_images() {
        let mut session = CaptureSession::new(target());
        session.mark_committed();
        assert!(matches!(
            session.load_image(image("late.png")),
            Err(SessionError::AlreadyCommitted)
        ));
    }
}
