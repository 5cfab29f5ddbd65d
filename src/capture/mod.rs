//! OCR Capture Workflow
//!
//! Image acquisition, extracted-text review and the modal state machine that
//! ties them to a recognition job. Also holds the size-capped attachment check
//! used by the builder.

pub mod acquisition;
pub mod attachment;
pub mod review;
pub mod session;

pub use acquisition::{accept_image, accept_image_path, AcquisitionError, ImageFile, ImagePreview, UploadedImage};
pub use attachment::{Attachment, AttachmentError, AttachmentPolicy};
pub use review::TextReview;
pub use session::{CapturePhase, CaptureSession, CommitRequest, JobStatus, RecognitionJob, SessionError};
