//! Extracted-text review buffer

/// Editable copy of the recognized text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextReview {
    original: String,
    /// Bound directly to the modal's text area
    pub buffer: String,
}

impl TextReview {
    /// Seed the buffer from a recognition result
    pub fn new(recognized: impl Into<String>) -> Self {
        let original = recognized.into();
        Self {
            buffer: original.clone(),
            original,
        }
    }

    /// Text as the engine returned it
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Current, possibly edited, text
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_edited(&self) -> bool {
        self.buffer != self.original
    }

    /// Throw away edits
    pub fn reset(&mut self) {
        self.buffer = self.original.clone();
    }
}
