//! Error taxonomy for the capture/VAD pipeline and its collaborators.
//!
//! Collaborator and device failures are caught at the owning loop and
//! reported; none of them propagate past the loop or end the session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Microphone or camera unavailable. Fatal to the loop that owns the
    /// device; sibling loops keep running until the stop flag is set.
    #[error("device unavailable: {0}")]
    Device(String),

    /// Remote transcription failed, the audio file is missing, or the
    /// result text was empty.
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// Remote response generation failed.
    #[error("response generation failed: {0}")]
    Generation(String),

    /// Remote speech synthesis or local playback failed.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// Remote image analysis failed.
    #[error("image analysis failed: {0}")]
    Analysis(String),

    /// `capture_frame` was called without a preceding `open`. Reported,
    /// never a crash.
    #[error("camera is not open")]
    CameraNotOpen,

    /// Input rejected before any remote call (empty buffer, bad selector).
    #[error("invalid input: {0}")]
    Validation(String),
}

impl Error {
    /// Short label for log lines and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Device(_) => "device",
            Error::Transcription(_) => "transcription",
            Error::Generation(_) => "generation",
            Error::Synthesis(_) => "synthesis",
            Error::Analysis(_) => "analysis",
            Error::CameraNotOpen => "camera_not_open",
            Error::Validation(_) => "validation",
        }
    }

    /// True when the owning loop cannot usefully continue.
    pub fn is_fatal_to_loop(&self) -> bool {
        matches!(self, Error::Device(_))
    }
}
