//! Collaborator boundaries for the processing loop.
//!
//! Each collaborator is a single blocking call to an external service.
//! The processor only knows these traits; production wires in the OpenAI
//! clients, tests wire in fakes.

mod denoise;
mod openai;
mod playback;

pub use denoise::NoiseGate;
pub use openai::{OpenAiClient, OpenAiResponder, OpenAiSynthesizer, OpenAiTranscriber, OpenAiVision};
pub use playback::play_pcm16;

use crate::error::Error;
use std::path::Path;
use std::sync::Arc;

/// Turns a persisted audio file into text. Empty results are an error.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio_path: &Path) -> Result<String, Error>;
}

/// Generates the assistant's reply, maintaining an append-only
/// conversation history across calls within one session.
pub trait Responder: Send + Sync {
    fn respond(&self, user_text: &str) -> Result<String, Error>;
}

/// Synthesizes text to audio and plays it immediately.
pub trait Synthesizer: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), Error>;
}

/// Analyzes a persisted camera frame and returns a textual description.
pub trait VisionAnalyzer: Send + Sync {
    fn analyze(&self, image_path: &Path) -> Result<String, Error>;
}

/// Cleans up a captured buffer before transcription.
/// Contract: same-shape buffer in, same-shape buffer out.
pub trait Denoiser: Send + Sync {
    fn denoise(&self, samples: &[f32]) -> Result<Vec<f32>, Error>;
}

/// The full set of collaborators the processor needs for one session.
#[derive(Clone)]
pub struct Collaborators {
    pub transcriber: Arc<dyn Transcriber>,
    pub responder: Arc<dyn Responder>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub vision: Arc<dyn VisionAnalyzer>,
    pub denoiser: Arc<dyn Denoiser>,
}

/// The fixed set of synthesis voices the remote API accepts. Anything
/// outside this enum is rejected before the request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Voice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub fn as_str(self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }

    pub fn parse(value: &str) -> Result<Self, Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "alloy" => Ok(Voice::Alloy),
            "echo" => Ok(Voice::Echo),
            "fable" => Ok(Voice::Fable),
            "onyx" => Ok(Voice::Onyx),
            "nova" => Ok(Voice::Nova),
            "shimmer" => Ok(Voice::Shimmer),
            other => Err(Error::Validation(format!(
                "invalid voice '{other}'; choose from alloy, echo, fable, onyx, nova, shimmer"
            ))),
        }
    }
}
