//! Command-line parsing and validation helpers.

mod validation;

use crate::audio::CAPTURE_SECS;
use crate::services::Voice;
use clap::Parser;

/// Default chat model for response generation.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";

/// Default transcription model.
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Default speech synthesis model.
pub const DEFAULT_SPEECH_MODEL: &str = "tts-1";

/// Default image analysis model.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";

/// CLI options for the voice assistant. Validated values keep the device
/// setup and remote calls safe.
#[derive(Debug, Parser, Clone)]
#[command(about = "Voice-driven conversational assistant", author, version)]
pub struct AppConfig {
    /// Preferred audio input device name
    #[arg(long = "input-device")]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Name the assistant greets at startup
    #[arg(long = "user-name", default_value = "Bryan")]
    pub user_name: String,

    /// Name the assistant announces as its own
    #[arg(long = "bot-name", default_value = "AXEL")]
    pub bot_name: String,

    /// API key for the OpenAI-compatible endpoint
    #[arg(
        long = "api-key",
        env = "OPENAI_API_KEY",
        hide_env_values = true,
        default_value = ""
    )]
    pub api_key: String,

    /// Base URL for the OpenAI-compatible endpoint
    #[arg(long = "api-base-url", default_value = "https://api.openai.com/v1")]
    pub api_base_url: String,

    /// Chat model used for response generation
    #[arg(long = "chat-model", default_value = DEFAULT_CHAT_MODEL)]
    pub chat_model: String,

    /// Model used for transcription
    #[arg(long = "transcription-model", default_value = DEFAULT_TRANSCRIPTION_MODEL)]
    pub transcription_model: String,

    /// Model used for speech synthesis
    #[arg(long = "speech-model", default_value = DEFAULT_SPEECH_MODEL)]
    pub speech_model: String,

    /// Model used for image analysis
    #[arg(long = "vision-model", default_value = DEFAULT_VISION_MODEL)]
    pub vision_model: String,

    /// Synthesis voice
    #[arg(long, value_enum, default_value_t = Voice::Shimmer)]
    pub voice: Voice,

    /// Capture segment duration in seconds
    #[arg(long, default_value_t = CAPTURE_SECS)]
    pub seconds: u64,

    /// Maximum tokens per generated reply or image description
    #[arg(long = "max-tokens", default_value_t = 300)]
    pub max_tokens: u32,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "VOXCHAT_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "VOXCHAT_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging transcript/reply snippets (debug log only)
    #[arg(
        long = "log-content",
        env = "VOXCHAT_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

/// Snapshot of the validated settings the running session needs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_name: String,
    pub bot_name: String,
    pub input_device: Option<String>,
    pub capture_secs: u64,
    pub voice: Voice,
}
