use super::{AppConfig, SessionConfig};
use anyhow::{bail, Result};
use clap::Parser;

const MIN_RECORD_SECONDS: u64 = 1;
const MAX_RECORD_SECONDS: u64 = 60;
const MIN_MAX_TOKENS: u32 = 16;
const MAX_MAX_TOKENS: u32 = 4096;
const MAX_NAME_LEN: usize = 64;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize strings.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_RECORD_SECONDS..=MAX_RECORD_SECONDS).contains(&self.seconds) {
            bail!(
                "--seconds must be between {MIN_RECORD_SECONDS} and {MAX_RECORD_SECONDS}, got {}",
                self.seconds
            );
        }

        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
            bail!(
                "--max-tokens must be between {MIN_MAX_TOKENS} and {MAX_MAX_TOKENS}, got {}",
                self.max_tokens
            );
        }

        self.user_name = sanitize_name(&self.user_name, "--user-name")?;
        self.bot_name = sanitize_name(&self.bot_name, "--bot-name")?;

        // Key validity is the server's call; we only reject the obviously
        // unusable values before any request is made.
        if !self.list_input_devices && self.api_key.trim().is_empty() {
            bail!("an API key is required; pass --api-key or set OPENAI_API_KEY");
        }

        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            bail!(
                "--api-base-url must start with http:// or https://, got '{}'",
                self.api_base_url
            );
        }

        for (flag, model) in [
            ("--chat-model", &self.chat_model),
            ("--transcription-model", &self.transcription_model),
            ("--speech-model", &self.speech_model),
            ("--vision-model", &self.vision_model),
        ] {
            if model.trim().is_empty() {
                bail!("{flag} must not be empty");
            }
        }

        if let Some(device) = &self.input_device {
            if device.trim().is_empty() {
                bail!("--input-device must not be empty when provided");
            }
            if device.len() > 256 || device.chars().any(|ch| matches!(ch, '\n' | '\r')) {
                bail!("--input-device must be <=256 characters with no control characters");
            }
        }

        Ok(())
    }

    /// Snapshot the validated settings the pipeline consumes.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            user_name: self.user_name.clone(),
            bot_name: self.bot_name.clone(),
            input_device: self.input_device.clone(),
            capture_secs: self.seconds,
            voice: self.voice,
        }
    }
}

/// Names end up inside spoken prompts, so keep them short and printable.
pub(super) fn sanitize_name(value: &str, flag: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} must not be empty");
    }
    if trimmed.len() > MAX_NAME_LEN {
        bail!("{flag} must be at most {MAX_NAME_LEN} characters");
    }
    if trimmed.chars().any(char::is_control) {
        bail!("{flag} must not contain control characters");
    }
    Ok(trimmed.to_string())
}
