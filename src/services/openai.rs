//! OpenAI-backed collaborator implementations.
//!
//! Every call is blocking; the processing loop runs on its own thread and
//! tolerates unbounded network latency, so no async runtime is involved.

use super::{playback::play_pcm16, Responder, Synthesizer, Transcriber, VisionAnalyzer, Voice};
use crate::app::log_debug;
use crate::error::Error;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::blocking::multipart;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// TTS PCM output rate documented by the speech endpoint.
const TTS_PCM_RATE: u32 = 24_000;

/// Shared HTTP client plus credentials for all OpenAI-backed services.
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::blocking::Response, String> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|err| format!("request to {path} failed: {err}"))?;
        check_status(path, response)
    }
}

fn check_status(
    path: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(format!("{path} returned {status}: {snippet}"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// `audio/transcriptions` wrapper.
pub struct OpenAiTranscriber {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(client: Arc<OpenAiClient>, model: String) -> Self {
        Self { client, model }
    }
}

impl Transcriber for OpenAiTranscriber {
    fn transcribe(&self, audio_path: &Path) -> Result<String, Error> {
        if !audio_path.exists() {
            return Err(Error::Transcription(format!(
                "audio file '{}' does not exist",
                audio_path.display()
            )));
        }

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .file("file", audio_path)
            .map_err(|err| Error::Transcription(format!("failed to attach audio file: {err}")))?;

        let response = self
            .client
            .http
            .post(self.client.endpoint("audio/transcriptions"))
            .bearer_auth(&self.client.api_key)
            .multipart(form)
            .send()
            .map_err(|err| Error::Transcription(err.to_string()))?;
        let response = check_status("audio/transcriptions", response)
            .map_err(Error::Transcription)?;

        let parsed: TranscriptionResponse = response
            .json()
            .map_err(|err| Error::Transcription(format!("malformed response: {err}")))?;
        let text = parsed.text.trim().to_string();
        if text.is_empty() {
            return Err(Error::Transcription("the transcription is empty".into()));
        }
        Ok(text)
    }
}

/// `chat/completions` wrapper with an append-only session history.
///
/// The user turn is appended before the call and the assistant turn after,
/// so the history always reflects what the model actually saw.
pub struct OpenAiResponder {
    client: Arc<OpenAiClient>,
    model: String,
    max_tokens: u32,
    history: Mutex<Vec<ChatMessage>>,
}

impl OpenAiResponder {
    pub fn new(client: Arc<OpenAiClient>, model: String, max_tokens: u32) -> Self {
        Self {
            client,
            model,
            max_tokens,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn clear_history(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }
}

impl Responder for OpenAiResponder {
    fn respond(&self, user_text: &str) -> Result<String, Error> {
        let mut history = self
            .history
            .lock()
            .map_err(|_| Error::Generation("conversation history lock poisoned".into()))?;
        history.push(ChatMessage {
            role: "user".into(),
            content: user_text.to_string(),
        });

        let request = ChatRequest {
            model: &self.model,
            messages: &history,
            max_tokens: self.max_tokens,
        };
        let response = self
            .client
            .post_json("chat/completions", &request)
            .map_err(Error::Generation)?;
        let parsed: ChatResponse = response
            .json()
            .map_err(|err| Error::Generation(format!("malformed response: {err}")))?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if reply.trim().is_empty() {
            return Err(Error::Generation("model returned an empty reply".into()));
        }

        history.push(ChatMessage {
            role: "assistant".into(),
            content: reply.clone(),
        });
        Ok(reply)
    }
}

/// `audio/speech` wrapper that plays the returned PCM immediately.
pub struct OpenAiSynthesizer {
    client: Arc<OpenAiClient>,
    model: String,
    voice: Voice,
}

impl OpenAiSynthesizer {
    pub fn new(client: Arc<OpenAiClient>, model: String, voice: Voice) -> Self {
        Self {
            client,
            model,
            voice,
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

impl Synthesizer for OpenAiSynthesizer {
    fn speak(&self, text: &str) -> Result<(), Error> {
        if text.trim().is_empty() {
            return Err(Error::Validation("cannot synthesize empty text".into()));
        }

        // PCM avoids a local codec: 16-bit little-endian mono at 24 kHz.
        let request = SpeechRequest {
            model: &self.model,
            voice: self.voice.as_str(),
            input: text,
            response_format: "pcm",
        };
        let response = self
            .client
            .post_json("audio/speech", &request)
            .map_err(Error::Synthesis)?;
        let audio = response
            .bytes()
            .map_err(|err| Error::Synthesis(format!("failed to read audio body: {err}")))?;

        log_debug(&format!("synthesized {} bytes of speech", audio.len()));
        play_pcm16(&audio, TTS_PCM_RATE)
    }
}

/// Image analysis through `chat/completions` with a base64 data URI.
pub struct OpenAiVision {
    client: Arc<OpenAiClient>,
    model: String,
    max_tokens: u32,
}

impl OpenAiVision {
    pub fn new(client: Arc<OpenAiClient>, model: String, max_tokens: u32) -> Self {
        Self {
            client,
            model,
            max_tokens,
        }
    }
}

impl VisionAnalyzer for OpenAiVision {
    fn analyze(&self, image_path: &Path) -> Result<String, Error> {
        let bytes = std::fs::read(image_path).map_err(|err| {
            Error::Analysis(format!(
                "failed to read image '{}': {err}",
                image_path.display()
            ))
        })?;
        let encoded = BASE64.encode(&bytes);

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "Describe what the camera is seeing."},
                    {"type": "image_url", "image_url": {
                        "url": format!("data:image/jpeg;base64,{encoded}")
                    }}
                ]
            }],
            "max_tokens": self.max_tokens,
        });
        let response = self
            .client
            .post_json("chat/completions", &payload)
            .map_err(Error::Analysis)?;
        let parsed: ChatResponse = response
            .json()
            .map_err(|err| Error::Analysis(format!("malformed response: {err}")))?;
        let description = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if description.trim().is_empty() {
            return Err(Error::Analysis("model returned no description".into()));
        }
        Ok(description)
    }
}
