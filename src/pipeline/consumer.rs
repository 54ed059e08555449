//! Processor loop: the consumer side of the speech queue.
//!
//! Drains buffers in FIFO order, gates them on the adaptive energy
//! threshold, and drives the collaborator chain: denoise -> persist ->
//! transcribe -> dispatch. Every collaborator failure is caught here,
//! reported with a fixed apology phrase, and the loop continues; no
//! single bad turn ends the session.
//!
//! The energy threshold is written by this loop and nowhere else. The
//! recorder's loudness gate and this energy gate read shared scalars at
//! unsynchronized times and may disagree on a given buffer: the recorder
//! only decides whether to emit a cue, this loop decides whether to
//! actually transcribe.

use crate::app::{log_debug, log_debug_content};
use crate::audio::{pre_emphasis_energy, AudioBuffer, CHANNELS};
use crate::error::Error;
use crate::services::Collaborators;
use crate::session::SharedSession;
use crossbeam_channel::RecvTimeoutError;
use regex::Regex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// How often the consumer re-checks the stop flag while the queue is idle.
const QUEUE_POLL: Duration = Duration::from_millis(200);

/// Fixed apology phrase for failed turns; nothing fails silently.
const APOLOGY: &str = "Sorry, I couldn't understand what you said. Please try again.";

/// Spoken while response generation is in flight.
const THINKING: &str = "Let me think for a moment.";

/// Exact-match command keywords recognized in a transcript, resolved
/// before the text is forwarded to response generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// "camera" or "analyze image": grab a frame and describe it.
    AnalyzeImage,
    /// "open camera".
    OpenCamera,
    /// "close camera".
    CloseCamera,
    /// Contains "play": media shortcut, acknowledged but not implemented.
    MediaShortcut,
    /// Anything else goes to response generation.
    Converse,
}

/// Classify a sanitized transcript.
pub fn parse_command(text: &str) -> Command {
    let normalized = text.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "camera" | "analyze image" => Command::AnalyzeImage,
        "open camera" => Command::OpenCamera,
        "close camera" => Command::CloseCamera,
        _ if normalized.contains("play") => Command::MediaShortcut,
        _ => Command::Converse,
    }
}

/// What one buffer turned into; used by tests to pin the control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty buffer, nothing to do.
    Skipped,
    /// Energy at or below the (freshly adjusted) threshold.
    Silence,
    /// Denoise or transcription failed, or the transcript was empty.
    NoTranscript,
    /// Transcript matched the last spoken reply: feedback-loop guard.
    Echoed,
    /// A command keyword was handled.
    Command(Command),
    /// The text went through generation and synthesis.
    Reply,
}

pub struct Processor {
    session: Arc<SharedSession>,
    collaborators: Collaborators,
    scratch_dir: PathBuf,
    turn_seq: AtomicU64,
}

impl Processor {
    pub fn new(session: Arc<SharedSession>, collaborators: Collaborators) -> Self {
        Self {
            session,
            collaborators,
            scratch_dir: std::env::temp_dir(),
            turn_seq: AtomicU64::new(0),
        }
    }

    /// Run until the stop flag is observed or the producer side hangs up.
    pub fn run(&self) {
        let queue = self.session.queue_receiver();
        while !self.session.stop_requested() {
            match queue.recv_timeout(QUEUE_POLL) {
                Ok(buffer) => {
                    let outcome = self.process_buffer(buffer);
                    log_debug(&format!("turn outcome: {outcome:?}"));
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    log_debug("speech queue disconnected");
                    break;
                }
            }
        }
        log_debug("processor loop exited");
    }

    /// Handle one buffer end to end. Never panics and never propagates a
    /// collaborator error; the return value exists for tests.
    pub fn process_buffer(&self, buffer: AudioBuffer) -> TurnOutcome {
        if buffer.is_empty() {
            return TurnOutcome::Skipped;
        }

        // The threshold is adjusted first; the silence gate compares
        // against the post-update value.
        let energy = pre_emphasis_energy(buffer.samples());
        let threshold = self.session.vad().update_energy_threshold(energy);
        if energy <= threshold {
            println!("Silence detected.");
            tracing::debug!(energy, threshold, "segment classified as silence");
            return TurnOutcome::Silence;
        }

        let text = match self.transcribe_buffer(buffer) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "turn failed before dispatch");
                self.print_and_speak(APOLOGY);
                return TurnOutcome::NoTranscript;
            }
        };

        println!("User: {text}");
        log_debug_content(&format!("transcript: {text}"));

        // Feedback-loop guard: the microphone may have picked up our own
        // speech output. Discard a transcript that matches the last reply.
        let last = self.session.last_response();
        if !last.is_empty() && text.trim().eq_ignore_ascii_case(last.trim()) {
            tracing::debug!("transcript matched last reply, discarding");
            return TurnOutcome::Echoed;
        }

        self.dispatch(&text)
    }

    /// Denoise, persist to a transient WAV, transcribe, clean up.
    fn transcribe_buffer(&self, buffer: AudioBuffer) -> Result<String, Error> {
        let sample_rate = buffer.sample_rate();
        let cleaned = self.collaborators.denoiser.denoise(buffer.samples())?;

        let seq = self.turn_seq.fetch_add(1, Ordering::Relaxed);
        let wav_path = self
            .scratch_dir
            .join(format!("voxchat_turn_{}_{seq}.wav", std::process::id()));
        write_wav(&wav_path, &cleaned, sample_rate)?;

        let result = self.collaborators.transcriber.transcribe(&wav_path);
        if let Err(err) = std::fs::remove_file(&wav_path) {
            log_debug(&format!("failed to remove transient wav: {err}"));
        }

        let text = sanitize_transcript(&result?);
        if text.is_empty() {
            return Err(Error::Transcription(
                "transcript contained no speech".into(),
            ));
        }
        Ok(text)
    }

    fn dispatch(&self, text: &str) -> TurnOutcome {
        let command = parse_command(text);
        match command {
            Command::OpenCamera => {
                match self.session.camera().open() {
                    Ok(()) => self.print_and_speak("Camera is now open."),
                    Err(err) => {
                        tracing::warn!(error = %err, "camera open failed");
                        self.print_and_speak("Failed to open the camera.");
                    }
                }
                TurnOutcome::Command(command)
            }
            Command::CloseCamera => {
                if self.session.camera().is_open() {
                    self.session.camera().close();
                    self.print_and_speak("Camera is now closed.");
                }
                TurnOutcome::Command(command)
            }
            Command::AnalyzeImage => {
                self.analyze_image();
                TurnOutcome::Command(command)
            }
            Command::MediaShortcut => {
                tracing::info!("media playback shortcut requested; not supported");
                self.print_and_speak("Media playback isn't available here.");
                TurnOutcome::Command(command)
            }
            Command::Converse => {
                self.generate_and_speak(text);
                TurnOutcome::Reply
            }
        }
    }

    fn analyze_image(&self) {
        let camera = self.session.camera();
        let frame = match camera.capture_frame() {
            Ok(frame) => frame,
            Err(Error::CameraNotOpen) => {
                self.print_and_speak(
                    "Camera is not open. Please say 'open camera' to open the camera first.",
                );
                return;
            }
            Err(err) => {
                tracing::warn!(error = %err, "frame capture failed");
                self.print_and_speak("Failed to capture an image.");
                return;
            }
        };

        let seq = self.turn_seq.fetch_add(1, Ordering::Relaxed);
        let image_path = self
            .scratch_dir
            .join(format!("voxchat_frame_{}_{seq}.png", std::process::id()));
        if let Err(err) = std::fs::write(&image_path, &frame) {
            tracing::warn!(error = %err, "failed to persist camera frame");
            self.print_and_speak("Failed to capture an image.");
            return;
        }

        match self.collaborators.vision.analyze(&image_path) {
            Ok(description) => println!("Analysis results: {description}"),
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "image analysis failed");
                self.print_and_speak(APOLOGY);
            }
        }
        if let Err(err) = std::fs::remove_file(&image_path) {
            log_debug(&format!("failed to remove transient image: {err}"));
        }
    }

    fn generate_and_speak(&self, user_text: &str) {
        println!("AI is thinking...");
        self.print_and_speak(THINKING);

        match self.collaborators.responder.respond(user_text) {
            Ok(reply) => {
                println!("AI Response: {reply}");
                self.print_and_speak(&reply);
                self.session.set_last_response(&reply);
            }
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "response generation failed");
                self.print_and_speak("Sorry, just a moment. I'm still thinking.");
            }
        }
    }

    /// Print a message and speak it best-effort; synthesis failures are
    /// logged, never propagated.
    fn print_and_speak(&self, message: &str) {
        println!("{message}");
        if let Err(err) = self.collaborators.synthesizer.speak(message) {
            tracing::warn!(error = %err, kind = err.kind(), "speech synthesis failed");
            log_debug(&format!("speak failed: {err}"));
        }
    }
}

/// Strip bracketed non-speech markers the transcription service emits for
/// silence, music, and similar, then collapse whitespace.
pub fn sanitize_transcript(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    static NON_SPEECH_RE: OnceLock<Regex> = OnceLock::new();
    let re = NON_SPEECH_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\[\s*\]|\(\s*\)|\[(?:\s*(?:silence|noise|inaudible|blank_audio|blank audio|music|laughter|applause|cough|breath(?:ing)?|wind|background)\s*)\]|\((?:\s*(?:silence|noise|inaudible|blank audio|music|laughter|applause|cough|breath(?:ing)?|wind|background)\s*)\)",
        )
        .expect("non-speech regex should compile")
    });
    let without_markers = re.replace_all(trimmed, " ");
    without_markers
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Persist f32 samples as 16-bit PCM for the transcription upload.
fn write_wav(path: &std::path::Path, samples: &[f32], sample_rate: u32) -> Result<(), Error> {
    let spec = hound::WavSpec {
        channels: CHANNELS as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|err| Error::Transcription(format!("failed to create wav: {err}")))?;
    for &sample in samples {
        let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(clamped)
            .map_err(|err| Error::Transcription(format!("failed to write wav: {err}")))?;
    }
    writer
        .finalize()
        .map_err(|err| Error::Transcription(format!("failed to finalize wav: {err}")))?;
    Ok(())
}
