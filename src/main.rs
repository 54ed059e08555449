//! Voice assistant entrypoint: wires the microphone, the OpenAI-backed
//! collaborators, and the three pipeline loops into one session.

use anyhow::{Context, Result};
use std::panic;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use voxchat::audio::AudioSource;
use voxchat::camera::CameraManager;
use voxchat::config::AppConfig;
use voxchat::greeting::current_greeting;
use voxchat::pipeline::{start_session, PipelineEvent};
use voxchat::services::{
    Collaborators, NoiseGate, OpenAiClient, OpenAiResponder, OpenAiSynthesizer, OpenAiTranscriber,
    OpenAiVision, Synthesizer,
};
use voxchat::{init_logging, log_debug, SharedSession};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    voxchat::telemetry::init_tracing(&config);
    panic::set_hook(Box::new(|info| {
        voxchat::log_panic(info);
    }));

    if config.list_input_devices {
        let devices =
            AudioSource::list_devices().context("failed to enumerate audio input devices")?;
        if devices.is_empty() {
            println!("No audio input devices detected.");
        } else {
            println!("Audio input devices:");
            for name in devices {
                println!("  {name}");
            }
        }
        return Ok(());
    }

    let session_config = config.session_config();
    let client = Arc::new(OpenAiClient::new(
        config.api_key.clone(),
        config.api_base_url.clone(),
    ));
    let synthesizer: Arc<OpenAiSynthesizer> = Arc::new(OpenAiSynthesizer::new(
        client.clone(),
        config.speech_model.clone(),
        session_config.voice,
    ));
    let collaborators = Collaborators {
        transcriber: Arc::new(OpenAiTranscriber::new(
            client.clone(),
            config.transcription_model.clone(),
        )),
        responder: Arc::new(OpenAiResponder::new(
            client.clone(),
            config.chat_model.clone(),
            config.max_tokens,
        )),
        synthesizer: synthesizer.clone(),
        vision: Arc::new(OpenAiVision::new(
            client,
            config.vision_model.clone(),
            config.max_tokens,
        )),
        denoiser: Arc::new(NoiseGate::new()),
    };

    let source = AudioSource::new(
        session_config.input_device.as_deref(),
        Duration::from_secs(session_config.capture_secs),
    )
    .context("failed to open the microphone")?;
    log_debug(&format!("capturing from '{}'", source.device_name()));

    // No camera backend is wired in yet; the commands still respond.
    let session = Arc::new(SharedSession::new(CameraManager::unavailable()));

    // The assistant announces itself, then greets by time of day.
    print_and_speak(synthesizer.as_ref(), &session_config.bot_name);
    print_and_speak(
        synthesizer.as_ref(),
        &current_greeting(&session_config.user_name),
    );
    tracing::info!(user = %session_config.user_name, "conversation started");
    println!("Say 'stop', 'exit', 'quit', or 'end' (typed) to end the conversation.");

    let (events_tx, events_rx) = crossbeam_channel::unbounded();
    let cue_printer = thread::spawn(move || {
        for event in events_rx {
            match event {
                PipelineEvent::RecordingStarted => println!("Sound detected, recording..."),
                PipelineEvent::RecordingStopped => println!("Silence detected, standing by."),
            }
        }
    });

    let handles = start_session(session.clone(), Box::new(source), collaborators, events_tx);
    handles.join();
    if cue_printer.join().is_err() {
        log_debug("cue printer thread panicked");
    }

    tracing::info!("conversation ended");
    println!("Conversation ended.");
    Ok(())
}

/// Best-effort startup speech; a synthesis failure should not keep the
/// session from starting.
fn print_and_speak(synthesizer: &dyn Synthesizer, message: &str) {
    println!("{message}");
    if let Err(err) = synthesizer.speak(message) {
        tracing::warn!(error = %err, "startup speech failed");
        log_debug(&format!("startup speech failed: {err}"));
    }
}
