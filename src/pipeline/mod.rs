//! Concurrent producer/consumer pipeline.
//!
//! Three loops run on independent threads for the life of one session:
//! the recorder (producer) captures fixed-duration buffers and feeds the
//! speech queue, the processor (consumer) drains it and drives the
//! collaborators, and the interrupt watcher turns typed keywords into the
//! stop signal. The shared stop flag is cooperative: each loop checks it
//! at loop-top, so shutdown latency is bounded by the longest blocking
//! call in flight.

mod consumer;
mod interrupt;
mod producer;

pub use consumer::{parse_command, Command, Processor, TurnOutcome};
pub use interrupt::{is_interrupt, run_interrupt_watcher, INTERRUPT_KEYWORDS};
pub use producer::Recorder;

use crate::audio::CaptureSource;
use crate::services::Collaborators;
use crate::session::SharedSession;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::thread;

/// Observable pipeline transitions, emitted so an external collaborator
/// can play cue sounds or update a UI. The pipeline itself never blocks
/// on the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The recorder moved Idle -> Active: the user started speaking.
    RecordingStarted,
    /// The recorder moved Active -> Idle: the user went quiet.
    RecordingStopped,
}

/// Join handles for one running session.
pub struct SessionHandles {
    pub recorder: thread::JoinHandle<()>,
    pub processor: thread::JoinHandle<()>,
    pub interrupt: thread::JoinHandle<()>,
}

impl SessionHandles {
    /// Wait for all three loops to finish. Returns once every loop has
    /// observed the stop flag and exited.
    pub fn join(self) {
        for (name, handle) in [
            ("recorder", self.recorder),
            ("processor", self.processor),
            ("interrupt", self.interrupt),
        ] {
            if handle.join().is_err() {
                tracing::error!(loop_name = name, "pipeline thread panicked");
            }
        }
    }
}

/// Spawn the recorder, processor, and interrupt threads for one session.
///
/// The interrupt watcher reads stdin; tests drive the loops directly with
/// injected readers and sources instead of going through here.
pub fn start_session(
    session: Arc<SharedSession>,
    mut source: Box<dyn CaptureSource>,
    collaborators: Collaborators,
    events: Sender<PipelineEvent>,
) -> SessionHandles {
    let recorder = {
        let session = session.clone();
        let events = events.clone();
        thread::Builder::new()
            .name("voxchat-recorder".into())
            .spawn(move || {
                Recorder::new(session, events).run(source.as_mut());
            })
            .expect("failed to spawn recorder thread")
    };

    let processor = {
        let session = session.clone();
        thread::Builder::new()
            .name("voxchat-processor".into())
            .spawn(move || {
                Processor::new(session, collaborators).run();
            })
            .expect("failed to spawn processor thread")
    };

    let interrupt = thread::Builder::new()
        .name("voxchat-interrupt".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            run_interrupt_watcher(&session, stdin.lock());
        })
        .expect("failed to spawn interrupt thread");

    SessionHandles {
        recorder,
        processor,
        interrupt,
    }
}
