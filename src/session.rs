//! Cross-thread session state.
//!
//! One [`SharedSession`] is created per conversation and passed as an
//! `Arc` to the recorder, processor, and interrupt loops. Everything
//! mutable inside is behind an atomic, a mutex, or a thread-safe channel;
//! there are no module-level globals.

use crate::audio::{AdaptiveThreshold, AudioBuffer};
use crate::camera::CameraManager;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub struct SharedSession {
    /// Cooperative cancellation signal: set once, never reset. Every loop
    /// checks it at loop-top.
    stop: AtomicBool,
    /// Adaptive VAD scalars (atomic f32 bits, single writer each).
    vad: AdaptiveThreshold,
    /// Exclusive camera slot behind its own mutex.
    camera: CameraManager,
    /// Last spoken assistant reply, for the feedback-loop guard.
    last_response: Mutex<String>,
    /// Unbounded FIFO handoff: recorder pushes, processor pops. Single
    /// producer / single consumer by convention; insertion order is the
    /// only ordering guarantee.
    queue_tx: Sender<AudioBuffer>,
    queue_rx: Receiver<AudioBuffer>,
}

impl SharedSession {
    pub fn new(camera: CameraManager) -> Self {
        let (queue_tx, queue_rx) = unbounded();
        Self {
            stop: AtomicBool::new(false),
            vad: AdaptiveThreshold::new(),
            camera,
            last_response: Mutex::new(String::new()),
            queue_tx,
            queue_rx,
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn vad(&self) -> &AdaptiveThreshold {
        &self.vad
    }

    pub fn camera(&self) -> &CameraManager {
        &self.camera
    }

    pub fn queue_sender(&self) -> Sender<AudioBuffer> {
        self.queue_tx.clone()
    }

    pub fn queue_receiver(&self) -> Receiver<AudioBuffer> {
        self.queue_rx.clone()
    }

    pub fn last_response(&self) -> String {
        self.last_response
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn set_last_response(&self, text: &str) {
        if let Ok(mut guard) = self.last_response.lock() {
            *guard = text.to_string();
        }
    }
}
