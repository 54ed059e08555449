//! Recorder loop: the producer side of the speech queue.
//!
//! Pulls fixed-duration buffers from the capture source, keeps the volume
//! baseline current, and tracks an Idle/Active recording state whose
//! transitions are emitted as events so cue sounds can be played
//! externally. Capture blocks for the full segment, which makes it the
//! dominant latency source; a capture already in flight when stop is
//! requested completes but its buffer is not enqueued.

use super::PipelineEvent;
use crate::app::log_debug;
use crate::audio::CaptureSource;
use crate::session::SharedSession;
use crossbeam_channel::Sender;
use std::sync::Arc;

pub struct Recorder {
    session: Arc<SharedSession>,
    events: Sender<PipelineEvent>,
}

impl Recorder {
    pub fn new(session: Arc<SharedSession>, events: Sender<PipelineEvent>) -> Self {
        Self { session, events }
    }

    /// Run until the stop flag is observed or the device fails.
    ///
    /// The volume baseline is written here and nowhere else; the speech
    /// predicate reads the baseline that already includes the current
    /// buffer.
    pub fn run(&self, source: &mut dyn CaptureSource) {
        let queue = self.session.queue_sender();
        let mut recording = false;

        while !self.session.stop_requested() {
            let buffer = match source.capture() {
                Ok(buffer) => buffer,
                Err(err) => {
                    tracing::error!(error = %err, kind = err.kind(), "audio capture failed");
                    log_debug(&format!("recorder loop ending: {err}"));
                    if err.is_fatal_to_loop() {
                        // Siblings keep running until the stop flag is set;
                        // the session degrades rather than restarting itself.
                        break;
                    }
                    continue;
                }
            };

            if buffer.is_empty() {
                tracing::warn!("no audio data captured this segment");
                continue;
            }

            // The capture blocked for the full segment; stop may have been
            // requested meanwhile. No work is enqueued after shutdown begins.
            if self.session.stop_requested() {
                break;
            }

            let vad = self.session.vad();
            vad.update_volume(&buffer);
            let speaking = vad.is_speech(&buffer);
            log_debug(&format!(
                "segment: samples={} baseline={:.4} speaking={speaking}",
                buffer.len(),
                vad.volume_baseline()
            ));

            if queue.send(buffer).is_err() {
                // Consumer side is gone; nothing left to produce for.
                break;
            }

            if speaking != recording {
                recording = speaking;
                let event = if recording {
                    tracing::info!("sound detected, start recording");
                    PipelineEvent::RecordingStarted
                } else {
                    tracing::info!("silence detected, stop recording");
                    PipelineEvent::RecordingStopped
                };
                let _ = self.events.send(event);
            }
        }

        log_debug("recorder loop exited");
    }
}
