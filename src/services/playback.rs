//! Speaker playback for synthesized speech.
//!
//! Mirrors the capture side: a CPAL output stream is fed 16-bit
//! little-endian mono PCM converted to the device's native f32 format, and
//! the call blocks until the clip has drained.

use crate::app::log_debug;
use crate::error::Error;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Play a mono s16le PCM clip at `sample_rate`, blocking until done.
pub fn play_pcm16(pcm: &[u8], sample_rate: u32) -> Result<(), Error> {
    if pcm.len() < 2 {
        return Err(Error::Synthesis("empty audio clip".into()));
    }

    let samples: Arc<Vec<f32>> = Arc::new(
        pcm.chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32_768.0)
            .collect(),
    );

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Synthesis("no default output device available".into()))?;
    let config = StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let cursor = Arc::new(AtomicUsize::new(0));
    let cursor_cb = cursor.clone();
    let samples_cb = samples.clone();
    let err_fn = |err| log_debug(&format!("playback_stream_error: {err}"));

    let stream = device
        .build_output_stream(
            &config,
            move |out: &mut [f32], _| {
                let start = cursor_cb.fetch_add(out.len(), Ordering::Relaxed);
                for (i, slot) in out.iter_mut().enumerate() {
                    *slot = samples_cb.get(start + i).copied().unwrap_or(0.0);
                }
            },
            err_fn,
            None,
        )
        .map_err(|err| Error::Synthesis(format!("failed to open output stream: {err}")))?;

    stream
        .play()
        .map_err(|err| Error::Synthesis(format!("failed to start playback: {err}")))?;

    // Block for the clip duration plus a small drain margin.
    let secs = samples.len() as f64 / sample_rate as f64;
    std::thread::sleep(Duration::from_secs_f64(secs) + Duration::from_millis(100));
    if let Err(err) = stream.pause() {
        log_debug(&format!("failed to pause playback stream: {err}"));
    }
    Ok(())
}
