//! System microphone capture via CPAL.
//!
//! Handles device selection, sample-format conversion, and normalization
//! to 44.1 kHz mono. Capture blocks the calling thread for the full
//! segment duration; there is no mid-call cancellation, so shutdown
//! latency is bounded by one segment.

use super::resample::resample_to_capture_rate;
use super::{AudioBuffer, SAMPLE_RATE};
use crate::app::log_debug;
use crate::error::Error;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of fixed-duration audio segments.
///
/// The pipeline records through this trait so tests can feed synthetic
/// buffers without a physical microphone.
pub trait CaptureSource: Send {
    fn capture(&mut self) -> Result<AudioBuffer, Error>;
}

/// Microphone wrapper producing fixed-duration 44.1 kHz mono buffers.
pub struct AudioSource {
    device: cpal::Device,
    duration: Duration,
}

impl AudioSource {
    /// List input device names so the CLI can expose a selector.
    pub fn list_devices() -> Result<Vec<String>, Error> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|err| Error::Device(format!("no input devices available: {err}")))?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Open the default microphone, or a specific one when the machine
    /// exposes several inputs.
    pub fn new(preferred_device: Option<&str>, duration: Duration) -> Result<Self, Error> {
        let host = cpal::default_host();
        let device = match preferred_device {
            Some(name) => {
                let mut devices = host
                    .input_devices()
                    .map_err(|err| Error::Device(format!("no input devices available: {err}")))?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| Error::Device(format!("input device '{name}' not found")))?
            }
            None => host
                .default_input_device()
                .ok_or_else(|| Error::Device("no default input device available".into()))?,
        };
        Ok(Self { device, duration })
    }

    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown Device".to_string())
    }

    /// Block for the configured duration while sampling, then return a
    /// normalized buffer.
    fn record(&self) -> Result<AudioBuffer, Error> {
        let default_config = self
            .device
            .default_input_config()
            .map_err(|err| Error::Device(format!("failed to query input config: {err}")))?;
        let format = default_config.sample_format();
        let device_config: StreamConfig = default_config.into();
        let device_rate = device_config.sample_rate.0;
        let channels = usize::from(device_config.channels.max(1));
        let device_name = self.device_name();

        log_debug(&format!(
            "capture config: format={format:?} rate={device_rate}Hz channels={channels}"
        ));

        // CPAL delivers samples on a callback thread; collect into a shared
        // buffer so ownership stays on the caller side.
        let expected =
            (self.duration.as_secs_f64() * device_rate as f64 * channels as f64).ceil() as usize;
        let collected = Arc::new(Mutex::new(Vec::<f32>::with_capacity(expected)));

        let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));
        let stream = match format {
            SampleFormat::F32 => {
                let collected = collected.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[f32], _| {
                        if let Ok(mut buf) = collected.lock() {
                            downmix_into(&mut buf, data, channels, |sample| sample);
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::I16 => {
                let collected = collected.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[i16], _| {
                        if let Ok(mut buf) = collected.lock() {
                            downmix_into(&mut buf, data, channels, |sample| {
                                sample as f32 / 32_768.0_f32
                            });
                        }
                    },
                    err_fn,
                    None,
                )
            }
            SampleFormat::U16 => {
                let collected = collected.clone();
                self.device.build_input_stream(
                    &device_config,
                    move |data: &[u16], _| {
                        if let Ok(mut buf) = collected.lock() {
                            downmix_into(&mut buf, data, channels, |sample| {
                                (sample as f32 - 32_768.0_f32) / 32_768.0_f32
                            });
                        }
                    },
                    err_fn,
                    None,
                )
            }
            other => return Err(Error::Device(format!("unsupported sample format: {other:?}"))),
        }
        .map_err(|err| Error::Device(format!("failed to open input stream: {err}")))?;

        stream
            .play()
            .map_err(|err| Error::Device(format!("failed to start input stream: {err}")))?;
        std::thread::sleep(self.duration);
        if let Err(err) = stream.pause() {
            log_debug(&format!("failed to pause audio stream: {err}"));
        }
        drop(stream);

        let samples = collected
            .lock()
            .map_err(|_| Error::Device("audio buffer lock poisoned".into()))?;
        if samples.is_empty() {
            return Err(Error::Device(format!(
                "no samples captured from '{device_name}'; check microphone permissions. {}",
                mic_permission_hint()
            )));
        }

        let normalized = resample_to_capture_rate(&samples, device_rate);
        Ok(AudioBuffer::new(normalized, SAMPLE_RATE))
    }
}

impl CaptureSource for AudioSource {
    fn capture(&mut self) -> Result<AudioBuffer, Error> {
        self.record()
    }
}

/// Average interleaved frames down to one channel while converting each
/// sample to f32.
pub(super) fn downmix_into<T, F>(out: &mut Vec<f32>, data: &[T], channels: usize, mut convert: F)
where
    T: Copy,
    F: FnMut(T) -> f32,
{
    if channels <= 1 {
        out.extend(data.iter().copied().map(&mut convert));
        return;
    }
    for frame in data.chunks(channels) {
        let sum: f32 = frame.iter().copied().map(&mut convert).sum();
        out.push(sum / frame.len() as f32);
    }
}

fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow access for your terminal)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}
