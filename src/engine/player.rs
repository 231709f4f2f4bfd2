//! Real-time audio playback using cpal
//!
//! The cpal stream is not `Send`, so it lives on a dedicated thread that
//! holds it until the player is stopped.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::Engine;
use crate::error::{Result, SonifyError};

/// Real-time audio player
pub struct Player {
    device: Option<String>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Player {
    /// Create a player for the named device, or the default device if `None`
    pub fn new(device: Option<String>) -> Self {
        Self {
            device,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Start playing audio from the engine.
    ///
    /// Blocks until the output stream is running or has failed to open.
    pub fn start(&mut self, engine: Arc<Mutex<Engine>>) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let device_name = self.device.clone();
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("sonify-audio".into())
            .spawn(move || {
                let stream = match open_stream(device_name.as_deref(), engine, Arc::clone(&running)) {
                    Ok(stream) => stream,
                    Err(e) => {
                        running.store(false, Ordering::SeqCst);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                while running.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(20));
                }
                drop(stream);
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.thread = Some(thread);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                Err(SonifyError::AudioUnavailable("audio thread exited".into()))
            }
        }
    }

    /// Stop playback and release the output device
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

fn find_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();
    let device = match name {
        Some(wanted) => host
            .output_devices()
            .map_err(|e| SonifyError::AudioUnavailable(e.to_string()))?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false)),
        None => host.default_output_device(),
    };
    device.ok_or_else(|| match name {
        Some(wanted) => SonifyError::AudioUnavailable(format!("no output device named {}", wanted)),
        None => SonifyError::AudioUnavailable("no output device available".into()),
    })
}

fn open_stream(
    device_name: Option<&str>,
    engine: Arc<Mutex<Engine>>,
    running: Arc<AtomicBool>,
) -> Result<Stream> {
    let device = find_device(device_name)?;
    let config = device
        .default_output_config()
        .map_err(|e| SonifyError::AudioUnavailable(e.to_string()))?;
    let sample_format = config.sample_format();
    let stream_config: StreamConfig = config.into();

    if let Ok(mut eng) = engine.lock() {
        eng.set_sample_rate(stream_config.sample_rate.0 as f64);
    }

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, engine, running)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, engine, running)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, engine, running)?,
        other => {
            return Err(SonifyError::AudioUnavailable(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    };

    stream
        .play()
        .map_err(|e| SonifyError::Stream(e.to_string()))?;
    log::debug!(
        "output stream open: {} Hz, {} channels",
        stream_config.sample_rate.0,
        stream_config.channels
    );
    Ok(stream)
}

fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    engine: Arc<Mutex<Engine>>,
    running: Arc<AtomicBool>,
) -> Result<Stream> {
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.clear();
                scratch.resize(data.len(), 0.0);

                if running.load(Ordering::SeqCst) {
                    // Contended lock: output silence for this buffer
                    if let Ok(mut eng) = engine.try_lock() {
                        eng.fill_buffer(&mut scratch, channels);
                    }
                }

                for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                    *out = T::from_sample(sample);
                }
            },
            |err| {
                log::error!("audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| SonifyError::Stream(e.to_string()))
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

/// List all available output devices with their default stream config
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
