//! Tone renderer backed by the synth engine and a live output stream

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::{Engine, Player};
use crate::config::AudioConfig;
use crate::error::{Result, SonifyError};
use crate::mapping::{Marker, SweepParameters, ToneParameters};
use crate::playback::{BoxFuture, SweepHandle, ToneRenderer};
use crate::synth::{SweepVoice, ToneVoice, Voice};

/// Plays tones through the default (or configured) output device.
///
/// The output stream is opened by [`init`](ToneRenderer::init) and closed by
/// [`destroy`](ToneRenderer::destroy); sounds requested while it is closed
/// are dropped.
pub struct SynthRenderer {
    engine: Arc<Mutex<Engine>>,
    player: Mutex<Player>,
}

impl SynthRenderer {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Engine::new(config))),
            player: Mutex::new(Player::new(config.device.clone())),
        }
    }

    /// Shared mixer, for callers that want to inspect or drive it directly
    pub fn engine(&self) -> Arc<Mutex<Engine>> {
        Arc::clone(&self.engine)
    }

    pub fn is_running(&self) -> bool {
        lock(&self.player).is_playing()
    }

    fn add_voice(&self, build: impl FnOnce(f64) -> Box<dyn Voice>) -> bool {
        if !self.is_running() {
            return false;
        }
        let mut engine = lock(&self.engine);
        let voice = build(engine.sample_rate());
        engine.add_voice(voice);
        true
    }
}

impl ToneRenderer for SynthRenderer {
    fn init(&self) -> Result<()> {
        let mut player = lock(&self.player);
        if player.is_playing() {
            return Ok(());
        }
        player.start(Arc::clone(&self.engine))?;
        log::debug!("Audio output started");
        Ok(())
    }

    fn resume(&self) -> BoxFuture<'_, Result<()>> {
        // A stream that died since init is reopened
        Box::pin(std::future::ready(self.init()))
    }

    fn play_tone(&self, tone: &ToneParameters) {
        let added = self.add_voice(|sample_rate| {
            Box::new(ToneVoice::new(tone, sample_rate)) as Box<dyn Voice>
        });
        if !added {
            log::debug!("Dropped {:.1} Hz tone: output not running", tone.frequency);
        }
    }

    fn play_marker(&self, marker: Marker) {
        self.play_tone(&marker.tone());
    }

    fn start_sweep(&self, sweep: &SweepParameters) -> Result<Box<dyn SweepHandle>> {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let params = sweep.clone();
        let added = self.add_voice(move |sample_rate| {
            Box::new(SweepVoice::new(params, sample_rate, flag)) as Box<dyn Voice>
        });
        if !added {
            return Err(SonifyError::AudioUnavailable("output not running".into()));
        }

        Ok(Box::new(SynthSweep {
            stopped,
            ends_at: Instant::now() + Duration::from_secs_f64(sweep.duration.max(0.0)),
        }))
    }

    fn destroy(&self) {
        lock(&self.player).stop();
        lock(&self.engine).stop_all();
        log::debug!("Audio output closed");
    }
}

/// Handle to a sweep voice in the mixer
struct SynthSweep {
    stopped: Arc<AtomicBool>,
    ends_at: Instant,
}

impl SweepHandle for SynthSweep {
    fn stop(&self) -> Result<()> {
        let already_stopped = self.stopped.swap(true, Ordering::SeqCst);
        if already_stopped || Instant::now() >= self.ends_at {
            return Err(SonifyError::SweepFinalized);
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
