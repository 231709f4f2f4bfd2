//! Offline rendering of a full traversal to a WAV file

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::{Engine, Recorder};
use crate::config::SonifyConfig;
use crate::data::DataPoint;
use crate::mapping::{Marker, ValueMapper};
use crate::playback::PlaybackMode;
use crate::synth::{SweepVoice, ToneVoice, Voice};

/// What [`render_to_wav`] wrote
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    pub points: usize,
    pub frames: u64,
    pub sample_rate: u32,
    pub mode: PlaybackMode,
    /// Loudest sample written, 0.0 to 1.0 unless the mix clipped
    pub peak: f32,
}

impl RenderSummary {
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Render start marker, every point (or one sweep) and end marker into a
/// stereo WAV with the note and gap pacing of live playback at speed 1.
/// The file starts on the start marker; the settle pause live playback
/// leaves after the spoken summary is not rendered.
pub fn render_to_wav(points: &[DataPoint], config: &SonifyConfig, path: &Path) -> Result<RenderSummary> {
    if points.is_empty() {
        bail!("No data points to render");
    }

    let sample_rate = config.audio.sample_rate as f64;
    let mut mapper = ValueMapper::new(config);
    mapper.analyze(points);

    // (start time in seconds, voice), in time order
    let mut cues: Vec<(f64, Box<dyn Voice>)> = Vec::new();
    let mut cursor = 0.0;

    if config.markers.start {
        let tone = Marker::Start.tone();
        let voice: Box<dyn Voice> = Box::new(ToneVoice::new(&tone, sample_rate));
        cues.push((cursor, voice));
        cursor += tone.duration;
    }

    match config.mode {
        PlaybackMode::Discrete => {
            for (i, point) in points.iter().enumerate() {
                let tone = mapper.map(point, i, points.len());
                let voice: Box<dyn Voice> = Box::new(ToneVoice::new(&tone, sample_rate));
                cues.push((cursor, voice));
                cursor += tone.duration + config.gap / 1000.0;
            }
        }
        PlaybackMode::Continuous => {
            let sweep = mapper.sweep(points, 0, config.duration.base_ms() / 1000.0);
            let length = sweep.duration;
            let never_stopped = Arc::new(AtomicBool::new(false));
            let voice: Box<dyn Voice> = Box::new(SweepVoice::new(sweep, sample_rate, never_stopped));
            cues.push((cursor, voice));
            cursor += length;
        }
    }

    if config.markers.end {
        let voice: Box<dyn Voice> = Box::new(ToneVoice::new(&Marker::End.tone(), sample_rate));
        cues.push((cursor, voice));
    }

    let mut engine = Engine::new(&config.audio);
    let mut recorder = Recorder::new(path, config.audio.sample_rate)?;
    let mut cues = cues
        .into_iter()
        .map(|(at, voice)| ((at * sample_rate).round() as u64, voice))
        .peekable();

    let mut frame = 0u64;
    loop {
        while cues.peek().is_some_and(|(start, _)| *start <= frame) {
            if let Some((_, voice)) = cues.next() {
                engine.add_voice(voice);
            }
        }
        if cues.peek().is_none() && engine.active_voices() == 0 {
            break;
        }

        let (left, right) = engine.process();
        recorder.write_frame(left, right)?;
        frame += 1;
    }

    let take = recorder.finalize()?;
    let summary = RenderSummary {
        points: points.len(),
        frames: take.frames,
        sample_rate: config.audio.sample_rate,
        mode: config.mode,
        peak: take.peak,
    };

    log::info!(
        "Rendered {} points ({} mode) to {:?}: {:.2}s",
        summary.points,
        summary.mode,
        path,
        summary.duration_secs()
    );
    Ok(summary)
}
