//! WAV capture of the mixed stereo stream

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// What a finished recording holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Take {
    pub frames: u64,
    /// Largest absolute sample on either channel
    pub peak: f32,
}

/// Writes interleaved stereo frames as 32-bit float WAV
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    take: Take,
}

impl Recorder {
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            take: Take {
                frames: 0,
                peak: 0.0,
            },
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames_written(&self) -> u64 {
        self.take.frames
    }

    pub fn duration_secs(&self) -> f64 {
        self.take.frames as f64 / self.sample_rate as f64
    }

    pub fn write_frame(&mut self, left: f32, right: f32) -> Result<()> {
        self.writer
            .write_sample(left)
            .and_then(|_| self.writer.write_sample(right))
            .context("failed to write frame")?;
        self.take.frames += 1;
        self.take.peak = self.take.peak.max(left.abs()).max(right.abs());
        Ok(())
    }

    /// Flush and patch the header. Without this the file is unreadable.
    pub fn finalize(self) -> Result<Take> {
        self.writer.finalize().context("failed to finalize WAV file")?;
        Ok(self.take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_recording() {
        let file = NamedTempFile::new().unwrap();
        let recorder = Recorder::new(file.path(), 44100).unwrap();

        assert_eq!(recorder.sample_rate(), 44100);
        assert_eq!(recorder.duration_secs(), 0.0);

        let take = recorder.finalize().unwrap();
        assert_eq!(take, Take { frames: 0, peak: 0.0 });
    }

    #[test]
    fn test_one_second_of_frames() {
        let file = NamedTempFile::new().unwrap();
        let mut recorder = Recorder::new(file.path(), 8000).unwrap();

        for _ in 0..8000 {
            recorder.write_frame(0.0, 0.0).unwrap();
        }

        assert_eq!(recorder.frames_written(), 8000);
        assert!((recorder.duration_secs() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_channels_interleave_and_peak_tracks_both() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut recorder = Recorder::new(&path, 22050).unwrap();
        recorder.write_frame(0.25, -0.5).unwrap();
        recorder.write_frame(0.75, 0.1).unwrap();
        let take = recorder.finalize().unwrap();
        assert_eq!(take.frames, 2);
        assert_eq!(take.peak, 0.75);

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.sample_format, SampleFormat::Float);

        let samples: Vec<f32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.25, -0.5, 0.75, 0.1]);
    }
}
