//! Single enveloped tone

use super::{Envelope, Oscillator, Voice};
use crate::mapping::ToneParameters;

/// Plays one tone: attack, decay and sustain until `duration - release`,
/// then releases so the tone ends at `duration`. Notes shorter than the
/// configured envelope get a shortened attack and release.
pub struct ToneVoice {
    oscillator: Oscillator,
    envelope: Envelope,
    volume: f64,
    pan: f64,
    elapsed: u64,
    release_at: u64,
    end_at: u64,
    stopped: bool,
}

impl ToneVoice {
    pub fn new(params: &ToneParameters, sample_rate: f64) -> Self {
        let mut envelope = Envelope::new(&params.envelope, sample_rate);
        envelope.trigger();

        let duration = params.duration.max(0.0);
        envelope.fit_to(duration);
        // Never release before the attack has peaked
        let release_start = (duration - envelope.release_time()).max(envelope.attack_time());

        Self {
            oscillator: Oscillator::new(params.timbre, params.frequency, sample_rate),
            envelope,
            volume: params.volume.clamp(0.0, 1.0),
            pan: params.pan.clamp(-1.0, 1.0),
            elapsed: 0,
            release_at: (release_start * sample_rate) as u64,
            end_at: (duration * sample_rate).ceil() as u64,
            stopped: false,
        }
    }
}

impl Voice for ToneVoice {
    fn is_active(&self) -> bool {
        !self.stopped && (self.elapsed < self.end_at || self.envelope.is_active())
    }

    fn process(&mut self) -> (f64, f64) {
        if self.stopped {
            return (0.0, self.pan);
        }
        if self.elapsed == self.release_at {
            self.envelope.release();
        }
        self.elapsed += 1;

        let level = self.envelope.process();
        (self.oscillator.generate() * level * self.volume, self.pan)
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvelopeConfig;
    use crate::synth::Waveform;

    fn tone(duration: f64) -> ToneParameters {
        ToneParameters {
            frequency: 440.0,
            volume: 0.5,
            pan: -0.3,
            duration,
            timbre: Waveform::Square,
            envelope: EnvelopeConfig::default(),
        }
    }

    #[test]
    fn test_tone_produces_sound_then_ends() {
        let sample_rate = 1000.0;
        let mut voice = ToneVoice::new(&tone(0.2), sample_rate);

        let mut peak: f64 = 0.0;
        let mut count = 0;
        while voice.is_active() && count < 10_000 {
            let (sample, pan) = voice.process();
            assert_eq!(pan, -0.3);
            peak = peak.max(sample.abs());
            count += 1;
        }

        assert!(peak > 0.2 && peak <= 0.5, "peak {}", peak);
        // Ends shortly after the requested 200 samples
        assert!((200..260).contains(&count), "ran {} samples", count);
    }

    #[test]
    fn test_stop_silences() {
        let mut voice = ToneVoice::new(&tone(1.0), 1000.0);
        for _ in 0..50 {
            voice.process();
        }
        voice.stop();
        assert!(!voice.is_active());
        assert_eq!(voice.process().0, 0.0);
    }

    fn peak_of(mut voice: ToneVoice) -> f64 {
        let mut peak: f64 = 0.0;
        let mut count = 0;
        while voice.is_active() && count < 100_000 {
            peak = peak.max(voice.process().0.abs());
            count += 1;
        }
        peak
    }

    #[test]
    fn test_notes_shorter_than_release_still_sound() {
        // Default release is 0.1s; these are the note lengths at 2x and 4x speed
        for duration in [0.1, 0.05, 0.02] {
            let peak = peak_of(ToneVoice::new(&tone(duration), 44100.0));
            assert!(peak > 0.2, "{}s tone peaked at {}", duration, peak);
        }
    }

    #[test]
    fn test_short_note_ends_near_its_duration() {
        let mut voice = ToneVoice::new(&tone(0.05), 1000.0);
        let mut count = 0;
        while voice.is_active() && count < 10_000 {
            voice.process();
            count += 1;
        }
        assert!((50..60).contains(&count), "ran {} samples", count);
    }
}
