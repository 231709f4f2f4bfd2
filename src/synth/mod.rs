//! Synthesis primitives for rendering tones
//!
//! Contains the oscillator, envelope, and the two voice kinds the renderer
//! plays: single tones and continuous sweeps.

mod envelope;
mod oscillator;
mod sweep;
mod tone;
mod voice;

pub use envelope::{Envelope, EnvelopeStage};
pub use oscillator::{Oscillator, Waveform};
pub use sweep::SweepVoice;
pub use tone::ToneVoice;
pub use voice::Voice;
