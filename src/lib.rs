//! Sonify - Hear your charts
//!
//! Turns a dataset into sound. Each point becomes a tone whose pitch, volume,
//! pan, length and timbre follow its values, or the whole series becomes one
//! continuous sweep. Playback can be paused, stepped and scrubbed from the
//! keyboard while every point is narrated and focused for screen-reader and
//! low-vision users.

pub mod config;
pub mod data;
pub mod describe;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod playback;
pub mod synth;
pub mod viz;

pub use config::SonifyConfig;
pub use data::{Accessor, DataPoint, VisualHandle};
pub use describe::DescriptionGenerator;
pub use engine::{Engine, SynthRenderer};
pub use error::{Result, SonifyError};
pub use mapping::ValueMapper;
pub use playback::{sonify, PlaybackController, PlaybackEvent, PlaybackMode, Services};
