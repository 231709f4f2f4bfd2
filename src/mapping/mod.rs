//! Mapping system for transforming data to audio parameters
//!
//! Values are normalized against the extent observed for their channel and
//! then mapped to frequency, volume, pan, duration and timbre.

mod extent;
mod linear;
mod mapper;
mod quantize;
mod tone;
mod value_mapper;

pub use extent::Extent;
pub use linear::{lerp, LinearMapper};
pub use mapper::Mapper;
pub use quantize::{hz_to_midi, midi_to_hz, QuantizeMapper, Scale, REFERENCE_HZ};
pub use tone::{Marker, SweepParameters, ToneParameters};
pub use value_mapper::{map_pan, value_to_frequency, Extents, ValueMapper};
