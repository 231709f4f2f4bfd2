//! Playback engine
//!
//! Traverses a bound dataset, rendering each point through a
//! [`ToneRenderer`], narrating it through an [`Announcer`] and moving a
//! [`FocusTarget`] along with it.

mod controller;
mod events;
mod keys;
mod services;
mod state;
mod timer;

pub use controller::{sonify, PlaybackController, SETTLE_DELAY, TRACK_INTERVAL};
pub use events::PlaybackEvent;
pub use keys::NavigationKey;
pub use services::{
    Announcer, BoxFuture, ConsoleAnnouncer, FocusTarget, LogAnnouncer, NoFocus, Services,
    SilentRenderer, SweepHandle, ToneRenderer,
};
pub use state::{clamp_speed, PlaybackMode, PlaybackState, MAX_SPEED, MIN_SPEED};

