//! Playback lifecycle events

use crate::data::VisualHandle;

/// Broadcast to every subscriber as playback progresses
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A fresh traversal began (after the summary and start marker)
    Started,
    /// A point was rendered or focused
    Point {
        index: usize,
        handle: Option<VisualHandle>,
    },
    Paused,
    Stopped,
    /// The traversal ran past the last point
    Completed,
}
