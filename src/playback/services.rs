//! Collaborators the controller drives but never implements

use std::future::Future;
use std::pin::Pin;

use crate::data::VisualHandle;
use crate::error::Result;
use crate::mapping::{Marker, SweepParameters, ToneParameters};

/// Boxed future returned by [`ToneRenderer::resume`]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can make sound
pub trait ToneRenderer: Send + Sync {
    /// Acquire the audio output. Called lazily before first playback;
    /// must be cheap when already initialized.
    fn init(&self) -> Result<()>;

    /// Wake a suspended output so the next tone is audible
    fn resume(&self) -> BoxFuture<'_, Result<()>>;

    /// Play one enveloped tone; returns immediately
    fn play_tone(&self, tone: &ToneParameters);

    fn play_marker(&self, marker: Marker);

    /// Start a continuous sweep; the handle stops it early
    fn start_sweep(&self, sweep: &SweepParameters) -> Result<Box<dyn SweepHandle>>;

    /// Release the audio output
    fn destroy(&self);
}

/// A running sweep
pub trait SweepHandle: Send {
    /// Stop the sweep. Returns [`SonifyError::SweepFinalized`] if it has
    /// already ended or been stopped.
    ///
    /// [`SonifyError::SweepFinalized`]: crate::error::SonifyError::SweepFinalized
    fn stop(&self) -> Result<()>;
}

/// Fire-and-forget narration sink
pub trait Announcer: Send + Sync {
    fn announce(&self, message: &str);
}

/// Visual focus indicator; `None` clears it
pub trait FocusTarget: Send + Sync {
    fn highlight(&self, handle: Option<VisualHandle>);
}

/// Everything a controller needs from the outside world
pub struct Services {
    pub renderer: Box<dyn ToneRenderer>,
    pub announcer: Box<dyn Announcer>,
    pub focus: Box<dyn FocusTarget>,
}

impl Services {
    pub fn new(
        renderer: impl ToneRenderer + 'static,
        announcer: impl Announcer + 'static,
        focus: impl FocusTarget + 'static,
    ) -> Self {
        Self {
            renderer: Box::new(renderer),
            announcer: Box::new(announcer),
            focus: Box::new(focus),
        }
    }
}

/// Prints announcements to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleAnnouncer;

impl Announcer for ConsoleAnnouncer {
    fn announce(&self, message: &str) {
        println!("{}", message);
    }
}

/// Sends announcements to the log at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&self, message: &str) {
        log::info!("{}", message);
    }
}

/// Focus target for callers without a visual
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFocus;

impl FocusTarget for NoFocus {
    fn highlight(&self, _handle: Option<VisualHandle>) {}
}

/// Renderer that produces no sound
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentRenderer;

struct SilentSweep;

impl SweepHandle for SilentSweep {
    fn stop(&self) -> Result<()> {
        Ok(())
    }
}

impl ToneRenderer for SilentRenderer {
    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn resume(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn play_tone(&self, _tone: &ToneParameters) {}

    fn play_marker(&self, _marker: Marker) {}

    fn start_sweep(&self, _sweep: &SweepParameters) -> Result<Box<dyn SweepHandle>> {
        Ok(Box::new(SilentSweep))
    }

    fn destroy(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::VisualHandle;

    #[tokio::test]
    async fn test_silent_renderer_accepts_everything() {
        let renderer = SilentRenderer;
        renderer.init().unwrap();
        renderer.resume().await.unwrap();
        renderer.play_tone(&Marker::Start.tone());
        renderer.play_marker(Marker::End);

        let sweep = SweepParameters {
            frequencies: vec![220.0, 440.0],
            pans: vec![-0.5, 0.5],
            duration: 0.4,
            volume: 0.5,
            timbre: Default::default(),
            fade: 0.05,
        };
        let handle = renderer.start_sweep(&sweep).unwrap();
        handle.stop().unwrap();
        handle.stop().unwrap();
        renderer.destroy();
    }

    #[test]
    fn test_services_box_stock_collaborators() {
        let services = Services::new(SilentRenderer, LogAnnouncer, NoFocus);
        services.announcer.announce("Point 1 of 1");
        services.focus.highlight(Some(VisualHandle(0)));
        services.focus.highlight(None);
        assert!(services.renderer.init().is_ok());

        let console = Services::new(SilentRenderer, ConsoleAnnouncer, NoFocus);
        console.announcer.announce("Playback complete");
    }
}
