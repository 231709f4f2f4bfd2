//! Voice trait for sound generators

/// One sounding event in the mix
pub trait Voice: Send + Sync {
    /// Check if the voice still produces sound; inactive voices are dropped
    fn is_active(&self) -> bool;

    /// Generate the next sample and its stereo position (-1.0..1.0)
    fn process(&mut self) -> (f64, f64);

    /// Silence the voice immediately
    fn stop(&mut self);
}
