use crate::shared::frame::Frame;

/// Receives each finished destination buffer, once per frame.
///
/// Display and recording live behind this seam; the compositor only hands
/// frames over and never waits on anything but the call itself.
pub trait PresentationSink: Send {
    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes anything buffered. Default: no-op.
    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
