use crate::{MergedBuffer, RenderTargetError};

/// The renderer side of an [`EditorSession`](crate::EditorSession).
///
/// The session owns the authoritative splat data, the render target only displays the latest
/// [`MergedBuffer`] and can be recreated from it at any time.
pub trait RenderTarget {
    /// Display the merged buffer.
    fn update(&mut self, merged: &MergedBuffer) -> Result<(), RenderTargetError>;

    /// Discard the underlying render resource and create a fresh one.
    ///
    /// This is called after [`RenderTarget::update`] fails, before retrying the update.
    fn recreate(&mut self);
}

/// A render target which discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderTarget;

impl RenderTarget for NullRenderTarget {
    fn update(&mut self, _merged: &MergedBuffer) -> Result<(), RenderTargetError> {
        Ok(())
    }

    fn recreate(&mut self) {}
}
