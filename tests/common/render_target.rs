use splat_editor::{MergedBuffer, RenderTarget, RenderTargetError};

/// A render target that records every buffer it displays.
///
/// It rejects the next `failures` updates, and every update while `broken` is set.
#[derive(Debug, Default)]
pub struct RecordingRenderTarget {
    pub updates: Vec<Vec<u8>>,
    pub recreated: usize,
    pub failures: usize,
    pub broken: bool,
}

impl RecordingRenderTarget {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Default::default()
        }
    }

    pub fn last(&self) -> Option<&[u8]> {
        self.updates.last().map(Vec::as_slice)
    }
}

impl RenderTarget for RecordingRenderTarget {
    fn update(&mut self, merged: &MergedBuffer) -> Result<(), RenderTargetError> {
        if self.broken {
            return Err(RenderTargetError::new("broken"));
        }

        if self.failures > 0 {
            self.failures -= 1;
            return Err(RenderTargetError::new("device lost"));
        }

        self.updates.push(merged.as_bytes().to_vec());
        Ok(())
    }

    fn recreate(&mut self) {
        self.recreated += 1;
    }
}
