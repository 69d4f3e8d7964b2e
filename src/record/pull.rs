use crate::{
    error::{AccessorErr, Result},
    layout::PullLayout,
};

/// A typed view over a pull (read path) record.
#[derive(Debug)]
pub struct PullValue<B> {
    layout: PullLayout,
    buf: B,
}

impl<B: AsRef<[f32]>> PullValue<B> {
    /// Creates a new `PullValue` view.
    ///
    /// # Returns
    /// A new `PullValue` or `AccessorErr::RecordSize` if `buf` isn't `layout.dim()` long.
    pub fn new(layout: PullLayout, buf: B) -> Result<Self> {
        let len = buf.as_ref().len();

        if len != layout.dim() {
            return Err(AccessorErr::RecordSize {
                record: "pull",
                got: len,
                expected: layout.dim(),
            });
        }

        Ok(Self { layout, buf })
    }

    pub fn embed_w(&self) -> f32 {
        self.buf.as_ref()[self.layout.embed_w_index()]
    }

    pub fn embedx_w(&self) -> &[f32] {
        &self.buf.as_ref()[self.layout.embedx_w_index()..]
    }
}

impl<B: AsRef<[f32]> + AsMut<[f32]>> PullValue<B> {
    pub fn set_embed_w(&mut self, embed_w: f32) {
        let idx = self.layout.embed_w_index();
        self.buf.as_mut()[idx] = embed_w;
    }

    pub fn embedx_w_mut(&mut self) -> &mut [f32] {
        let idx = self.layout.embedx_w_index();
        &mut self.buf.as_mut()[idx..]
    }
}
