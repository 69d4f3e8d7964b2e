use crate::{
    error::{AccessorErr, Result},
    layout::PushLayout,
};

/// A typed view over a push (write path) record.
#[derive(Debug)]
pub struct PushValue<B> {
    layout: PushLayout,
    buf: B,
}

impl<B: AsRef<[f32]>> PushValue<B> {
    /// Creates a new `PushValue` view.
    ///
    /// # Returns
    /// A new `PushValue` or `AccessorErr::RecordSize` if `buf` isn't `layout.dim()` long.
    pub fn new(layout: PushLayout, buf: B) -> Result<Self> {
        let len = buf.as_ref().len();

        if len != layout.dim() {
            return Err(AccessorErr::RecordSize {
                record: "push",
                got: len,
                expected: layout.dim(),
            });
        }

        Ok(Self { layout, buf })
    }

    pub fn as_slice(&self) -> &[f32] {
        self.buf.as_ref()
    }

    pub fn slot(&self) -> f32 {
        self.as_slice()[self.layout.slot_index()]
    }

    pub fn show(&self) -> f32 {
        self.as_slice()[self.layout.show_index()]
    }

    pub fn click(&self) -> f32 {
        self.as_slice()[self.layout.click_index()]
    }

    /// The embed gradient, a single slot.
    pub fn embed_g(&self) -> &[f32] {
        let idx = self.layout.embed_g_index();
        &self.as_slice()[idx..idx + 1]
    }

    pub fn embedx_g(&self) -> &[f32] {
        &self.as_slice()[self.layout.embedx_g_index()..]
    }
}

impl<B: AsRef<[f32]> + AsMut<[f32]>> PushValue<B> {
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.buf.as_mut()
    }

    pub fn set_slot(&mut self, slot: f32) {
        let idx = self.layout.slot_index();
        self.as_mut_slice()[idx] = slot;
    }

    pub fn set_show(&mut self, show: f32) {
        let idx = self.layout.show_index();
        self.as_mut_slice()[idx] = show;
    }

    pub fn set_click(&mut self, click: f32) {
        let idx = self.layout.click_index();
        self.as_mut_slice()[idx] = click;
    }

    /// Adds every field of `other` into this record except for the slot, which is
    /// a tag owned by the caller.
    pub fn merge<O: AsRef<[f32]>>(&mut self, other: &PushValue<O>) {
        let slot = self.layout.slot_index();

        self.as_mut_slice()
            .iter_mut()
            .zip(other.as_slice())
            .enumerate()
            .filter(|(i, _)| *i != slot)
            .for_each(|(_, (acc, v))| *acc += v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_skips_the_slot() {
        let layout = PushLayout::new(2);
        let mut a = [7., 1., 0., 0.5, 1., 2.];
        let b = [9., 2., 1., 0.5, 1., 1.];

        let mut acc = PushValue::new(layout, &mut a[..]).unwrap();
        acc.merge(&PushValue::new(layout, &b[..]).unwrap());

        assert_eq!(a, [7., 3., 1., 1., 2., 3.]);
    }

    #[test]
    fn rejects_wrong_lengths() {
        let layout = PushLayout::new(2);
        assert!(PushValue::new(layout, &[0.; 5][..]).is_err());
        assert!(PushValue::new(layout, &[0.; 7][..]).is_err());
    }
}
