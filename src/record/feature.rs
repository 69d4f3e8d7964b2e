use std::marker::PhantomData;

use crate::{
    error::{AccessorErr, Result},
    layout::{Counter, FeatureLayout},
};

/// A typed view over a full (stored) record.
///
/// The buffer must hold either a short record (everything before the extended
/// region) or an extended one, the length is checked once on construction and
/// every accessor after that is in bounds.
#[derive(Debug)]
pub struct FeatureValue<B, C> {
    layout: FeatureLayout,
    buf: B,
    counter: PhantomData<C>,
}

impl<B: AsRef<[f32]>, C: Counter> FeatureValue<B, C> {
    /// Creates a new `FeatureValue` view.
    ///
    /// # Arguments
    /// * `layout` - The layout of the record.
    /// * `buf` - The record's slots.
    ///
    /// # Returns
    /// A new `FeatureValue` or `AccessorErr::RecordSize` if `buf` isn't as long as
    /// a short or an extended record.
    pub fn new(layout: FeatureLayout, buf: B) -> Result<Self> {
        let len = buf.as_ref().len();

        if len != layout.slots() && len != layout.short_slots() {
            return Err(AccessorErr::RecordSize {
                record: "feature",
                got: len,
                expected: layout.slots(),
            });
        }

        Ok(Self {
            layout,
            buf,
            counter: PhantomData,
        })
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn as_slice(&self) -> &[f32] {
        self.buf.as_ref()
    }

    pub fn has_mf(&self) -> bool {
        self.layout.has_mf(self.as_slice().len())
    }

    pub fn unseen_days(&self) -> f32 {
        self.as_slice()[self.layout.unseen_days_index()]
    }

    pub fn delta_score(&self) -> f32 {
        self.as_slice()[self.layout.delta_score_index()]
    }

    pub fn show(&self) -> C {
        C::read(&self.as_slice()[self.layout.show_index()..])
    }

    pub fn click(&self) -> C {
        C::read(&self.as_slice()[self.layout.click_index()..])
    }

    pub fn embed_w(&self) -> f32 {
        self.as_slice()[self.layout.embed_w_index()]
    }

    pub fn embed_accum(&self) -> &[f32] {
        &self.as_slice()[self.layout.embed_accum_index()..self.layout.slot_index()]
    }

    pub fn slot(&self) -> f32 {
        self.as_slice()[self.layout.slot_index()]
    }

    /// The accumulator of the embedx weights, `None` on short records.
    pub fn embedx_accum(&self) -> Option<&[f32]> {
        self.has_mf()
            .then(|| &self.as_slice()[self.layout.embedx_accum_index()..self.layout.embedx_w_index()])
    }

    /// The embedx weights, `None` on short records.
    pub fn embedx_w(&self) -> Option<&[f32]> {
        self.has_mf()
            .then(|| &self.as_slice()[self.layout.embedx_w_index()..])
    }
}

impl<B: AsRef<[f32]> + AsMut<[f32]>, C: Counter> FeatureValue<B, C> {
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.buf.as_mut()
    }

    pub fn set_unseen_days(&mut self, unseen_days: f32) {
        let idx = self.layout.unseen_days_index();
        self.as_mut_slice()[idx] = unseen_days;
    }

    pub fn set_delta_score(&mut self, delta_score: f32) {
        let idx = self.layout.delta_score_index();
        self.as_mut_slice()[idx] = delta_score;
    }

    pub fn set_show(&mut self, show: C) {
        let idx = self.layout.show_index();
        show.write(&mut self.as_mut_slice()[idx..]);
    }

    pub fn set_click(&mut self, click: C) {
        let idx = self.layout.click_index();
        click.write(&mut self.as_mut_slice()[idx..]);
    }

    pub fn set_embed_w(&mut self, embed_w: f32) {
        let idx = self.layout.embed_w_index();
        self.as_mut_slice()[idx] = embed_w;
    }

    pub fn set_slot(&mut self, slot: f32) {
        let idx = self.layout.slot_index();
        self.as_mut_slice()[idx] = slot;
    }

    /// Splits the embed region into its weight (a single slot) and its accumulator.
    pub fn embed_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        let start = self.layout.embed_w_index();
        let end = self.layout.slot_index();
        self.as_mut_slice()[start..end].split_at_mut(1)
    }

    /// Splits the extended region into the embedx weights and their accumulator,
    /// `None` on short records.
    pub fn embedx_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        if !self.has_mf() {
            return None;
        }

        let start = self.layout.embedx_accum_index();
        let accum_dim = self.layout.embedx_sgd_dim();
        let (accum, weights) = self.as_mut_slice()[start..].split_at_mut(accum_dim);
        Some((weights, accum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unexpected_lengths() {
        let layout = FeatureLayout::new::<f32>(1, 4, 1);

        for len in [0, 6, 8, 11, 13] {
            let buf = vec![0.; len];
            assert!(FeatureValue::<_, f32>::new(layout, &buf[..]).is_err());
        }

        let short = vec![0.; layout.short_slots()];
        let full = vec![0.; layout.slots()];
        assert!(FeatureValue::<_, f32>::new(layout, &short[..]).is_ok());
        assert!(FeatureValue::<_, f32>::new(layout, &full[..]).is_ok());
    }

    #[test]
    fn short_records_hide_the_extended_region() {
        let layout = FeatureLayout::new::<f32>(1, 4, 1);
        let mut buf = vec![0.; layout.short_slots()];
        let mut value = FeatureValue::<_, f32>::new(layout, &mut buf[..]).unwrap();

        assert!(!value.has_mf());
        assert!(value.embedx_w().is_none());
        assert!(value.embedx_mut().is_none());
    }

    #[test]
    fn regions_are_split_in_place() {
        let layout = FeatureLayout::new::<f32>(1, 3, 1);
        let mut buf: Vec<f32> = (0..layout.slots()).map(|i| i as f32).collect();
        let mut value = FeatureValue::<_, f32>::new(layout, &mut buf[..]).unwrap();

        let (w, accum) = value.embed_mut();
        assert_eq!(w, [4.]);
        assert_eq!(accum, [5.]);

        let (w, accum) = value.embedx_mut().unwrap();
        assert_eq!(w, [8., 9., 10.]);
        assert_eq!(accum, [7.]);

        assert_eq!(value.slot(), 6.);
    }

    #[test]
    fn double_counters_roundtrip_through_the_view() {
        let layout = FeatureLayout::new::<f64>(1, 2, 1);
        let mut buf = vec![0.; layout.slots()];
        let mut value = FeatureValue::<_, f64>::new(layout, &mut buf[..]).unwrap();

        value.set_show(1e10 + 0.5);
        value.set_click(3.25);
        value.set_embed_w(-1.);

        assert_eq!(value.show(), 1e10 + 0.5);
        assert_eq!(value.click(), 3.25);
        assert_eq!(value.embed_w(), -1.);
    }
}
