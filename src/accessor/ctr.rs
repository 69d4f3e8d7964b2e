use std::marker::PhantomData;

use super::{AccessorInfo, TimeDecay};
use crate::{
    error::{AccessorErr, Result},
    layout::{Counter, FeatureLayout, PullLayout, PushLayout},
    optimization::SgdRule,
    record::{FeatureValue, PullValue, PushValue},
    specs::CtrParamSpec,
};

/// The value accessor of a click-through-rate sparse table.
///
/// It knows the layout of the three records of a feature (full, pull and push),
/// and every transformation between them. It holds no record itself: all the
/// operations work on buffers owned by the caller, so a single accessor can be
/// shared by every shard of a table.
pub struct CtrAccessor<C: Counter> {
    pub(super) feature: FeatureLayout,
    pub(super) pull: PullLayout,
    pub(super) push: PushLayout,
    pub(super) params: CtrParamSpec,
    pub(super) embedx_threshold: f32,
    pub(super) embed_rule: Box<dyn SgdRule>,
    pub(super) embedx_rule: Box<dyn SgdRule>,
    pub(super) decay: TimeDecay,
    counter: PhantomData<C>,
}

impl<C: Counter> CtrAccessor<C> {
    /// Creates a new `CtrAccessor`.
    ///
    /// # Arguments
    /// * `params` - Scoring, eviction and export thresholds.
    /// * `embedx_dim` - The embedding width.
    /// * `embedx_threshold` - The score a feature needs to hold embedx weights.
    /// * `embed_rule` - The update rule of the scalar embed weight.
    /// * `embedx_rule` - The update rule of the embedx weights.
    ///
    /// # Returns
    /// A new `CtrAccessor` instance.
    pub fn new(
        params: CtrParamSpec,
        embedx_dim: usize,
        embedx_threshold: f32,
        embed_rule: Box<dyn SgdRule>,
        embedx_rule: Box<dyn SgdRule>,
    ) -> Self {
        let feature = FeatureLayout::new::<C>(embed_rule.dim(), embedx_dim, embedx_rule.dim());
        let decay = TimeDecay::new(
            params.show_click_decay_rate,
            params.delete_after_unseen_days.max(0.) as usize,
        );

        Self {
            feature,
            pull: PullLayout::new(embedx_dim),
            push: PushLayout::new(embedx_dim),
            params,
            embedx_threshold,
            embed_rule,
            embedx_rule,
            decay,
            counter: PhantomData,
        }
    }

    pub fn feature_layout(&self) -> &FeatureLayout {
        &self.feature
    }

    /// The amount of logical fields of a full record.
    pub fn dim(&self) -> usize {
        self.feature.dim()
    }

    /// The byte width of the full record field `dim`.
    pub fn dim_size(&self, dim: usize) -> usize {
        self.feature.dim_size(dim)
    }

    /// The byte size of a full record.
    pub fn size(&self) -> usize {
        self.feature.size()
    }

    /// The byte size of the extended region of a full record.
    pub fn mf_size(&self) -> usize {
        self.feature.mf_size()
    }

    pub fn select_dim(&self) -> usize {
        self.pull.dim()
    }

    pub fn select_dim_size(&self, dim: usize) -> usize {
        self.pull.dim_size(dim)
    }

    pub fn select_size(&self) -> usize {
        self.pull.size()
    }

    pub fn update_dim(&self) -> usize {
        self.push.dim()
    }

    pub fn update_dim_size(&self, dim: usize) -> usize {
        self.push.dim_size(dim)
    }

    pub fn update_size(&self) -> usize {
        self.push.size()
    }

    /// Every dimension and size a table needs, at once.
    pub fn table_info(&self) -> AccessorInfo {
        AccessorInfo {
            dim: self.dim(),
            size: self.size(),
            select_dim: self.select_dim(),
            select_size: self.select_size(),
            update_dim: self.update_dim(),
            update_size: self.update_size(),
            mf_size: self.mf_size(),
        }
    }

    /// Weights the show and click statistics into a single importance score.
    pub fn show_click_score<T: Counter>(&self, show: T, click: T) -> T {
        let nonclk_coeff = T::from_f32(self.params.nonclk_coeff);
        let click_coeff = T::from_f32(self.params.click_coeff);
        (show - click) * nonclk_coeff + click * click_coeff
    }

    pub(super) fn feature<'a>(&self, buf: &'a [f32]) -> Result<FeatureValue<&'a [f32], C>> {
        FeatureValue::new(self.feature, buf)
    }

    pub(super) fn feature_mut<'a>(
        &self,
        buf: &'a mut [f32],
    ) -> Result<FeatureValue<&'a mut [f32], C>> {
        FeatureValue::new(self.feature, buf)
    }

    /// Initializes new full records.
    ///
    /// Statistics start at zero and the slot at `-1`, weights and accumulators are
    /// left to the update rules. The embedx region is only initialized on records
    /// that hold it.
    ///
    /// # Arguments
    /// * `values` - The full records to initialize.
    ///
    /// # Returns
    /// `AccessorErr::RecordSize` if any of the buffers isn't a full record.
    pub fn create(&self, values: &mut [&mut [f32]]) -> Result<()> {
        for value in values.iter_mut() {
            let mut value = self.feature_mut(value)?;

            value.set_unseen_days(0.);
            value.set_delta_score(0.);
            value.set_show(C::default());
            value.set_click(C::default());
            value.set_slot(-1.);

            let (w, accum) = value.embed_mut();
            self.embed_rule.init_value(w, accum, true);

            if let Some((w, accum)) = value.embedx_mut() {
                self.embedx_rule.init_value(w, accum, false);
            }
        }

        Ok(())
    }

    /// Projects full records into pull records.
    ///
    /// The embedx block of records that don't hold it yet is read as zeros.
    ///
    /// # Arguments
    /// * `pulls` - The pull records to write.
    /// * `values` - The full records to read.
    ///
    /// # Returns
    /// An error if the batches differ in length or any buffer has the wrong size.
    pub fn select(&self, pulls: &mut [&mut [f32]], values: &[&[f32]]) -> Result<()> {
        check_batch("pull values", "feature values", pulls.len(), values.len())?;

        for (pull, value) in pulls.iter_mut().zip(values) {
            let value = self.feature(value)?;
            let mut pull = PullValue::new(self.pull, &mut **pull)?;

            pull.set_embed_w(value.embed_w());

            match value.embedx_w() {
                Some(embedx_w) => pull.embedx_w_mut().copy_from_slice(embedx_w),
                None => pull.embedx_w_mut().fill(0.),
            }
        }

        Ok(())
    }

    /// Folds push records into accumulating push records, field by field.
    ///
    /// The slot of the accumulating records is left untouched.
    ///
    /// # Arguments
    /// * `updates` - The accumulating push records.
    /// * `others` - The push records to add.
    ///
    /// # Returns
    /// An error if the batches differ in length or any buffer has the wrong size.
    pub fn merge(&self, updates: &mut [&mut [f32]], others: &[&[f32]]) -> Result<()> {
        check_batch("update values", "other update values", updates.len(), others.len())?;

        for (update, other) in updates.iter_mut().zip(others) {
            let other = PushValue::new(self.push, *other)?;
            PushValue::new(self.push, &mut **update)?.merge(&other);
        }

        Ok(())
    }

    /// Applies push records to full records.
    ///
    /// Adds the pushed statistics, takes the pushed slot, accumulates the pushed
    /// score into `delta_score`, marks the feature as seen and lets the update rules
    /// step the weights. Records that don't hold the embedx region ignore the embedx
    /// gradient.
    ///
    /// # Arguments
    /// * `values` - The full records to update.
    /// * `pushes` - The push records to apply.
    ///
    /// # Returns
    /// An error if the batches differ in length or any buffer has the wrong size.
    pub fn update(&self, values: &mut [&mut [f32]], pushes: &[&[f32]]) -> Result<()> {
        check_batch("feature values", "push values", values.len(), pushes.len())?;

        for (value, push) in values.iter_mut().zip(pushes) {
            let push = PushValue::new(self.push, *push)?;
            let mut value = self.feature_mut(value)?;

            let push_show = push.show();
            let push_click = push.click();

            value.set_show(value.show() + C::from_f32(push_show));
            value.set_click(value.click() + C::from_f32(push_click));
            value.set_slot(push.slot());
            value.set_delta_score(value.delta_score() + self.show_click_score(push_show, push_click));
            value.set_unseen_days(0.);

            let (w, accum) = value.embed_mut();
            self.embed_rule.update_value(w, accum, push.embed_g());

            if let Some((w, accum)) = value.embedx_mut() {
                self.embedx_rule.update_value(w, accum, push.embedx_g());
            }
        }

        Ok(())
    }
}

fn check_batch(a: &'static str, b: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(AccessorErr::BatchMismatch {
            a,
            b,
            got,
            expected,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::testing::{accessor, push_record};
    use crate::layout::SLOT_SIZE;

    #[test]
    fn facade_sizes_follow_the_embedding_width() {
        for embedx_dim in [0, 1, 8, 32] {
            let acc = accessor::<f32>(embedx_dim);
            let info = acc.table_info();

            assert_eq!(info.size, (8 + embedx_dim) * SLOT_SIZE);
            assert_eq!(info.select_size, (1 + embedx_dim) * SLOT_SIZE);
            assert_eq!(info.update_size, (4 + embedx_dim) * SLOT_SIZE);
            assert_eq!(info.mf_size, (1 + embedx_dim) * SLOT_SIZE);
            assert_eq!(info.dim, 8 + embedx_dim);
        }
    }

    #[test]
    fn create_resets_statistics() {
        let acc = accessor::<f32>(4);
        let mut buf = vec![9.; acc.feature_layout().slots()];

        acc.create(&mut [&mut buf]).unwrap();

        let value = acc.feature(&buf).unwrap();
        assert_eq!(value.unseen_days(), 0.);
        assert_eq!(value.delta_score(), 0.);
        assert_eq!(value.show(), 0.);
        assert_eq!(value.click(), 0.);
        assert_eq!(value.slot(), -1.);
        assert_eq!(value.embed_w(), 0.);
        assert_eq!(value.embed_accum(), [0.]);
        assert_eq!(value.embedx_accum(), Some(&[0.][..]));
        assert!(value.embedx_w().unwrap().iter().all(|w| w.abs() < 1e-3));
    }

    #[test]
    fn create_leaves_the_extended_region_of_short_records_alone() {
        let acc = accessor::<f32>(4);
        let mut buf = vec![9.; acc.feature_layout().short_slots()];

        acc.create(&mut [&mut buf]).unwrap();
        assert_eq!(acc.feature(&buf).unwrap().slot(), -1.);
    }

    #[test]
    fn select_projects_weights() {
        let acc = accessor::<f32>(3);
        let layout = *acc.feature_layout();
        let mut buf: Vec<f32> = (0..layout.slots()).map(|i| i as f32).collect();
        let mut pull = vec![0.; acc.select_dim()];

        acc.select(&mut [&mut pull], &[&buf]).unwrap();
        assert_eq!(pull, [4., 8., 9., 10.]);

        buf.truncate(layout.short_slots());
        acc.select(&mut [&mut pull], &[&buf]).unwrap();
        assert_eq!(pull, [4., 0., 0., 0.]);
    }

    #[test]
    fn merge_is_order_independent() {
        let acc = accessor::<f32>(2);
        let a = push_record(1., 3., 1., 0.5, &[0.25, -1.]);
        let b = push_record(2., 4., 0., -0.25, &[1., 2.]);
        let c = push_record(3., 1., 1., 1., &[0.5, 0.5]);

        let mut ab_c = a.clone();
        acc.merge(&mut [&mut ab_c], &[&b]).unwrap();
        acc.merge(&mut [&mut ab_c], &[&c]).unwrap();

        let mut bc = b.clone();
        acc.merge(&mut [&mut bc], &[&c]).unwrap();
        let mut a_bc = a.clone();
        acc.merge(&mut [&mut a_bc], &[&bc]).unwrap();

        let mut cba = c.clone();
        acc.merge(&mut [&mut cba], &[&b]).unwrap();
        acc.merge(&mut [&mut cba], &[&a]).unwrap();

        assert_eq!(ab_c[1..], a_bc[1..]);
        assert_eq!(ab_c[1..], cba[1..]);
        assert_eq!(ab_c[1..], [8., 2., 1.25, 1.75, 1.5]);

        assert_eq!(ab_c[0], 1.);
        assert_eq!(a_bc[0], 1.);
        assert_eq!(cba[0], 3.);
    }

    #[test]
    fn update_accumulates_statistics() {
        let acc = accessor::<f32>(2);
        let mut buf = vec![0.; acc.feature_layout().slots()];
        acc.create(&mut [&mut buf]).unwrap();
        acc.feature_mut(&mut buf).unwrap().set_unseen_days(4.);

        let push = push_record(7., 3., 1., 0., &[0., 0.]);
        acc.update(&mut [&mut buf], &[&push]).unwrap();

        let value = acc.feature(&buf).unwrap();
        assert_eq!(value.show(), 3.);
        assert_eq!(value.click(), 1.);
        assert_eq!(value.slot(), 7.);
        assert_eq!(value.unseen_days(), 0.);
        assert!((value.delta_score() - 1.2).abs() < 1e-6);

        acc.update(&mut [&mut buf], &[&push]).unwrap();
        let value = acc.feature(&buf).unwrap();
        assert_eq!(value.show(), 6.);
        assert_eq!(value.click(), 2.);
        assert!((value.delta_score() - 2.4).abs() < 1e-6);
    }

    #[test]
    fn update_steps_weights_through_the_rules() {
        let acc = accessor::<f32>(2);
        let mut buf = vec![0.; acc.feature_layout().slots()];
        acc.create(&mut [&mut buf]).unwrap();
        let before: Vec<f32> = acc.feature(&buf).unwrap().embedx_w().unwrap().to_vec();

        let push = push_record(1., 1., 0., 1., &[1., -1.]);
        acc.update(&mut [&mut buf], &[&push]).unwrap();

        let value = acc.feature(&buf).unwrap();
        assert!(value.embed_w() < 0.);
        assert!(value.embed_accum()[0] > 0.);
        let after = value.embedx_w().unwrap();
        assert!(after[0] < before[0]);
        assert!(after[1] > before[1]);
    }

    #[test]
    fn double_precision_accumulates_past_f32_resolution() {
        let acc = accessor::<f64>(2);
        let mut buf = vec![0.; acc.feature_layout().slots()];
        acc.create(&mut [&mut buf]).unwrap();
        acc.feature_mut(&mut buf).unwrap().set_show(16_777_216.);

        let push = push_record(1., 1., 0., 0., &[0., 0.]);
        acc.update(&mut [&mut buf], &[&push]).unwrap();

        assert_eq!(acc.feature(&buf).unwrap().show(), 16_777_217.);
    }

    #[test]
    fn batch_length_mismatch_is_rejected() {
        let acc = accessor::<f32>(2);
        let mut buf = vec![0.; acc.feature_layout().slots()];
        let push = push_record(1., 1., 0., 0., &[0., 0.]);

        let err = acc.update(&mut [&mut buf], &[&push, &push]).unwrap_err();
        assert!(matches!(err, AccessorErr::BatchMismatch { got: 1, expected: 2, .. }));
    }

    #[test]
    fn wrong_push_size_is_rejected() {
        let acc = accessor::<f32>(2);
        let mut buf = vec![0.; acc.feature_layout().slots()];

        let err = acc.update(&mut [&mut buf], &[&[0.; 3]]).unwrap_err();
        assert!(matches!(err, AccessorErr::RecordSize { record: "push", .. }));
    }
}
