use rand::Rng;

use super::{CtrAccessor, SaveMode, Stage};
use crate::{
    error::{AccessorErr, Result},
    layout::Counter,
    record::{FeatureValue, PushValue},
};

impl<C: Counter> CtrAccessor<C> {
    /// Decays a record's statistics and decides whether it should be evicted.
    ///
    /// The decay is applied whatever the outcome, so a record must be shrunk at
    /// most once per maintenance cycle.
    ///
    /// # Arguments
    /// * `value` - The full record.
    ///
    /// # Returns
    /// Whether the record should be evicted, or an error if `value` isn't a full record.
    pub fn shrink(&self, value: &mut [f32]) -> Result<bool> {
        let mut value = self.feature_mut(value)?;
        let rate = C::from_f32(self.params.show_click_decay_rate);

        value.set_show(value.show() * rate);
        value.set_click(value.click() * rate);

        let score = self.show_click_score(value.show(), value.click());

        Ok(score < C::from_f32(self.params.delete_threshold)
            || value.unseen_days() > self.params.delete_after_unseen_days)
    }

    /// Decides whether a record takes part in a save pass.
    ///
    /// Only `SaveMode::Base` mutates the record, it clears `delta_score` of the
    /// records it keeps. Every other bookkeeping waits for `update_stat_after_save`,
    /// so a failed save can be retried against the same state.
    ///
    /// # Arguments
    /// * `value` - The full record.
    /// * `mode` - The export policy of the pass.
    ///
    /// # Returns
    /// Whether the record should be saved, or an error if `value` isn't a full record.
    pub fn save(&self, value: &mut [f32], mode: SaveMode) -> Result<bool> {
        let mut value = self.feature_mut(value)?;

        match mode {
            SaveMode::Delta => Ok(self.exportable(&value, self.params.delta_threshold)),
            SaveMode::Base => {
                if !self.exportable(&value, 0.) {
                    return Ok(false);
                }

                value.set_delta_score(0.);
                Ok(true)
            }
            SaveMode::All | SaveMode::Decayed | SaveMode::Revert | SaveMode::Other(_) => Ok(true),
        }
    }

    /// Updates a record's bookkeeping once a save pass is durable.
    ///
    /// A delta pass clears `delta_score` of the records it exported, a decayed pass
    /// counts one more unseen day. Other passes leave the record alone.
    ///
    /// # Arguments
    /// * `value` - The full record.
    /// * `mode` - The export policy of the pass.
    ///
    /// # Returns
    /// An error if `value` isn't a full record.
    pub fn update_stat_after_save(&self, value: &mut [f32], mode: SaveMode) -> Result<()> {
        let mut value = self.feature_mut(value)?;

        match mode {
            SaveMode::Delta => {
                if self.exportable(&value, self.params.delta_threshold) {
                    value.set_delta_score(0.);
                }
            }
            SaveMode::Decayed => value.set_unseen_days(value.unseen_days() + 1.),
            _ => {}
        }

        Ok(())
    }

    /// Decides whether a missing key should get a record, see `create_value_with`.
    pub fn create_value(&self, stage: Stage, push: &[f32]) -> Result<bool> {
        self.create_value_with(stage, push, &mut rand::rng())
    }

    /// Decides whether a missing key should get a record.
    ///
    /// Readers always get one. A push is admitted according to its score: never
    /// when it's not positive, always from `1` on, and with a probability equal to
    /// the score in between.
    ///
    /// # Arguments
    /// * `stage` - The stage the record would be created at.
    /// * `push` - The push record of the key, only read at `Stage::Push`.
    /// * `rng` - The random number generator for the admission draw.
    ///
    /// # Returns
    /// Whether to create the record, or an error if `push` isn't a push record.
    pub fn create_value_with<R: Rng + ?Sized>(
        &self,
        stage: Stage,
        push: &[f32],
        rng: &mut R,
    ) -> Result<bool> {
        let Stage::Push = stage else {
            return Ok(true);
        };

        let push = PushValue::new(self.push, push)?;
        let score = self.show_click_score(push.show(), push.click());

        if score <= 0. {
            return Ok(false);
        }

        if score >= 1. {
            return Ok(true);
        }

        Ok(rng.random::<f32>() < score)
    }

    /// Whether a record has been unseen long enough to be moved to slower storage.
    pub fn save_ssd(&self, value: &[f32]) -> Result<bool> {
        let value = self.feature(value)?;
        Ok(value.unseen_days() > self.params.ssd_unseenday_threshold)
    }

    /// Whether a record is important enough to hold the embedx region.
    pub fn need_extend_mf(&self, value: &[f32]) -> Result<bool> {
        let value = self.feature(value)?;
        let score = self.show_click_score(value.show(), value.click());
        Ok(score >= C::from_f32(self.embedx_threshold))
    }

    /// Whether a record of `slots` slots holds the embedx region.
    pub fn has_mf(&self, slots: usize) -> bool {
        self.feature.has_mf(slots)
    }

    /// Grows a short record into an extended one and initializes its embedx region.
    ///
    /// # Arguments
    /// * `value` - The full record, it's left untouched if already extended.
    ///
    /// # Returns
    /// Whether the record grew, or an error if `value` isn't a full record.
    pub fn extend_mf(&self, value: &mut Vec<f32>) -> Result<bool> {
        if self.feature(value)?.has_mf() {
            return Ok(false);
        }

        value.resize(self.feature.slots(), 0.);

        let mut value = self.feature_mut(value)?;
        let (w, accum) = value.embedx_mut().ok_or(AccessorErr::RecordSize {
            record: "feature",
            got: self.feature.short_slots(),
            expected: self.feature.slots(),
        })?;
        self.embedx_rule.init_value(w, accum, false);

        Ok(true)
    }

    /// Reads a named field of a record, only `"show"` is exposed.
    ///
    /// Single precision statistics are read through the day-indexed decay table,
    /// double precision ones are returned as stored.
    ///
    /// # Returns
    /// The field's value, or `AccessorErr::UnknownField` for any other name.
    pub fn get_field(&self, value: &[f32], name: &str) -> Result<f32> {
        if name != "show" {
            return Err(AccessorErr::UnknownField(name.to_string()));
        }

        let value = self.feature(value)?;
        let show = value.show().to_f32();

        if !C::DECAYS_BY_DAY {
            return Ok(show);
        }

        Ok((f64::from(show) * self.decay.rate(value.unseen_days())) as f32)
    }

    pub fn day_id(&self) -> i32 {
        self.decay.day_id()
    }

    pub fn set_day_id(&self, day_id: i32) {
        self.decay.set_day_id(day_id);
    }

    /// The export predicate shared by the delta and base passes.
    fn exportable<B: AsRef<[f32]>>(&self, value: &FeatureValue<B, C>, delta_threshold: f32) -> bool {
        let score = self.show_click_score(value.show(), value.click());

        score >= C::from_f32(self.params.base_threshold)
            && value.delta_score() >= delta_threshold
            && value.unseen_days() <= self.params.delta_keep_days
    }
}

impl CtrAccessor<f32> {
    /// Decays a record by the days elapsed since it was last seen, when the
    /// accessor runs on day ids.
    ///
    /// In this mode `unseen_days` holds the day the feature was last seen. Records
    /// stamped in the future are moved to the current day, records older than the
    /// decay table are left to eviction.
    ///
    /// # Arguments
    /// * `value` - The full record.
    /// * `update_seen_day` - Whether to stamp the record as seen on the current day.
    ///
    /// # Returns
    /// An error if `value` isn't a full record.
    pub fn update_time_decay(&self, value: &mut [f32], update_seen_day: bool) -> Result<()> {
        let day_id = self.decay.day_id();
        if day_id <= 0 {
            return Ok(());
        }

        let mut value = self.feature_mut(value)?;
        let day_diff = self.decay.day_diff(value.unseen_days());

        if day_diff < 0 {
            value.set_unseen_days(day_id as f32);
            return Ok(());
        }

        if day_diff as f32 >= self.params.delete_after_unseen_days {
            return Ok(());
        }

        let Some(rate) = self.decay.rate_for(day_diff as usize) else {
            return Ok(());
        };

        value.set_show((f64::from(value.show()) * rate) as f32);
        value.set_click((f64::from(value.click()) * rate) as f32);

        if update_seen_day {
            value.set_unseen_days(day_id as f32);
        }

        Ok(())
    }
}
