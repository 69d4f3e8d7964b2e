use super::{Counter, SLOT_SIZE};

/// Offsets of the full (stored) record.
///
/// ```text
/// unseen_days | delta_score | show | click | embed_w | embed_accum[..] | slot
///   | embedx_accum[..] | embedx_w[embedx_dim]
/// ```
///
/// `show` and `click` take `counter_slots` slots each, the accumulator regions are
/// sized by the update rules. Everything from `embedx_accum` on is the extended
/// (MF) region, which a stored record only holds once it has been extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLayout {
    counter_slots: usize,
    embed_sgd_dim: usize,
    embedx_sgd_dim: usize,
    embedx_dim: usize,
}

impl FeatureLayout {
    /// Creates a new `FeatureLayout`.
    ///
    /// # Arguments
    /// * `embed_sgd_dim` - The accumulator width of the embed update rule.
    /// * `embedx_dim` - The embedding width.
    /// * `embedx_sgd_dim` - The accumulator width of the embedx update rule.
    ///
    /// # Returns
    /// A new `FeatureLayout` instance for counters of type `C`.
    pub fn new<C: Counter>(embed_sgd_dim: usize, embedx_dim: usize, embedx_sgd_dim: usize) -> Self {
        Self {
            counter_slots: C::SLOTS,
            embed_sgd_dim,
            embedx_sgd_dim,
            embedx_dim,
        }
    }

    pub fn unseen_days_index(&self) -> usize {
        0
    }

    pub fn delta_score_index(&self) -> usize {
        self.unseen_days_index() + 1
    }

    pub fn show_index(&self) -> usize {
        self.delta_score_index() + 1
    }

    pub fn click_index(&self) -> usize {
        self.show_index() + self.counter_slots
    }

    pub fn embed_w_index(&self) -> usize {
        self.click_index() + self.counter_slots
    }

    pub fn embed_accum_index(&self) -> usize {
        self.embed_w_index() + 1
    }

    pub fn slot_index(&self) -> usize {
        self.embed_accum_index() + self.embed_sgd_dim
    }

    pub fn embedx_accum_index(&self) -> usize {
        self.slot_index() + 1
    }

    pub fn embedx_w_index(&self) -> usize {
        self.embedx_accum_index() + self.embedx_sgd_dim
    }

    pub fn embed_sgd_dim(&self) -> usize {
        self.embed_sgd_dim
    }

    pub fn embedx_sgd_dim(&self) -> usize {
        self.embedx_sgd_dim
    }

    /// The amount of slots of an extended record.
    pub fn slots(&self) -> usize {
        self.embedx_w_index() + self.embedx_dim
    }

    /// The amount of slots of a record that doesn't hold the extended region yet.
    pub fn short_slots(&self) -> usize {
        self.embedx_accum_index()
    }

    /// The amount of logical fields of an extended record, counters count once.
    pub fn dim(&self) -> usize {
        6 + self.embed_sgd_dim + self.embedx_sgd_dim + self.embedx_dim
    }

    /// The byte width reported for the logical field `_dim`. Every field reports
    /// a single slot, double counters included.
    pub fn dim_size(&self, _dim: usize) -> usize {
        SLOT_SIZE
    }

    /// The byte size of an extended record.
    pub fn size(&self) -> usize {
        self.slots() * SLOT_SIZE
    }

    /// The byte size of the extended region, embedx weights plus their accumulator.
    pub fn mf_size(&self) -> usize {
        (self.embedx_dim + self.embedx_sgd_dim) * SLOT_SIZE
    }

    /// Whether a record of `slots` slots holds the extended region.
    pub fn has_mf(&self, slots: usize) -> bool {
        slots > self.embedx_accum_index()
    }
}
