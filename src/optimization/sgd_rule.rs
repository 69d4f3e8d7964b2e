use parking_lot::Mutex;
use rand::{Rng, rngs::StdRng};

/// Defines how a weight block and its optimizer accumulator are initialized and
/// updated from a gradient.
///
/// Rules hold no per-feature state, everything lives in the slices handed to
/// them, so a single instance serves every record of a table from many threads.
/// The slices always come from a length checked record view.
pub trait SgdRule: Send + Sync {
    /// The amount of accumulator slots this rule needs per weight block.
    fn dim(&self) -> usize;

    /// Initializes a weight block and its accumulator.
    ///
    /// # Arguments
    /// * `weights` - The weights to initialize.
    /// * `accum` - The accumulator of `weights`, `dim()` slots long.
    /// * `zero_init` - Whether the weights start at zero instead of a random value.
    fn init_value(&self, weights: &mut [f32], accum: &mut [f32], zero_init: bool);

    /// Applies a gradient to a weight block.
    ///
    /// # Arguments
    /// * `weights` - The weights to update.
    /// * `accum` - The accumulator of `weights`, `dim()` slots long.
    /// * `grad` - The gradient of `weights`.
    fn update_value(&self, weights: &mut [f32], accum: &mut [f32], grad: &[f32]);
}

/// Settings every rule shares: the step size, how weights are initialized and
/// the range they are kept in.
#[derive(Debug)]
pub struct RuleBase {
    pub(super) learning_rate: f32,
    initial_range: f32,
    min_bound: f32,
    max_bound: f32,
    rng: Mutex<StdRng>,
}

impl RuleBase {
    /// Creates a new `RuleBase`.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `initial_range` - Random weights are sampled from `[-initial_range, initial_range)`.
    /// * `weight_bounds` - The inclusive range weights are clamped to.
    /// * `rng` - The random number generator for the initial weights.
    ///
    /// # Returns
    /// A new `RuleBase` instance.
    pub fn new(learning_rate: f32, initial_range: f32, weight_bounds: (f32, f32), rng: StdRng) -> Self {
        Self {
            learning_rate,
            initial_range,
            min_bound: weight_bounds.0,
            max_bound: weight_bounds.1,
            rng: Mutex::new(rng),
        }
    }

    /// Fills `weights` with zeros or with uniform samples of the initial range.
    pub fn init_weights(&self, weights: &mut [f32], zero_init: bool) {
        if zero_init {
            weights.fill(0.);
            return;
        }

        let range = self.initial_range;
        let mut rng = self.rng.lock();

        for w in weights.iter_mut() {
            *w = self.bound((rng.random::<f32>() * 2. - 1.) * range);
        }
    }

    /// Clamps a weight into the configured bounds.
    pub fn bound(&self, w: f32) -> f32 {
        w.clamp(self.min_bound, self.max_bound)
    }
}
