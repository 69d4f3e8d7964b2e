use super::{RuleBase, SgdRule};

/// Adam, the accumulator holds the first and second moments of every weight
/// followed by the running powers of both decay rates:
///
/// ```text
/// gsum[embedding_dim] | g2sum[embedding_dim] | beta1_pow | beta2_pow
/// ```
#[derive(Debug)]
pub struct AdamSgd {
    base: RuleBase,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    embedding_dim: usize,
}

impl AdamSgd {
    /// Creates a new `AdamSgd` rule.
    ///
    /// # Arguments
    /// * `base` - The learning rate, initialization and bounds of the rule.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    /// * `embedding_dim` - The width of the weight blocks this rule updates.
    ///
    /// # Returns
    /// A new `AdamSgd` instance.
    pub fn new(base: RuleBase, beta1: f32, beta2: f32, epsilon: f32, embedding_dim: usize) -> Self {
        Self {
            base,
            beta1,
            beta2,
            epsilon,
            embedding_dim,
        }
    }
}

impl SgdRule for AdamSgd {
    fn dim(&self) -> usize {
        self.embedding_dim * 2 + 2
    }

    fn init_value(&self, weights: &mut [f32], accum: &mut [f32], zero_init: bool) {
        self.base.init_weights(weights, zero_init);

        let n = self.embedding_dim;
        accum[..2 * n].fill(0.);
        accum[2 * n] = self.beta1;
        accum[2 * n + 1] = self.beta2;
    }

    fn update_value(&self, weights: &mut [f32], accum: &mut [f32], grad: &[f32]) {
        let Self {
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            embedding_dim: n,
            ..
        } = *self;

        let (moments, pows) = accum.split_at_mut(2 * n);
        let (gsum, g2sum) = moments.split_at_mut(n);

        let beta1_pow = pows[0];
        let beta2_pow = pows[1];
        let lr = self.base.learning_rate * (1. - beta2_pow).sqrt() / (1. - beta1_pow);

        weights
            .iter_mut()
            .zip(gsum.iter_mut())
            .zip(g2sum.iter_mut())
            .zip(grad)
            .for_each(|(((w, m), v), g)| {
                *m = b1 * *m + (1. - b1) * g;
                *v = b2 * *v + (1. - b2) * g * g;
                *w = self.base.bound(*w - lr * (*m / (v.sqrt() + eps)));
            });

        pows[0] *= b1;
        pows[1] *= b2;
    }
}
