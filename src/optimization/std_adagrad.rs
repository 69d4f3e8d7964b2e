use super::{RuleBase, SgdRule};

/// AdaGrad with one squared gradient sum per weight.
#[derive(Debug)]
pub struct StdAdaGradSgd {
    base: RuleBase,
    initial_g2sum: f32,
    embedding_dim: usize,
}

impl StdAdaGradSgd {
    /// Creates a new `StdAdaGradSgd` rule.
    ///
    /// # Arguments
    /// * `base` - The learning rate, initialization and bounds of the rule.
    /// * `initial_g2sum` - Smooths the step size while the accumulated sums are small.
    /// * `embedding_dim` - The width of the weight blocks this rule updates.
    ///
    /// # Returns
    /// A new `StdAdaGradSgd` instance.
    pub fn new(base: RuleBase, initial_g2sum: f32, embedding_dim: usize) -> Self {
        Self {
            base,
            initial_g2sum,
            embedding_dim,
        }
    }
}

impl SgdRule for StdAdaGradSgd {
    fn dim(&self) -> usize {
        self.embedding_dim
    }

    fn init_value(&self, weights: &mut [f32], accum: &mut [f32], zero_init: bool) {
        self.base.init_weights(weights, zero_init);
        accum.fill(0.);
    }

    fn update_value(&self, weights: &mut [f32], accum: &mut [f32], grad: &[f32]) {
        let lr = self.base.learning_rate;
        let ig = self.initial_g2sum;

        weights
            .iter_mut()
            .zip(accum.iter_mut())
            .zip(grad)
            .for_each(|((w, g2sum), g)| {
                let scale = (ig / (ig + *g2sum)).sqrt();
                *w = self.base.bound(*w - lr * g * scale);
                *g2sum += g * g;
            });
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn keeps_one_sum_per_weight() {
        let base = RuleBase::new(0.1, 1e-4, (-10., 10.), StdRng::seed_from_u64(0));
        let rule = StdAdaGradSgd::new(base, 3., 2);
        let mut weights = [0., 0.];
        let mut accum = [0., 0.];

        assert_eq!(rule.dim(), 2);

        rule.update_value(&mut weights, &mut accum, &[1., 2.]);
        assert_eq!(accum, [1., 4.]);

        rule.update_value(&mut weights, &mut accum, &[0., 1.]);
        assert_eq!(accum, [1., 5.]);
        assert_eq!(weights[0], -0.1);
    }
}
