use super::{RuleBase, SgdRule};

/// AdaGrad with a single squared gradient sum shared by the whole weight block.
#[derive(Debug)]
pub struct AdaGradSgd {
    base: RuleBase,
    initial_g2sum: f32,
}

impl AdaGradSgd {
    /// Creates a new `AdaGradSgd` rule.
    ///
    /// # Arguments
    /// * `base` - The learning rate, initialization and bounds of the rule.
    /// * `initial_g2sum` - Smooths the step size while the accumulated sum is small.
    ///
    /// # Returns
    /// A new `AdaGradSgd` instance.
    pub fn new(base: RuleBase, initial_g2sum: f32) -> Self {
        Self {
            base,
            initial_g2sum,
        }
    }
}

impl SgdRule for AdaGradSgd {
    fn dim(&self) -> usize {
        1
    }

    fn init_value(&self, weights: &mut [f32], accum: &mut [f32], zero_init: bool) {
        self.base.init_weights(weights, zero_init);
        accum.fill(0.);
    }

    fn update_value(&self, weights: &mut [f32], accum: &mut [f32], grad: &[f32]) {
        if weights.is_empty() {
            return;
        }

        let lr = self.base.learning_rate;
        let g2sum = accum[0];
        let scale = (self.initial_g2sum / (self.initial_g2sum + g2sum)).sqrt();
        let mut add_g2sum = 0.;

        for (w, g) in weights.iter_mut().zip(grad) {
            *w = self.base.bound(*w - lr * g * scale);
            add_g2sum += g * g;
        }

        accum[0] += add_g2sum / weights.len() as f32;
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn rule() -> AdaGradSgd {
        let base = RuleBase::new(0.1, 1e-4, (-10., 10.), StdRng::seed_from_u64(0));
        AdaGradSgd::new(base, 3.)
    }

    #[test]
    fn first_step_is_plain_sgd() {
        let rule = rule();
        let mut weights = [0., 0.];
        let mut accum = [0.];

        rule.update_value(&mut weights, &mut accum, &[1., 3.]);

        assert_eq!(weights, [-0.1, -0.3]);
        assert_eq!(accum, [5.]);
    }

    #[test]
    fn steps_shrink_as_g2sum_grows() {
        let rule = rule();
        let mut weights = [0.];
        let mut accum = [0.];

        rule.update_value(&mut weights, &mut accum, &[1.]);
        let first = -weights[0];
        rule.update_value(&mut weights, &mut accum, &[1.]);
        let second = -weights[0] - first;

        assert!(second < first);
        assert_eq!(accum, [2.]);
    }

    #[test]
    fn init_clears_the_accumulator() {
        let rule = rule();
        let mut weights = [1.];
        let mut accum = [7.];

        rule.init_value(&mut weights, &mut accum, true);
        assert_eq!((weights, accum), ([0.], [0.]));
    }
}
