use super::{RuleBase, SgdRule};

/// Plain gradient descent, it keeps no accumulator.
#[derive(Debug)]
pub struct NaiveSgd {
    base: RuleBase,
}

impl NaiveSgd {
    /// Creates a new `NaiveSgd` rule.
    ///
    /// # Arguments
    /// * `base` - The learning rate, initialization and bounds of the rule.
    ///
    /// # Returns
    /// A new `NaiveSgd` instance.
    pub fn new(base: RuleBase) -> Self {
        Self { base }
    }
}

impl SgdRule for NaiveSgd {
    fn dim(&self) -> usize {
        0
    }

    fn init_value(&self, weights: &mut [f32], _accum: &mut [f32], zero_init: bool) {
        self.base.init_weights(weights, zero_init);
    }

    fn update_value(&self, weights: &mut [f32], _accum: &mut [f32], grad: &[f32]) {
        let lr = self.base.learning_rate;

        for (w, g) in weights.iter_mut().zip(grad) {
            *w = self.base.bound(*w - lr * g);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let rule = NaiveSgd::new(RuleBase::new(0.5, 0.1, (-10., 10.), StdRng::seed_from_u64(0)));
        let mut weights = [1., 1.];

        rule.update_value(&mut weights, &mut [], &[2., -2.]);
        assert_eq!(weights, [0., 2.]);
    }

    #[test]
    fn respects_bounds() {
        let rule = NaiveSgd::new(RuleBase::new(1., 0.1, (-1., 1.), StdRng::seed_from_u64(0)));
        let mut weights = [0.];

        rule.update_value(&mut weights, &mut [], &[-5.]);
        assert_eq!(weights, [1.]);
    }
}
