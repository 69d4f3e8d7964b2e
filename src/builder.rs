use log::debug;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    accessor::CtrAccessor,
    error::{AccessorErr, Result},
    layout::Counter,
    optimization::{AdaGradSgd, AdamSgd, NaiveSgd, RuleBase, SgdRule, StdAdaGradSgd},
    specs::{AccessorSpec, Precision, SgdRuleSpec},
};

/// Builds `CtrAccessor`s given a specification.
#[derive(Debug, Default)]
pub struct AccessorBuilder;

impl AccessorBuilder {
    /// Creates a new `AccessorBuilder`.
    ///
    /// # Returns
    /// A new `AccessorBuilder` instance.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `CtrAccessor` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification of the accessor, its precision must match `C`.
    ///
    /// # Returns
    /// A new `CtrAccessor` or an `AccessorErr::InvalidSpec` if the spec is inconsistent.
    pub fn build<C: Counter>(&self, spec: &AccessorSpec) -> Result<CtrAccessor<C>> {
        spec.validate()?;

        let slots = match spec.precision {
            Precision::Single => 1,
            Precision::Double => 2,
        };

        if slots != C::SLOTS {
            return Err(AccessorErr::InvalidSpec(format!(
                "{:?} precision counters can't be stored in {} slots",
                spec.precision,
                C::SLOTS
            )));
        }

        let mut rng = self.generate_rng(spec.seed);
        let embed_rule = self.resolve_rule(spec.embed_sgd, 1, &mut rng);
        let embedx_rule = self.resolve_rule(spec.embedx_sgd, spec.embedx_dim, &mut rng);

        debug!(
            embedx_dim = spec.embedx_dim,
            embed_sgd_dim = embed_rule.dim(),
            embedx_sgd_dim = embedx_rule.dim();
            "built accessor"
        );

        Ok(CtrAccessor::new(
            spec.ctr,
            spec.embedx_dim,
            spec.embedx_threshold,
            embed_rule,
            embedx_rule,
        ))
    }

    /// Generates a random number generator given (or not) a seed.
    ///
    /// # Arguments
    /// * `seed` - An optional seed for the rng.
    ///
    /// # Returns
    /// A random number generator the rules' generators are drawn from.
    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Resolves an `SgdRule`.
    ///
    /// # Arguments
    /// * `spec` - The specification of the rule.
    /// * `embedding_dim` - The amount of weights the rule updates.
    /// * `rng` - The random number generator to seed the rule's own generator from.
    ///
    /// # Returns
    /// The rule, boxed so both rules of an accessor may differ.
    fn resolve_rule<R: Rng>(
        &self,
        spec: SgdRuleSpec,
        embedding_dim: usize,
        rng: &mut R,
    ) -> Box<dyn SgdRule> {
        let rule_rng = StdRng::seed_from_u64(rng.random());

        match spec {
            SgdRuleSpec::Naive(s) => {
                let base = RuleBase::new(s.learning_rate, s.initial_range, s.weight_bounds, rule_rng);
                Box::new(NaiveSgd::new(base))
            }
            SgdRuleSpec::Adagrad(s) => {
                let base = RuleBase::new(s.learning_rate, s.initial_range, s.weight_bounds, rule_rng);
                Box::new(AdaGradSgd::new(base, s.initial_g2sum))
            }
            SgdRuleSpec::StdAdagrad(s) => {
                let base = RuleBase::new(s.learning_rate, s.initial_range, s.weight_bounds, rule_rng);
                Box::new(StdAdaGradSgd::new(base, s.initial_g2sum, embedding_dim))
            }
            SgdRuleSpec::Adam(s) => {
                let base = RuleBase::new(s.learning_rate, s.initial_range, s.weight_bounds, rule_rng);
                Box::new(AdamSgd::new(base, s.beta1, s.beta2, s.epsilon, embedding_dim))
            }
        }
    }
}
