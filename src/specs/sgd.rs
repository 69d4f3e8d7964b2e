use serde::{Deserialize, Serialize};

/// The specification for the `NaiveSgd` rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveSpec {
    pub learning_rate: f32,
    pub initial_range: f32,
    pub weight_bounds: (f32, f32),
}

impl Default for NaiveSpec {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            initial_range: 1e-4,
            weight_bounds: (-10., 10.),
        }
    }
}

/// The specification for the `AdaGradSgd` and `StdAdaGradSgd` rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdagradSpec {
    pub learning_rate: f32,
    pub initial_g2sum: f32,
    pub initial_range: f32,
    pub weight_bounds: (f32, f32),
}

impl Default for AdagradSpec {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            initial_g2sum: 3.,
            initial_range: 1e-4,
            weight_bounds: (-10., 10.),
        }
    }
}

/// The specification for the `AdamSgd` rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamSpec {
    pub learning_rate: f32,
    pub initial_range: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    pub weight_bounds: (f32, f32),
}

impl Default for AdamSpec {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            initial_range: 1e-4,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_bounds: (-10., 10.),
        }
    }
}

/// The specification for the `SgdRule` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SgdRuleSpec {
    Naive(NaiveSpec),
    Adagrad(AdagradSpec),
    StdAdagrad(AdagradSpec),
    Adam(AdamSpec),
}

impl Default for SgdRuleSpec {
    fn default() -> Self {
        Self::Adagrad(AdagradSpec::default())
    }
}

impl SgdRuleSpec {
    /// Checks the hyperparameters of the rule.
    ///
    /// # Returns
    /// A description of the first invalid value, if any.
    pub fn check(&self) -> Result<(), String> {
        let (learning_rate, initial_range, (low, high)) = match *self {
            SgdRuleSpec::Naive(s) => (s.learning_rate, s.initial_range, s.weight_bounds),
            SgdRuleSpec::Adagrad(s) | SgdRuleSpec::StdAdagrad(s) => {
                if !(s.initial_g2sum > 0.) {
                    return Err(format!("initial_g2sum must be positive, got {}", s.initial_g2sum));
                }
                (s.learning_rate, s.initial_range, s.weight_bounds)
            }
            SgdRuleSpec::Adam(s) => {
                for (name, beta) in [("beta1", s.beta1), ("beta2", s.beta2)] {
                    if !(0. ..1.).contains(&beta) {
                        return Err(format!("{name} must be in [0, 1), got {beta}"));
                    }
                }
                (s.learning_rate, s.initial_range, s.weight_bounds)
            }
        };

        if !learning_rate.is_finite() {
            return Err(format!("learning_rate must be finite, got {learning_rate}"));
        }

        if !(initial_range >= 0.) {
            return Err(format!("initial_range can't be negative, got {initial_range}"));
        }

        if !(low <= high) {
            return Err(format!("invalid weight_bounds ({low}, {high})"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_externally_tagged_rules() {
        let spec: SgdRuleSpec =
            serde_json::from_str(r#"{"adagrad": {"learning_rate": 0.1}}"#).unwrap();

        let SgdRuleSpec::Adagrad(adagrad) = spec else {
            panic!("expected adagrad, got {spec:?}");
        };

        assert_eq!(adagrad.learning_rate, 0.1);
        assert_eq!(adagrad.initial_g2sum, 3.);
    }

    #[test]
    fn rejects_inverted_bounds() {
        let spec = SgdRuleSpec::Naive(NaiveSpec {
            weight_bounds: (1., -1.),
            ..Default::default()
        });

        assert!(spec.check().is_err());
    }

    #[test]
    fn rejects_adam_betas_out_of_range() {
        let spec = SgdRuleSpec::Adam(AdamSpec {
            beta2: 1.,
            ..Default::default()
        });

        assert!(spec.check().is_err());
        assert!(SgdRuleSpec::Adam(AdamSpec::default()).check().is_ok());
    }
}
