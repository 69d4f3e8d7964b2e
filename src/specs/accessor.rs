use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use super::SgdRuleSpec;
use crate::error::{AccessorErr, Result};

/// The longest unseen period the day decay table is allowed to cover.
pub const MAX_UNSEEN_DAYS: f32 = 3650.;

/// The numeric representation of the show and click statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    #[default]
    Single,
    Double,
}

/// Scoring, eviction and export thresholds of a click-through-rate accessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtrParamSpec {
    pub nonclk_coeff: f32,
    pub click_coeff: f32,
    pub base_threshold: f32,
    pub delta_threshold: f32,
    pub delta_keep_days: f32,
    pub show_click_decay_rate: f32,
    pub delete_threshold: f32,
    pub delete_after_unseen_days: f32,
    pub ssd_unseenday_threshold: f32,
}

impl Default for CtrParamSpec {
    fn default() -> Self {
        Self {
            nonclk_coeff: 0.1,
            click_coeff: 1.,
            base_threshold: 1.5,
            delta_threshold: 0.25,
            delta_keep_days: 16.,
            show_click_decay_rate: 0.98,
            delete_threshold: 0.8,
            delete_after_unseen_days: 30.,
            ssd_unseenday_threshold: 1.,
        }
    }
}

/// The specification for a `CtrAccessor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessorSpec {
    pub embedx_dim: usize,
    pub embedx_threshold: f32,
    pub precision: Precision,
    pub ctr: CtrParamSpec,
    pub embed_sgd: SgdRuleSpec,
    pub embedx_sgd: SgdRuleSpec,
    pub seed: Option<u64>,
}

impl Default for AccessorSpec {
    fn default() -> Self {
        Self {
            embedx_dim: 8,
            embedx_threshold: 10.,
            precision: Precision::default(),
            ctr: CtrParamSpec::default(),
            embed_sgd: SgdRuleSpec::default(),
            embedx_sgd: SgdRuleSpec::default(),
            seed: None,
        }
    }
}

impl AccessorSpec {
    /// Reads an `AccessorSpec` from a json file.
    ///
    /// # Arguments
    /// * `path` - The path of the json file.
    ///
    /// # Returns
    /// The validated spec, or an error if the file can't be read, parsed or validated.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let spec: Self = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Checks that the spec describes a usable accessor.
    ///
    /// # Returns
    /// `AccessorErr::InvalidSpec` describing the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        let ctr = &self.ctr;

        let finite = [
            ("embedx_threshold", self.embedx_threshold),
            ("nonclk_coeff", ctr.nonclk_coeff),
            ("click_coeff", ctr.click_coeff),
            ("base_threshold", ctr.base_threshold),
            ("delta_threshold", ctr.delta_threshold),
            ("delta_keep_days", ctr.delta_keep_days),
            ("delete_threshold", ctr.delete_threshold),
            ("delete_after_unseen_days", ctr.delete_after_unseen_days),
            ("ssd_unseenday_threshold", ctr.ssd_unseenday_threshold),
        ];

        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AccessorErr::InvalidSpec(format!("{name} must be finite, got {value}")));
        }

        if !(0. ..=1.).contains(&ctr.show_click_decay_rate) {
            return Err(AccessorErr::InvalidSpec(format!(
                "show_click_decay_rate must be in [0, 1], got {}",
                ctr.show_click_decay_rate
            )));
        }

        if !(0. ..=MAX_UNSEEN_DAYS).contains(&ctr.delete_after_unseen_days) {
            return Err(AccessorErr::InvalidSpec(format!(
                "delete_after_unseen_days must be in [0, {MAX_UNSEEN_DAYS}], got {}",
                ctr.delete_after_unseen_days
            )));
        }

        self.embed_sgd
            .check()
            .map_err(|e| AccessorErr::InvalidSpec(format!("embed_sgd: {e}")))?;

        self.embedx_sgd
            .check()
            .map_err(|e| AccessorErr::InvalidSpec(format!("embedx_sgd: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let spec: AccessorSpec = serde_json::from_str("{}").unwrap();

        assert_eq!(spec, AccessorSpec::default());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let json = r#"{
            "embedx_dim": 4,
            "precision": "double",
            "ctr": { "delete_threshold": 0.5 },
            "embedx_sgd": { "std_adagrad": { "learning_rate": 0.2 } },
            "seed": 7
        }"#;
        let spec: AccessorSpec = serde_json::from_str(json).unwrap();

        assert_eq!(spec.embedx_dim, 4);
        assert_eq!(spec.precision, Precision::Double);
        assert_eq!(spec.ctr.delete_threshold, 0.5);
        assert_eq!(spec.ctr.click_coeff, 1.);
        assert!(matches!(spec.embedx_sgd, SgdRuleSpec::StdAdagrad(s) if s.learning_rate == 0.2));
        assert_eq!(spec.seed, Some(7));
    }

    #[test]
    fn rejects_decay_rates_above_one() {
        let mut spec = AccessorSpec::default();
        spec.ctr.show_click_decay_rate = 1.5;

        assert!(matches!(spec.validate(), Err(AccessorErr::InvalidSpec(_))));
    }

    #[test]
    fn rejects_unseen_limits_the_decay_table_cannot_hold() {
        let mut spec = AccessorSpec::default();

        spec.ctr.delete_after_unseen_days = 1e10;
        assert!(matches!(spec.validate(), Err(AccessorErr::InvalidSpec(_))));

        spec.ctr.delete_after_unseen_days = -1.;
        assert!(matches!(spec.validate(), Err(AccessorErr::InvalidSpec(_))));

        spec.ctr.delete_after_unseen_days = MAX_UNSEEN_DAYS;
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn reports_the_failing_rule() {
        let mut spec = AccessorSpec::default();
        spec.embedx_sgd = SgdRuleSpec::Naive(crate::specs::NaiveSpec {
            learning_rate: f32::NAN,
            ..Default::default()
        });

        let Err(AccessorErr::InvalidSpec(detail)) = spec.validate() else {
            panic!("expected an invalid spec");
        };
        assert!(detail.starts_with("embedx_sgd"));
    }
}
