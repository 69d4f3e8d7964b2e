mod adagrad;
mod adam;
mod naive;
mod sgd_rule;
mod std_adagrad;

pub use adagrad::AdaGradSgd;
pub use adam::AdamSgd;
pub use naive::NaiveSgd;
pub use sgd_rule::{RuleBase, SgdRule};
pub use std_adagrad::StdAdaGradSgd;
