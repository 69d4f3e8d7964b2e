mod accessor;
mod sgd;

pub use accessor::{AccessorSpec, CtrParamSpec, Precision};
pub use sgd::{AdagradSpec, AdamSpec, NaiveSpec, SgdRuleSpec};
