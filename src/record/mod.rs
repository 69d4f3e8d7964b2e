mod feature;
mod pull;
mod push;

pub use feature::FeatureValue;
pub use pull::PullValue;
pub use push::PushValue;
