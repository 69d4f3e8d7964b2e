mod counter;
mod feature;
mod pull;
mod push;

pub use counter::Counter;
pub use feature::FeatureLayout;
pub use pull::PullLayout;
pub use push::PushLayout;

/// The byte width of a record slot.
pub const SLOT_SIZE: usize = size_of::<f32>();
