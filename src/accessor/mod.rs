mod codec;
mod ctr;
mod decay;
mod info;
mod mode;
mod retention;
mod value_accessor;

#[cfg(test)]
pub(crate) mod testing;

pub use ctr::CtrAccessor;
pub use decay::TimeDecay;
pub use info::{AccessorInfo, InfoKey};
pub use mode::{SaveMode, Stage};
pub use value_accessor::ValueAccessor;
