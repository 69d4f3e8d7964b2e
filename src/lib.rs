//! Value accessor of click-through-rate sparse feature tables.
//!
//! A table stores one record per feature key. The accessor knows the layout of
//! those records and owns their whole lifecycle: creation, projection for the
//! readers, gradient application, decay, eviction and persistence.

pub mod accessor;
pub mod builder;
pub mod error;
pub mod layout;
pub mod optimization;
pub mod record;
pub mod specs;
pub mod storage;

pub use accessor::{CtrAccessor, SaveMode, Stage, ValueAccessor};
pub use builder::AccessorBuilder;
pub use error::{AccessorErr, Result};
pub use specs::AccessorSpec;
pub use storage::SparseTable;
