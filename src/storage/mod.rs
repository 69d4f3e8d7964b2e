mod shard;
mod table;

pub(super) use shard::TableShard;
pub use table::SparseTable;
