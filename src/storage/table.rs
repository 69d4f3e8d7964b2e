use std::{
    collections::{HashMap, hash_map::Entry},
    io::{BufRead, BufWriter, Write},
    num::NonZeroUsize,
};

use log::{debug, info};
use rayon::prelude::*;

use super::TableShard;
use crate::{
    accessor::{SaveMode, ValueAccessor},
    error::{AccessorErr, Result},
};

/// Partitions the records of a sparse feature table in shards and leverages
/// parallelization to serve pulls, pushes and maintenance passes.
///
/// The table only stores `f32` buffers, every decision about their content is
/// delegated to the accessor.
#[derive(Debug)]
pub struct SparseTable<A: ValueAccessor> {
    accessor: A,
    shards: Box<[TableShard]>,
}

impl<A: ValueAccessor> SparseTable<A> {
    /// Creates a new empty `SparseTable`.
    ///
    /// # Arguments
    /// * `accessor` - The accessor of the table's records.
    /// * `shard_num` - The amount of shards the keys are spread over.
    ///
    /// # Returns
    /// A new `SparseTable` instance.
    pub fn new(accessor: A, shard_num: NonZeroUsize) -> Self {
        let shards = (0..shard_num.get()).map(|_| TableShard::new()).collect();
        Self { accessor, shards }
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    /// The amount of records in the table.
    pub fn len(&self) -> usize {
        self.shards.iter().map(TableShard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of the full record of `key`, if the table holds it.
    pub fn get(&self, key: u64) -> Option<Vec<f32>> {
        self.shard(key).get(key)
    }

    /// Reads the pull records of `keys`, creating the ones that are missing.
    ///
    /// # Arguments
    /// * `keys` - The feature keys.
    ///
    /// # Returns
    /// The pull records of `keys` laid out one after the other.
    pub fn pull(&self, keys: &[u64]) -> Result<Vec<f32>> {
        let dim = self.accessor.select_dim();
        let mut pulls = vec![0.; keys.len() * dim];

        pulls
            .par_chunks_mut(dim)
            .zip(keys.par_iter())
            .try_for_each(|(pull, &key)| self.shard(key).pull(&self.accessor, key, pull))?;

        Ok(pulls)
    }

    /// Applies the push records of `keys`.
    ///
    /// Push records of repeated keys are merged before they reach the table, so
    /// each key is updated once per call.
    ///
    /// # Arguments
    /// * `keys` - The feature keys.
    /// * `pushes` - The push records of `keys` laid out one after the other.
    ///
    /// # Returns
    /// The amount of keys the pushes were applied to, or an error if `pushes`
    /// doesn't hold a push record per key.
    pub fn push(&self, keys: &[u64], pushes: &[f32]) -> Result<usize> {
        let dim = self.accessor.update_dim();

        if pushes.len() != keys.len() * dim {
            return Err(AccessorErr::BatchMismatch {
                a: "push values",
                b: "keys",
                got: pushes.len(),
                expected: keys.len() * dim,
            });
        }

        let mut merged: HashMap<u64, Vec<f32>> = HashMap::with_capacity(keys.len());

        for (&key, push) in keys.iter().zip(pushes.chunks(dim)) {
            match merged.entry(key) {
                Entry::Occupied(mut entry) => {
                    self.accessor.merge(&mut [entry.get_mut().as_mut_slice()], &[push])?
                }
                Entry::Vacant(entry) => {
                    entry.insert(push.to_vec());
                }
            }
        }

        let applied = merged
            .par_iter()
            .map(|(&key, push)| self.shard(key).push(&self.accessor, key, push).map(usize::from))
            .try_reduce(|| 0, |a, b| Ok(a + b))?;

        debug!(keys = merged.len(), applied = applied; "applied pushes");
        Ok(applied)
    }

    /// Decays every record and evicts the cold ones.
    ///
    /// # Returns
    /// The amount of evicted records.
    pub fn shrink(&self) -> Result<usize> {
        let evicted = self
            .shards
            .par_iter()
            .map(|shard| shard.shrink(&self.accessor))
            .try_reduce(|| 0, |a, b| Ok(a + b))?;

        info!(evicted = evicted, remaining = self.len(); "shrunk table");
        Ok(evicted)
    }

    /// Writes the records selected by `mode`, one `key<TAB>record` line each.
    ///
    /// The bookkeeping of every record is updated once the whole dump is flushed,
    /// so a failed write leaves the table ready for a retry. Every shard stays
    /// locked until then, pushes arriving meanwhile wait for the next save.
    ///
    /// # Arguments
    /// * `mode` - The export policy.
    /// * `writer` - The destination of the dump.
    ///
    /// # Returns
    /// The amount of written records.
    pub fn save<W: Write>(&self, mode: SaveMode, writer: W) -> Result<usize> {
        let mut writer = BufWriter::new(writer);
        let mut shards: Vec<_> = self.shards.iter().map(TableShard::lock).collect();
        let mut saved = 0;

        for shard in shards.iter_mut() {
            saved += shard.save(&self.accessor, mode, &mut writer)?;
        }

        writer.flush()?;

        for shard in shards.iter_mut() {
            shard.update_stat_after_save(&self.accessor, mode)?;
        }

        info!(mode = i32::from(mode), saved = saved; "saved table");
        Ok(saved)
    }

    /// Reads a dump written by `save`, replacing the records of the keys it holds.
    ///
    /// # Arguments
    /// * `reader` - The source of the dump.
    ///
    /// # Returns
    /// The amount of loaded records, or an error on the first malformed line.
    pub fn load<R: BufRead>(&self, reader: R) -> Result<usize> {
        let mut loaded = 0;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            let malformed = || AccessorErr::MalformedLine {
                line: idx + 1,
                content: line.to_string(),
            };

            let (key, text) = line.split_once('\t').ok_or_else(malformed)?;
            let key = key.parse().map_err(|_| malformed())?;

            let value = self.parse_record(text)?;
            self.shard(key).insert(key, value);
            loaded += 1;
        }

        info!(loaded = loaded; "loaded table");
        Ok(loaded)
    }

    /// Restores a record in the shortest buffer that fits its dump.
    fn parse_record(&self, text: &str) -> Result<Vec<f32>> {
        let mut value = vec![0.; self.accessor.short_slots()];

        match self.accessor.parse_from_string(text, &mut value) {
            Ok(_) => Ok(value),
            Err(AccessorErr::TooManyFields { .. }) => {
                value.resize(self.accessor.slots(), 0.);
                self.accessor.parse_from_string(text, &mut value)?;
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    fn shard(&self, key: u64) -> &TableShard {
        &self.shards[(key % self.shards.len() as u64) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::testing::{accessor, push_record};

    fn table(embedx_dim: usize) -> SparseTable<crate::accessor::CtrAccessor<f32>> {
        SparseTable::new(accessor(embedx_dim), NonZeroUsize::new(4).unwrap())
    }

    #[test]
    fn pull_lays_records_out_in_key_order() {
        let table = table(2);

        let pulls = table.pull(&[5, 6, 5]).unwrap();

        assert_eq!(pulls.len(), 9);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn push_merges_repeated_keys() {
        let table = table(2);
        let a = push_record(1., 2., 1., 0., &[0., 0.]);
        let b = push_record(1., 3., 0., 0., &[0., 0.]);
        let pushes = [a, b].concat();

        assert_eq!(table.push(&[9, 9], &pushes).unwrap(), 1);

        let value = table.get(9).unwrap();
        let layout = table.accessor().feature_layout();
        assert_eq!(value[layout.show_index()], 5.);
        assert_eq!(value[layout.click_index()], 1.);
    }

    #[test]
    fn push_rejects_ragged_batches() {
        let table = table(2);

        let err = table.push(&[1, 2], &[0.; 6]).unwrap_err();
        assert!(matches!(err, AccessorErr::BatchMismatch { got: 6, expected: 12, .. }));
    }

    #[test]
    fn load_rejects_lines_without_a_key() {
        let table = table(2);

        let err = table.load("0 0 1 0 0 0 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AccessorErr::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn load_picks_the_record_length_from_the_dump() {
        let table = table(2);
        let dump = "1\t0 0 1 0 0 0 -1\n\n2\t0 0 200 20 0.5 0 1 0 0.25 0.5\n";

        assert_eq!(table.load(dump.as_bytes()).unwrap(), 2);

        let layout = *table.accessor().feature_layout();
        assert_eq!(table.get(1).unwrap().len(), layout.short_slots());
        assert_eq!(table.get(2).unwrap().len(), layout.slots());
    }
}
