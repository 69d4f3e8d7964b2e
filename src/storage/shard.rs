use std::{
    collections::{HashMap, hash_map::Entry},
    io::Write,
};

use parking_lot::{RwLock, RwLockWriteGuard};

use crate::{
    accessor::{SaveMode, Stage, ValueAccessor},
    error::Result,
};

/// A partition of a sparse table's records, guarded by a single lock.
#[derive(Debug, Default)]
pub struct TableShard {
    records: RwLock<HashMap<u64, Vec<f32>>>,
}

impl TableShard {
    /// Creates a new empty `TableShard`.
    ///
    /// # Returns
    /// A new `TableShard` instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn get(&self, key: u64) -> Option<Vec<f32>> {
        self.records.read().get(&key).cloned()
    }

    pub fn insert(&self, key: u64, value: Vec<f32>) {
        self.records.write().insert(key, value);
    }

    /// Writes the pull record of `key` into `out`, creating the key if it's missing.
    ///
    /// # Arguments
    /// * `accessor` - The accessor of the records.
    /// * `key` - The feature key.
    /// * `out` - The pull record to write.
    ///
    /// # Returns
    /// An error if `out` isn't a pull record.
    pub fn pull<A>(&self, accessor: &A, key: u64, out: &mut [f32]) -> Result<()>
    where
        A: ValueAccessor + ?Sized,
    {
        if let Some(value) = self.records.read().get(&key) {
            return accessor.select(&mut [out], &[value.as_slice()]);
        }

        let mut records = self.records.write();
        let value = match records.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if !accessor.create_value(Stage::Pull, &[])? {
                    out.fill(0.);
                    return Ok(());
                }

                let mut value = vec![0.; accessor.short_slots()];
                accessor.create(&mut [&mut value])?;
                entry.insert(value)
            }
        };

        accessor.select(&mut [out], &[value.as_slice()])
    }

    /// Applies a merged push record to `key`.
    ///
    /// Missing keys go through admission first. Records whose score crosses the
    /// embedx threshold are extended right after the update.
    ///
    /// # Arguments
    /// * `accessor` - The accessor of the records.
    /// * `key` - The feature key.
    /// * `push` - The push record of the key.
    ///
    /// # Returns
    /// Whether the push was applied, or an error if `push` isn't a push record.
    pub fn push<A>(&self, accessor: &A, key: u64, push: &[f32]) -> Result<bool>
    where
        A: ValueAccessor + ?Sized,
    {
        let mut records = self.records.write();
        let value = match records.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if !accessor.create_value(Stage::Push, push)? {
                    return Ok(false);
                }

                let mut value = vec![0.; accessor.short_slots()];
                accessor.create(&mut [&mut value])?;
                entry.insert(value)
            }
        };

        accessor.update(&mut [value.as_mut_slice()], &[push])?;

        if !accessor.has_mf(value.len()) && accessor.need_extend_mf(value)? {
            accessor.extend_mf(value)?;
        }

        Ok(true)
    }

    /// Decays every record and evicts the ones the accessor gives up on.
    ///
    /// # Returns
    /// The amount of evicted records.
    pub fn shrink<A>(&self, accessor: &A) -> Result<usize>
    where
        A: ValueAccessor + ?Sized,
    {
        let mut records = self.records.write();
        let mut evicted = Vec::new();

        for (&key, value) in records.iter_mut() {
            if accessor.shrink(value)? {
                evicted.push(key);
            }
        }

        for key in &evicted {
            records.remove(key);
        }

        Ok(evicted.len())
    }

    /// Locks the shard for a save, keeping its records still until the guard drops.
    pub fn lock(&self) -> LockedShard<'_> {
        LockedShard {
            records: self.records.write(),
        }
    }
}

/// A shard held under its write lock across the export and bookkeeping of a save.
pub struct LockedShard<'a> {
    records: RwLockWriteGuard<'a, HashMap<u64, Vec<f32>>>,
}

impl LockedShard<'_> {
    /// Writes the records selected by `mode` as `key<TAB>record` lines.
    ///
    /// # Returns
    /// The amount of written records.
    pub fn save<A, W>(&mut self, accessor: &A, mode: SaveMode, writer: &mut W) -> Result<usize>
    where
        A: ValueAccessor + ?Sized,
        W: Write,
    {
        let mut saved = 0;

        for (key, value) in self.records.iter_mut() {
            if !accessor.save(value, mode)? {
                continue;
            }

            let text = accessor.parse_to_string(value, value.len())?;
            writeln!(writer, "{key}\t{text}")?;
            saved += 1;
        }

        Ok(saved)
    }

    pub fn update_stat_after_save<A>(&mut self, accessor: &A, mode: SaveMode) -> Result<()>
    where
        A: ValueAccessor + ?Sized,
    {
        self.records
            .values_mut()
            .try_for_each(|value| accessor.update_stat_after_save(value, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        accessor::testing::{accessor, accessor_with, push_record},
        specs::CtrParamSpec,
    };

    #[test]
    fn pull_creates_short_records() {
        let acc = accessor::<f32>(2);
        let shard = TableShard::new();
        let mut out = vec![9.; acc.select_dim()];

        shard.pull(&acc, 7, &mut out).unwrap();

        assert_eq!(out, [0., 0., 0.]);
        assert_eq!(shard.get(7).unwrap().len(), acc.feature_layout().short_slots());
    }

    #[test]
    fn push_extends_important_records() {
        let acc = accessor::<f32>(2);
        let shard = TableShard::new();

        let push = push_record(1., 20., 0., 0.5, &[1., 1.]);
        assert!(shard.push(&acc, 3, &push).unwrap());
        assert_eq!(shard.get(3).unwrap().len(), acc.feature_layout().short_slots());

        let push = push_record(1., 100., 10., 0.5, &[1., 1.]);
        assert!(shard.push(&acc, 3, &push).unwrap());
        assert_eq!(shard.get(3).unwrap().len(), acc.feature_layout().slots());
    }

    #[test]
    fn push_without_score_is_not_admitted() {
        let acc = accessor::<f32>(2);
        let shard = TableShard::new();
        let push = push_record(1., 0., 0., 0.5, &[1., 1.]);

        assert!(!shard.push(&acc, 3, &push).unwrap());
        assert_eq!(shard.len(), 0);
    }

    #[test]
    fn shrink_evicts_cold_records() {
        let params = CtrParamSpec {
            delete_threshold: 1.5,
            ..Default::default()
        };
        let acc = accessor_with::<f32>(params, 2);
        let shard = TableShard::new();

        shard.push(&acc, 1, &push_record(1., 100., 10., 0., &[0., 0.])).unwrap();
        shard.push(&acc, 2, &push_record(1., 10., 0., 0., &[0., 0.])).unwrap();

        assert_eq!(shard.shrink(&acc).unwrap(), 1);
        assert!(shard.get(1).is_some());
        assert!(shard.get(2).is_none());
    }

    #[test]
    fn save_writes_key_and_record() {
        let acc = accessor::<f32>(2);
        let shard = TableShard::new();
        shard.push(&acc, 42, &push_record(1., 100., 10., 0., &[0., 0.])).unwrap();

        let mut out = Vec::new();
        assert_eq!(shard.lock().save(&acc, SaveMode::All, &mut out).unwrap(), 1);

        let text = String::from_utf8(out).unwrap();
        let (key, record) = text.trim_end().split_once('\t').unwrap();
        assert_eq!(key, "42");
        assert_eq!(record.split(' ').count(), acc.dim());
    }

    #[test]
    fn delta_bookkeeping_follows_the_export() {
        let acc = accessor::<f32>(2);
        let shard = TableShard::new();
        shard.push(&acc, 5, &push_record(1., 20., 2., 0., &[0., 0.])).unwrap();

        let mut locked = shard.lock();
        assert_eq!(locked.save(&acc, SaveMode::Delta, &mut Vec::<u8>::new()).unwrap(), 1);
        locked.update_stat_after_save(&acc, SaveMode::Delta).unwrap();
        assert_eq!(locked.save(&acc, SaveMode::Delta, &mut Vec::<u8>::new()).unwrap(), 0);
    }
}
