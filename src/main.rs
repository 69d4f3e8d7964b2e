use std::{
    env,
    fs::File,
    io::{self, BufReader},
    num::NonZeroUsize,
    path::PathBuf,
};

use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};

use ctr_accessor::{
    AccessorBuilder, AccessorSpec, SaveMode, SparseTable, ValueAccessor,
    layout::Counter,
    specs::Precision,
};

const DEFAULT_DAYS: i32 = 7;
const BATCHES_PER_DAY: usize = 64;
const BATCH_SIZE: usize = 512;
const KEY_SPACE: u64 = 100_000;
const SHARDS: usize = 16;

/// Replays a synthetic click log against a sparse table for a few days, with a
/// maintenance pass at the end of each, then checks the final dump reloads.
///
/// Usage: `ctr-accessor [spec.json] [dump path]`, `DAYS` overrides the amount of days.
fn main() -> io::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let spec = match args.next() {
        Some(path) => AccessorSpec::from_path(path)?,
        None => AccessorSpec::default(),
    };
    let dump = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("ctr-accessor.dump"));

    let days = match env::var("DAYS") {
        Ok(days) => days.parse().map_err(io::Error::other)?,
        Err(_) => DEFAULT_DAYS,
    };

    info!("replaying {days} day(s) with {:?} precision counters", spec.precision);

    match spec.precision {
        Precision::Single => run::<f32>(&spec, days, dump),
        Precision::Double => run::<f64>(&spec, days, dump),
    }
}

fn run<C: Counter>(spec: &AccessorSpec, days: i32, dump: PathBuf) -> io::Result<()> {
    let accessor = AccessorBuilder::new().build::<C>(spec)?;
    let info = accessor.table_info();
    info!(
        dim = info.dim,
        size = info.size,
        select_size = info.select_size,
        update_size = info.update_size,
        mf_size = info.mf_size;
        "built accessor"
    );

    let shards = NonZeroUsize::new(SHARDS).ok_or_else(|| io::Error::other("no shards"))?;
    let table = SparseTable::new(accessor, shards);
    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    for day in 1..=days {
        for _ in 0..BATCHES_PER_DAY {
            let keys = sample_keys(&mut rng);
            let pulls = table.pull(&keys)?;
            let pushes = sample_pushes(&table, &keys, &pulls, &mut rng);
            table.push(&keys, &pushes)?;
        }

        let evicted = table.shrink()?;
        let saved = table.save(SaveMode::Delta, File::create(&dump)?)?;
        table.save(SaveMode::Decayed, io::sink())?;

        info!(day = day, records = table.len(), evicted = evicted, delta = saved; "day done");
    }

    let saved = table.save(SaveMode::Base, File::create(&dump)?)?;

    let restored = SparseTable::new(AccessorBuilder::new().build::<C>(spec)?, shards);
    let loaded = restored.load(BufReader::new(File::open(&dump)?))?;

    info!(base = saved, loaded = loaded; "replay finished, dump at {}", dump.display());

    if saved != loaded {
        return Err(io::Error::other(format!("saved {saved} records but loaded {loaded}")));
    }

    Ok(())
}

/// Draws a batch of keys, a few of them are far more frequent than the rest.
fn sample_keys<R: Rng>(rng: &mut R) -> Vec<u64> {
    (0..BATCH_SIZE)
        .map(|_| (rng.random::<f64>().powi(3) * KEY_SPACE as f64) as u64)
        .collect()
}

/// Builds the push records of a batch, clicking proportionally to the pulled weight.
fn sample_pushes<A, R>(table: &SparseTable<A>, keys: &[u64], pulls: &[f32], rng: &mut R) -> Vec<f32>
where
    A: ValueAccessor,
    R: Rng,
{
    let accessor = table.accessor();
    let pull_dim = accessor.select_dim();
    let push_dim = accessor.update_dim();
    let mut pushes = Vec::with_capacity(keys.len() * push_dim);

    for (&key, pull) in keys.iter().zip(pulls.chunks(pull_dim)) {
        let ctr = 1. / (1. + (-pull[0]).exp()) * 0.2;
        let click = if rng.random::<f32>() < ctr { 1. } else { 0. };
        let grad = ctr - click;

        pushes.push((key % 64) as f32);
        pushes.push(1.);
        pushes.push(click);
        pushes.push(grad);
        pushes.extend(pull[1..].iter().map(|w| grad * w + rng.random_range(-1e-3..1e-3)));
    }

    pushes
}
