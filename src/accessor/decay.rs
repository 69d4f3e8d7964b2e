use std::sync::atomic::{AtomicI32, Ordering};

/// Day-indexed decay of the show and click statistics.
///
/// `rates[d]` is the decay accumulated over `d` days, the table covers every day a
/// feature may stay unseen before it's evicted.
#[derive(Debug)]
pub struct TimeDecay {
    day_id: AtomicI32,
    rates: Box<[f64]>,
}

impl TimeDecay {
    /// Creates a new `TimeDecay` table.
    ///
    /// # Arguments
    /// * `decay_rate` - The daily decay rate.
    /// * `max_days` - The last day the table covers.
    ///
    /// # Returns
    /// A new `TimeDecay` instance starting at day `0`.
    pub fn new(decay_rate: f32, max_days: usize) -> Self {
        let rate = f64::from(decay_rate);
        let rates = (0..=max_days).map(|d| rate.powi(d as i32)).collect();

        Self {
            day_id: AtomicI32::new(0),
            rates,
        }
    }

    pub fn day_id(&self) -> i32 {
        self.day_id.load(Ordering::Acquire)
    }

    pub fn set_day_id(&self, day_id: i32) {
        self.day_id.store(day_id, Ordering::Release);
    }

    /// The amount of days between the current day and `seen_day`.
    pub fn day_diff(&self, seen_day: f32) -> i32 {
        self.day_id() - seen_day as i32
    }

    /// The decay accumulated since `seen_day`.
    ///
    /// A day in the future hasn't decayed at all, a day past the end of the table
    /// decays completely.
    pub fn rate(&self, seen_day: f32) -> f64 {
        match usize::try_from(self.day_diff(seen_day)) {
            Ok(diff) => self.rates.get(diff).copied().unwrap_or(0.),
            Err(_) => 1.,
        }
    }

    /// The decay accumulated over exactly `days` days, `None` past the end of the table.
    pub fn rate_for(&self, days: usize) -> Option<f64> {
        self.rates.get(days).copied()
    }
}
