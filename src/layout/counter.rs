use std::{
    fmt::{Debug, Display},
    ops::{Add, Mul, Sub},
    str::FromStr,
};

/// The numeric representation of the `show` and `click` statistics of a feature.
///
/// Every record is a sequence of `f32` slots, a counter occupies `SLOTS` adjacent
/// slots of it. The engine is written once over this trait and instantiated for
/// single (`f32`) and double (`f64`) precision statistics.
pub trait Counter:
    Copy
    + Default
    + Debug
    + Display
    + FromStr
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// The amount of `f32` slots a single counter occupies.
    const SLOTS: usize;

    /// Whether `get_field("show")` reads the counter through the day-indexed decay table.
    const DECAYS_BY_DAY: bool;

    /// Reads a counter from the first `SLOTS` slots of `slots`.
    fn read(slots: &[f32]) -> Self;

    /// Writes this counter into the first `SLOTS` slots of `slots`.
    fn write(self, slots: &mut [f32]);

    fn from_f32(value: f32) -> Self;

    fn to_f32(self) -> f32;
}

impl Counter for f32 {
    const SLOTS: usize = 1;
    const DECAYS_BY_DAY: bool = true;

    fn read(slots: &[f32]) -> Self {
        slots[0]
    }

    fn write(self, slots: &mut [f32]) {
        slots[0] = self;
    }

    fn from_f32(value: f32) -> Self {
        value
    }

    fn to_f32(self) -> f32 {
        self
    }
}

/// The two slots hold the low and the high word of the `f64` bit pattern, in that order.
impl Counter for f64 {
    const SLOTS: usize = 2;
    const DECAYS_BY_DAY: bool = false;

    fn read(slots: &[f32]) -> Self {
        let lo = u64::from(slots[0].to_bits());
        let hi = u64::from(slots[1].to_bits());
        f64::from_bits((hi << 32) | lo)
    }

    fn write(self, slots: &mut [f32]) {
        let bits = self.to_bits();
        slots[0] = f32::from_bits(bits as u32);
        slots[1] = f32::from_bits((bits >> 32) as u32);
    }

    fn from_f32(value: f32) -> Self {
        f64::from(value)
    }

    fn to_f32(self) -> f32 {
        self as f32
    }
}
