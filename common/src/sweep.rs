use core::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 256;

/// Number of concurrent requests fio keeps in flight against the target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct QueueDepth(u32);

impl QueueDepth {
    pub fn new(depth: u32) -> Result<Self, Error> {
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
            return Err(Error::InvalidArgument(format!(
                "iodepth must be between {MIN_DEPTH} and {MAX_DEPTH}, got {depth}"
            )));
        }
        Ok(Self(depth))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for QueueDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<u32> for QueueDepth {
    type Error = Error;

    fn try_from(depth: u32) -> Result<Self, Error> {
        Self::new(depth)
    }
}

impl From<QueueDepth> for u32 {
    fn from(depth: QueueDepth) -> Self {
        depth.0
    }
}

/// Generate `num_points` iodepth values log2-spaced between `start` and
/// `stop`, ascending. Rounding collisions at the low end are deduplicated,
/// so the result may be shorter than `num_points`.
pub fn generate(num_points: u32, start: u32, stop: u32) -> Result<Vec<QueueDepth>, Error> {
    if num_points < 2 {
        return Err(Error::InvalidArgument(format!(
            "sweep needs at least 2 points, got {num_points}"
        )));
    }
    QueueDepth::new(start)?;
    QueueDepth::new(stop)?;
    if stop < start {
        return Err(Error::InvalidArgument(format!(
            "sweep stop {stop} is below start {start}"
        )));
    }

    let start_log = f64::from(start).log2();
    let step = (f64::from(stop).log2() - start_log) / f64::from(num_points - 1);

    (0..num_points)
        .map(|i| (start_log + f64::from(i) * step).exp2().round() as u32)
        .sorted()
        .dedup()
        .map(QueueDepth::new)
        .collect()
}
