//! Business hours and the fixed-granularity slot grid.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::{format_wall_clock, parse_wall_clock};
use crate::error::{Result, SlotError};

/// Opening hours split into equally sized slots.
///
/// Slots start at `open` and every `slot_minutes` after it, as long as the
/// start is strictly before `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid", into = "RawGrid")]
pub struct SlotGrid {
    open: NaiveTime,
    close: NaiveTime,
    slot_minutes: u32,
}

impl SlotGrid {
    /// Build a grid, rejecting empty business hours and zero granularity.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidGrid` if `open >= close` or `slot_minutes == 0`.
    pub fn new(open: NaiveTime, close: NaiveTime, slot_minutes: u32) -> Result<Self> {
        if slot_minutes == 0 {
            return Err(SlotError::InvalidGrid(
                "slot_minutes must be positive".to_string(),
            ));
        }
        if open >= close {
            return Err(SlotError::InvalidGrid(format!(
                "open {} is not before close {}",
                format_wall_clock(open),
                format_wall_clock(close)
            )));
        }
        Ok(SlotGrid {
            open,
            close,
            slot_minutes,
        })
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// Slot start times in ascending order.
    pub fn starts(&self) -> impl Iterator<Item = NaiveTime> + '_ {
        let step = Duration::minutes(i64::from(self.slot_minutes));
        // `NaiveTime` addition wraps at midnight, so stop on wrap as well as on close.
        std::iter::successors(Some(self.open), move |&t| {
            let (next, wrapped) = t.overflowing_add_signed(step);
            (wrapped == 0).then_some(next)
        })
        .take_while(move |&t| t < self.close)
    }

    /// Whether `time` is one of this grid's slot starts.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.starts().any(|t| t == time)
    }

    /// Number of slots per day.
    pub fn len(&self) -> usize {
        self.starts().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SlotGrid {
    /// 08:00 to 18:00 in 30 minute steps: 20 slots, the last one at 17:30.
    fn default() -> Self {
        SlotGrid {
            open: NaiveTime::MIN + Duration::hours(8),
            close: NaiveTime::MIN + Duration::hours(18),
            slot_minutes: 30,
        }
    }
}

/// On-disk form of a grid: `{ open = "08:00", close = "18:00", slot_minutes = 30 }`.
#[derive(Serialize, Deserialize)]
struct RawGrid {
    open: String,
    close: String,
    slot_minutes: u32,
}

impl TryFrom<RawGrid> for SlotGrid {
    type Error = SlotError;

    fn try_from(raw: RawGrid) -> Result<Self> {
        SlotGrid::new(
            parse_wall_clock(&raw.open)?,
            parse_wall_clock(&raw.close)?,
            raw.slot_minutes,
        )
    }
}

impl From<SlotGrid> for RawGrid {
    fn from(grid: SlotGrid) -> Self {
        RawGrid {
            open: format_wall_clock(grid.open),
            close: format_wall_clock(grid.close),
            slot_minutes: grid.slot_minutes,
        }
    }
}
