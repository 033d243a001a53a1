//! Running totals printed in the logbook footer.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::record::{FlightRecord, Landings, Times};
use crate::time::Duration;

/// Sum of the numeric columns of any number of flight records.
///
/// Folding is exact integer arithmetic, so the result does not depend on the
/// order the records are folded in. Every column saturates instead of
/// overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsRecord {
    /// Summed flight time columns.
    pub times: Times,
    /// Summed landings.
    pub landings: Landings,
    /// Summed simulator time.
    pub sim_time: Duration,
}

impl TotalsRecord {
    /// Totals with every column at zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Add one record's columns.
    #[must_use]
    pub fn fold(self, record: &FlightRecord) -> Self {
        self + Self::of(record)
    }

    /// Totals of a single record.
    #[must_use]
    pub fn of(record: &FlightRecord) -> Self {
        Self {
            times: record.times,
            landings: record.landings,
            sim_time: record.sim.time,
        }
    }

    /// Fold an iterator of records.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FlightRecord>,
    {
        records.into_iter().fold(Self::zero(), Self::fold)
    }
}

impl Add for Times {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            single_pilot: self.single_pilot + rhs.single_pilot,
            multi_pilot: self.multi_pilot + rhs.multi_pilot,
            multi_crew: self.multi_crew + rhs.multi_crew,
            night: self.night + rhs.night,
            instrument: self.instrument + rhs.instrument,
            pic: self.pic + rhs.pic,
            copilot: self.copilot + rhs.copilot,
            dual: self.dual + rhs.dual,
            instructor: self.instructor + rhs.instructor,
            total: self.total + rhs.total,
        }
    }
}

impl Add for Landings {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            day: self.day.saturating_add(rhs.day),
            night: self.night.saturating_add(rhs.night),
        }
    }
}

impl Add for TotalsRecord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            times: self.times + rhs.times,
            landings: self.landings + rhs.landings,
            sim_time: self.sim_time + rhs.sim_time,
        }
    }
}

impl AddAssign for TotalsRecord {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
