//! Time windows for listing journeys and totting up stats.

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use serde::Serialize;

/// How far back to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Since {
    AllTime,
    /// The month up to now.
    LastMonth,
    /// Since midnight UTC on the 1st of January.
    YearToDate,
}

impl Since {
    /// The exclusive lower bound on journey dates, if there is one.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Since::AllTime => None,
            Since::LastMonth => now.checked_sub_months(Months::new(1)),
            Since::YearToDate => Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0).single(),
        }
    }
}

/// Aggregate figures over a set of journeys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JourneyStats {
    pub count: usize,
    pub miles: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoffs() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 18, 30, 0).unwrap();

        assert_eq!(Since::AllTime.cutoff(now), None);
        assert_eq!(
            Since::YearToDate.cutoff(now),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        // Clamped to the end of February.
        assert_eq!(
            Since::LastMonth.cutoff(now),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 18, 30, 0).unwrap())
        );
    }
}
