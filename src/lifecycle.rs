//! Discipline lifecycle.
//!
//! Only `active`, `completed` and `failed` are stored. `upcoming` and
//! `closing` are derived from the dates; an active discipline is closed by
//! the rollover job the first night after its end date.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::DisciplineStatus;
use crate::streak::{self, DayOutcome, STREAK_THRESHOLD_PERCENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Upcoming,
    Active,
    /// Past its end date, waiting for the rollover verdict.
    Closing,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }

    /// Only upcoming and running disciplines accept structural edits.
    pub fn is_editable(self) -> bool {
        matches!(self, Phase::Upcoming | Phase::Active)
    }
}

pub fn phase(
    status: DisciplineStatus,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Phase {
    match status {
        DisciplineStatus::Completed => Phase::Completed,
        DisciplineStatus::Failed => Phase::Failed,
        DisciplineStatus::Active if start > today => Phase::Upcoming,
        DisciplineStatus::Active if end < today => Phase::Closing,
        DisciplineStatus::Active => Phase::Active,
    }
}

/// What the rollover job must do with an active discipline on `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Not started yet.
    Wait,
    /// Running today; its day log must exist.
    Run,
    /// The end date has passed.
    Close,
}

pub fn transition(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Transition {
    if end < today {
        Transition::Close
    } else if start > today {
        Transition::Wait
    } else {
        Transition::Run
    }
}

/// Verdict for a discipline whose range is over: completed when streak days
/// cover at least the streak threshold of its calendar days.
pub fn closing_status(history: &[DayOutcome], start: NaiveDate, end: NaiveDate) -> DisciplineStatus {
    let total_days = (end - start).num_days() + 1;
    if total_days <= 0 {
        return DisciplineStatus::Failed;
    }
    let streak_days = streak::streak_days_between(history, start, end) as i64;
    if streak_days * 100 >= total_days * STREAK_THRESHOLD_PERCENT as i64 {
        DisciplineStatus::Completed
    } else {
        DisciplineStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, day).unwrap()
    }

    #[test]
    fn future_start_is_upcoming() {
        assert_eq!(
            phase(DisciplineStatus::Active, date(10), date(20), date(9)),
            Phase::Upcoming
        );
        assert_eq!(
            phase(DisciplineStatus::Active, date(10), date(20), date(10)),
            Phase::Active
        );
        assert_eq!(
            phase(DisciplineStatus::Failed, date(10), date(20), date(1)),
            Phase::Failed
        );
    }

    #[test]
    fn past_end_date_is_closing_until_rollover() {
        let closing = phase(DisciplineStatus::Active, date(1), date(5), date(8));
        assert_eq!(closing, Phase::Closing);
        assert!(!closing.is_terminal());
        assert!(!closing.is_editable());

        assert_eq!(
            phase(DisciplineStatus::Active, date(1), date(5), date(5)),
            Phase::Active
        );
        assert_eq!(
            phase(DisciplineStatus::Completed, date(1), date(5), date(8)),
            Phase::Completed
        );
    }

    #[test]
    fn transition_follows_the_date_range() {
        assert_eq!(transition(date(5), date(7), date(4)), Transition::Wait);
        assert_eq!(transition(date(5), date(7), date(5)), Transition::Run);
        assert_eq!(transition(date(5), date(7), date(7)), Transition::Run);
        assert_eq!(transition(date(5), date(7), date(8)), Transition::Close);
    }

    #[test]
    fn closing_uses_the_streak_threshold() {
        let outcomes = |flags: &[bool]| -> Vec<DayOutcome> {
            flags
                .iter()
                .enumerate()
                .map(|(i, &is_streak_day)| DayOutcome {
                    date: date(1 + i as u32),
                    is_streak_day,
                })
                .collect()
        };

        let three_of_four = outcomes(&[true, false, true, true]);
        assert_eq!(
            closing_status(&three_of_four, date(1), date(4)),
            DisciplineStatus::Completed
        );

        let two_of_four = outcomes(&[true, false, false, true]);
        assert_eq!(
            closing_status(&two_of_four, date(1), date(4)),
            DisciplineStatus::Failed
        );

        // Unlogged days count against the discipline.
        let sparse = outcomes(&[true, true]);
        assert_eq!(
            closing_status(&sparse, date(1), date(4)),
            DisciplineStatus::Failed
        );
    }
}
