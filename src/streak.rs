//! Streak engine.
//!
//! A day counts as a streak day when at least [`STREAK_THRESHOLD_PERCENT`] of
//! its tasks are completed. Streak counters are always rebuilt from the day
//! history of a discipline, so any edit to a day (task added, removed,
//! completed) moves `current`/`longest` by exactly the effect of that day.

use chrono::NaiveDate;
use serde::Serialize;

pub const STREAK_THRESHOLD_PERCENT: u32 = 75;

/// Completed vs. total tasks of one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionRate {
    pub completed: u32,
    pub total: u32,
}

impl CompletionRate {
    pub fn new(completed: u32, total: u32) -> Self {
        Self {
            completed: completed.min(total),
            total,
        }
    }

    /// Floored percentage, 0 for a day without tasks.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }

    /// Integer comparison so that exactly 75% qualifies. A day without tasks
    /// never does.
    pub fn is_streak_day(&self) -> bool {
        self.total > 0 && self.completed * 100 >= self.total * STREAK_THRESHOLD_PERCENT
    }

    /// How many more tasks must be completed for the day to qualify.
    pub fn remaining_for_streak(&self) -> u32 {
        let required = (self.total * STREAK_THRESHOLD_PERCENT).div_ceil(100);
        required.saturating_sub(self.completed)
    }
}

/// Whether a logged date was a streak day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOutcome {
    pub date: NaiveDate,
    pub is_streak_day: bool,
}

impl DayOutcome {
    pub fn new(date: NaiveDate, rate: CompletionRate) -> Self {
        Self {
            date,
            is_streak_day: rate.is_streak_day(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

/// Rebuilds the streak counters of a discipline as seen on `today`.
///
/// `history` must be ordered by date. Entries after `today` are ignored and a
/// missing calendar date breaks a run. Today is still open: while its log is
/// below the threshold the current streak is the run that ended yesterday.
pub fn recompute_streak(history: &[DayOutcome], today: NaiveDate) -> Streak {
    debug_assert!(history.windows(2).all(|w| w[0].date < w[1].date));

    let mut run = 0u32;
    let mut run_before_today = 0u32;
    let mut longest = 0u32;
    let mut last_date: Option<NaiveDate> = None;

    for outcome in history.iter().filter(|o| o.date <= today) {
        let follows_previous = last_date
            .and_then(|d| d.succ_opt())
            .is_some_and(|next| next == outcome.date);
        if !follows_previous {
            run = 0;
        }
        if outcome.date == today {
            run_before_today = run;
        }

        run = if outcome.is_streak_day { run + 1 } else { 0 };
        longest = longest.max(run);
        last_date = Some(outcome.date);
    }

    let current = match last_date {
        Some(date) if date == today => {
            if run > 0 {
                run
            } else {
                run_before_today
            }
        }
        Some(date) if date.succ_opt() == Some(today) => run,
        _ => 0,
    };

    Streak { current, longest }
}

/// Number of streak days in `history` that fall inside `[start, end]`.
pub fn streak_days_between(history: &[DayOutcome], start: NaiveDate, end: NaiveDate) -> u32 {
    history
        .iter()
        .filter(|o| o.is_streak_day && o.date >= start && o.date <= end)
        .count() as u32
}
