use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Priority;
use crate::streak::{CompletionRate, DayOutcome};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskState {
    pub task_id: String,
    pub name: String,
    pub priority: Priority,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// One user's log for one calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    pub id: String,
    pub user_id: String,
    pub discipline_id: String,
    pub date: NaiveDate,
    pub tasks: Vec<TaskState>,
}

impl Day {
    pub fn completion(&self) -> CompletionRate {
        let completed = self.tasks.iter().filter(|t| t.is_completed).count() as u32;
        CompletionRate::new(completed, self.tasks.len() as u32)
    }

    pub fn outcome(&self) -> DayOutcome {
        DayOutcome::new(self.date, self.completion())
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskState> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &TaskState> {
        self.tasks.iter().filter(|t| !t.is_completed)
    }

    pub fn view(self) -> DayView {
        let rate = self.completion();
        DayView {
            percent: rate.percent(),
            is_streak_day: rate.is_streak_day(),
            completion: rate,
            day: self,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    #[serde(flatten)]
    pub day: Day,
    pub completion: CompletionRate,
    pub percent: u32,
    pub is_streak_day: bool,
}

/// Aggregated completion of a stored day, used to rebuild streaks without
/// loading every task state.
#[derive(Debug, Clone, FromRow)]
pub struct DayTally {
    pub date: NaiveDate,
    pub completed: i64,
    pub total: i64,
}

impl DayTally {
    pub fn outcome(&self) -> DayOutcome {
        DayOutcome::new(
            self.date,
            CompletionRate::new(self.completed.max(0) as u32, self.total.max(0) as u32),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCompletionRequest {
    pub is_completed: bool,
}
