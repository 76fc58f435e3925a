use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::lifecycle::{self, Phase};
use crate::models::{DayView, NewTaskRequest, Task};
use crate::streak::Streak;

/// Stored status. `upcoming` is never stored, see [`lifecycle::phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum DisciplineStatus {
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Discipline {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: DisciplineStatus,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discipline {
    pub fn streak(&self) -> Streak {
        Streak {
            current: self.current_streak,
            longest: self.longest_streak,
        }
    }

    pub fn phase(&self, today: NaiveDate) -> Phase {
        lifecycle::phase(self.status, self.start_date, self.end_date, today)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn view(self, today: NaiveDate) -> DisciplineView {
        DisciplineView {
            phase: self.phase(today),
            discipline: self,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DisciplineView {
    #[serde(flatten)]
    pub discipline: Discipline,
    pub phase: Phase,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisciplineDetail {
    #[serde(flatten)]
    pub discipline: DisciplineView,
    pub tasks: Vec<Task>,
    pub today: Option<DayView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDisciplineRequest {
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub tasks: Vec<NewTaskRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDisciplineRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl UpdateDisciplineRequest {
    pub fn changes_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}
