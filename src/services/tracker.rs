use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::db::{days, disciplines, tasks};
use crate::error::AppError;
use crate::models::*;
use crate::streak::{self, DayOutcome, Streak};

/// Owns every mutation that can move a streak. Each one runs in a single
/// transaction and ends by rebuilding the discipline's streak from its
/// stored days.
pub struct Tracker {
    db: SqlitePool,
}

impl Tracker {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_disciplines(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<DisciplineView>, AppError> {
        let mut conn = self.db.acquire().await?;
        let list = disciplines::fetch_user_disciplines(&mut conn, user_id).await?;
        Ok(list.into_iter().map(|d| d.view(today)).collect())
    }

    pub async fn discipline_detail(
        &self,
        user_id: &str,
        id: &str,
        today: NaiveDate,
    ) -> Result<DisciplineDetail, AppError> {
        let mut conn = self.db.acquire().await?;
        let discipline = disciplines::find_user_discipline(&mut conn, user_id, id)
            .await?
            .ok_or(AppError::NotFound)?;
        let tasks = tasks::fetch_tasks(&mut conn, &discipline.id).await?;
        let today_log = days::find_discipline_day(&mut conn, &discipline, today).await?;

        Ok(DisciplineDetail {
            discipline: discipline.view(today),
            tasks,
            today: today_log.map(Day::view),
        })
    }

    pub async fn discipline_days(&self, user_id: &str, id: &str) -> Result<Vec<DayView>, AppError> {
        let mut conn = self.db.acquire().await?;
        let discipline = disciplines::find_user_discipline(&mut conn, user_id, id)
            .await?
            .ok_or(AppError::NotFound)?;
        let history = days::fetch_discipline_days(&mut conn, &discipline.id).await?;
        Ok(history.into_iter().map(Day::view).collect())
    }

    pub async fn today(&self, user_id: &str, today: NaiveDate) -> Result<DayView, AppError> {
        let mut conn = self.db.acquire().await?;
        days::find_day(&mut conn, user_id, today)
            .await?
            .map(Day::view)
            .ok_or(AppError::NotFound)
    }

    pub async fn create_discipline(
        &self,
        user_id: &str,
        mut req: NewDisciplineRequest,
        today: NaiveDate,
    ) -> Result<DisciplineDetail, AppError> {
        req.name = required_name(&req.name, "Discipline name")?;
        for task in &mut req.tasks {
            task.name = required_name(&task.name, "Task name")?;
        }
        validate_range(req.start_date, req.end_date, today, today)?;

        let mut tx = self.db.begin().await?;
        if disciplines::has_overlap(&mut tx, user_id, req.start_date, req.end_date, None).await? {
            return Err(overlap_conflict());
        }

        let discipline = disciplines::insert_discipline(&mut tx, user_id, &req).await?;
        for task in &req.tasks {
            tasks::insert_task(&mut tx, &discipline.id, task).await?;
        }
        let task_list = tasks::fetch_tasks(&mut tx, &discipline.id).await?;
        let today_log = if discipline.covers(today) {
            Some(days::insert_day(&mut tx, &discipline, today, &task_list).await?)
        } else {
            None
        };
        tx.commit().await?;

        info!(
            "Created discipline {} ({} to {}) with {} tasks",
            discipline.id,
            discipline.start_date,
            discipline.end_date,
            task_list.len()
        );

        Ok(DisciplineDetail {
            discipline: discipline.view(today),
            tasks: task_list,
            today: today_log.map(Day::view),
        })
    }

    pub async fn update_discipline(
        &self,
        user_id: &str,
        id: &str,
        req: UpdateDisciplineRequest,
        today: NaiveDate,
    ) -> Result<DisciplineView, AppError> {
        let mut tx = self.db.begin().await?;
        let mut discipline = disciplines::find_user_discipline(&mut tx, user_id, id)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_editable(&discipline, today)?;

        if let Some(name) = &req.name {
            discipline.name = required_name(name, "Discipline name")?;
        }
        if let Some(description) = req.description.clone() {
            discipline.description = Some(description).filter(|d| !d.trim().is_empty());
        }

        let dates_changed = req.changes_dates();
        if dates_changed {
            let start = req.start_date.unwrap_or(discipline.start_date);
            let end = req.end_date.unwrap_or(discipline.end_date);
            // days before the stored start never had a log
            let earliest_start = discipline.start_date.min(today);
            validate_range(start, end, today, earliest_start)?;
            if disciplines::has_overlap(&mut tx, user_id, start, end, Some(&discipline.id)).await? {
                return Err(overlap_conflict());
            }
            discipline.start_date = start;
            discipline.end_date = end;
        }

        disciplines::save_discipline(&mut tx, &mut discipline).await?;

        if dates_changed {
            let pruned = days::delete_days_outside(
                &mut tx,
                &discipline.id,
                discipline.start_date,
                discipline.end_date,
            )
            .await?;
            if pruned > 0 {
                info!("Dropped {} day logs outside the new range of {}", pruned, discipline.id);
            }
            if discipline.covers(today) {
                ensure_day(&mut tx, &discipline, today).await?;
            }
            refresh_streak(&mut tx, &mut discipline, today).await?;
        }
        tx.commit().await?;

        Ok(discipline.view(today))
    }

    pub async fn delete_discipline(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let discipline = disciplines::find_user_discipline(&mut tx, user_id, id)
            .await?
            .ok_or(AppError::NotFound)?;
        disciplines::delete_discipline(&mut tx, &discipline.id).await?;
        tx.commit().await?;

        info!("Deleted discipline {}", discipline.id);
        Ok(())
    }

    /// Adds a task. If the discipline is running, the task joins today's log
    /// as incomplete, which can drop today below the threshold.
    pub async fn add_task(
        &self,
        user_id: &str,
        discipline_id: &str,
        mut req: NewTaskRequest,
        today: NaiveDate,
    ) -> Result<Task, AppError> {
        req.name = required_name(&req.name, "Task name")?;

        let mut tx = self.db.begin().await?;
        let mut discipline = disciplines::find_user_discipline(&mut tx, user_id, discipline_id)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_editable(&discipline, today)?;

        let task = tasks::insert_task(&mut tx, &discipline.id, &req).await?;
        if let Some(day) = days::find_discipline_day(&mut tx, &discipline, today).await? {
            days::append_task_state(&mut tx, &day.id, &task.id).await?;
            refresh_streak(&mut tx, &mut discipline, today).await?;
        }
        tx.commit().await?;

        Ok(task)
    }

    pub async fn update_task(
        &self,
        user_id: &str,
        task_id: &str,
        req: UpdateTaskRequest,
        today: NaiveDate,
    ) -> Result<Task, AppError> {
        let mut tx = self.db.begin().await?;
        let (mut task, discipline) = find_user_task(&mut tx, user_id, task_id).await?;
        ensure_editable(&discipline, today)?;

        if let Some(name) = &req.name {
            task.name = required_name(name, "Task name")?;
        }
        if let Some(priority) = req.priority {
            task.priority = priority;
        }
        tasks::save_task(&mut tx, &task).await?;
        tx.commit().await?;

        Ok(task)
    }

    /// Archives a task and takes it out of today's log. Past logs keep it.
    pub async fn remove_task(
        &self,
        user_id: &str,
        task_id: &str,
        today: NaiveDate,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let (task, mut discipline) = find_user_task(&mut tx, user_id, task_id).await?;
        ensure_editable(&discipline, today)?;

        tasks::archive_task(&mut tx, &task.id).await?;
        if let Some(day) = days::find_discipline_day(&mut tx, &discipline, today).await? {
            if days::remove_task_state(&mut tx, &day.id, &task.id).await? {
                refresh_streak(&mut tx, &mut discipline, today).await?;
            }
        }
        tx.commit().await?;

        Ok(())
    }

    /// Marks a task of today's log done or not done. Earlier days are
    /// read-only.
    pub async fn set_task_completion(
        &self,
        user_id: &str,
        task_id: &str,
        is_completed: bool,
        today: NaiveDate,
    ) -> Result<DayView, AppError> {
        let mut tx = self.db.begin().await?;
        let day = days::find_day(&mut tx, user_id, today)
            .await?
            .ok_or(AppError::NotFound)?;
        let state = day.task(task_id).ok_or(AppError::NotFound)?;

        if state.is_completed != is_completed {
            let completed_at = is_completed.then(Utc::now);
            days::set_task_completed(&mut tx, &day.id, task_id, completed_at).await?;

            let mut discipline = disciplines::find_discipline(&mut tx, &day.discipline_id)
                .await?
                .ok_or(AppError::NotFound)?;
            refresh_streak(&mut tx, &mut discipline, today).await?;
        }

        let day = days::find_day(&mut tx, user_id, today)
            .await?
            .ok_or(AppError::NotFound)?;
        tx.commit().await?;

        Ok(day.view())
    }
}

/// Day outcomes of a discipline, ordered by date.
pub(crate) async fn load_history(
    conn: &mut SqliteConnection,
    discipline_id: &str,
) -> Result<Vec<DayOutcome>, AppError> {
    Ok(days::fetch_tallies(conn, discipline_id)
        .await?
        .iter()
        .map(DayTally::outcome)
        .collect())
}

/// Stores `streak` when it differs from what the discipline carries.
pub(crate) async fn store_streak(
    conn: &mut SqliteConnection,
    discipline: &mut Discipline,
    streak: Streak,
) -> Result<(), AppError> {
    if streak == discipline.streak() {
        return Ok(());
    }

    debug!(
        "Streak of {} moved from {:?} to {:?}",
        discipline.id,
        discipline.streak(),
        streak
    );
    disciplines::update_streak(conn, &discipline.id, streak).await?;
    discipline.current_streak = streak.current;
    discipline.longest_streak = streak.longest;
    Ok(())
}

pub(crate) async fn refresh_streak(
    conn: &mut SqliteConnection,
    discipline: &mut Discipline,
    today: NaiveDate,
) -> Result<Streak, AppError> {
    let history = load_history(conn, &discipline.id).await?;
    let streak = streak::recompute_streak(&history, today);
    store_streak(conn, discipline, streak).await?;
    Ok(streak)
}

/// Returns today's log of the discipline, opening it if needed. The flag is
/// true when a new log was created.
pub(crate) async fn ensure_day(
    conn: &mut SqliteConnection,
    discipline: &Discipline,
    today: NaiveDate,
) -> Result<(Day, bool), AppError> {
    if let Some(day) = days::find_day(conn, &discipline.user_id, today).await? {
        if day.discipline_id != discipline.id {
            return Err(AppError::Conflict(format!(
                "Another discipline already has a log for {}",
                today
            )));
        }
        return Ok((day, false));
    }

    let task_list = tasks::fetch_tasks(conn, &discipline.id).await?;
    let day = days::insert_day(conn, discipline, today, &task_list).await?;
    Ok((day, true))
}

async fn find_user_task(
    conn: &mut SqliteConnection,
    user_id: &str,
    task_id: &str,
) -> Result<(Task, Discipline), AppError> {
    let task = tasks::find_task(conn, task_id)
        .await?
        .filter(|t| !t.is_archived)
        .ok_or(AppError::NotFound)?;
    let discipline = disciplines::find_user_discipline(conn, user_id, &task.discipline_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok((task, discipline))
}

fn ensure_editable(discipline: &Discipline, today: NaiveDate) -> Result<(), AppError> {
    if !discipline.phase(today).is_editable() {
        return Err(AppError::Conflict(format!(
            "Discipline {} has already ended",
            discipline.name
        )));
    }
    Ok(())
}

/// `earliest_start` is the first day that can still get a log: today for a
/// new discipline, the stored start if that is earlier for an existing one.
fn validate_range(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    earliest_start: NaiveDate,
) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::BadRequest(
            "start_date must not be after end_date".to_string(),
        ));
    }
    if end < today {
        return Err(AppError::BadRequest(
            "end_date must not be in the past".to_string(),
        ));
    }
    if start < earliest_start {
        return Err(AppError::BadRequest(format!(
            "start_date must not be before {earliest_start}"
        )));
    }
    Ok(())
}

fn required_name(name: &str, field: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn overlap_conflict() -> AppError {
    AppError::Conflict("Dates overlap another active discipline".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{setup_test_db, users};
    use crate::lifecycle::Phase;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    async fn setup() -> (SqlitePool, Tracker, User) {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();
        let user = users::insert_user(
            &mut conn,
            NewUserRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
        )
        .await
        .unwrap();
        drop(conn);
        (pool.clone(), Tracker::new(pool), user)
    }

    fn request(start: NaiveDate, end: NaiveDate, task_names: &[&str]) -> NewDisciplineRequest {
        NewDisciplineRequest {
            name: "Deep work".to_string(),
            description: None,
            start_date: start,
            end_date: end,
            tasks: task_names
                .iter()
                .map(|name| NewTaskRequest {
                    name: name.to_string(),
                    priority: Priority::Medium,
                })
                .collect(),
        }
    }

    async fn stored(pool: &SqlitePool, id: &str) -> Discipline {
        let mut conn = pool.acquire().await.unwrap();
        disciplines::find_discipline(&mut conn, id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_three_of_four_starts_a_streak() {
        let (pool, tracker, user) = setup().await;
        let detail = tracker
            .create_discipline(&user.id, request(date(1), date(30), &["a", "b", "c", "d"]), date(1))
            .await
            .expect("Failed to create discipline");
        let today = detail.today.expect("today's log should be open");
        assert_eq!(today.day.tasks.len(), 4);

        for task in &detail.tasks[..3] {
            tracker
                .set_task_completion(&user.id, &task.id, true, date(1))
                .await
                .unwrap();
        }

        let discipline = stored(&pool, &detail.discipline.discipline.id).await;
        assert_eq!(discipline.streak(), Streak { current: 1, longest: 1 });

        // toggling back below the threshold undoes the increment
        let view = tracker
            .set_task_completion(&user.id, &detail.tasks[0].id, false, date(1))
            .await
            .unwrap();
        assert_eq!(view.percent, 50);
        let discipline = stored(&pool, &detail.discipline.discipline.id).await;
        assert_eq!(discipline.streak(), Streak::default());
    }

    #[tokio::test]
    async fn test_task_added_mid_day_drops_today() {
        let (pool, tracker, user) = setup().await;
        let detail = tracker
            .create_discipline(&user.id, request(date(1), date(30), &["a", "b", "c"]), date(1))
            .await
            .unwrap();
        let id = detail.discipline.discipline.id.clone();
        for task in &detail.tasks {
            tracker
                .set_task_completion(&user.id, &task.id, true, date(1))
                .await
                .unwrap();
        }
        assert_eq!(stored(&pool, &id).await.current_streak, 1);

        // 3 of 4 still counts
        let fourth = tracker
            .add_task(
                &user.id,
                &id,
                NewTaskRequest {
                    name: "d".to_string(),
                    priority: Priority::High,
                },
                date(1),
            )
            .await
            .unwrap();
        assert_eq!(stored(&pool, &id).await.current_streak, 1);

        // 3 of 5 does not
        let fifth = tracker
            .add_task(
                &user.id,
                &id,
                NewTaskRequest {
                    name: "e".to_string(),
                    priority: Priority::Low,
                },
                date(1),
            )
            .await
            .unwrap();
        assert_eq!(stored(&pool, &id).await.streak(), Streak::default());

        let today = tracker.today(&user.id, date(1)).await.unwrap();
        assert_eq!(today.day.tasks.len(), 5);
        assert_eq!(today.day.tasks[3].task_id, fourth.id);
        assert_eq!(today.day.tasks[4].task_id, fifth.id);

        // removing an open task restores the streak day
        tracker.remove_task(&user.id, &fifth.id, date(1)).await.unwrap();
        assert_eq!(stored(&pool, &id).await.streak(), Streak { current: 1, longest: 1 });
        let today = tracker.today(&user.id, date(1)).await.unwrap();
        assert_eq!(today.day.tasks.len(), 4);
    }

    #[tokio::test]
    async fn test_removing_last_task_leaves_an_empty_day() {
        let (pool, tracker, user) = setup().await;
        let detail = tracker
            .create_discipline(&user.id, request(date(1), date(30), &["only"]), date(1))
            .await
            .unwrap();
        let id = detail.discipline.discipline.id.clone();
        tracker
            .set_task_completion(&user.id, &detail.tasks[0].id, true, date(1))
            .await
            .unwrap();
        assert_eq!(stored(&pool, &id).await.current_streak, 1);

        tracker.remove_task(&user.id, &detail.tasks[0].id, date(1)).await.unwrap();
        let today = tracker.today(&user.id, date(1)).await.unwrap();
        assert!(today.day.tasks.is_empty());
        assert!(!today.is_streak_day);
        assert_eq!(stored(&pool, &id).await.streak(), Streak::default());
    }

    #[tokio::test]
    async fn test_streak_continues_across_days() {
        let (pool, tracker, user) = setup().await;
        let detail = tracker
            .create_discipline(&user.id, request(date(1), date(30), &["a"]), date(1))
            .await
            .unwrap();
        let id = detail.discipline.discipline.id.clone();
        let task_id = detail.tasks[0].id.clone();
        tracker.set_task_completion(&user.id, &task_id, true, date(1)).await.unwrap();

        let mut discipline = stored(&pool, &id).await;
        {
            let mut conn = pool.acquire().await.unwrap();
            let (_, opened) = ensure_day(&mut conn, &discipline, date(2)).await.unwrap();
            assert!(opened);
            refresh_streak(&mut conn, &mut discipline, date(2)).await.unwrap();
        }
        // day 2 is open, the run through day 1 still stands
        assert_eq!(stored(&pool, &id).await.streak(), Streak { current: 1, longest: 1 });

        tracker.set_task_completion(&user.id, &task_id, true, date(2)).await.unwrap();
        assert_eq!(stored(&pool, &id).await.streak(), Streak { current: 2, longest: 2 });

        let days = tracker.discipline_days(&user.id, &id).await.unwrap();
        assert_eq!(days.len(), 2);
        assert!(days.iter().all(|d| d.is_streak_day));

        // only today's log can be edited
        assert!(matches!(
            tracker.set_task_completion(&user.id, &task_id, false, date(3)).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_moving_start_into_future_clears_history() {
        let (pool, tracker, user) = setup().await;
        let detail = tracker
            .create_discipline(&user.id, request(date(1), date(30), &["a"]), date(1))
            .await
            .unwrap();
        let id = detail.discipline.discipline.id.clone();
        tracker
            .set_task_completion(&user.id, &detail.tasks[0].id, true, date(1))
            .await
            .unwrap();
        assert_eq!(stored(&pool, &id).await.current_streak, 1);

        let view = tracker
            .update_discipline(
                &user.id,
                &id,
                UpdateDisciplineRequest {
                    start_date: Some(date(5)),
                    ..Default::default()
                },
                date(1),
            )
            .await
            .unwrap();
        assert_eq!(view.phase, Phase::Upcoming);
        assert_eq!(view.discipline.streak(), Streak::default());
        assert!(tracker.discipline_days(&user.id, &id).await.unwrap().is_empty());
        assert!(matches!(
            tracker.today(&user.id, date(1)).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_pulling_start_to_today_opens_log() {
        let (_pool, tracker, user) = setup().await;
        let detail = tracker
            .create_discipline(&user.id, request(date(10), date(20), &["a", "b"]), date(1))
            .await
            .unwrap();
        assert!(detail.today.is_none());
        assert_eq!(detail.discipline.phase, Phase::Upcoming);

        let view = tracker
            .update_discipline(
                &user.id,
                &detail.discipline.discipline.id,
                UpdateDisciplineRequest {
                    start_date: Some(date(1)),
                    ..Default::default()
                },
                date(1),
            )
            .await
            .unwrap();
        assert_eq!(view.phase, Phase::Active);
        let today = tracker.today(&user.id, date(1)).await.unwrap();
        assert_eq!(today.day.tasks.len(), 2);
    }

    #[tokio::test]
    async fn test_validation_and_conflicts() {
        let (pool, tracker, user) = setup().await;

        let err = tracker
            .create_discipline(&user.id, request(date(5), date(4), &[]), date(1))
            .await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));

        let err = tracker
            .create_discipline(&user.id, request(date(1), date(3), &[]), date(4))
            .await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));

        let mut blank = request(date(1), date(3), &[]);
        blank.name = "   ".to_string();
        assert!(matches!(
            tracker.create_discipline(&user.id, blank, date(1)).await,
            Err(AppError::BadRequest(_))
        ));

        let first = tracker
            .create_discipline(&user.id, request(date(1), date(10), &["a"]), date(1))
            .await
            .unwrap();
        let err = tracker
            .create_discipline(&user.id, request(date(10), date(20), &[]), date(1))
            .await;
        assert!(matches!(err, Err(AppError::Conflict(_))));

        let id = first.discipline.discipline.id.clone();
        {
            let mut conn = pool.acquire().await.unwrap();
            disciplines::set_status(&mut conn, &id, DisciplineStatus::Failed)
                .await
                .unwrap();
        }
        let err = tracker
            .add_task(
                &user.id,
                &id,
                NewTaskRequest {
                    name: "late".to_string(),
                    priority: Priority::Low,
                },
                date(2),
            )
            .await;
        assert!(matches!(err, Err(AppError::Conflict(_))));

        assert!(matches!(
            tracker.discipline_detail("intruder", &id, date(2)).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_start_date_cannot_reach_unlogged_days() {
        let (_pool, tracker, user) = setup().await;

        // created on the 10th, the 1st to the 9th can never be logged
        let err = tracker
            .create_discipline(&user.id, request(date(1), date(12), &["a"]), date(10))
            .await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));

        let detail = tracker
            .create_discipline(&user.id, request(date(10), date(20), &["a"]), date(10))
            .await
            .unwrap();
        let id = detail.discipline.discipline.id.clone();

        let earlier = UpdateDisciplineRequest {
            start_date: Some(date(8)),
            ..Default::default()
        };
        assert!(matches!(
            tracker.update_discipline(&user.id, &id, earlier, date(12)).await,
            Err(AppError::BadRequest(_))
        ));

        // later in the range is fine, and so is keeping the past start
        let later = UpdateDisciplineRequest {
            start_date: Some(date(11)),
            ..Default::default()
        };
        let view = tracker.update_discipline(&user.id, &id, later, date(12)).await.unwrap();
        assert_eq!(view.discipline.start_date, date(11));

        let longer = UpdateDisciplineRequest {
            end_date: Some(date(25)),
            ..Default::default()
        };
        let view = tracker.update_discipline(&user.id, &id, longer, date(12)).await.unwrap();
        assert_eq!(view.discipline.end_date, date(25));
    }

    #[tokio::test]
    async fn test_expired_discipline_refuses_edits_before_rollover() {
        let (pool, tracker, user) = setup().await;
        let detail = tracker
            .create_discipline(&user.id, request(date(1), date(5), &["a"]), date(1))
            .await
            .unwrap();
        let id = detail.discipline.discipline.id.clone();
        let task_id = detail.tasks[0].id.clone();

        let view = tracker.discipline_detail(&user.id, &id, date(8)).await.unwrap();
        assert_eq!(view.discipline.phase, Phase::Closing);

        let extend = UpdateDisciplineRequest {
            end_date: Some(date(30)),
            ..Default::default()
        };
        assert!(matches!(
            tracker.update_discipline(&user.id, &id, extend, date(8)).await,
            Err(AppError::Conflict(_))
        ));
        let late = NewTaskRequest {
            name: "late".to_string(),
            priority: Priority::Low,
        };
        assert!(matches!(
            tracker.add_task(&user.id, &id, late, date(8)).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            tracker.remove_task(&user.id, &task_id, date(8)).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(stored(&pool, &id).await.end_date, date(5));
    }

    #[tokio::test]
    async fn test_update_task_keeps_streak_untouched() {
        let (_pool, tracker, user) = setup().await;
        let detail = tracker
            .create_discipline(&user.id, request(date(1), date(30), &["a"]), date(1))
            .await
            .unwrap();

        let task = tracker
            .update_task(
                &user.id,
                &detail.tasks[0].id,
                UpdateTaskRequest {
                    name: Some("  Meditate ".to_string()),
                    priority: Some(Priority::High),
                },
                date(1),
            )
            .await
            .unwrap();
        assert_eq!(task.name, "Meditate");
        assert_eq!(task.priority, Priority::High);

        let today = tracker.today(&user.id, date(1)).await.unwrap();
        assert_eq!(today.day.tasks[0].name, "Meditate");

        tracker
            .delete_discipline(&user.id, &detail.discipline.discipline.id)
            .await
            .unwrap();
        assert!(tracker.list_disciplines(&user.id, date(1)).await.unwrap().is_empty());
    }
}
