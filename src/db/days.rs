use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

use crate::models::{Day, DayTally, Discipline, Task, TaskState};

#[derive(FromRow)]
struct DayRow {
    id: String,
    user_id: String,
    discipline_id: String,
    date: NaiveDate,
}

impl DayRow {
    fn with_tasks(self, tasks: Vec<TaskState>) -> Day {
        Day {
            id: self.id,
            user_id: self.user_id,
            discipline_id: self.discipline_id,
            date: self.date,
            tasks,
        }
    }
}

/// Opens the log of `date` with every task incomplete, in the given order.
pub async fn insert_day(
    conn: &mut SqliteConnection,
    discipline: &Discipline,
    date: NaiveDate,
    tasks: &[Task],
) -> Result<Day, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO days (id, user_id, discipline_id, date) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&discipline.user_id)
        .bind(&discipline.id)
        .bind(date)
        .execute(&mut *conn)
        .await?;

    for (position, task) in tasks.iter().enumerate() {
        sqlx::query(
            "INSERT INTO task_states (day_id, task_id, position, is_completed, completed_at) VALUES (?, ?, ?, 0, NULL)",
        )
        .bind(&id)
        .bind(&task.id)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }

    Ok(Day {
        id,
        user_id: discipline.user_id.clone(),
        discipline_id: discipline.id.clone(),
        date,
        tasks: tasks
            .iter()
            .map(|t| TaskState {
                task_id: t.id.clone(),
                name: t.name.clone(),
                priority: t.priority,
                is_completed: false,
                completed_at: None,
            })
            .collect(),
    })
}

async fn fetch_task_states(
    conn: &mut SqliteConnection,
    day_id: &str,
) -> Result<Vec<TaskState>, sqlx::Error> {
    sqlx::query_as::<_, TaskState>(
        r#"
        SELECT ts.task_id AS task_id,
               t.name AS name,
               t.priority AS priority,
               ts.is_completed AS is_completed,
               ts.completed_at AS completed_at
        FROM task_states ts
        JOIN tasks t ON t.id = ts.task_id
        WHERE ts.day_id = ?
        ORDER BY ts.position
        "#,
    )
    .bind(day_id)
    .fetch_all(&mut *conn)
    .await
}

/// The user's log for `date`, whichever discipline it belongs to.
pub async fn find_day(
    conn: &mut SqliteConnection,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<Day>, sqlx::Error> {
    let row = sqlx::query_as::<_, DayRow>(
        "SELECT id, user_id, discipline_id, date FROM days WHERE user_id = ? AND date = ?",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let tasks = fetch_task_states(conn, &row.id).await?;
            Ok(Some(row.with_tasks(tasks)))
        }
        None => Ok(None),
    }
}

/// Today's log if it belongs to `discipline`.
pub async fn find_discipline_day(
    conn: &mut SqliteConnection,
    discipline: &Discipline,
    date: NaiveDate,
) -> Result<Option<Day>, sqlx::Error> {
    Ok(find_day(conn, &discipline.user_id, date)
        .await?
        .filter(|day| day.discipline_id == discipline.id))
}

pub async fn fetch_discipline_days(
    conn: &mut SqliteConnection,
    discipline_id: &str,
) -> Result<Vec<Day>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DayRow>(
        "SELECT id, user_id, discipline_id, date FROM days WHERE discipline_id = ? ORDER BY date",
    )
    .bind(discipline_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut days = Vec::with_capacity(rows.len());
    for row in rows {
        let tasks = fetch_task_states(conn, &row.id).await?;
        days.push(row.with_tasks(tasks));
    }
    Ok(days)
}

/// Per-day completion counts of a discipline, ordered by date.
pub async fn fetch_tallies(
    conn: &mut SqliteConnection,
    discipline_id: &str,
) -> Result<Vec<DayTally>, sqlx::Error> {
    sqlx::query_as::<_, DayTally>(
        r#"
        SELECT d.date AS date,
               COALESCE(SUM(ts.is_completed), 0) AS completed,
               COUNT(ts.task_id) AS total
        FROM days d
        LEFT JOIN task_states ts ON ts.day_id = d.id
        WHERE d.discipline_id = ?
        GROUP BY d.id, d.date
        ORDER BY d.date
        "#,
    )
    .bind(discipline_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn append_task_state(
    conn: &mut SqliteConnection,
    day_id: &str,
    task_id: &str,
) -> Result<(), sqlx::Error> {
    let position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM task_states WHERE day_id = ?",
    )
    .bind(day_id)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO task_states (day_id, task_id, position, is_completed, completed_at) VALUES (?, ?, ?, 0, NULL)",
    )
    .bind(day_id)
    .bind(task_id)
    .bind(position)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn remove_task_state(
    conn: &mut SqliteConnection,
    day_id: &str,
    task_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM task_states WHERE day_id = ? AND task_id = ?")
        .bind(day_id)
        .bind(task_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn set_task_completed(
    conn: &mut SqliteConnection,
    day_id: &str,
    task_id: &str,
    completed_at: Option<DateTime<Utc>>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE task_states SET is_completed = ?, completed_at = ? WHERE day_id = ? AND task_id = ?",
    )
    .bind(completed_at.is_some())
    .bind(completed_at)
    .bind(day_id)
    .bind(task_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(result > 0)
}

/// Drops the logs of a discipline that fall outside `[start, end]`.
pub async fn delete_days_outside(
    conn: &mut SqliteConnection,
    discipline_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM days WHERE discipline_id = ? AND (date < ? OR date > ?)",
    )
    .bind(discipline_id)
    .bind(start)
    .bind(end)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(result)
}
