use chrono::{NaiveDate, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::models::{Discipline, DisciplineStatus, NewDisciplineRequest};
use crate::streak::Streak;

pub async fn insert_discipline(
    conn: &mut SqliteConnection,
    user_id: &str,
    req: &NewDisciplineRequest,
) -> Result<Discipline, sqlx::Error> {
    let now = Utc::now();
    let discipline = Discipline {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: req.name.clone(),
        description: req.description.clone(),
        start_date: req.start_date,
        end_date: req.end_date,
        status: DisciplineStatus::Active,
        current_streak: 0,
        longest_streak: 0,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO disciplines
            (id, user_id, name, description, start_date, end_date, status,
            current_streak, longest_streak, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, ?8, ?8)
        "#,
    )
    .bind(&discipline.id)
    .bind(&discipline.user_id)
    .bind(&discipline.name)
    .bind(&discipline.description)
    .bind(discipline.start_date)
    .bind(discipline.end_date)
    .bind(discipline.status)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(discipline)
}

pub async fn find_discipline(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Discipline>, sqlx::Error> {
    sqlx::query_as::<_, Discipline>(
        r#"
        SELECT id, user_id, name, description, start_date, end_date, status,
               current_streak, longest_streak, created_at, updated_at
        FROM disciplines
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

/// Looks a discipline up only if it belongs to `user_id`.
pub async fn find_user_discipline(
    conn: &mut SqliteConnection,
    user_id: &str,
    id: &str,
) -> Result<Option<Discipline>, sqlx::Error> {
    Ok(find_discipline(conn, id)
        .await?
        .filter(|d| d.user_id == user_id))
}

pub async fn fetch_user_disciplines(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<Discipline>, sqlx::Error> {
    sqlx::query_as::<_, Discipline>(
        r#"
        SELECT id, user_id, name, description, start_date, end_date, status,
               current_streak, longest_streak, created_at, updated_at
        FROM disciplines
        WHERE user_id = ?
        ORDER BY start_date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
}

/// All disciplines still in the `active` status, upcoming ones included.
pub async fn fetch_active_disciplines(
    conn: &mut SqliteConnection,
) -> Result<Vec<Discipline>, sqlx::Error> {
    sqlx::query_as::<_, Discipline>(
        r#"
        SELECT id, user_id, name, description, start_date, end_date, status,
               current_streak, longest_streak, created_at, updated_at
        FROM disciplines
        WHERE status = 'active'
        ORDER BY start_date, created_at
        "#,
    )
    .fetch_all(&mut *conn)
    .await
}

/// Writes the editable fields back and bumps `updated_at`.
pub async fn save_discipline(
    conn: &mut SqliteConnection,
    discipline: &mut Discipline,
) -> Result<(), sqlx::Error> {
    discipline.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE disciplines
        SET name = ?1,
            description = ?2,
            start_date = ?3,
            end_date = ?4,
            updated_at = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&discipline.name)
    .bind(&discipline.description)
    .bind(discipline.start_date)
    .bind(discipline.end_date)
    .bind(discipline.updated_at)
    .bind(&discipline.id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn update_streak(
    conn: &mut SqliteConnection,
    id: &str,
    streak: Streak,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE disciplines SET current_streak = ?, longest_streak = ?, updated_at = ? WHERE id = ?",
    )
    .bind(streak.current)
    .bind(streak.longest)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn set_status(
    conn: &mut SqliteConnection,
    id: &str,
    status: DisciplineStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE disciplines SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn delete_discipline(conn: &mut SqliteConnection, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM disciplines WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Whether another active discipline of the user shares a date with
/// `[start, end]`.
pub async fn has_overlap(
    conn: &mut SqliteConnection,
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    exclude_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM disciplines
        WHERE user_id = ?1
          AND status = 'active'
          AND id != ?2
          AND start_date <= ?3
          AND end_date >= ?4
        "#,
    )
    .bind(user_id)
    .bind(exclude_id.unwrap_or(""))
    .bind(end)
    .bind(start)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count > 0)
}
