use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::models::{NewTaskRequest, Task};

pub async fn insert_task(
    conn: &mut SqliteConnection,
    discipline_id: &str,
    req: &NewTaskRequest,
) -> Result<Task, sqlx::Error> {
    let task = Task {
        id: Uuid::new_v4().to_string(),
        discipline_id: discipline_id.to_string(),
        name: req.name.clone(),
        priority: req.priority,
        is_archived: false,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO tasks (id, discipline_id, name, priority, is_archived, created_at) VALUES (?, ?, ?, ?, 0, ?)",
    )
    .bind(&task.id)
    .bind(&task.discipline_id)
    .bind(&task.name)
    .bind(task.priority)
    .bind(task.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(task)
}

pub async fn find_task(conn: &mut SqliteConnection, id: &str) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        "SELECT id, discipline_id, name, priority, is_archived, created_at FROM tasks WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

/// Live tasks of a discipline, highest priority first, then in creation
/// order. Day logs are seeded in this order.
pub async fn fetch_tasks(
    conn: &mut SqliteConnection,
    discipline_id: &str,
) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, discipline_id, name, priority, is_archived, created_at
        FROM tasks
        WHERE discipline_id = ? AND is_archived = 0
        ORDER BY CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
                 created_at,
                 rowid
        "#,
    )
    .bind(discipline_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn save_task(conn: &mut SqliteConnection, task: &Task) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE tasks SET name = ?, priority = ? WHERE id = ?")
        .bind(&task.name)
        .bind(task.priority)
        .bind(&task.id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Tasks are archived rather than deleted so past days keep their entries.
pub async fn archive_task(conn: &mut SqliteConnection, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE tasks SET is_archived = 1 WHERE id = ? AND is_archived = 0")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(result > 0)
}
