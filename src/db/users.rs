use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::models::{NewUserRequest, UpdateUserRequest, User};

pub async fn insert_user(
    conn: &mut SqliteConnection,
    req: NewUserRequest,
) -> Result<User, sqlx::Error> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email,
        email_notifications: true,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO users (id, name, email, email_notifications, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.email_notifications)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(user)
}

pub async fn find_user(conn: &mut SqliteConnection, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, email, email_notifications, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn find_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, email, email_notifications, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn update_user(
    conn: &mut SqliteConnection,
    id: &str,
    req: UpdateUserRequest,
) -> Result<Option<User>, sqlx::Error> {
    let mut current = match find_user(conn, id).await? {
        Some(u) => u,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(email_notifications) = req.email_notifications {
        current.email_notifications = email_notifications;
    }

    sqlx::query("UPDATE users SET name = ?, email_notifications = ? WHERE id = ?")
        .bind(&current.name)
        .bind(current.email_notifications)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(Some(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_test_db;

    #[tokio::test]
    async fn test_insert_and_update_user() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let user = insert_user(
            &mut conn,
            NewUserRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
        )
        .await
        .expect("Failed to insert user");
        assert!(user.email_notifications);

        let found = find_user_by_email(&mut conn, "ada@example.com")
            .await
            .unwrap()
            .expect("User not found");
        assert_eq!(found.id, user.id);

        let updated = update_user(
            &mut conn,
            &user.id,
            UpdateUserRequest {
                name: None,
                email_notifications: Some(false),
            },
        )
        .await
        .unwrap()
        .expect("User not found");
        assert_eq!(updated.name, "Ada");
        assert!(!updated.email_notifications);

        let missing = update_user(&mut conn, "nope", UpdateUserRequest::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
