// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::Utc;
use common::{CreateTaskPayload, SetThemePayload, Task, Theme, UpdateTaskPayload, User};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool}; // MigrateDatabase for database_exists/create_database
use tracing::{debug, info};

/// Establishes the database connection pool.
/// If the database does not exist, it creates it.
/// It also ensures all tables have the correct schema.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    create_tables(&pool).await?;

    info!("Tables are ready.");

    Ok(pool)
}

/// Creates the schema. Shared with the test setup so the in-memory
/// databases used in tests cannot drift from the real one.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'users' table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            text TEXT NOT NULL,
            task_date DATE NOT NULL,
            start_hour TEXT NOT NULL,
            end_hour TEXT NOT NULL,
            finished BOOLEAN NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'tasks' table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_themes (
            user_id INTEGER PRIMARY KEY,
            dark_mode BOOLEAN NOT NULL DEFAULT 0,
            light1 TEXT NOT NULL,
            light2 TEXT NOT NULL,
            gradient_color1 TEXT NOT NULL,
            gradient_color2 TEXT NOT NULL,
            updated_at TIMESTAMP NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'user_themes' table")?;

    Ok(())
}

// --- Users ---

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to look up user by email")?;

    Ok(user)
}

/// Inserts a new account. The email has a UNIQUE constraint, so racing
/// signups for the same address fail here rather than creating twins.
pub async fn insert_user(pool: &SqlitePool, email: &str, password_hash: &str) -> Result<User> {
    let created_at = Utc::now();

    debug!("Insert values: email={}", email);

    let id = sqlx::query("INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)")
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .execute(pool)
        .await
        .context("Failed to insert user into DB")?
        .last_insert_rowid();

    Ok(User {
        id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at,
    })
}

/// Removes the account matching `email`, returning the removed record.
/// Task and theme rows are left behind; nothing cascades.
pub async fn delete_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let Some(user) = find_user_by_email(pool, email).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user.id)
        .execute(pool)
        .await
        .context("Failed to delete user from DB")?;

    info!("Deleted user with ID: {}", user.id);

    Ok(Some(user))
}

// --- Tasks ---

/// Inserts a new task owned by `user_id`, unfinished by default.
pub async fn create_task_in_db(
    pool: &SqlitePool,
    user_id: i64,
    payload: CreateTaskPayload,
) -> Result<Task> {
    let created_at = Utc::now();

    debug!(
        "Insert values: user_id={}, text={}, task_date={}, start_hour={}, end_hour={}",
        user_id, payload.text, payload.date, payload.start_hour, payload.end_hour
    );

    let id = sqlx::query(
        "INSERT INTO tasks (user_id, text, task_date, start_hour, end_hour, finished, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 0, ?, ?)"
    )
    .bind(user_id)
    .bind(&payload.text)
    .bind(payload.date)
    .bind(&payload.start_hour)
    .bind(&payload.end_hour)
    .bind(created_at)
    .bind(created_at)
    .execute(pool)
    .await
    .context("Failed to insert task into DB")?
    .last_insert_rowid();

    Ok(Task {
        id,
        user_id,
        text: payload.text,
        date: payload.date,
        start_hour: payload.start_hour,
        end_hour: payload.end_hour,
        finished: false,
        created_at,
        updated_at: created_at,
    })
}

/// Retrieves every task owned by `user_id`. Pagination happens in the
/// views, over the full result set.
pub async fn get_tasks_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks WHERE user_id = ? ORDER BY task_date ASC, start_hour ASC;",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to retrieve tasks from DB")?;

    Ok(tasks)
}

/// Applies the fields present in `update` to the task, provided it
/// belongs to `user_id`. Returns the updated record, or `None` when no
/// such task exists for that owner. Concurrent updates to the same row
/// are last-write-wins.
pub async fn update_task_in_db(
    pool: &SqlitePool,
    user_id: i64,
    task_id: i64,
    update: UpdateTaskPayload,
) -> Result<Option<Task>> {
    let existing = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ? AND user_id = ?")
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to look up task for update")?;

    let Some(mut task) = existing else {
        return Ok(None);
    };

    if let Some(text) = update.text {
        task.text = text;
    }
    if let Some(date) = update.date {
        task.date = date;
    }
    if let Some(start_hour) = update.start_hour {
        task.start_hour = start_hour;
    }
    if let Some(end_hour) = update.end_hour {
        task.end_hour = end_hour;
    }
    if let Some(finished) = update.finished {
        task.finished = finished;
    }
    task.updated_at = Utc::now();

    sqlx::query(
        "UPDATE tasks SET text = ?, task_date = ?, start_hour = ?, end_hour = ?, finished = ?, updated_at = ? WHERE id = ? AND user_id = ?"
    )
    .bind(&task.text)
    .bind(task.date)
    .bind(&task.start_hour)
    .bind(&task.end_hour)
    .bind(task.finished)
    .bind(task.updated_at)
    .bind(task_id)
    .bind(user_id)
    .execute(pool)
    .await
    .context("Failed to update task in DB")?;

    info!("Updated task with ID: {}", task_id);

    Ok(Some(task))
}

/// Deletes the task if owned by `user_id`.
/// Returns true if a task was removed, false if no such task was found.
pub async fn delete_task_in_db(pool: &SqlitePool, user_id: i64, task_id: i64) -> Result<bool> {
    debug!("Attempting to delete task with ID: {}", task_id);

    let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context(format!("Failed to delete task with ID: {}", task_id))?;

    let rows_affected = result.rows_affected();
    info!("Deleted {} rows for task ID: {}", rows_affected, task_id);

    Ok(rows_affected > 0)
}

// --- Themes ---

pub async fn get_theme_for_user(pool: &SqlitePool, user_id: i64) -> Result<Option<Theme>> {
    let theme = sqlx::query_as::<_, Theme>("SELECT * FROM user_themes WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to retrieve theme from DB")?;

    Ok(theme)
}

/// Upserts the caller's theme record: created on first write, replaced
/// wholesale afterwards. The single-row write is atomic, so there is
/// never a half-old, half-new record.
pub async fn upsert_theme_for_user(
    pool: &SqlitePool,
    user_id: i64,
    payload: SetThemePayload,
) -> Result<Theme> {
    let updated_at = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO user_themes (user_id, dark_mode, light1, light2, gradient_color1, gradient_color2, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            dark_mode = excluded.dark_mode,
            light1 = excluded.light1,
            light2 = excluded.light2,
            gradient_color1 = excluded.gradient_color1,
            gradient_color2 = excluded.gradient_color2,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(payload.dark_mode)
    .bind(&payload.bg_colors.light1)
    .bind(&payload.bg_colors.light2)
    .bind(&payload.bg_colors.gradient_color1)
    .bind(&payload.bg_colors.gradient_color2)
    .bind(updated_at)
    .execute(pool)
    .await
    .context("Failed to upsert theme in DB")?;

    Ok(Theme {
        user_id,
        dark_mode: payload.dark_mode,
        bg_colors: payload.bg_colors,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::BgColors;

    /// Helper function to set up an in-memory SQLite database for testing.
    /// This creates a fresh, empty database for each test, ensuring they are isolated.
    async fn setup_test_db() -> Result<SqlitePool> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        create_tables(&pool).await?;
        Ok(pool)
    }

    fn task_payload(text: &str, date: NaiveDate, start: &str, end: &str) -> CreateTaskPayload {
        CreateTaskPayload {
            text: text.to_string(),
            date,
            start_hour: start.to_string(),
            end_hour: end.to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let pool = setup_test_db().await.unwrap();

        let created = insert_user(&pool, "a@example.com", "hash").await.unwrap();
        assert!(created.id > 0);

        let found = find_user_by_email(&pool, "a@example.com")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "hash");

        assert!(find_user_by_email(&pool, "nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_violates_unique_constraint() {
        let pool = setup_test_db().await.unwrap();

        insert_user(&pool, "a@example.com", "hash1").await.unwrap();
        assert!(insert_user(&pool, "a@example.com", "hash2").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_user_by_email() {
        let pool = setup_test_db().await.unwrap();
        insert_user(&pool, "a@example.com", "hash").await.unwrap();

        let deleted = delete_user_by_email(&pool, "a@example.com").await.unwrap();
        assert_eq!(deleted.map(|u| u.email), Some("a@example.com".to_string()));

        // Second delete finds nothing.
        assert!(delete_user_by_email(&pool, "a@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_and_list_tasks_are_owner_scoped() {
        let pool = setup_test_db().await.unwrap();
        let alice = insert_user(&pool, "alice@example.com", "h").await.unwrap();
        let bob = insert_user(&pool, "bob@example.com", "h").await.unwrap();

        let created = create_task_in_db(
            &pool,
            alice.id,
            task_payload("Gym", date(2025, 1, 10), "09:00", "10:00"),
        )
        .await
        .unwrap();
        assert!(!created.finished);
        assert_eq!(created.created_at, created.updated_at);

        let alice_tasks = get_tasks_for_user(&pool, alice.id).await.unwrap();
        assert_eq!(alice_tasks.len(), 1);
        assert_eq!(alice_tasks[0].text, "Gym");
        assert_eq!(alice_tasks[0].date, date(2025, 1, 10));
        assert_eq!(alice_tasks[0].start_hour, "09:00");
        assert_eq!(alice_tasks[0].end_hour, "10:00");

        // Bob never sees Alice's tasks.
        assert!(get_tasks_for_user(&pool, bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tasks_are_listed_in_date_order() {
        let pool = setup_test_db().await.unwrap();
        let user = insert_user(&pool, "a@example.com", "h").await.unwrap();

        for (text, day) in [("later", 12), ("earlier", 10), ("middle", 11)] {
            create_task_in_db(
                &pool,
                user.id,
                task_payload(text, date(2025, 1, day), "09:00", "10:00"),
            )
            .await
            .unwrap();
        }

        let tasks = get_tasks_for_user(&pool, user.id).await.unwrap();
        let texts: Vec<&str> = tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["earlier", "middle", "later"]);
    }

    #[tokio::test]
    async fn test_update_applies_only_supplied_fields() {
        let pool = setup_test_db().await.unwrap();
        let user = insert_user(&pool, "a@example.com", "h").await.unwrap();
        let task = create_task_in_db(
            &pool,
            user.id,
            task_payload("Gym", date(2025, 1, 10), "09:00", "10:00"),
        )
        .await
        .unwrap();

        let update = UpdateTaskPayload {
            finished: Some(true),
            ..Default::default()
        };
        let updated = update_task_in_db(&pool, user.id, task.id, update)
            .await
            .unwrap()
            .expect("task should be found");

        assert!(updated.finished);
        // Untouched fields survive the partial update.
        assert_eq!(updated.text, "Gym");
        assert_eq!(updated.start_hour, "09:00");
        assert_eq!(updated.end_hour, "10:00");
        assert!(updated.updated_at >= updated.created_at);

        let stored = get_tasks_for_user(&pool, user.id).await.unwrap();
        assert!(stored[0].finished);
    }

    #[tokio::test]
    async fn test_update_for_wrong_owner_is_none_and_leaves_row() {
        let pool = setup_test_db().await.unwrap();
        let alice = insert_user(&pool, "alice@example.com", "h").await.unwrap();
        let bob = insert_user(&pool, "bob@example.com", "h").await.unwrap();
        let task = create_task_in_db(
            &pool,
            alice.id,
            task_payload("Gym", date(2025, 1, 10), "09:00", "10:00"),
        )
        .await
        .unwrap();

        let update = UpdateTaskPayload {
            text: Some("Hijacked".to_string()),
            ..Default::default()
        };
        let result = update_task_in_db(&pool, bob.id, task.id, update)
            .await
            .unwrap();
        assert!(result.is_none());

        let stored = get_tasks_for_user(&pool, alice.id).await.unwrap();
        assert_eq!(stored[0].text, "Gym");
    }

    #[tokio::test]
    async fn test_delete_task_is_owner_scoped() {
        let pool = setup_test_db().await.unwrap();
        let alice = insert_user(&pool, "alice@example.com", "h").await.unwrap();
        let bob = insert_user(&pool, "bob@example.com", "h").await.unwrap();
        let task = create_task_in_db(
            &pool,
            alice.id,
            task_payload("Gym", date(2025, 1, 10), "09:00", "10:00"),
        )
        .await
        .unwrap();

        // Bob cannot delete Alice's task.
        assert!(!delete_task_in_db(&pool, bob.id, task.id).await.unwrap());
        assert_eq!(get_tasks_for_user(&pool, alice.id).await.unwrap().len(), 1);

        assert!(delete_task_in_db(&pool, alice.id, task.id).await.unwrap());
        assert!(get_tasks_for_user(&pool, alice.id).await.unwrap().is_empty());

        // Already gone.
        assert!(!delete_task_in_db(&pool, alice.id, task.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_theme_is_absent_until_first_write() {
        let pool = setup_test_db().await.unwrap();
        let user = insert_user(&pool, "a@example.com", "h").await.unwrap();

        assert!(get_theme_for_user(&pool, user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_theme_upsert_creates_then_replaces() {
        let pool = setup_test_db().await.unwrap();
        let user = insert_user(&pool, "a@example.com", "h").await.unwrap();

        let first = upsert_theme_for_user(
            &pool,
            user.id,
            SetThemePayload {
                dark_mode: true,
                bg_colors: BgColors::default(),
            },
        )
        .await
        .unwrap();
        assert!(first.dark_mode);

        let stored = get_theme_for_user(&pool, user.id)
            .await
            .unwrap()
            .expect("theme should exist");
        assert!(stored.dark_mode);
        assert_eq!(stored.bg_colors, BgColors::default());

        // A second write replaces the record wholesale, still one row.
        let recolored = BgColors {
            gradient_color1: "#000000".to_string(),
            ..BgColors::default()
        };
        upsert_theme_for_user(
            &pool,
            user.id,
            SetThemePayload {
                dark_mode: false,
                bg_colors: recolored.clone(),
            },
        )
        .await
        .unwrap();

        let stored = get_theme_for_user(&pool, user.id).await.unwrap().unwrap();
        assert!(!stored.dark_mode);
        assert_eq!(stored.bg_colors, recolored);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_themes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
