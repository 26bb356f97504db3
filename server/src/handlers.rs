// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::{self, AuthUser};
use crate::database;
use crate::errors::AppError;

use anyhow::Context;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use common::{
    AuthResponse, CreateTaskPayload, CredentialsPayload, DeleteUserPayload, SetThemePayload, Task,
    UpdateTaskPayload, UserInfo,
};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

// --- Accounts ---

/// Handler for registering a new account.
pub async fn signup(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    debug!("Received signup request for email: {}", payload.email);

    if payload.email.is_empty() || payload.password.is_empty() {
        error!("Validation failed: email or password is empty.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Email and password cannot be empty.",
        ));
    }

    if database::find_user_by_email(&pool, &payload.email)
        .await?
        .is_some()
    {
        error!("Signup rejected: email {} already registered.", payload.email);
        return Err(AppError::new(StatusCode::BAD_REQUEST, "User already exists"));
    }

    let password_hash = auth::hash_password(&payload.password).await?;
    let user = database::insert_user(&pool, &payload.email, &password_hash).await?;
    let token = auth::issue_token(user.id)?;

    info!("Account created successfully with ID: {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserInfo::from(&user),
            token,
        }),
    ))
}

/// Handler for authenticating an existing account.
pub async fn signin(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    debug!("Received signin request for email: {}", payload.email);

    let Some(user) = database::find_user_by_email(&pool, &payload.email).await? else {
        error!("Signin rejected: no account for {}.", payload.email);
        return Err(AppError::new(StatusCode::BAD_REQUEST, "User not found"));
    };

    if !auth::verify_password(&payload.password, &user.password_hash).await? {
        error!("Signin rejected: wrong password for {}.", payload.email);
        return Err(AppError::new(StatusCode::BAD_REQUEST, "Invalid credentials"));
    }

    let token = auth::issue_token(user.id)?;

    info!("Account {} signed in.", user.id);

    Ok(Json(AuthResponse {
        user: UserInfo::from(&user),
        token,
    }))
}

/// Handler for removing an account by email.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Json(payload): Json<DeleteUserPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    debug!("Received delete request for email: {}", payload.email);

    let Some(user) = database::delete_user_by_email(&pool, &payload.email).await? else {
        error!("No account found for {}.", payload.email);
        return Err(AppError::new(StatusCode::NOT_FOUND, "User not found"));
    };

    Ok(Json(serde_json::json!({
        "message": "User deleted",
        "user": UserInfo::from(&user),
    })))
}

// --- Tasks (all owner-scoped via `AuthUser`) ---

/// Handler for creating a new task.
pub async fn create_task(
    State(pool): State<SqlitePool>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    debug!("Received request to create task for user: {}", user_id);

    if payload.text.is_empty() {
        error!("Validation failed: task text is empty.");
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "Task text cannot be empty.",
        ));
    }

    let new_task = database::create_task_in_db(&pool, user_id, payload).await?;

    info!("Task created successfully with ID: {}", new_task.id);

    // Return a 201 Created status with the new task as JSON.
    Ok((StatusCode::CREATED, Json(new_task)))
}

/// Handler for listing the caller's tasks.
pub async fn list_tasks(
    State(pool): State<SqlitePool>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = database::get_tasks_for_user(&pool, user_id).await?;
    info!("Successfully retrieved {} tasks.", tasks.len());
    Ok(Json(tasks))
}

/// Handler for partially updating a task (text, date, hours, finished).
pub async fn update_task(
    State(pool): State<SqlitePool>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<Json<Task>, AppError> {
    debug!("Attempting to update task with ID: {}", task_id);

    let Some(task) = database::update_task_in_db(&pool, user_id, task_id, payload).await? else {
        error!("Task with ID {} not found for update.", task_id);
        return Err(AppError::new(StatusCode::NOT_FOUND, "Task not found"));
    };

    Ok(Json(task))
}

/// Handler for deleting a task by ID.
pub async fn delete_task(
    State(pool): State<SqlitePool>,
    AuthUser(user_id): AuthUser,
    Path(task_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    debug!("Attempting to delete task with ID: {}", task_id);

    let deleted = database::delete_task_in_db(&pool, user_id, task_id).await?;

    if deleted {
        info!("Task with ID {} deleted successfully.", task_id);
        Ok(Json(serde_json::json!({ "message": "Task deleted" })))
    } else {
        error!("Task with ID {} not found for deletion.", task_id);
        Err(AppError::new(StatusCode::NOT_FOUND, "Task not found"))
    }
}

// --- Theme preferences ---

/// Handler for fetching the caller's theme. An account that never wrote
/// a preference gets an empty object, not an error.
pub async fn get_theme(
    State(pool): State<SqlitePool>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let theme = database::get_theme_for_user(&pool, user_id).await?;

    let body = match theme {
        Some(theme) => serde_json::to_value(theme).context("Failed to serialize theme")?,
        None => serde_json::json!({}),
    };

    Ok(Json(body))
}

/// Handler for upserting the caller's theme.
pub async fn set_theme(
    State(pool): State<SqlitePool>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SetThemePayload>,
) -> Result<Json<common::Theme>, AppError> {
    debug!("Received theme update for user: {}", user_id);

    let theme = database::upsert_theme_for_user(&pool, user_id, payload).await?;

    info!("Theme stored for user: {}", user_id);

    Ok(Json(theme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sqlx::SqlitePool;

    // The validation failures below never reach the database, so an
    // empty in-memory pool with no tables is enough.
    async fn empty_pool() -> SqlitePool {
        SqlitePool::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_signup_validation_empty_email() {
        let pool = empty_pool().await;
        let payload = Json(CredentialsPayload {
            email: "".to_string(),
            password: "hunter2".to_string(),
        });

        let result = signup(State(pool), payload).await;

        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Email and password cannot be empty.");
    }

    #[tokio::test]
    async fn test_signup_validation_empty_password() {
        let pool = empty_pool().await;
        let payload = Json(CredentialsPayload {
            email: "a@example.com".to_string(),
            password: "".to_string(),
        });

        let result = signup(State(pool), payload).await;

        assert!(result.is_err());
        assert_eq!(result.err().unwrap().code, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_task_validation_empty_text() {
        let pool = empty_pool().await;
        let payload = Json(CreateTaskPayload {
            text: "".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            start_hour: "09:00".to_string(),
            end_hour: "10:00".to_string(),
        });

        let result = create_task(State(pool), AuthUser(1), payload).await;

        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.code, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Task text cannot be empty.");
    }
}
