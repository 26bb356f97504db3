// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::SqlitePool;

/// Creates and configures the application router.
///
/// The auth routes are open; every task and theme route extracts the
/// caller's identity from the bearer token before doing any work.
pub fn create_router(pool: SqlitePool) -> Router {
    Router::new()
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/signin", post(handlers::signin))
        .route("/api/auth/user", delete(handlers::delete_user))
        .route("/api/tasks", get(handlers::list_tasks))
        .route("/api/tasks", post(handlers::create_task))
        .route("/api/tasks/{id}", put(handlers::update_task))
        .route("/api/tasks/{id}", delete(handlers::delete_task))
        .route("/api/theme", get(handlers::get_theme))
        .route("/api/theme", put(handlers::set_theme))
        // Adds the database pool to the application state
        .with_state(pool)
}
