// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod grid;

/// Represents a registered account.
///
/// The password hash is carried for verification on the server side but
/// is never serialized into a response (`#[serde(skip_serializing)]`).
#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    #[sqlx(rename = "id")]
    pub id: i64,

    #[sqlx(rename = "email")]
    pub email: String,

    #[serde(skip_serializing)]
    #[sqlx(rename = "password_hash")]
    pub password_hash: String,

    #[sqlx(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

/// The public identity of an account as returned by the auth endpoints.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserInfo {
    pub email: String,
    pub id: i64,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
        }
    }
}

/// Credentials for signup and signin.
#[derive(Deserialize, Debug)]
pub struct CredentialsPayload {
    pub email: String,
    pub password: String,
}

/// Body of the delete-by-email operation.
#[derive(Deserialize, Debug)]
pub struct DeleteUserPayload {
    pub email: String,
}

/// Response body shared by signup and signin: the public identity plus
/// a bearer token bound to it.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
}

/// Represents a task within the system.
///
/// JSON uses camelCase (`startHour`, `createdAt`, ...) to match the
/// HTTP API; columns stay snake_case.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[sqlx(rename = "id")]
    pub id: i64,

    #[sqlx(rename = "user_id")]
    pub user_id: i64,

    #[sqlx(rename = "text")]
    pub text: String,

    // We use NaiveDate because we are only interested in the day,
    // without a timezone.
    #[sqlx(rename = "task_date")]
    pub date: NaiveDate,

    // Hour-of-day labels like "09:00". An end before the start means the
    // task spans past midnight (see `grid`). Stored verbatim.
    #[sqlx(rename = "start_hour")]
    pub start_hour: String,

    #[sqlx(rename = "end_hour")]
    pub end_hour: String,

    #[sqlx(rename = "finished")]
    pub finished: bool,

    #[sqlx(rename = "created_at")]
    pub created_at: DateTime<Utc>,

    #[sqlx(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// Structure used to receive task creation data from the API.
/// It's a good practice to separate database models (`Task`)
/// from API models (`CreateTaskPayload`), as they may have different fields.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub text: String,
    pub date: NaiveDate,
    pub start_hour: String,
    pub end_hour: String,
}

/// Partial update: only the fields present in the request are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    pub text: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_hour: Option<String>,
    pub end_hour: Option<String>,
    pub finished: Option<bool>,
}

/// The four accent colors of a user's theme.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BgColors {
    #[serde(default = "default_light1")]
    pub light1: String,

    #[serde(default = "default_light2")]
    pub light2: String,

    #[serde(default = "default_gradient_color1")]
    pub gradient_color1: String,

    #[serde(default = "default_gradient_color2")]
    pub gradient_color2: String,
}

fn default_light1() -> String {
    "#ff4d6d33".to_string()
}
fn default_light2() -> String {
    "#00f5d433".to_string()
}
fn default_gradient_color1() -> String {
    "#ff4d6d".to_string()
}
fn default_gradient_color2() -> String {
    "#00f5d4".to_string()
}

impl Default for BgColors {
    fn default() -> Self {
        Self {
            light1: default_light1(),
            light2: default_light2(),
            gradient_color1: default_gradient_color1(),
            gradient_color2: default_gradient_color2(),
        }
    }
}

/// A user's display preferences. At most one record per account.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[sqlx(rename = "user_id")]
    pub user_id: i64,

    #[sqlx(rename = "dark_mode")]
    pub dark_mode: bool,

    #[sqlx(flatten)]
    pub bg_colors: BgColors,

    #[sqlx(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// Body of the theme upsert. Omitted colors fall back to the defaults,
/// so the stored record is always fully populated.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SetThemePayload {
    #[serde(default)]
    pub dark_mode: bool,

    #[serde(default)]
    pub bg_colors: BgColors,
}
