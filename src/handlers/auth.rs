use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    database::Database,
    error::ApiError,
    middleware::AuthUser,
    models::{Role, User, UserResponse},
    utils::{create_token, hash_password, verify_password},
};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

pub async fn signup(
    State(db): State<Database>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if !req.email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(ApiError::Validation("Password is required".to_string()));
    }

    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Validation("User already exists".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash, role) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&req.email)
    .bind(&password_hash)
    .bind(req.role.as_str())
    .fetch_one(&db)
    .await?;

    let token = create_token(user.id, &user.email, &user.role)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn login(
    State(db): State<Database>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    if !verify_password(&req.password, &user.password_hash).unwrap_or(false) {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = create_token(user.id, &user.email, &user.role)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Resolves the bearer token back to the current user record.
pub async fn verify(
    State(db): State<Database>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    Ok(Json(user.into()))
}
