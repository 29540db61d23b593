use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    middleware::AuthUser,
    models::{Role, User, UserResponse},
    utils::{create_token, hash_password},
};

pub async fn list_users(
    State(db): State<Database>,
    auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    auth.require_admin()?;

    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

pub async fn create_user(
    State(db): State<Database>,
    auth: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require_admin()?;

    if !req.email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(ApiError::Validation("Password is required".to_string()));
    }

    let existing = sqlx::query("SELECT 1 FROM users WHERE email = $1")
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

    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: Uuid,
    pub role: Role,
}

/// Admin role change. An existing admin's role cannot be changed.
pub async fn update_user(
    State(db): State<Database>,
    auth: AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require_admin()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(req.user_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if user.role == Role::Admin.as_str() {
        return Err(ApiError::Validation("Cannot change admin role".to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(req.role.as_str())
    .bind(user.id)
    .fetch_one(&db)
    .await?;

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(db): State<Database>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if user.role == Role::Admin.as_str() {
        let admins =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(&db)
                .await?;
        if admins <= 1 {
            return Err(ApiError::Validation(
                "Cannot delete the last admin user".to_string(),
            ));
        }
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RoleChanged {
    pub user: UserResponse,
    pub token: String,
}

/// Role change that re-issues a token carrying the new role, so the affected
/// user's session can be swapped in place.
pub async fn change_role(
    State(db): State<Database>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Json<RoleChanged>, ApiError> {
    auth.require_admin()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if user.role == Role::Admin.as_str() {
        return Err(ApiError::Validation("Cannot change admin role".to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(req.role.as_str())
    .bind(user.id)
    .fetch_one(&db)
    .await?;

    let token = create_token(user.id, &user.email, &user.role)?;

    Ok(Json(RoleChanged {
        user: user.into(),
        token,
    }))
}
