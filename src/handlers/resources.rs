use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    middleware::AuthUser,
    models::{CreateResource, Resource, ResourceStatus},
};

pub async fn list_resources(
    State(db): State<Database>,
    _auth: AuthUser,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let resources = sqlx::query_as::<_, Resource>("SELECT * FROM resources ORDER BY created_at DESC")
        .fetch_all(&db)
        .await?;

    Ok(Json(resources))
}

pub async fn create_resource(
    State(db): State<Database>,
    _auth: AuthUser,
    Json(req): Json<CreateResource>,
) -> Result<Json<Resource>, ApiError> {
    req.validate()?;

    let exists = sqlx::query("SELECT 1 FROM organizations WHERE id = $1")
        .bind(req.organization_id)
        .fetch_optional(&db)
        .await?;
    if exists.is_none() {
        return Err(ApiError::NotFound("Organization"));
    }

    let resource = sqlx::query_as::<_, Resource>(
        r#"
        INSERT INTO resources (resource_type, quantity, latitude, longitude, status, organization_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(req.resource_type.as_str())
    .bind(req.quantity)
    .bind(req.location.lat)
    .bind(req.location.lng)
    .bind(ResourceStatus::Available.as_str())
    .bind(req.organization_id)
    .fetch_one(&db)
    .await?;

    Ok(Json(resource))
}

#[derive(Debug, Deserialize)]
pub struct UpdateResourceStatus {
    pub status: ResourceStatus,
}

pub async fn update_resource_status(
    State(db): State<Database>,
    _auth: AuthUser,
    Path(resource_id): Path<Uuid>,
    Json(req): Json<UpdateResourceStatus>,
) -> Result<Json<Resource>, ApiError> {
    let resource = sqlx::query_as::<_, Resource>(
        "UPDATE resources SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(req.status.as_str())
    .bind(resource_id)
    .fetch_optional(&db)
    .await?
    .ok_or(ApiError::NotFound("Resource"))?;

    Ok(Json(resource))
}
