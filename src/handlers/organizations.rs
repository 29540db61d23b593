use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    middleware::AuthUser,
    models::{CreateOrganization, Member, Organization, UpdateOrganization},
};

fn unique_violation(err: sqlx::Error, message: &str) -> ApiError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return ApiError::Validation(message.to_string());
        }
    }
    ApiError::from(err)
}

#[derive(Debug, Deserialize)]
pub struct OrganizationsQuery {
    pub search: Option<String>,
}

pub async fn list_organizations(
    State(db): State<Database>,
    _auth: AuthUser,
    Query(query): Query<OrganizationsQuery>,
) -> Result<Json<Vec<Organization>>, ApiError> {
    let organizations = match query.search {
        Some(ref search) => {
            let pattern = format!("%{}%", search);
            sqlx::query_as::<_, Organization>(
                "SELECT * FROM organizations WHERE name ILIKE $1 OR description ILIKE $1 ORDER BY created_at DESC",
            )
            .bind(pattern)
            .fetch_all(&db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Organization>(
                "SELECT * FROM organizations ORDER BY created_at DESC",
            )
            .fetch_all(&db)
            .await?
        }
    };

    Ok(Json(organizations))
}

/// Creates an organization with the caller as its admin and first member.
pub async fn create_organization(
    State(db): State<Database>,
    auth: AuthUser,
    Json(req): Json<CreateOrganization>,
) -> Result<Json<Organization>, ApiError> {
    req.validate()?;

    let mut tx = db.begin().await?;

    let organization = sqlx::query_as::<_, Organization>(
        r#"
        INSERT INTO organizations (name, description, contact_email, contact_phone, address, website, admin_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.contact_email)
    .bind(&req.contact_phone)
    .bind(&req.address)
    .bind(&req.website)
    .bind(auth.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        unique_violation(
            e,
            "An organization with this name or contact email already exists",
        )
    })?;

    sqlx::query("INSERT INTO organization_members (organization_id, user_id) VALUES ($1, $2)")
        .bind(organization.id)
        .bind(auth.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(organization))
}

/// Only the organization's admin can update its details.
pub async fn update_organization(
    State(db): State<Database>,
    auth: AuthUser,
    Json(req): Json<UpdateOrganization>,
) -> Result<Json<Organization>, ApiError> {
    let organization =
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(req.organization_id)
            .fetch_optional(&db)
            .await?
            .ok_or(ApiError::NotFound("Organization"))?;

    if organization.admin_id != auth.id {
        return Err(ApiError::Unauthorized(
            "Only the organization admin can do this".to_string(),
        ));
    }

    let organization = sqlx::query_as::<_, Organization>(
        r#"
        UPDATE organizations SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            contact_email = COALESCE($4, contact_email),
            contact_phone = COALESCE($5, contact_phone),
            address = COALESCE($6, address),
            website = COALESCE($7, website),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(organization.id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.contact_email)
    .bind(&req.contact_phone)
    .bind(&req.address)
    .bind(&req.website)
    .fetch_one(&db)
    .await
    .map_err(|e| {
        unique_violation(
            e,
            "An organization with this name or contact email already exists",
        )
    })?;

    Ok(Json(organization))
}

#[derive(Debug, Deserialize)]
pub struct DeleteOrganization {
    pub organization_id: Uuid,
}

pub async fn delete_organization(
    State(db): State<Database>,
    auth: AuthUser,
    Json(req): Json<DeleteOrganization>,
) -> Result<StatusCode, ApiError> {
    let organization =
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(req.organization_id)
            .fetch_optional(&db)
            .await?
            .ok_or(ApiError::NotFound("Organization"))?;

    if organization.admin_id != auth.id {
        return Err(ApiError::Unauthorized(
            "Only the organization admin can do this".to_string(),
        ));
    }

    sqlx::query("DELETE FROM organizations WHERE id = $1")
        .bind(organization.id)
        .execute(&db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn members_of(db: &Database, organization_id: Uuid) -> Result<Vec<Member>, ApiError> {
    let members = sqlx::query_as::<_, Member>(
        r#"
        SELECT u.id, u.email, u.role
        FROM users u
        JOIN organization_members m ON m.user_id = u.id
        WHERE m.organization_id = $1
        ORDER BY u.email
        "#,
    )
    .bind(organization_id)
    .fetch_all(db)
    .await?;
    Ok(members)
}

pub async fn list_members(
    State(db): State<Database>,
    _auth: AuthUser,
    Path(organization_id): Path<Uuid>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let exists = sqlx::query("SELECT 1 FROM organizations WHERE id = $1")
        .bind(organization_id)
        .fetch_optional(&db)
        .await?;
    if exists.is_none() {
        return Err(ApiError::NotFound("Organization"));
    }

    Ok(Json(members_of(&db, organization_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct MemberChange {
    pub member_id: Uuid,
}

pub async fn add_member(
    State(db): State<Database>,
    auth: AuthUser,
    Path(organization_id): Path<Uuid>,
    Json(req): Json<MemberChange>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let organization =
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(organization_id)
            .fetch_optional(&db)
            .await?
            .ok_or(ApiError::NotFound("Organization"))?;

    if organization.admin_id != auth.id {
        return Err(ApiError::Unauthorized(
            "Only the organization admin can do this".to_string(),
        ));
    }

    let user = sqlx::query("SELECT 1 FROM users WHERE id = $1")
        .bind(req.member_id)
        .fetch_optional(&db)
        .await?;
    if user.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    sqlx::query("INSERT INTO organization_members (organization_id, user_id) VALUES ($1, $2)")
        .bind(organization.id)
        .bind(req.member_id)
        .execute(&db)
        .await
        .map_err(|e| unique_violation(e, "User is already a member"))?;

    Ok(Json(members_of(&db, organization.id).await?))
}

pub async fn remove_member(
    State(db): State<Database>,
    auth: AuthUser,
    Path(organization_id): Path<Uuid>,
    Json(req): Json<MemberChange>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let organization =
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(organization_id)
            .fetch_optional(&db)
            .await?
            .ok_or(ApiError::NotFound("Organization"))?;

    if organization.admin_id != auth.id {
        return Err(ApiError::Unauthorized(
            "Only the organization admin can do this".to_string(),
        ));
    }

    if req.member_id == organization.admin_id {
        return Err(ApiError::Validation(
            "Cannot remove organization admin".to_string(),
        ));
    }

    sqlx::query("DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2")
        .bind(organization.id)
        .bind(req.member_id)
        .execute(&db)
        .await?;

    Ok(Json(members_of(&db, organization.id).await?))
}
