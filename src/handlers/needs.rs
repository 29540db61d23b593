use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    lifecycle::{self, DispatchStatus, NeedStatus},
    middleware::AuthUser,
    models::{CreateDispatch, CreateNeed, Dispatch, Need, NeedResponse, Stock},
};

#[derive(Debug, Deserialize)]
pub struct NeedsQuery {
    pub status: Option<String>,
}

fn need_status(need: &Need) -> Result<NeedStatus, ApiError> {
    NeedStatus::parse(&need.status)
        .ok_or_else(|| ApiError::Internal(format!("invalid need status: {}", need.status)))
}

pub async fn list_needs(
    State(db): State<Database>,
    _auth: AuthUser,
    Query(query): Query<NeedsQuery>,
) -> Result<Json<Vec<NeedResponse>>, ApiError> {
    let needs = match query.status {
        Some(ref status) => {
            let status = NeedStatus::parse(status)
                .ok_or_else(|| ApiError::Validation("Invalid status filter".to_string()))?;
            sqlx::query_as::<_, Need>(
                "SELECT * FROM needs WHERE status = $1 ORDER BY created_at DESC",
            )
            .bind(status.as_str())
            .fetch_all(&db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Need>("SELECT * FROM needs ORDER BY created_at DESC")
                .fetch_all(&db)
                .await?
        }
    };

    Ok(Json(needs.into_iter().map(NeedResponse::from).collect()))
}

pub async fn create_need(
    State(db): State<Database>,
    auth: AuthUser,
    Json(req): Json<CreateNeed>,
) -> Result<Json<NeedResponse>, ApiError> {
    req.validate()?;

    let need = sqlx::query_as::<_, Need>(
        r#"
        INSERT INTO needs (need_type, description, urgency, latitude, longitude, status, required_quantity, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(req.need_type.as_str())
    .bind(&req.description)
    .bind(req.urgency.as_str())
    .bind(req.location.lat)
    .bind(req.location.lng)
    .bind(NeedStatus::Pending.as_str())
    .bind(req.required_quantity.unwrap_or(1))
    .bind(auth.id)
    .fetch_one(&db)
    .await?;

    Ok(Json(need.into()))
}

pub async fn needs_by_user(
    State(db): State<Database>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<NeedResponse>>, ApiError> {
    let needs = sqlx::query_as::<_, Need>(
        "SELECT * FROM needs WHERE created_by = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&db)
    .await?;

    Ok(Json(needs.into_iter().map(NeedResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct FulfillRequest {
    pub quantity: i32,
}

/// Direct stock fulfillment: moves `quantity` units from the matching stock
/// row onto the need. Both writes happen in one transaction with the rows
/// locked, so a crash or a concurrent fulfill cannot leave the stock and the
/// need out of step.
pub async fn fulfill_need(
    State(db): State<Database>,
    _auth: AuthUser,
    Path(need_id): Path<Uuid>,
    Json(req): Json<FulfillRequest>,
) -> Result<Json<NeedResponse>, ApiError> {
    if req.quantity <= 0 {
        return Err(ApiError::Validation(
            "Quantity must be greater than zero".to_string(),
        ));
    }

    let mut tx = db.begin().await?;

    let need = sqlx::query_as::<_, Need>("SELECT * FROM needs WHERE id = $1 FOR UPDATE")
        .bind(need_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Need"))?;

    let stock =
        sqlx::query_as::<_, Stock>("SELECT * FROM stock WHERE stock_type = $1 FOR UPDATE")
            .bind(&need.need_type)
            .fetch_optional(&mut *tx)
            .await?;
    let on_hand = stock.map(|s| s.quantity).unwrap_or(0);

    let outcome = lifecycle::apply_fulfillment(
        need_status(&need)?,
        need.required_quantity,
        need.fulfilled_quantity,
        on_hand,
        req.quantity,
    )?;

    sqlx::query("UPDATE stock SET quantity = $1, updated_at = NOW() WHERE stock_type = $2")
        .bind(outcome.stock_quantity)
        .bind(&need.need_type)
        .execute(&mut *tx)
        .await?;

    let need = sqlx::query_as::<_, Need>(
        "UPDATE needs SET status = $1, fulfilled_quantity = $2, updated_at = NOW() WHERE id = $3 RETURNING *",
    )
    .bind(outcome.status.as_str())
    .bind(outcome.fulfilled_quantity)
    .bind(need.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(need.into()))
}

/// Allocates resources against a need: creates a dispatch record and moves a
/// pending need to resources-dispatched.
pub async fn create_dispatch(
    State(db): State<Database>,
    _auth: AuthUser,
    Path(need_id): Path<Uuid>,
    Json(req): Json<CreateDispatch>,
) -> Result<Json<Dispatch>, ApiError> {
    req.validate()?;

    let mut tx = db.begin().await?;

    let need = sqlx::query_as::<_, Need>("SELECT * FROM needs WHERE id = $1 FOR UPDATE")
        .bind(need_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Need"))?;

    let status = lifecycle::apply_dispatch(need_status(&need)?)?;

    let dispatch = sqlx::query_as::<_, Dispatch>(
        "INSERT INTO dispatches (need_id, eta, resource_amount, status) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(need.id)
    .bind(req.eta)
    .bind(req.resource_amount)
    .bind(DispatchStatus::Dispatched.as_str())
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE needs SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status.as_str())
        .bind(need.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(dispatch))
}

#[derive(Debug, Deserialize)]
pub struct MarkReachedRequest {
    pub dispatch_id: Uuid,
}

/// Marks a dispatch as arrived and credits its resource amount to the need.
/// Not idempotent: marking the same dispatch reached twice double-counts,
/// matching the system this one replaces.
pub async fn mark_reached(
    State(db): State<Database>,
    _auth: AuthUser,
    Path(need_id): Path<Uuid>,
    Json(req): Json<MarkReachedRequest>,
) -> Result<Json<NeedResponse>, ApiError> {
    let mut tx = db.begin().await?;

    // Lock order is need row, then dispatch row; update_dispatch_status
    // follows the same order.
    let need = sqlx::query_as::<_, Need>("SELECT * FROM needs WHERE id = $1 FOR UPDATE")
        .bind(need_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Need"))?;

    let dispatch = sqlx::query_as::<_, Dispatch>("SELECT * FROM dispatches WHERE id = $1")
        .bind(req.dispatch_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Dispatch"))?;

    sqlx::query("UPDATE dispatches SET status = $1 WHERE id = $2")
        .bind(DispatchStatus::Reached.as_str())
        .bind(dispatch.id)
        .execute(&mut *tx)
        .await?;

    let (status, fulfilled) = lifecycle::apply_reached(
        need_status(&need)?,
        need.required_quantity,
        need.fulfilled_quantity,
        dispatch.resource_amount,
    );

    let need = sqlx::query_as::<_, Need>(
        "UPDATE needs SET status = $1, fulfilled_quantity = $2, updated_at = NOW() WHERE id = $3 RETURNING *",
    )
    .bind(status.as_str())
    .bind(fulfilled)
    .bind(need.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(need.into()))
}
