use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    database::Database,
    error::ApiError,
    lifecycle::{self, DispatchStatus, NeedStatus},
    middleware::AuthUser,
    models::{Dispatch, Need},
};

pub async fn list_dispatches(
    State(db): State<Database>,
    _auth: AuthUser,
) -> Result<Json<Vec<Dispatch>>, ApiError> {
    let dispatches =
        sqlx::query_as::<_, Dispatch>("SELECT * FROM dispatches ORDER BY dispatched_at DESC")
            .fetch_all(&db)
            .await?;

    Ok(Json(dispatches))
}

pub async fn get_dispatch(
    State(db): State<Database>,
    _auth: AuthUser,
    Path(dispatch_id): Path<Uuid>,
) -> Result<Json<Dispatch>, ApiError> {
    let dispatch = sqlx::query_as::<_, Dispatch>("SELECT * FROM dispatches WHERE id = $1")
        .bind(dispatch_id)
        .fetch_optional(&db)
        .await?
        .ok_or(ApiError::NotFound("Dispatch"))?;

    Ok(Json(dispatch))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDispatchStatus {
    pub status: String,
}

/// Direct status update. `reached` also credits the dispatched amount to the
/// owning need; `cancelled` leaves the need's fulfilled quantity untouched.
pub async fn update_dispatch_status(
    State(db): State<Database>,
    _auth: AuthUser,
    Path(dispatch_id): Path<Uuid>,
    Json(req): Json<UpdateDispatchStatus>,
) -> Result<Json<Dispatch>, ApiError> {
    let status = DispatchStatus::parse(&req.status)
        .filter(|s| matches!(s, DispatchStatus::Reached | DispatchStatus::Cancelled))
        .ok_or_else(|| ApiError::Validation("Invalid status".to_string()))?;

    let mut tx = db.begin().await?;

    // Unlocked read to learn the owning need. The need row is then locked
    // before the dispatch row: mark_reached takes its locks in that order,
    // and both paths must agree or concurrent calls deadlock.
    let dispatch = sqlx::query_as::<_, Dispatch>("SELECT * FROM dispatches WHERE id = $1")
        .bind(dispatch_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Dispatch"))?;

    let need = if status == DispatchStatus::Reached {
        sqlx::query_as::<_, Need>("SELECT * FROM needs WHERE id = $1 FOR UPDATE")
            .bind(dispatch.need_id)
            .fetch_optional(&mut *tx)
            .await?
    } else {
        None
    };

    let dispatch = sqlx::query_as::<_, Dispatch>(
        "UPDATE dispatches SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(status.as_str())
    .bind(dispatch.id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(need) = need {
        let current = NeedStatus::parse(&need.status)
            .ok_or_else(|| ApiError::Internal(format!("invalid need status: {}", need.status)))?;
        let (next, fulfilled) = lifecycle::apply_reached(
            current,
            need.required_quantity,
            need.fulfilled_quantity,
            dispatch.resource_amount,
        );
        sqlx::query(
            "UPDATE needs SET status = $1, fulfilled_quantity = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(next.as_str())
        .bind(fulfilled)
        .bind(need.id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Json(dispatch))
}

/// Admin removal of a dispatch record. Does not touch the owning need.
pub async fn delete_dispatch(
    State(db): State<Database>,
    auth: AuthUser,
    Path(dispatch_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    let deleted = sqlx::query("DELETE FROM dispatches WHERE id = $1")
        .bind(dispatch_id)
        .execute(&db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Dispatch"));
    }

    Ok(StatusCode::NO_CONTENT)
}
