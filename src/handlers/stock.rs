use axum::{extract::State, Json};

use crate::{
    database::Database,
    error::ApiError,
    middleware::AuthUser,
    models::{Stock, StockChange},
};

async fn all_stock(db: &Database) -> Result<Vec<Stock>, ApiError> {
    let stock = sqlx::query_as::<_, Stock>("SELECT * FROM stock ORDER BY stock_type")
        .fetch_all(db)
        .await?;
    Ok(stock)
}

pub async fn list_stock(
    State(db): State<Database>,
    _auth: AuthUser,
) -> Result<Json<Vec<Stock>>, ApiError> {
    Ok(Json(all_stock(&db).await?))
}

/// Restock: adds the given quantity to the category's row, creating the row
/// when the category has none yet. Returns the full stock list.
pub async fn add_stock(
    State(db): State<Database>,
    _auth: AuthUser,
    Json(req): Json<StockChange>,
) -> Result<Json<Vec<Stock>>, ApiError> {
    req.validate_restock()?;

    sqlx::query(
        r#"
        INSERT INTO stock (stock_type, quantity) VALUES ($1, $2)
        ON CONFLICT (stock_type)
        DO UPDATE SET quantity = stock.quantity + EXCLUDED.quantity, updated_at = NOW()
        "#,
    )
    .bind(req.stock_type.as_str())
    .bind(req.quantity)
    .execute(&db)
    .await?;

    Ok(Json(all_stock(&db).await?))
}

/// Sets the absolute quantity for a category. Returns the full stock list.
pub async fn set_stock(
    State(db): State<Database>,
    _auth: AuthUser,
    Json(req): Json<StockChange>,
) -> Result<Json<Vec<Stock>>, ApiError> {
    req.validate_set()?;

    let updated =
        sqlx::query("UPDATE stock SET quantity = $1, updated_at = NOW() WHERE stock_type = $2")
            .bind(req.quantity)
            .bind(req.stock_type.as_str())
            .execute(&db)
            .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("Stock"));
    }

    Ok(Json(all_stock(&db).await?))
}
