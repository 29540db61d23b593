use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::need::NeedType;
use crate::error::ApiError;

/// Aggregate on-hand inventory per relief category, independent of any
/// specific need. One row per category.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Stock {
    #[serde(rename = "type")]
    pub stock_type: String,
    pub quantity: i32,
    pub updated_at: DateTime<Utc>,
}

/// Body of both stock mutations: POST adds `quantity` to the row (creating
/// it if absent), PATCH sets the absolute value.
#[derive(Debug, Deserialize)]
pub struct StockChange {
    #[serde(rename = "type")]
    pub stock_type: NeedType,
    pub quantity: i32,
}

impl StockChange {
    pub fn validate_restock(&self) -> Result<(), ApiError> {
        if self.quantity < 1 {
            return Err(ApiError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_set(&self) -> Result<(), ApiError> {
        if self.quantity < 0 {
            return Err(ApiError::Validation(
                "Quantity cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}
