use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::need::{Location, NeedType};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceStatus {
    Available,
    InTransit,
    Depleted,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Available => "available",
            ResourceStatus::InTransit => "in-transit",
            ResourceStatus::Depleted => "depleted",
        }
    }
}

/// Inventory an organization holds in the field, as opposed to the central
/// stock pool.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub resource_type: String,
    pub quantity: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    pub organization_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateResource {
    #[serde(rename = "type")]
    pub resource_type: NeedType,
    pub quantity: i32,
    pub location: Location,
    pub organization_id: Uuid,
}

impl CreateResource {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.quantity < 0 {
            return Err(ApiError::Validation(
                "Quantity cannot be negative".to_string(),
            ));
        }
        self.location.validate()
    }
}
