use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;

/// Relief categories. Shared with stock, which tracks on-hand quantity per
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedType {
    Food,
    Shelter,
    Medical,
    Water,
    Other,
}

impl NeedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeedType::Food => "food",
            NeedType::Shelter => "shelter",
            NeedType::Medical => "medical",
            NeedType::Water => "water",
            NeedType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ApiError::Validation(
                "Latitude must be between -90 and 90".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(ApiError::Validation(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Need {
    pub id: Uuid,
    pub need_type: String,
    pub description: String,
    pub urgency: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    pub required_quantity: i32,
    pub fulfilled_quantity: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNeed {
    #[serde(rename = "type")]
    pub need_type: NeedType,
    pub description: String,
    pub urgency: Urgency,
    pub location: Location,
    pub required_quantity: Option<i32>,
}

impl CreateNeed {
    pub fn validate(&self) -> Result<(), ApiError> {
        let len = self.description.chars().count();
        if !(10..=500).contains(&len) {
            return Err(ApiError::Validation(
                "Description must be between 10 and 500 characters".to_string(),
            ));
        }
        self.location.validate()?;
        if let Some(required) = self.required_quantity {
            if required < 1 {
                return Err(ApiError::Validation(
                    "Required quantity must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct NeedResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub need_type: String,
    pub description: String,
    pub urgency: String,
    pub location: Location,
    pub status: String,
    pub required_quantity: i32,
    pub fulfilled_quantity: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Need> for NeedResponse {
    fn from(need: Need) -> Self {
        Self {
            id: need.id,
            need_type: need.need_type,
            description: need.description,
            urgency: need.urgency,
            location: Location {
                lat: need.latitude,
                lng: need.longitude,
            },
            status: need.status,
            required_quantity: need.required_quantity,
            fulfilled_quantity: need.fulfilled_quantity,
            created_by: need.created_by,
            created_at: need.created_at,
            updated_at: need.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_need() -> CreateNeed {
        CreateNeed {
            need_type: NeedType::Water,
            description: "Drinking water for forty people".to_string(),
            urgency: Urgency::High,
            location: Location {
                lat: 27.7,
                lng: 85.3,
            },
            required_quantity: Some(40),
        }
    }

    #[test]
    fn valid_need_passes_validation() {
        assert!(valid_need().validate().is_ok());
    }

    #[test]
    fn short_description_is_rejected() {
        let mut need = valid_need();
        need.description = "too short".to_string();
        assert!(matches!(
            need.validate().unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let mut need = valid_need();
        need.location.lat = 91.0;
        assert!(need.validate().is_err());

        let mut need = valid_need();
        need.location.lng = -180.5;
        assert!(need.validate().is_err());
    }

    #[test]
    fn zero_required_quantity_is_rejected() {
        let mut need = valid_need();
        need.required_quantity = Some(0);
        assert!(need.validate().is_err());
    }
}
