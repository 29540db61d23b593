use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub description: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
}

impl CreateOrganization {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("Name is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(ApiError::Validation("Description is required".to_string()));
        }
        if !self.contact_email.contains('@') {
            return Err(ApiError::Validation(
                "A valid contact email is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update; absent fields keep their current values. The admin and
/// member list are managed through dedicated routes.
#[derive(Debug, Deserialize)]
pub struct UpdateOrganization {
    pub organization_id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}
