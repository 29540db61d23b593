use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Dispatch {
    pub id: Uuid,
    pub need_id: Uuid,
    pub eta: i32, // minutes
    pub resource_amount: i32,
    pub status: String,
    pub dispatched_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDispatch {
    pub eta: i32,
    pub resource_amount: i32,
}

impl CreateDispatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.eta < 1 {
            return Err(ApiError::Validation(
                "ETA must be at least 1 minute".to_string(),
            ));
        }
        if self.resource_amount < 1 {
            return Err(ApiError::Validation(
                "Resource amount must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_eta_and_amount_pass() {
        let req = CreateDispatch {
            eta: 30,
            resource_amount: 6,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn zero_eta_is_rejected() {
        let req = CreateDispatch {
            eta: 0,
            resource_amount: 6,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_amount_is_rejected() {
        let req = CreateDispatch {
            eta: 30,
            resource_amount: 0,
        };
        assert!(req.validate().is_err());
    }
}
