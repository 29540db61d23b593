use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use uuid::Uuid;

use crate::{error::ApiError, models::Role, utils::verify_token};

/// The authenticated caller, extracted from the `Authorization: Bearer`
/// header of each request. Request-scoped; there is no global auth state.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role != Role::Admin {
            return Err(ApiError::Unauthorized("Admin access required".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let token = bearer
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let claims = verify_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;
        let role = Role::parse(&claims.role)
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

        Ok(AuthUser {
            id,
            email: claims.email,
            role,
        })
    }
}
