use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::config_loader,
    domain::value_objects::{document_id::DocumentId, enums::user_roles::UserRole, iam::Actor},
    infrastructure::axum_http::error_responses::AppError,
};

/// Claims of the bearer tokens issued by the auth service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: DocumentId,
    pub role: UserRole,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

pub fn validate_jwt(token: &str) -> Result<Claims, AppError> {
    let secret = config_loader::get_auth_secret().map_err(AppError::Internal)?;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AppError::Unauthorized(format!("JWT validation failed: {e}")))?;

    Ok(token_data.claims)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Unauthorized("missing or malformed bearer token".to_string())
                })?;

        let claims = validate_jwt(bearer.token())?;

        let user_id = DocumentId::parse(&claims.sub)
            .map_err(|_| AppError::Unauthorized("invalid user id in token".to_string()))?;
        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| AppError::Unauthorized(format!("unknown role: {}", claims.role)))?;

        debug!(%user_id, role = %role, "auth: bearer token accepted");
        Ok(AuthUser { user_id, role })
    }
}
