use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// The caller's family-unit code, resolved once per request and handed to
/// handlers as an extension.
#[derive(Debug, Clone)]
pub struct FamilyUnit(pub String);

/// Decode the bearer token and resolve the subject's family unit. Callers
/// without one never reach the exchange.
pub async fn require_family_unit(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(e.to_string()))?;

    let family = state
        .directory
        .family_for_user(&token_data.claims.sub)
        .await?
        .ok_or_else(|| {
            AppError::AuthorizationError("no family unit associated with this account".to_string())
        })?;

    req.extensions_mut().insert(FamilyUnit(family));
    Ok(next.run(req).await)
}
