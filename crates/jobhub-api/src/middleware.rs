use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use jobhub_types::api::Claims;
use jobhub_types::models::Role;

use crate::error::ApiError;
use crate::state::{AppState, db_call};

/// The caller, as loaded from the database for this request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_role(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("insufficient role"))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner of the resource, or an admin.
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> Result<(), ApiError> {
        if self.id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("not the owner of this resource"))
        }
    }

    pub fn require_owner(&self, owner_id: Uuid) -> Result<(), ApiError> {
        if self.id == owner_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden("not the owner of this resource"))
        }
    }
}

/// Extract and validate JWT from Authorization header, then load the account.
///
/// The account is re-read on every request so deactivation and role changes
/// apply to tokens that were issued earlier.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?
    .claims;

    let user = db_call(&state, move |db| db.get_user(claims.sub))
        .await?
        .ok_or(ApiError::Unauthorized)?;
    if !user.is_active {
        return Err(ApiError::Forbidden("account is deactivated"));
    }

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        role: user.role,
    });
    Ok(next.run(req).await)
}
