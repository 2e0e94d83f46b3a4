use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::{ConnectionTrait, EntityTrait};

use crate::entity::member;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated member extracted from the `Authorization: Bearer <token>`
/// header. Add this as a handler parameter to require authentication.
pub struct AuthMember {
    pub member_id: i32,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthMember {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthMember {
            member_id: claims.mid,
            email: claims.sub,
        })
    }
}

/// Like [`AuthMember`], but an absent `Authorization` header is a valid
/// anonymous caller rather than an error. A present-but-invalid credential
/// is still rejected.
pub struct MaybeAuthMember(pub Option<AuthMember>);

impl FromRequestParts<AppState> for MaybeAuthMember {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.get("Authorization").is_none() {
            return Ok(MaybeAuthMember(None));
        }
        AuthMember::from_request_parts(parts, state)
            .await
            .map(|m| MaybeAuthMember(Some(m)))
    }
}

/// Resolve the authenticated claims against the member directory replica.
///
/// A verified token naming a member the directory does not know is an
/// upstream identity failure, not a 404.
pub async fn resolve_member<C: ConnectionTrait>(
    db: &C,
    auth: &AuthMember,
) -> Result<member::Model, AppError> {
    member::Entity::find_by_id(auth.member_id)
        .one(db)
        .await?
        .ok_or(AppError::IdentityUnresolved)
}
