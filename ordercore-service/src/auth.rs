//! Bearer-token authentication extractors.
//!
//! Handlers declare the access they need in their signature: [`Identity`]
//! for any signed-in user, [`AdminIdentity`] for administrators. The core
//! trusts the identity these extractors attach.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use ordercore::store::ShopStore;

use crate::error::ApiError;
use crate::state::AppState;

pub use crate::state::Identity;

/// An authenticated caller holding the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminIdentity(pub Identity);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl<S> FromRequestParts<AppState<S>> for Identity
where
    S: ShopStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(ApiError::unauthorized)?;
        state
            .sessions
            .resolve(token)
            .ok_or_else(ApiError::unauthorized)
    }
}

impl<S> FromRequestParts<AppState<S>> for AdminIdentity
where
    S: ShopStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        if !identity.role.is_admin() {
            return Err(ApiError::forbidden());
        }
        Ok(Self(identity))
    }
}
