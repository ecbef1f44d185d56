//! Authentication middleware and guard extractors.
//!
//! The middleware resolves the caller's identity once per request and
//! stashes the result in request extensions; it never rejects, so routes
//! with optional auth still run. The extractors are the guards: they
//! turn a stashed failure into the precise 401/400/403 the route needs.
//!
//! ```text
//! Request -> auth_middleware -> CurrentAccount | AuthFailure in extensions
//!                                     |
//!                        handler -> RequireAuth / RequireAdmin / OptionalAuth
//! ```

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::domain::account::{AuthError, Role};
use crate::domain::foundation::AccountId;

use super::super::error::ApiError;
use super::super::AppState;

/// Verified identity of the caller, attached by the middleware.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub id: AccountId,
    pub email: String,
    pub role: Role,
}

/// Why the caller could not be authenticated, attached instead of
/// rejecting so optional-auth routes still run.
#[derive(Debug, Clone)]
pub struct AuthFailure(pub AuthError);

enum Resolution {
    Authenticated(CurrentAccount),
    Failed(AuthError),
}

/// Token from the auth cookie or the `Authorization: Bearer` header.
fn extract_token(parts: &axum::http::HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = parts
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        return Some(token.to_string());
    }

    for header_value in parts.get_all(header::COOKIE) {
        let Ok(raw) = header_value.to_str() else {
            continue;
        };
        for cookie in cookie::Cookie::split_parse(raw).flatten() {
            if cookie.name() == cookie_name && !cookie.value().is_empty() {
                return Some(cookie.value().to_string());
            }
        }
    }
    None
}

async fn resolve(
    state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Result<Resolution, ApiError> {
    let Some(token) = extract_token(headers, &state.cookies.name) else {
        return Ok(Resolution::Failed(AuthError::AuthenticationRequired));
    };

    let claims = match state.token_codec.verify(&token) {
        Ok(claims) => claims,
        Err(err) => return Ok(Resolution::Failed(err)),
    };

    // The credential alone is not enough: the account must still exist
    // and still be active.
    let account = state.accounts.find_by_id(claims.account_id).await?;
    Ok(match account {
        None => Resolution::Failed(AuthError::AccountNotFound),
        Some(account) if !account.is_active => Resolution::Failed(AuthError::AccountDeactivated),
        Some(account) => Resolution::Authenticated(CurrentAccount {
            id: account.id,
            email: account.email,
            role: account.role,
        }),
    })
}

/// Resolves the caller's identity and stashes it for the extractors.
///
/// Only an infrastructure failure (the account lookup erroring) produces
/// a response here; every authentication failure is deferred to the
/// guards so each route decides whether it cares.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve(&state, request.headers()).await {
        Ok(Resolution::Authenticated(account)) => {
            request.extensions_mut().insert(account);
        }
        Ok(Resolution::Failed(err)) => {
            request.extensions_mut().insert(AuthFailure(err));
        }
        Err(api_err) => return api_err.into_response(),
    }
    next.run(request).await
}

/// Guard: the caller must be authenticated.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub CurrentAccount);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(account) = parts.extensions.get::<CurrentAccount>() {
            return Ok(RequireAuth(account.clone()));
        }
        let failure = parts
            .extensions
            .get::<AuthFailure>()
            .map(|f| f.0.clone())
            .unwrap_or(AuthError::AuthenticationRequired);
        Err(failure.into())
    }
}

/// Guard: the caller must hold admin or super-admin.
///
/// The wrapped account keeps its role so handlers can distinguish the
/// two where the super-admin rules require it.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentAccount);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(account) = RequireAuth::from_request_parts(parts, state).await?;
        if !account.role.is_admin() {
            return Err(AuthError::InsufficientRole.into());
        }
        Ok(RequireAdmin(account))
    }
}

/// Guard that never rejects: `None` for anonymous callers.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<CurrentAccount>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<CurrentAccount>().cloned()))
    }
}
