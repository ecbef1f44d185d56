//! Handlers for signup, login, social login, and password lifecycle.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::domain::account::{
    generate_secret, hash_secret, normalize_email, validate_email, validate_password_strength,
    Account, AuthError, NewAccount, Role,
};
use crate::ports::EmailMessage;

use super::super::envelope;
use super::super::error::{ApiError, ApiJson};
use super::super::middleware::RequireAuth;
use super::super::AppState;
use super::dto::{
    AuthPayload, ForgotPasswordRequest, GoogleLoginRequest, LoginRequest, MePayload,
    ResetPasswordRequest, SignupRequest, UpdatePasswordRequest, UserDto,
};

/// Identical answer whether or not the email exists, to keep the endpoint
/// useless for account enumeration.
const FORGOT_PASSWORD_MESSAGE: &str =
    "If that email is registered, a password reset link is on its way";

fn login_response(
    state: &AppState,
    status: StatusCode,
    account: &Account,
) -> Result<Response, ApiError> {
    let token = state.token_codec.issue(account.id, &account.email)?;
    let cookie = state.cookies.issue(&token);
    let payload = AuthPayload {
        token,
        user: UserDto::from(account),
    };
    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(envelope::success(payload)),
    )
        .into_response())
}

pub(super) fn reset_link(app_base_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        app_base_url.trim_end_matches('/'),
        token
    )
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<Response, ApiError> {
    validate_email(&req.email)?;
    validate_password_strength(&req.password)?;

    let password_hash = state.password_hasher.hash(&req.password)?;
    let account = state
        .accounts
        .create(NewAccount {
            email: normalize_email(&req.email),
            password_hash: Some(password_hash),
            display_name: req.display_name.filter(|n| !n.trim().is_empty()),
            role: Role::User,
        })
        .await?;

    tracing::info!(account_id = %account.id, "account created");
    login_response(&state, StatusCode::CREATED, &account)
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let account = state
        .accounts
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    // Social-only accounts have no password; same generic rejection.
    let stored_hash = account
        .password_hash
        .as_deref()
        .ok_or(AuthError::InvalidCredentials)?;
    if !state.password_hasher.verify(&req.password, stored_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }
    account.ensure_active()?;

    login_response(&state, StatusCode::OK, &account)
}

/// POST /auth/google
///
/// Links by (provider, subject); creates the account on first login, and
/// attaches the provider to an existing account when the verified email
/// already has one.
pub async fn google_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GoogleLoginRequest>,
) -> Result<Response, ApiError> {
    let identity = state.identity.verify_id_token(&req.id_token).await?;

    let account = match state
        .accounts
        .find_by_provider(identity.provider, &identity.subject)
        .await?
    {
        Some(account) => account,
        None => {
            let email = normalize_email(&identity.email);
            match state.accounts.find_by_email(&email).await? {
                Some(existing) => {
                    state
                        .accounts
                        .link_provider(existing.id, identity.provider, &identity.subject)
                        .await?;
                    existing
                }
                None => {
                    let account = state
                        .accounts
                        .create(NewAccount {
                            email,
                            password_hash: None,
                            display_name: identity.display_name.clone(),
                            role: Role::User,
                        })
                        .await?;
                    state
                        .accounts
                        .link_provider(account.id, identity.provider, &identity.subject)
                        .await?;
                    tracing::info!(account_id = %account.id, "account created via google");
                    account
                }
            }
        }
    };
    account.ensure_active()?;

    login_response(&state, StatusCode::OK, &account)
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(_account): RequireAuth,
) -> Response {
    (
        [(header::SET_COOKIE, state.cookies.clear())],
        Json(envelope::message_only("Logged out")),
    )
        .into_response()
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<serde_json::Value>, ApiError> {
    let account = state
        .accounts
        .find_by_id(current.id)
        .await?
        .ok_or(AuthError::AccountNotFound)?;
    Ok(Json(envelope::success(MePayload {
        user: UserDto::from(&account),
    })))
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = normalize_email(&req.email);
    if let Some(account) = state.accounts.find_by_email(&email).await? {
        if account.is_active {
            let secret = generate_secret(Utc::now());
            state
                .reset_tokens
                .create(account.id, &secret.hash, secret.expires_at)
                .await?;

            let link = reset_link(&state.app_base_url, &secret.raw);
            let message = EmailMessage {
                to: account.email.clone(),
                subject: "Reset your password".to_string(),
                html_body: format!(
                    "<p>Someone requested a password reset for this address.</p>\
                     <p><a href=\"{link}\">Reset your password</a> \
                     (the link expires in one hour).</p>\
                     <p>If this wasn't you, you can ignore this email.</p>"
                ),
            };
            // Delivery failure must not change the response shape.
            if let Err(err) = state.mailer.send(message).await {
                tracing::error!(account_id = %account.id, error = %err, "reset email failed");
            }
        }
    }

    Ok(Json(envelope::message_only(FORGOT_PASSWORD_MESSAGE)))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = state
        .reset_tokens
        .find_by_hash(&hash_secret(&req.token))
        .await?
        .ok_or(AuthError::InvalidResetToken)?;
    token.ensure_redeemable(Utc::now())?;

    validate_password_strength(&req.new_password)?;

    let account = state
        .accounts
        .find_by_id(token.account_id)
        .await?
        .ok_or(AuthError::InvalidResetToken)?;
    if let Some(stored_hash) = account.password_hash.as_deref() {
        if state.password_hasher.verify(&req.new_password, stored_hash)? {
            return Err(AuthError::SamePassword.into());
        }
    }

    let new_hash = state.password_hasher.hash(&req.new_password)?;
    let consumed = state
        .reset_tokens
        .consume_and_reset_password(token.id, account.id, &new_hash)
        .await?;
    if !consumed {
        // Lost the race against a concurrent redemption of the same token.
        return Err(AuthError::InvalidResetToken.into());
    }

    tracing::info!(account_id = %account.id, "password reset");
    Ok(Json(envelope::message_only("Password has been reset")))
}

/// PUT /auth/update-password
pub async fn update_password(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(req): ApiJson<UpdatePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let account = state
        .accounts
        .find_by_id(current.id)
        .await?
        .ok_or(AuthError::AccountNotFound)?;

    let stored_hash = account
        .password_hash
        .as_deref()
        .ok_or(AuthError::NoPassword)?;
    if !state
        .password_hasher
        .verify(&req.current_password, stored_hash)?
    {
        return Err(AuthError::InvalidCredentials.into());
    }
    if req.new_password == req.current_password {
        return Err(AuthError::SamePassword.into());
    }
    validate_password_strength(&req.new_password)?;

    let new_hash = state.password_hasher.hash(&req.new_password)?;
    state
        .accounts
        .update_password_hash(account.id, &new_hash)
        .await?;

    Ok(Json(envelope::message_only("Password updated")))
}
