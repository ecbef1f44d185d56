//! Handlers for the admin user listing and account mutations.
//!
//! The five interacting super-admin rules are decided by the pure policy
//! functions in the account domain; these handlers only gather the
//! inputs and translate verdicts.

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::domain::account::{decide_role_change, decide_status_toggle, Account, Role};
use crate::domain::foundation::AccountId;
use crate::ports::AccountPage;

use super::super::auth::dto::UserDto;
use super::super::envelope::{self, Pagination};
use super::super::error::{ApiError, ApiJson};
use super::super::middleware::RequireAdmin;
use super::super::AppState;
use super::dto::{ListUsersQuery, UpdateRoleRequest, UpdateStatusRequest};

const MAX_PAGE_SIZE: u32 = 100;

fn parse_account_id(raw: &str) -> Result<AccountId, ApiError> {
    AccountId::parse(raw).map_err(|_| ApiError::validation_field("id", "must be a valid UUID"))
}

async fn load_target(state: &AppState, id: AccountId) -> Result<Account, ApiError> {
    state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("ACCOUNT_NOT_FOUND", "Account not found"))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_actor): RequireAdmin,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let search = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let (accounts, total) = state
        .accounts
        .list(AccountPage {
            page,
            limit,
            search,
        })
        .await?;

    let users: Vec<UserDto> = accounts.iter().map(UserDto::from).collect();
    Ok(Json(envelope::paginated(
        users,
        Pagination::new(page, limit, total),
    )))
}

/// PATCH /admin/users/:id/role
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateRoleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target_id = parse_account_id(&id)?;
    let new_role = Role::parse(&req.role)
        .ok_or_else(|| ApiError::validation_field("role", "must be user, admin, or super_admin"))?;

    let target = load_target(&state, target_id).await?;
    decide_role_change(actor.role, target.role, new_role, actor.id == target.id)?;

    state.accounts.set_role(target.id, new_role).await?;
    tracing::info!(
        actor_id = %actor.id,
        target_id = %target.id,
        role = new_role.as_str(),
        "role changed"
    );

    let updated = load_target(&state, target_id).await?;
    Ok(Json(envelope::success_with_message(
        UserDto::from(&updated),
        "Role updated",
    )))
}

/// PATCH /admin/users/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target_id = parse_account_id(&id)?;

    let target = load_target(&state, target_id).await?;
    decide_status_toggle(actor.role, target.role, req.is_active, actor.id == target.id)?;

    state.accounts.set_active(target.id, req.is_active).await?;
    tracing::info!(
        actor_id = %actor.id,
        target_id = %target.id,
        is_active = req.is_active,
        "account status changed"
    );

    let updated = load_target(&state, target_id).await?;
    Ok(Json(envelope::success_with_message(
        UserDto::from(&updated),
        if req.is_active {
            "Account activated"
        } else {
            "Account deactivated"
        },
    )))
}
