//! Request/response shapes for the auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::{Account, Role};
use crate::domain::foundation::AccountId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Public view of an account. Shared with the admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: AccountId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for UserDto {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            role: account.role,
            is_active: account.is_active,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Login/signup payload: the token plus the account it belongs to.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct MePayload {
    pub user: UserDto,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn user_dto_serializes_camel_case_without_secrets() {
        let account = Account {
            id: AccountId::generate(),
            email: "a@x.com".to_string(),
            password_hash: Some("phc-string".to_string()),
            display_name: Some("Alice".to_string()),
            role: Role::SuperAdmin,
            is_active: true,
            stripe_customer_id: Some("cus_1".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(UserDto::from(&account)).unwrap();
        assert_eq!(value["email"], "a@x.com");
        assert_eq!(value["displayName"], "Alice");
        assert_eq!(value["role"], "super_admin");
        assert_eq!(value["isActive"], true);
        // Never leak the credential
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn signup_request_accepts_missing_display_name() {
        let req: SignupRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"Secret123"}"#).unwrap();
        assert!(req.display_name.is_none());
    }
}
