//! HTTP middleware.

mod auth;

pub use auth::{
    auth_middleware, AuthFailure, CurrentAccount, OptionalAuth, RequireAdmin, RequireAuth,
};
