//! Auth cookie construction.
//!
//! The bearer token also travels as an HTTP-only cookie so browser
//! clients never touch it from script. SameSite is Lax in development
//! and None+Secure in production, where the SPA lives on another origin.

use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use crate::config::{AuthConfig, Environment};

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    secure: bool,
    cross_site: bool,
    max_age_days: i64,
}

impl CookieSettings {
    pub fn new(name: impl Into<String>, secure: bool, cross_site: bool, max_age_days: i64) -> Self {
        Self {
            name: name.into(),
            secure,
            cross_site,
            max_age_days,
        }
    }

    pub fn from_config(auth: &AuthConfig, environment: &Environment) -> Self {
        let production = *environment == Environment::Production;
        Self::new(
            auth.cookie_name.clone(),
            production,
            production,
            auth.token_ttl_days as i64,
        )
    }

    fn base(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .http_only(true)
            .path("/")
            .secure(self.secure)
            .same_site(if self.cross_site {
                SameSite::None
            } else {
                SameSite::Lax
            })
            .build()
    }

    /// Set-Cookie value carrying a fresh token.
    pub fn issue(&self, token: &str) -> String {
        let mut cookie = self.base(token.to_string());
        cookie.set_max_age(Duration::days(self.max_age_days));
        cookie.to_string()
    }

    /// Set-Cookie value that removes the auth cookie.
    pub fn clear(&self) -> String {
        let mut cookie = self.base(String::new());
        cookie.set_max_age(Duration::ZERO);
        cookie.to_string()
    }
}
