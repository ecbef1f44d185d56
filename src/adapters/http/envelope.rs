//! Uniform JSON response envelope.
//!
//! Every response is `{ success: true, data, message? }` or
//! `{ success: false, error, code?, details? }`; paginated payloads add a
//! `pagination` object.

use serde::Serialize;
use serde_json::{json, Value};

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

pub fn success<T: Serialize>(data: T) -> Value {
    json!({ "success": true, "data": data })
}

pub fn success_with_message<T: Serialize>(data: T, message: &str) -> Value {
    json!({ "success": true, "data": data, "message": message })
}

pub fn message_only(message: &str) -> Value {
    json!({ "success": true, "message": message })
}

pub fn paginated<T: Serialize>(data: T, pagination: Pagination) -> Value {
    json!({ "success": true, "data": data, "pagination": pagination })
}

pub fn error(code: &str, message: &str, details: Option<Value>) -> Value {
    match details {
        Some(details) => {
            json!({ "success": false, "error": message, "code": code, "details": details })
        }
        None => json!({ "success": false, "error": message, "code": code }),
    }
}
