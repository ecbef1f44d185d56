//! Owner-scoped notes CRUD.

pub mod dto;
pub mod handlers;
mod routes;

pub use routes::routes;
