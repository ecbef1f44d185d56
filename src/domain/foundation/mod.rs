//! Foundation types shared by every domain module.

mod errors;
mod ids;

pub use errors::{DomainError, ErrorCode};
pub use ids::{AccountId, NoteId, ResetTokenId};
