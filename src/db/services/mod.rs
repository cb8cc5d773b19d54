//! The `services` module provides the high-level API for interacting with the database.
//! Handlers work with entity models and never build queries themselves.

pub mod tag_service;
pub mod user_service;

pub use tag_service::{TagService, TagServiceError};
pub use user_service::*;
