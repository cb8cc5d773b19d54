//! SeaORM Entity Crate
//!
//! Defines the SeaORM entities that map to database tables.
//! Each entity is defined in its own module (`user.rs`, `tag.rs`).

pub mod tag;
pub mod user;

// Prelude module for easy importing of all entities and their related types
pub mod prelude {
    pub use super::user::Entity as User;
    pub use super::tag::Entity as Tag;
}
