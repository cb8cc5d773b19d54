pub mod avatar_routes;
pub mod tag_routes;
pub mod user_routes;
