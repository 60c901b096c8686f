pub mod admin_handlers;
pub mod auth_handlers;
pub mod handlers;
pub mod router;

pub use handlers::AppState;
pub use router::create_router;
