mod error;
mod handlers;
mod middleware;
mod routes;

pub use error::AppError;
pub use middleware::require_session;
pub use routes::session_routes;
