//! HTTP surface for the token-count service.
mod error;
mod router;
mod state;

pub use error::ApiError;
pub use router::{build_router, HEALTH_PATH};
pub use state::AppState;
