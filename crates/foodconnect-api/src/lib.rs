pub mod auth;
pub mod donations;
pub mod error;
pub mod extract;
pub mod health;
pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod requests;
pub mod router;
pub mod rows;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::{AppState, AppStateInner, Settings};
