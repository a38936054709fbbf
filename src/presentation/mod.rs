pub mod auth;
pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use auth::{AuthGate, CallerIdentity};
pub use config::{Environment, Settings};
pub use router::{DEFAULT_HEALTH_PATH, PROCESS_PATH, create_health_router, create_router};
pub use state::AppState;
