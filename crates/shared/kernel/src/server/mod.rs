mod fallback;
mod health;
mod router;
mod state;

pub use fallback::unknown_endpoint;
pub use health::HealthResponse;
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
