//! API layer - HTTP endpoints and middleware

pub mod docs;
pub mod health;
pub mod middleware;
pub mod router;
pub mod sample;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;
