//! API middleware components

pub mod access_gate;
pub mod monitoring;
pub mod panic;

pub use access_gate::{access_gate_middleware, AccessGate, GateDecision};
pub use monitoring::{monitoring_middleware, RequestMonitor};
pub use panic::handle_panic;
