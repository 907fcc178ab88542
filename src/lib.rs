pub mod core;
pub mod classifier;
pub mod approval;
pub mod store;

// Wiring shared by every front end
pub mod config;
pub mod logging;
pub mod service;

// Front ends
pub mod cli;
pub mod server;

pub use service::{Gatekeeper, DEFAULT_ACTOR};
