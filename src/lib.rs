pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod server;
pub mod types;

// Application use cases and the ports they depend on
pub mod app;
// Adapters implementing those ports
pub mod infra;
