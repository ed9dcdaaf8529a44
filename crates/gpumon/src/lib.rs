pub mod app;
pub mod config;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod telemetry;

pub use monitor::Monitor;
