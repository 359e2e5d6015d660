//! Nattiq braille display driver
//!
//! Ties the transport and protocol crates together for the command-line
//! driver: configuration loading and connection sessions that survive
//! device restarts.

pub mod config;
pub mod session;

pub use config::{ConfigError, DriverConfig, ProfileConfig};
pub use session::{ChannelSource, Flow, HidSource, Session};
