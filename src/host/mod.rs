//! Rendering host: owns mounted view instances and drives re-renders.

pub mod config;
pub mod error;
pub mod render_host;

pub use config::HostConfig;
pub use error::HostError;
pub use render_host::{FlushReport, Host};
