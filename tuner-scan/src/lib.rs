//! Scan session tooling for DVB-T frontends.
//!
//! - [`session`]: delivers scan notifications to registered callbacks
//! - [`report`]: stock callbacks that log and collect results
//! - [`replay`]: recorded captures fed back into a session
//! - [`config`] and [`access`]: TOML configuration and capability grants

pub mod access;
pub mod config;
pub mod error;
pub mod logging;
pub mod replay;
pub mod report;
pub mod session;

pub use access::ConfiguredPermissions;
pub use config::{load_config, resolve_config, ConfigFile};
pub use error::ScanError;
pub use replay::{encode_capture, load_capture, replay, save_capture};
pub use report::{LoggingCallback, ScanReport, ScanSummary};
pub use session::{ScanEventSender, ScanSession, ScanSessionConfig, ScanSessionStats, SessionState};
