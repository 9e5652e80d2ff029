//! Configuration file loading.
//!
//! The configuration is a TOML file. It is taken from `--config` when given,
//! otherwise from `tuner-scan.toml` in the working directory when present,
//! otherwise every section falls back to its defaults.
//!
//! ```toml
//! [logging]
//! log_dir = "logs"
//! retention_days = 7
//! level = "info"
//!
//! [access]
//! granted = ["tuner.access"]
//!
//! [dvbt]
//! frequency = 474000000
//! transmission_mode = "MODE_8K"
//! bandwidth = "8MHZ"
//! standard = "T2"
//! plp_mode = "MANUAL"
//! plp_id = 1
//!
//! [scan]
//! event_buffer = 64
//! stop_on_end = true
//! replay_interval_ms = 0
//! ```

use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use tuner_protocol::{
    Bandwidth, CodeRate, Constellation, DvbtFrontendSettings, DvbtStandard, GuardInterval,
    Hierarchy, PlpMode, TransmissionMode, TunerAccess,
};

use crate::error::ScanError;

/// Name of the auto-detected configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "tuner-scan.toml";

/// Configuration file format.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub access: AccessSection,
    #[serde(default)]
    pub dvbt: DvbtSection,
    #[serde(default)]
    pub scan: ScanSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoggingSection {
    pub log_dir: Option<String>,
    pub retention_days: Option<u64>,
    pub level: Option<String>,
}

/// Capabilities granted to this process.
#[derive(Debug, Deserialize, Default)]
pub struct AccessSection {
    #[serde(default)]
    pub granted: Vec<String>,
}

/// DVB-T settings. Missing keys keep the builder's zero value.
#[derive(Debug, Deserialize, Default)]
pub struct DvbtSection {
    pub frequency: Option<u32>,
    pub transmission_mode: Option<TransmissionMode>,
    pub bandwidth: Option<Bandwidth>,
    pub constellation: Option<Constellation>,
    pub hierarchy: Option<Hierarchy>,
    pub hp_coderate: Option<CodeRate>,
    pub lp_coderate: Option<CodeRate>,
    pub guard_interval: Option<GuardInterval>,
    pub high_priority: Option<bool>,
    pub standard: Option<DvbtStandard>,
    pub miso: Option<bool>,
    pub plp_mode: Option<PlpMode>,
    pub plp_id: Option<i32>,
    pub plp_group_id: Option<i32>,
}

impl DvbtSection {
    /// Build settings from the configured values.
    pub fn build(&self, access: &TunerAccess) -> DvbtFrontendSettings {
        let mut builder = DvbtFrontendSettings::builder(access);

        if let Some(v) = self.frequency {
            builder.frequency(v);
        }
        if let Some(v) = self.transmission_mode {
            builder.transmission_mode(v);
        }
        if let Some(v) = self.bandwidth {
            builder.bandwidth(v);
        }
        if let Some(v) = self.constellation {
            builder.constellation(v);
        }
        if let Some(v) = self.hierarchy {
            builder.hierarchy(v);
        }
        if let Some(v) = self.hp_coderate {
            builder.hp_coderate(v);
        }
        if let Some(v) = self.lp_coderate {
            builder.lp_coderate(v);
        }
        if let Some(v) = self.guard_interval {
            builder.guard_interval(v);
        }
        if let Some(v) = self.high_priority {
            builder.high_priority(v);
        }
        if let Some(v) = self.standard {
            builder.standard(v);
        }
        if let Some(v) = self.miso {
            builder.miso(v);
        }
        if let Some(v) = self.plp_mode {
            builder.plp_mode(v);
        }
        if let Some(v) = self.plp_id {
            builder.plp_id(v);
        }
        if let Some(v) = self.plp_group_id {
            builder.plp_group_id(v);
        }

        builder.build()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ScanSection {
    /// Capacity of the session's event queue.
    pub event_buffer: Option<usize>,
    /// End the session on the first `end(true)` notification.
    pub stop_on_end: Option<bool>,
    /// Delay between replayed events.
    pub replay_interval_ms: Option<u64>,
}

/// Parse a configuration file.
pub fn load_config(path: &Path) -> Result<ConfigFile, ScanError> {
    let contents = std::fs::read_to_string(path)?;
    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load config: explicit path > auto-detect > default.
///
/// Returns the path that was read, if any.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(ConfigFile, Option<PathBuf>), ScanError> {
    let path = explicit.map(Path::to_path_buf).or_else(|| {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Some(default_path)
        } else {
            None
        }
    });

    match path {
        Some(path) => {
            let config = load_config(&path)?;
            debug!("Loaded config from {}", path.display());
            Ok((config, Some(path)))
        }
        None => Ok((ConfigFile::default(), None)),
    }
}
