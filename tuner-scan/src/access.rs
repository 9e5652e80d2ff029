//! Capability grants backed by the `[access]` configuration section.

use std::collections::HashSet;

use log::{debug, warn};
use tuner_protocol::{AccessError, PermissionCheck, TunerAccess};

use crate::config::AccessSection;

/// Capabilities granted through configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPermissions {
    granted: HashSet<String>,
}

impl ConfiguredPermissions {
    pub fn new<I, S>(granted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: granted.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(section: &AccessSection) -> Self {
        Self::new(section.granted.iter().map(|c| c.trim().to_string()))
    }

    /// Run the tuner-access check against these grants.
    pub fn acquire_tuner_access(&self) -> Result<TunerAccess, AccessError> {
        TunerAccess::acquire(self)
    }
}

impl PermissionCheck for ConfiguredPermissions {
    fn has_capability(&self, capability: &str) -> bool {
        let granted = self.granted.contains(capability);
        if granted {
            debug!("Capability '{}' granted", capability);
        } else {
            warn!("Capability '{}' not granted by configuration", capability);
        }
        granted
    }
}
