//! DVB-T frontend settings and their builder.
//!
//! Settings are immutable once built. A builder is only handed out against a
//! [`TunerAccess`] token, so every instance in the process was assembled by a
//! caller that passed the tuner-access check.
//!
//! ```rust
//! use tuner_protocol::{
//!     Bandwidth, DvbtFrontendSettings, DvbtStandard, FrontendSettings, FrontendType,
//!     PermissionCheck, TunerAccess, TransmissionMode,
//! };
//!
//! struct AllowAll;
//! impl PermissionCheck for AllowAll {
//!     fn has_capability(&self, _: &str) -> bool { true }
//! }
//!
//! let access = TunerAccess::acquire(&AllowAll).unwrap();
//! let settings = DvbtFrontendSettings::builder(&access)
//!     .frequency(474_000_000)
//!     .transmission_mode(TransmissionMode::Mode8K)
//!     .bandwidth(Bandwidth::Mhz8)
//!     .standard(DvbtStandard::T)
//!     .build();
//!
//! assert_eq!(settings.frontend_type(), FrontendType::Dvbt);
//! assert_eq!(settings.bandwidth(), Bandwidth::Mhz8);
//! ```

use serde::Serialize;

use crate::access::TunerAccess;
use crate::types::{
    Bandwidth, CodeRate, Constellation, DvbtStandard, FrontendType, GuardInterval, Hierarchy,
    PlpMode, TransmissionMode,
};

/// Common view over every frontend settings variant.
///
/// The tuner-configuration side dispatches on [`FrontendSettings::frontend_type`].
pub trait FrontendSettings {
    /// Variant discriminator, constant per implementing type.
    fn frontend_type(&self) -> FrontendType;

    /// Tuning frequency in Hz.
    fn frequency(&self) -> u32;
}

/// Tuning parameters for a DVB-T or DVB-T2 frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DvbtFrontendSettings {
    frequency: u32,
    transmission_mode: TransmissionMode,
    bandwidth: Bandwidth,
    constellation: Constellation,
    hierarchy: Hierarchy,
    hp_coderate: CodeRate,
    lp_coderate: CodeRate,
    guard_interval: GuardInterval,
    is_high_priority: bool,
    standard: DvbtStandard,
    is_miso: bool,
    plp_mode: PlpMode,
    plp_id: i32,
    plp_group_id: i32,
}

impl DvbtFrontendSettings {
    /// Start a builder. The access token is checked by the caller's
    /// authorization step; the builder keeps no reference to it.
    pub fn builder(_access: &TunerAccess) -> DvbtFrontendSettingsBuilder {
        DvbtFrontendSettingsBuilder::default()
    }

    pub fn transmission_mode(&self) -> TransmissionMode {
        self.transmission_mode
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    pub fn constellation(&self) -> Constellation {
        self.constellation
    }

    pub fn hierarchy(&self) -> Hierarchy {
        self.hierarchy
    }

    /// Code rate of the high priority stream.
    pub fn hp_coderate(&self) -> CodeRate {
        self.hp_coderate
    }

    /// Code rate of the low priority stream.
    pub fn lp_coderate(&self) -> CodeRate {
        self.lp_coderate
    }

    pub fn guard_interval(&self) -> GuardInterval {
        self.guard_interval
    }

    /// Whether the high priority stream is selected in hierarchical mode.
    pub fn is_high_priority(&self) -> bool {
        self.is_high_priority
    }

    pub fn standard(&self) -> DvbtStandard {
        self.standard
    }

    /// Multiple-input single-output transmission.
    pub fn is_miso(&self) -> bool {
        self.is_miso
    }

    pub fn plp_mode(&self) -> PlpMode {
        self.plp_mode
    }

    /// Physical layer pipe id. Only meaningful for T2 with manual PLP mode.
    pub fn plp_id(&self) -> i32 {
        self.plp_id
    }

    /// Physical layer pipe group id. Only meaningful for T2 with manual PLP mode.
    pub fn plp_group_id(&self) -> i32 {
        self.plp_group_id
    }

    /// Returns true if the PLP id and group id will be used by the frontend.
    ///
    /// Informational only; the settings do not reject ids in other modes.
    pub fn is_plp_selection_manual(&self) -> bool {
        self.standard == DvbtStandard::T2 && self.plp_mode == PlpMode::Manual
    }
}

impl FrontendSettings for DvbtFrontendSettings {
    fn frontend_type(&self) -> FrontendType {
        FrontendType::Dvbt
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }
}

/// Builder for [`DvbtFrontendSettings`].
///
/// Every field starts at its zero value. Setters store the value as given;
/// no combination of values is rejected. `build` does not reset the builder,
/// so it can be used as a template for several settings.
#[derive(Debug, Clone, Default)]
pub struct DvbtFrontendSettingsBuilder {
    frequency: u32,
    transmission_mode: TransmissionMode,
    bandwidth: Bandwidth,
    constellation: Constellation,
    hierarchy: Hierarchy,
    hp_coderate: CodeRate,
    lp_coderate: CodeRate,
    guard_interval: GuardInterval,
    is_high_priority: bool,
    standard: DvbtStandard,
    is_miso: bool,
    plp_mode: PlpMode,
    plp_id: i32,
    plp_group_id: i32,
}

impl DvbtFrontendSettingsBuilder {
    /// Tuning frequency in Hz.
    pub fn frequency(&mut self, frequency: u32) -> &mut Self {
        self.frequency = frequency;
        self
    }

    pub fn transmission_mode(&mut self, transmission_mode: TransmissionMode) -> &mut Self {
        self.transmission_mode = transmission_mode;
        self
    }

    pub fn bandwidth(&mut self, bandwidth: Bandwidth) -> &mut Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn constellation(&mut self, constellation: Constellation) -> &mut Self {
        self.constellation = constellation;
        self
    }

    pub fn hierarchy(&mut self, hierarchy: Hierarchy) -> &mut Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn hp_coderate(&mut self, hp_coderate: CodeRate) -> &mut Self {
        self.hp_coderate = hp_coderate;
        self
    }

    pub fn lp_coderate(&mut self, lp_coderate: CodeRate) -> &mut Self {
        self.lp_coderate = lp_coderate;
        self
    }

    pub fn guard_interval(&mut self, guard_interval: GuardInterval) -> &mut Self {
        self.guard_interval = guard_interval;
        self
    }

    pub fn high_priority(&mut self, is_high_priority: bool) -> &mut Self {
        self.is_high_priority = is_high_priority;
        self
    }

    pub fn standard(&mut self, standard: DvbtStandard) -> &mut Self {
        self.standard = standard;
        self
    }

    pub fn miso(&mut self, is_miso: bool) -> &mut Self {
        self.is_miso = is_miso;
        self
    }

    pub fn plp_mode(&mut self, plp_mode: PlpMode) -> &mut Self {
        self.plp_mode = plp_mode;
        self
    }

    /// Accepted regardless of standard and PLP mode.
    pub fn plp_id(&mut self, plp_id: i32) -> &mut Self {
        self.plp_id = plp_id;
        self
    }

    /// Accepted regardless of standard and PLP mode.
    pub fn plp_group_id(&mut self, plp_group_id: i32) -> &mut Self {
        self.plp_group_id = plp_group_id;
        self
    }

    /// Snapshot the current builder state.
    pub fn build(&self) -> DvbtFrontendSettings {
        DvbtFrontendSettings {
            frequency: self.frequency,
            transmission_mode: self.transmission_mode,
            bandwidth: self.bandwidth,
            constellation: self.constellation,
            hierarchy: self.hierarchy,
            hp_coderate: self.hp_coderate,
            lp_coderate: self.lp_coderate,
            guard_interval: self.guard_interval,
            is_high_priority: self.is_high_priority,
            standard: self.standard,
            is_miso: self.is_miso,
            plp_mode: self.plp_mode,
            plp_id: self.plp_id,
            plp_group_id: self.plp_group_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::PermissionCheck;

    struct AllowAll;

    impl PermissionCheck for AllowAll {
        fn has_capability(&self, _capability: &str) -> bool {
            true
        }
    }

    fn access() -> TunerAccess {
        TunerAccess::acquire(&AllowAll).unwrap()
    }

    #[test]
    fn test_default_settings_are_zero() {
        let settings = DvbtFrontendSettings::builder(&access()).build();
        assert_eq!(settings.frequency(), 0);
        assert_eq!(settings.transmission_mode(), TransmissionMode::Undefined);
        assert_eq!(settings.bandwidth(), Bandwidth::Undefined);
        assert_eq!(settings.constellation(), Constellation::Undefined);
        assert_eq!(settings.hierarchy(), Hierarchy::Undefined);
        assert_eq!(settings.hp_coderate(), CodeRate::Undefined);
        assert_eq!(settings.lp_coderate(), CodeRate::Undefined);
        assert_eq!(settings.guard_interval(), GuardInterval::Undefined);
        assert_eq!(settings.standard(), DvbtStandard::Undefined);
        assert_eq!(settings.plp_mode(), PlpMode::Undefined);
        assert!(!settings.is_high_priority());
        assert!(!settings.is_miso());
        assert_eq!(settings.plp_id(), 0);
        assert_eq!(settings.plp_group_id(), 0);
    }

    #[test]
    fn test_every_enum_value_is_kept() {
        let access = access();
        for v in TransmissionMode::ALL {
            let s = DvbtFrontendSettings::builder(&access).transmission_mode(*v).build();
            assert_eq!(s.transmission_mode(), *v);
        }
        for v in Bandwidth::ALL {
            assert_eq!(DvbtFrontendSettings::builder(&access).bandwidth(*v).build().bandwidth(), *v);
        }
        for v in Constellation::ALL {
            let s = DvbtFrontendSettings::builder(&access).constellation(*v).build();
            assert_eq!(s.constellation(), *v);
        }
        for v in Hierarchy::ALL {
            assert_eq!(DvbtFrontendSettings::builder(&access).hierarchy(*v).build().hierarchy(), *v);
        }
        for v in CodeRate::ALL {
            let s = DvbtFrontendSettings::builder(&access)
                .hp_coderate(*v)
                .lp_coderate(CodeRate::Auto)
                .build();
            assert_eq!(s.hp_coderate(), *v);
            assert_eq!(s.lp_coderate(), CodeRate::Auto);
        }
        for v in GuardInterval::ALL {
            let s = DvbtFrontendSettings::builder(&access).guard_interval(*v).build();
            assert_eq!(s.guard_interval(), *v);
        }
        for v in DvbtStandard::ALL {
            assert_eq!(DvbtFrontendSettings::builder(&access).standard(*v).build().standard(), *v);
        }
        for v in PlpMode::ALL {
            assert_eq!(DvbtFrontendSettings::builder(&access).plp_mode(*v).build().plp_mode(), *v);
        }
    }

    #[test]
    fn test_plp_ids_accepted_in_any_mode() {
        let settings = DvbtFrontendSettings::builder(&access())
            .standard(DvbtStandard::T)
            .plp_mode(PlpMode::Auto)
            .plp_id(-1)
            .plp_group_id(300)
            .build();
        assert_eq!(settings.plp_id(), -1);
        assert_eq!(settings.plp_group_id(), 300);
        assert!(!settings.is_plp_selection_manual());
    }

    #[test]
    fn test_manual_plp_selection() {
        let settings = DvbtFrontendSettings::builder(&access())
            .standard(DvbtStandard::T2)
            .plp_mode(PlpMode::Manual)
            .plp_id(1)
            .build();
        assert!(settings.is_plp_selection_manual());
    }

    #[test]
    fn test_build_twice_gives_equal_values() {
        let mut builder = DvbtFrontendSettings::builder(&access());
        builder
            .frequency(482_000_000)
            .constellation(Constellation::Qam64)
            .miso(true)
            .high_priority(true);
        let first = builder.build();
        let second = builder.build();
        assert_eq!(first, second);

        // Changing the builder afterwards leaves earlier snapshots alone.
        builder.frequency(490_000_000);
        let third = builder.build();
        assert_eq!(first.frequency(), 482_000_000);
        assert_eq!(third.frequency(), 490_000_000);
        assert!(third.is_miso());
    }

    #[test]
    fn test_frontend_type_is_constant() {
        let access = access();
        let plain = DvbtFrontendSettings::builder(&access).build();
        let tuned = DvbtFrontendSettings::builder(&access)
            .frequency(474_000_000)
            .standard(DvbtStandard::T2)
            .build();
        assert_eq!(plain.frontend_type(), FrontendType::Dvbt);
        assert_eq!(tuned.frontend_type(), FrontendType::Dvbt);
        for other in FrontendType::ALL.iter().filter(|t| **t != FrontendType::Dvbt) {
            assert_ne!(u32::from(*other), u32::from(tuned.frontend_type()));
        }
    }
}
