//! Scan notification contract.
//!
//! A scan session reports what the frontend discovers through
//! [`ScanCallback`]. The same notifications exist as values ([`ScanEvent`])
//! so they can be queued, recorded and replayed.

use serde::{Deserialize, Serialize};

use crate::types::{AnalogSifStandard, AnalogSignalType, DvbsStandard, DvbtStandard, Hierarchy};

/// PLP status for ATSC3 frontends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atsc3PlpInfo {
    plp_id: u32,
    lls_flag: bool,
}

impl Atsc3PlpInfo {
    pub fn new(plp_id: u32, lls_flag: bool) -> Self {
        Self { plp_id, lls_flag }
    }

    pub fn plp_id(&self) -> u32 {
        self.plp_id
    }

    /// Whether the PLP carries low level signaling.
    pub fn lls_flag(&self) -> bool {
        self.lls_flag
    }
}

/// Receiver of scan notifications.
///
/// The scan driver calls these methods from a thread the implementer does not
/// control, possibly from several threads at once, and in any order. A method
/// may be called any number of times per scan, including zero. Methods must
/// return promptly. Implementations that keep state across calls must
/// synchronize it themselves.
///
/// Every method defaults to a no-op.
#[allow(unused_variables)]
pub trait ScanCallback: Send + Sync {
    /// Signal lock gained (`true`) or lost.
    fn on_locked(&self, is_locked: bool) {}

    /// Scan stopped (`true`) or is still running.
    fn on_end(&self, is_end: bool) {}

    /// Progress percentage, 0..=100. Not guaranteed to be monotonic.
    fn on_progress(&self, percent: u8) {}

    /// Signal frequencies in Hz. Empty means nothing found yet.
    fn on_frequencies_report(&self, frequencies: &[u32]) {}

    /// Symbols per second.
    fn on_symbol_rates(&self, rates: &[u32]) {}

    /// Locked PLP ids (DVB-T2).
    fn on_plp_ids(&self, plp_ids: &[u32]) {}

    /// Locked PLP group ids (DVB-T2).
    fn on_group_ids(&self, group_ids: &[u32]) {}

    fn on_input_stream_ids(&self, input_stream_ids: &[u32]) {}

    fn on_dvbs_standard(&self, standard: DvbsStandard) {}

    fn on_dvbt_standard(&self, standard: DvbtStandard) {}

    fn on_analog_sif_standard(&self, sif: AnalogSifStandard) {}

    fn on_signal_type(&self, signal_type: AnalogSignalType) {}

    fn on_hierarchy(&self, hierarchy: Hierarchy) {}

    /// PLP status in the tuned band (ATSC3).
    fn on_atsc3_plp_infos(&self, infos: &[Atsc3PlpInfo]) {}

    /// Single entry point for event values. Forwards to the matching method.
    fn on_event(&self, event: &ScanEvent) {
        event.deliver(self);
    }
}

/// One scan notification as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum ScanEvent {
    Locked(bool),
    End(bool),
    Progress(u8),
    Frequencies(Vec<u32>),
    SymbolRates(Vec<u32>),
    PlpIds(Vec<u32>),
    GroupIds(Vec<u32>),
    InputStreamIds(Vec<u32>),
    DvbsStandard(DvbsStandard),
    DvbtStandard(DvbtStandard),
    AnalogSifStandard(AnalogSifStandard),
    SignalType(AnalogSignalType),
    Hierarchy(Hierarchy),
    Atsc3PlpInfos(Vec<Atsc3PlpInfo>),
}

impl ScanEvent {
    /// Short name of the notification kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanEvent::Locked(_) => "locked",
            ScanEvent::End(_) => "end",
            ScanEvent::Progress(_) => "progress",
            ScanEvent::Frequencies(_) => "frequencies",
            ScanEvent::SymbolRates(_) => "symbol_rates",
            ScanEvent::PlpIds(_) => "plp_ids",
            ScanEvent::GroupIds(_) => "group_ids",
            ScanEvent::InputStreamIds(_) => "input_stream_ids",
            ScanEvent::DvbsStandard(_) => "dvbs_standard",
            ScanEvent::DvbtStandard(_) => "dvbt_standard",
            ScanEvent::AnalogSifStandard(_) => "analog_sif_standard",
            ScanEvent::SignalType(_) => "signal_type",
            ScanEvent::Hierarchy(_) => "hierarchy",
            ScanEvent::Atsc3PlpInfos(_) => "atsc3_plp_infos",
        }
    }

    /// Call the callback method matching this event.
    pub fn deliver<C: ScanCallback + ?Sized>(&self, callback: &C) {
        match self {
            ScanEvent::Locked(v) => callback.on_locked(*v),
            ScanEvent::End(v) => callback.on_end(*v),
            ScanEvent::Progress(v) => callback.on_progress(*v),
            ScanEvent::Frequencies(v) => callback.on_frequencies_report(v),
            ScanEvent::SymbolRates(v) => callback.on_symbol_rates(v),
            ScanEvent::PlpIds(v) => callback.on_plp_ids(v),
            ScanEvent::GroupIds(v) => callback.on_group_ids(v),
            ScanEvent::InputStreamIds(v) => callback.on_input_stream_ids(v),
            ScanEvent::DvbsStandard(v) => callback.on_dvbs_standard(*v),
            ScanEvent::DvbtStandard(v) => callback.on_dvbt_standard(*v),
            ScanEvent::AnalogSifStandard(v) => callback.on_analog_sif_standard(*v),
            ScanEvent::SignalType(v) => callback.on_signal_type(*v),
            ScanEvent::Hierarchy(v) => callback.on_hierarchy(*v),
            ScanEvent::Atsc3PlpInfos(v) => callback.on_atsc3_plp_infos(v),
        }
    }
}
