//! Stock scan callbacks: a logger and a result collector.

use std::collections::BTreeSet;

use log::{debug, info};
use parking_lot::Mutex;
use serde::Serialize;

use tuner_protocol::{
    AnalogSifStandard, AnalogSignalType, Atsc3PlpInfo, DvbsStandard, DvbtStandard, Hierarchy,
    ScanCallback,
};

/// Logs every notification.
#[derive(Debug, Default)]
pub struct LoggingCallback;

impl ScanCallback for LoggingCallback {
    fn on_locked(&self, is_locked: bool) {
        info!("scan: {}", if is_locked { "signal locked" } else { "signal lost" });
    }

    fn on_end(&self, is_end: bool) {
        if is_end {
            info!("scan: ended");
        } else {
            debug!("scan: continuing");
        }
    }

    fn on_progress(&self, percent: u8) {
        info!("scan: {}%", percent);
    }

    fn on_frequencies_report(&self, frequencies: &[u32]) {
        debug!("scan: frequencies {:?}", frequencies);
    }

    fn on_symbol_rates(&self, rates: &[u32]) {
        debug!("scan: symbol rates {:?}", rates);
    }

    fn on_plp_ids(&self, plp_ids: &[u32]) {
        debug!("scan: PLP ids {:?}", plp_ids);
    }

    fn on_group_ids(&self, group_ids: &[u32]) {
        debug!("scan: group ids {:?}", group_ids);
    }

    fn on_input_stream_ids(&self, input_stream_ids: &[u32]) {
        debug!("scan: input stream ids {:?}", input_stream_ids);
    }

    fn on_dvbs_standard(&self, standard: DvbsStandard) {
        info!("scan: DVB-S standard {}", standard);
    }

    fn on_dvbt_standard(&self, standard: DvbtStandard) {
        info!("scan: DVB-T standard {}", standard);
    }

    fn on_analog_sif_standard(&self, sif: AnalogSifStandard) {
        info!("scan: analog SIF standard {}", sif);
    }

    fn on_signal_type(&self, signal_type: AnalogSignalType) {
        info!("scan: analog signal type {}", signal_type);
    }

    fn on_hierarchy(&self, hierarchy: Hierarchy) {
        info!("scan: hierarchy {}", hierarchy);
    }

    fn on_atsc3_plp_infos(&self, infos: &[Atsc3PlpInfo]) {
        for plp in infos {
            debug!("scan: ATSC3 PLP {} lls={}", plp.plp_id(), plp.lls_flag());
        }
    }
}

/// Everything a scan reported, merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Last reported lock state.
    pub locked: bool,
    /// Whether the scan reported its end.
    pub ended: bool,
    /// Last reported progress.
    pub progress: Option<u8>,
    /// Every progress value, in arrival order.
    pub progress_history: Vec<u8>,
    pub frequencies: BTreeSet<u32>,
    pub symbol_rates: BTreeSet<u32>,
    pub plp_ids: BTreeSet<u32>,
    pub group_ids: BTreeSet<u32>,
    pub input_stream_ids: BTreeSet<u32>,
    pub dvbs_standard: Option<DvbsStandard>,
    pub dvbt_standard: Option<DvbtStandard>,
    pub analog_sif_standard: Option<AnalogSifStandard>,
    pub signal_type: Option<AnalogSignalType>,
    pub hierarchy: Option<Hierarchy>,
    /// Latest ATSC3 PLP status list.
    pub atsc3_plp_infos: Vec<Atsc3PlpInfo>,
    /// List notifications that arrived empty.
    pub empty_reports: u64,
}

/// Collects scan results. Safe to share between driver threads.
#[derive(Debug, Default)]
pub struct ScanReport {
    summary: Mutex<ScanSummary>,
}

impl ScanReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of what has been collected so far.
    pub fn summary(&self) -> ScanSummary {
        self.summary.lock().clone()
    }

    /// Log the collected results.
    pub fn log_summary(&self) {
        let summary = self.summary();

        info!("scan: ==== Scan Results Summary ====");
        info!(
            "scan: Locked: {}  Ended: {}  Progress: {}",
            summary.locked,
            summary.ended,
            summary
                .progress
                .map(|p| format!("{}%", p))
                .unwrap_or_else(|| "N/A".to_string())
        );
        info!("scan: Frequencies found: {}", summary.frequencies.len());
        for frequency in &summary.frequencies {
            info!("scan:   {:.3} MHz", *frequency as f64 / 1_000_000.0);
        }
        if !summary.symbol_rates.is_empty() {
            info!("scan: Symbol rates: {:?}", summary.symbol_rates);
        }
        if !summary.plp_ids.is_empty() || !summary.group_ids.is_empty() {
            info!("scan: PLP ids: {:?}  group ids: {:?}", summary.plp_ids, summary.group_ids);
        }
        if !summary.input_stream_ids.is_empty() {
            info!("scan: Input stream ids: {:?}", summary.input_stream_ids);
        }
        if let Some(standard) = summary.dvbt_standard {
            info!("scan: DVB-T standard: {}", standard);
        }
        if let Some(standard) = summary.dvbs_standard {
            info!("scan: DVB-S standard: {}", standard);
        }
        if let Some(hierarchy) = summary.hierarchy {
            info!("scan: Hierarchy: {}", hierarchy);
        }
        if let (Some(signal_type), Some(sif)) = (summary.signal_type, summary.analog_sif_standard) {
            info!("scan: Analog: {} / {}", signal_type, sif);
        }
        if !summary.atsc3_plp_infos.is_empty() {
            info!("scan: ATSC3 PLPs: {}", summary.atsc3_plp_infos.len());
        }
        info!("scan: ==== End of Results ====");
    }

    fn merge(&self, values: &[u32], select: impl FnOnce(&mut ScanSummary) -> &mut BTreeSet<u32>) {
        let mut summary = self.summary.lock();
        if values.is_empty() {
            summary.empty_reports += 1;
            return;
        }
        select(&mut summary).extend(values.iter().copied());
    }
}

impl ScanCallback for ScanReport {
    fn on_locked(&self, is_locked: bool) {
        self.summary.lock().locked = is_locked;
    }

    fn on_end(&self, is_end: bool) {
        if is_end {
            self.summary.lock().ended = true;
        }
    }

    fn on_progress(&self, percent: u8) {
        let mut summary = self.summary.lock();
        summary.progress = Some(percent);
        summary.progress_history.push(percent);
    }

    fn on_frequencies_report(&self, frequencies: &[u32]) {
        self.merge(frequencies, |s| &mut s.frequencies);
    }

    fn on_symbol_rates(&self, rates: &[u32]) {
        self.merge(rates, |s| &mut s.symbol_rates);
    }

    fn on_plp_ids(&self, plp_ids: &[u32]) {
        self.merge(plp_ids, |s| &mut s.plp_ids);
    }

    fn on_group_ids(&self, group_ids: &[u32]) {
        self.merge(group_ids, |s| &mut s.group_ids);
    }

    fn on_input_stream_ids(&self, input_stream_ids: &[u32]) {
        self.merge(input_stream_ids, |s| &mut s.input_stream_ids);
    }

    fn on_dvbs_standard(&self, standard: DvbsStandard) {
        self.summary.lock().dvbs_standard = Some(standard);
    }

    fn on_dvbt_standard(&self, standard: DvbtStandard) {
        self.summary.lock().dvbt_standard = Some(standard);
    }

    fn on_analog_sif_standard(&self, sif: AnalogSifStandard) {
        self.summary.lock().analog_sif_standard = Some(sif);
    }

    fn on_signal_type(&self, signal_type: AnalogSignalType) {
        self.summary.lock().signal_type = Some(signal_type);
    }

    fn on_hierarchy(&self, hierarchy: Hierarchy) {
        self.summary.lock().hierarchy = Some(hierarchy);
    }

    fn on_atsc3_plp_infos(&self, infos: &[Atsc3PlpInfo]) {
        self.summary.lock().atsc3_plp_infos = infos.to_vec();
    }
}
