//! Frontend settings and scan notification types for TV tuner frontends.
//!
//! This crate defines the values exchanged between an application and a
//! tuner frontend driver:
//!
//! - [`DvbtFrontendSettings`]: immutable DVB-T/T2 tuning parameters, built
//!   through [`DvbtFrontendSettingsBuilder`] after a [`TunerAccess`] check
//! - [`ScanCallback`]: notifications a scan session delivers, with
//!   [`ScanEvent`] as the value form of each notification
//! - [`codec`]: binary frames for settings and scan events
//!
//! # Frame Format
//!
//! ```text
//! +--------+--------+--------+------------------+
//! | Magic  | Length | Type   |     Payload      |
//! | "TSCN" | u32 LE | u16 LE |    (variable)    |
//! +--------+--------+--------+------------------+
//! | 4 bytes| 4 bytes| 2 bytes|  Length bytes    |
//! ```
//!
//! # Example
//!
//! ```rust
//! use tuner_protocol::{decode_header, decode_scan_event, encode_scan_event, ScanEvent, HEADER_SIZE};
//! use bytes::Bytes;
//!
//! let event = ScanEvent::Frequencies(vec![474_000_000, 482_000_000]);
//! let encoded = encode_scan_event(&event).unwrap();
//!
//! let header = decode_header(&encoded).unwrap().unwrap();
//! let payload = Bytes::copy_from_slice(&encoded[HEADER_SIZE..]);
//! assert_eq!(decode_scan_event(header.message_type, payload).unwrap(), event);
//! ```

pub mod access;
pub mod codec;
pub mod error;
pub mod scan;
pub mod settings;
pub mod types;

pub use access::{PermissionCheck, TunerAccess, TUNER_ACCESS_CAPABILITY};
pub use codec::{
    decode_frames, decode_header, decode_scan_event, decode_settings, encode_scan_event,
    encode_settings, FrameHeader, HEADER_SIZE,
};
pub use error::{AccessError, ProtocolError};
pub use scan::{Atsc3PlpInfo, ScanCallback, ScanEvent};
pub use settings::{DvbtFrontendSettings, DvbtFrontendSettingsBuilder, FrontendSettings};
pub use types::{
    AnalogSifStandard, AnalogSignalType, Bandwidth, CodeRate, Constellation, DvbsStandard,
    DvbtStandard, FrontendType, GuardInterval, Hierarchy, MessageType, PlpMode,
    TransmissionMode, MAGIC, MAX_FRAME_SIZE,
};
