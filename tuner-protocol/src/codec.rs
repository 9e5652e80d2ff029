//! Codec for frontend settings and scan event frames.
//!
//! Frame format:
//! ```text
//! +--------+--------+--------+------------------+
//! | Magic  | Length | Type   |     Payload      |
//! | "TSCN" | u32 LE | u16 LE |    (variable)    |
//! +--------+--------+--------+------------------+
//! | 4 bytes| 4 bytes| 2 bytes|  Length bytes    |
//! ```
//!
//! Enumerations travel as their `u32 LE` HAL value, booleans as one byte and
//! lists as a `u32 LE` count followed by the items.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::access::TunerAccess;
use crate::error::ProtocolError;
use crate::scan::{Atsc3PlpInfo, ScanEvent};
use crate::settings::{DvbtFrontendSettings, FrontendSettings};
use crate::types::*;

/// Frame header size: 4 (magic) + 4 (length) + 2 (type) = 10 bytes.
pub const HEADER_SIZE: usize = 10;

/// Payload size of a DVB-T settings frame.
const DVBT_SETTINGS_SIZE: usize = 4 * 12 + 2;

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Message type.
    pub message_type: MessageType,
    /// Payload length in bytes.
    pub payload_len: u32,
}

impl FrameHeader {
    /// Total frame length including the header.
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.payload_len as usize
    }
}

/// Encode DVB-T settings into a frame.
pub fn encode_settings(settings: &DvbtFrontendSettings) -> Result<Bytes, ProtocolError> {
    let mut payload = BytesMut::with_capacity(DVBT_SETTINGS_SIZE);

    payload.put_u32_le(settings.frequency());
    payload.put_u32_le(settings.transmission_mode().into());
    payload.put_u32_le(settings.bandwidth().into());
    payload.put_u32_le(settings.constellation().into());
    payload.put_u32_le(settings.hierarchy().into());
    payload.put_u32_le(settings.hp_coderate().into());
    payload.put_u32_le(settings.lp_coderate().into());
    payload.put_u32_le(settings.guard_interval().into());
    payload.put_u8(settings.is_high_priority() as u8);
    payload.put_u32_le(settings.standard().into());
    payload.put_u8(settings.is_miso() as u8);
    payload.put_u32_le(settings.plp_mode().into());
    payload.put_i32_le(settings.plp_id());
    payload.put_i32_le(settings.plp_group_id());

    encode_frame(MessageType::DvbtSettings, payload.freeze())
}

/// Decode a DVB-T settings payload.
///
/// Decoded settings are assembled through the builder, so the caller needs
/// the same access token as for building them by hand.
pub fn decode_settings(
    access: &TunerAccess,
    msg_type: MessageType,
    mut payload: Bytes,
) -> Result<DvbtFrontendSettings, ProtocolError> {
    if msg_type != MessageType::DvbtSettings {
        return Err(ProtocolError::UnexpectedMessage(msg_type.into()));
    }
    ensure_remaining(&payload, DVBT_SETTINGS_SIZE)?;

    let frequency = payload.get_u32_le();
    let transmission_mode = TransmissionMode::try_from(payload.get_u32_le())?;
    let bandwidth = Bandwidth::try_from(payload.get_u32_le())?;
    let constellation = Constellation::try_from(payload.get_u32_le())?;
    let hierarchy = Hierarchy::try_from(payload.get_u32_le())?;
    let hp_coderate = CodeRate::try_from(payload.get_u32_le())?;
    let lp_coderate = CodeRate::try_from(payload.get_u32_le())?;
    let guard_interval = GuardInterval::try_from(payload.get_u32_le())?;
    let is_high_priority = payload.get_u8() != 0;
    let standard = DvbtStandard::try_from(payload.get_u32_le())?;
    let is_miso = payload.get_u8() != 0;
    let plp_mode = PlpMode::try_from(payload.get_u32_le())?;
    let plp_id = payload.get_i32_le();
    let plp_group_id = payload.get_i32_le();
    ensure_consumed(msg_type, &payload)?;

    Ok(DvbtFrontendSettings::builder(access)
        .frequency(frequency)
        .transmission_mode(transmission_mode)
        .bandwidth(bandwidth)
        .constellation(constellation)
        .hierarchy(hierarchy)
        .hp_coderate(hp_coderate)
        .lp_coderate(lp_coderate)
        .guard_interval(guard_interval)
        .high_priority(is_high_priority)
        .standard(standard)
        .miso(is_miso)
        .plp_mode(plp_mode)
        .plp_id(plp_id)
        .plp_group_id(plp_group_id)
        .build())
}

/// Encode a scan event into a frame.
pub fn encode_scan_event(event: &ScanEvent) -> Result<Bytes, ProtocolError> {
    let mut payload = BytesMut::new();

    let msg_type = match event {
        ScanEvent::Locked(v) => {
            payload.put_u8(*v as u8);
            MessageType::ScanLocked
        }
        ScanEvent::End(v) => {
            payload.put_u8(*v as u8);
            MessageType::ScanEnd
        }
        ScanEvent::Progress(v) => {
            payload.put_u8(*v);
            MessageType::ScanProgress
        }
        ScanEvent::Frequencies(v) => {
            encode_u32_list(&mut payload, v);
            MessageType::ScanFrequencies
        }
        ScanEvent::SymbolRates(v) => {
            encode_u32_list(&mut payload, v);
            MessageType::ScanSymbolRates
        }
        ScanEvent::PlpIds(v) => {
            encode_u32_list(&mut payload, v);
            MessageType::ScanPlpIds
        }
        ScanEvent::GroupIds(v) => {
            encode_u32_list(&mut payload, v);
            MessageType::ScanGroupIds
        }
        ScanEvent::InputStreamIds(v) => {
            encode_u32_list(&mut payload, v);
            MessageType::ScanInputStreamIds
        }
        ScanEvent::DvbsStandard(v) => {
            payload.put_u32_le((*v).into());
            MessageType::ScanDvbsStandard
        }
        ScanEvent::DvbtStandard(v) => {
            payload.put_u32_le((*v).into());
            MessageType::ScanDvbtStandard
        }
        ScanEvent::AnalogSifStandard(v) => {
            payload.put_u32_le((*v).into());
            MessageType::ScanAnalogSifStandard
        }
        ScanEvent::SignalType(v) => {
            payload.put_u32_le((*v).into());
            MessageType::ScanSignalType
        }
        ScanEvent::Hierarchy(v) => {
            payload.put_u32_le((*v).into());
            MessageType::ScanHierarchy
        }
        ScanEvent::Atsc3PlpInfos(infos) => {
            payload.put_u32_le(infos.len() as u32);
            for info in infos {
                payload.put_u32_le(info.plp_id());
                payload.put_u8(info.lls_flag() as u8);
            }
            MessageType::ScanAtsc3PlpInfos
        }
    };

    encode_frame(msg_type, payload.freeze())
}

/// Decode a scan event payload.
///
/// The payload must hold exactly one event; leftover bytes are an error.
pub fn decode_scan_event(msg_type: MessageType, mut payload: Bytes) -> Result<ScanEvent, ProtocolError> {
    let event = decode_scan_payload(msg_type, &mut payload)?;
    ensure_consumed(msg_type, &payload)?;
    Ok(event)
}

fn decode_scan_payload(msg_type: MessageType, payload: &mut Bytes) -> Result<ScanEvent, ProtocolError> {
    match msg_type {
        MessageType::ScanLocked => {
            ensure_remaining(payload, 1)?;
            Ok(ScanEvent::Locked(payload.get_u8() != 0))
        }
        MessageType::ScanEnd => {
            ensure_remaining(payload, 1)?;
            Ok(ScanEvent::End(payload.get_u8() != 0))
        }
        MessageType::ScanProgress => {
            ensure_remaining(payload, 1)?;
            Ok(ScanEvent::Progress(payload.get_u8()))
        }
        MessageType::ScanFrequencies => Ok(ScanEvent::Frequencies(decode_u32_list(payload)?)),
        MessageType::ScanSymbolRates => Ok(ScanEvent::SymbolRates(decode_u32_list(payload)?)),
        MessageType::ScanPlpIds => Ok(ScanEvent::PlpIds(decode_u32_list(payload)?)),
        MessageType::ScanGroupIds => Ok(ScanEvent::GroupIds(decode_u32_list(payload)?)),
        MessageType::ScanInputStreamIds => {
            Ok(ScanEvent::InputStreamIds(decode_u32_list(payload)?))
        }
        MessageType::ScanDvbsStandard => {
            ensure_remaining(payload, 4)?;
            Ok(ScanEvent::DvbsStandard(DvbsStandard::try_from(payload.get_u32_le())?))
        }
        MessageType::ScanDvbtStandard => {
            ensure_remaining(payload, 4)?;
            Ok(ScanEvent::DvbtStandard(DvbtStandard::try_from(payload.get_u32_le())?))
        }
        MessageType::ScanAnalogSifStandard => {
            ensure_remaining(payload, 4)?;
            Ok(ScanEvent::AnalogSifStandard(AnalogSifStandard::try_from(
                payload.get_u32_le(),
            )?))
        }
        MessageType::ScanSignalType => {
            ensure_remaining(payload, 4)?;
            Ok(ScanEvent::SignalType(AnalogSignalType::try_from(payload.get_u32_le())?))
        }
        MessageType::ScanHierarchy => {
            ensure_remaining(payload, 4)?;
            Ok(ScanEvent::Hierarchy(Hierarchy::try_from(payload.get_u32_le())?))
        }
        MessageType::ScanAtsc3PlpInfos => {
            ensure_remaining(payload, 4)?;
            let count = payload.get_u32_le() as usize;
            ensure_remaining(payload, count.saturating_mul(5))?;
            let mut infos = Vec::with_capacity(count);
            for _ in 0..count {
                let plp_id = payload.get_u32_le();
                let lls_flag = payload.get_u8() != 0;
                infos.push(Atsc3PlpInfo::new(plp_id, lls_flag));
            }
            Ok(ScanEvent::Atsc3PlpInfos(infos))
        }
        MessageType::DvbtSettings => Err(ProtocolError::UnexpectedMessage(msg_type.into())),
    }
}

/// Decode a frame header from bytes.
///
/// Returns `Ok(None)` if not enough data is available.
pub fn decode_header(data: &[u8]) -> Result<Option<FrameHeader>, ProtocolError> {
    if data.len() < HEADER_SIZE {
        return Ok(None);
    }

    let mut buf = data;

    let mut magic = [0u8; 4];
    buf.copy_to_slice(&mut magic);
    if magic != MAGIC {
        return Err(ProtocolError::InvalidMagic(magic));
    }

    let payload_len = buf.get_u32_le();
    if payload_len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(payload_len, MAX_FRAME_SIZE));
    }

    let raw_type = buf.get_u16_le();
    let message_type =
        MessageType::try_from(raw_type).map_err(ProtocolError::UnknownMessageType)?;

    Ok(Some(FrameHeader {
        message_type,
        payload_len,
    }))
}

/// Decode every scan event frame in `data`.
///
/// The buffer must hold whole frames; a trailing partial frame is an error.
pub fn decode_frames(data: &[u8]) -> Result<Vec<ScanEvent>, ProtocolError> {
    let mut events = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let rest = &data[offset..];
        let header = decode_header(rest)?.ok_or(ProtocolError::IncompleteFrame {
            expected: HEADER_SIZE,
            actual: rest.len(),
        })?;
        let frame_len = header.frame_len();
        if rest.len() < frame_len {
            return Err(ProtocolError::IncompleteFrame {
                expected: frame_len,
                actual: rest.len(),
            });
        }
        let payload = Bytes::copy_from_slice(&rest[HEADER_SIZE..frame_len]);
        events.push(decode_scan_event(header.message_type, payload)?);
        offset += frame_len;
    }

    Ok(events)
}

fn encode_frame(msg_type: MessageType, payload: Bytes) -> Result<Bytes, ProtocolError> {
    let payload_len = payload.len();
    if payload_len > MAX_FRAME_SIZE as usize {
        return Err(ProtocolError::FrameTooLarge(payload_len as u32, MAX_FRAME_SIZE));
    }

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload_len);
    frame.put_slice(&MAGIC);
    frame.put_u32_le(payload_len as u32);
    frame.put_u16_le(msg_type.into());
    frame.put_slice(&payload);

    Ok(frame.freeze())
}

fn encode_u32_list(buf: &mut BytesMut, values: &[u32]) {
    buf.put_u32_le(values.len() as u32);
    for value in values {
        buf.put_u32_le(*value);
    }
}

fn decode_u32_list(buf: &mut Bytes) -> Result<Vec<u32>, ProtocolError> {
    ensure_remaining(buf, 4)?;
    let count = buf.get_u32_le() as usize;
    ensure_remaining(buf, count.saturating_mul(4))?;
    Ok((0..count).map(|_| buf.get_u32_le()).collect())
}

fn ensure_consumed(msg_type: MessageType, buf: &Bytes) -> Result<(), ProtocolError> {
    if buf.has_remaining() {
        return Err(ProtocolError::TrailingBytes {
            message_type: msg_type.into(),
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

fn ensure_remaining(buf: &Bytes, expected: usize) -> Result<(), ProtocolError> {
    if buf.remaining() < expected {
        return Err(ProtocolError::IncompleteFrame {
            expected,
            actual: buf.remaining(),
        });
    }
    Ok(())
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

    fn payload_of(frame: &Bytes) -> Bytes {
        Bytes::copy_from_slice(&frame[HEADER_SIZE..])
    }

    #[test]
    fn test_encode_decode_settings() {
        let access = TunerAccess::acquire(&AllowAll).unwrap();
        let settings = DvbtFrontendSettings::builder(&access)
            .frequency(586_000_000)
            .transmission_mode(TransmissionMode::Mode32K)
            .bandwidth(Bandwidth::Mhz8)
            .constellation(Constellation::Qam256)
            .hierarchy(Hierarchy::NonNative)
            .hp_coderate(CodeRate::Rate2_3)
            .lp_coderate(CodeRate::Rate3_5)
            .guard_interval(GuardInterval::Interval19_256)
            .high_priority(true)
            .standard(DvbtStandard::T2)
            .miso(true)
            .plp_mode(PlpMode::Manual)
            .plp_id(2)
            .plp_group_id(-7)
            .build();

        let encoded = encode_settings(&settings).unwrap();
        assert_eq!(&encoded[0..4], &MAGIC);

        let header = decode_header(&encoded).unwrap().unwrap();
        assert_eq!(header.message_type, MessageType::DvbtSettings);
        assert_eq!(header.payload_len as usize, DVBT_SETTINGS_SIZE);

        let decoded = decode_settings(&access, header.message_type, payload_of(&encoded)).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_truncated_settings() {
        let access = TunerAccess::acquire(&AllowAll).unwrap();
        let encoded = encode_settings(&DvbtFrontendSettings::builder(&access).build()).unwrap();
        let short = Bytes::copy_from_slice(&encoded[HEADER_SIZE..HEADER_SIZE + 10]);
        let result = decode_settings(&access, MessageType::DvbtSettings, short);
        assert_eq!(
            result,
            Err(ProtocolError::IncompleteFrame {
                expected: DVBT_SETTINGS_SIZE,
                actual: 10
            })
        );
    }

    #[test]
    fn test_settings_with_trailing_bytes() {
        let access = TunerAccess::acquire(&AllowAll).unwrap();
        let encoded = encode_settings(&DvbtFrontendSettings::builder(&access).build()).unwrap();
        let mut payload = BytesMut::from(&encoded[HEADER_SIZE..]);
        payload.put_u16_le(0xBEEF);
        let result = decode_settings(&access, MessageType::DvbtSettings, payload.freeze());
        assert_eq!(
            result,
            Err(ProtocolError::TrailingBytes {
                message_type: MessageType::DvbtSettings.into(),
                remaining: 2
            })
        );
    }

    #[test]
    fn test_scan_event_with_trailing_bytes() {
        let mut payload = BytesMut::new();
        payload.put_u8(1);
        payload.put_u8(0);
        assert_eq!(
            decode_scan_event(MessageType::ScanLocked, payload.freeze()),
            Err(ProtocolError::TrailingBytes {
                message_type: MessageType::ScanLocked.into(),
                remaining: 1
            })
        );

        // A declared length past the list contents is rejected inside a capture.
        let encoded = encode_scan_event(&ScanEvent::Frequencies(vec![474_000_000])).unwrap();
        let mut frame = BytesMut::from(&encoded[..]);
        frame[4..8].copy_from_slice(&12u32.to_le_bytes());
        frame.put_u32_le(0);
        assert!(matches!(
            decode_frames(&frame),
            Err(ProtocolError::TrailingBytes { remaining: 4, .. })
        ));
    }

    #[test]
    fn test_settings_with_bad_enum_value() {
        let access = TunerAccess::acquire(&AllowAll).unwrap();
        let encoded = encode_settings(&DvbtFrontendSettings::builder(&access).build()).unwrap();
        let mut payload = BytesMut::from(&encoded[HEADER_SIZE..]);
        // Bandwidth is the third u32.
        payload[8..12].copy_from_slice(&3u32.to_le_bytes());
        let result = decode_settings(&access, MessageType::DvbtSettings, payload.freeze());
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidEnumValue { kind: "bandwidth", value: 3 })
        ));
    }

    #[test]
    fn test_encode_decode_scan_events() {
        let events = vec![
            ScanEvent::Locked(true),
            ScanEvent::Progress(50),
            ScanEvent::Frequencies(vec![474_000_000, 482_000_000]),
            ScanEvent::PlpIds(vec![]),
            ScanEvent::AnalogSifStandard(AnalogSifStandard::DkNicam),
            ScanEvent::Atsc3PlpInfos(vec![Atsc3PlpInfo::new(3, true), Atsc3PlpInfo::new(7, false)]),
            ScanEvent::End(true),
        ];

        for event in &events {
            let encoded = encode_scan_event(event).unwrap();
            let header = decode_header(&encoded).unwrap().unwrap();
            let decoded = decode_scan_event(header.message_type, payload_of(&encoded)).unwrap();
            assert_eq!(&decoded, event);
        }
    }

    #[test]
    fn test_decode_frames_stream() {
        let events = vec![
            ScanEvent::Progress(0),
            ScanEvent::SymbolRates(vec![27_500_000]),
            ScanEvent::DvbsStandard(DvbsStandard::S2),
            ScanEvent::End(true),
        ];
        let mut stream = BytesMut::new();
        for event in &events {
            stream.put_slice(&encode_scan_event(event).unwrap());
        }
        assert_eq!(decode_frames(&stream).unwrap(), events);

        let cut = stream.len() - 1;
        assert!(matches!(
            decode_frames(&stream[..cut]),
            Err(ProtocolError::IncompleteFrame { .. })
        ));
    }

    #[test]
    fn test_settings_frame_is_not_a_scan_event() {
        let access = TunerAccess::acquire(&AllowAll).unwrap();
        let encoded = encode_settings(&DvbtFrontendSettings::builder(&access).build()).unwrap();
        assert_eq!(
            decode_frames(&encoded),
            Err(ProtocolError::UnexpectedMessage(0x0100))
        );
    }

    #[test]
    fn test_list_count_exceeds_payload() {
        let mut payload = BytesMut::new();
        payload.put_u32_le(3);
        payload.put_u32_le(474_000_000);
        let result = decode_scan_event(MessageType::ScanFrequencies, payload.freeze());
        assert_eq!(
            result,
            Err(ProtocolError::IncompleteFrame {
                expected: 12,
                actual: 4
            })
        );
    }

    #[test]
    fn test_invalid_magic() {
        let bad_frame = b"BADPxxxx\x00\x00";
        let result = decode_header(bad_frame);
        assert!(matches!(result, Err(ProtocolError::InvalidMagic(_))));
    }

    #[test]
    fn test_incomplete_header() {
        let partial = b"TSCN\x00";
        let result = decode_header(partial).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_frame_too_large() {
        let mut frame = BytesMut::new();
        frame.put_slice(&MAGIC);
        frame.put_u32_le(MAX_FRAME_SIZE + 1);
        frame.put_u16_le(0x0200);
        assert_eq!(
            decode_header(&frame),
            Err(ProtocolError::FrameTooLarge(MAX_FRAME_SIZE + 1, MAX_FRAME_SIZE))
        );
    }
}
