//! Recorded scan captures.
//!
//! A capture is either a sequence of binary scan event frames, recognized by
//! the frame magic at the start of the file, or JSON lines with one
//! [`ScanEvent`] per line:
//!
//! ```text
//! # 474 MHz sweep
//! {"event":"progress","value":0}
//! {"event":"frequencies","value":[474000000]}
//! {"event":"end","value":true}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::path::Path;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use log::{debug, info, warn};

use tuner_protocol::{decode_frames, encode_scan_event, ScanEvent, MAGIC};

use crate::error::ScanError;
use crate::session::ScanEventSender;

/// Read a capture file.
pub fn load_capture(path: &Path) -> Result<Vec<ScanEvent>, ScanError> {
    let data = std::fs::read(path)?;

    let events = if data.starts_with(&MAGIC) {
        debug!("Reading {} as binary frames", path.display());
        decode_frames(&data)?
    } else {
        let text = String::from_utf8(data).map_err(|e| ScanError::Capture {
            path: path.to_path_buf(),
            line: 0,
            message: format!("not UTF-8 and not a frame capture: {}", e),
        })?;
        parse_json_lines(path, &text)?
    };

    info!("Loaded {} event(s) from {}", events.len(), path.display());
    Ok(events)
}

fn parse_json_lines(path: &Path, text: &str) -> Result<Vec<ScanEvent>, ScanError> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|e| ScanError::Capture {
            path: path.to_path_buf(),
            line: index + 1,
            message: e.to_string(),
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Encode events as a binary frame capture.
pub fn encode_capture(events: &[ScanEvent]) -> Result<Bytes, ScanError> {
    let mut buf = BytesMut::new();
    for event in events {
        buf.put(encode_scan_event(event)?);
    }
    Ok(buf.freeze())
}

/// Write events to `path` as a binary frame capture.
pub fn save_capture(path: &Path, events: &[ScanEvent]) -> Result<(), ScanError> {
    let data = encode_capture(events)?;
    std::fs::write(path, &data)?;
    info!("Saved {} event(s) to {}", events.len(), path.display());
    Ok(())
}

/// Feed recorded events into a session, pausing `interval` between them.
///
/// Returns the number of events the session accepted. Stops early when the
/// session has ended.
pub async fn replay(events: Vec<ScanEvent>, sender: &ScanEventSender, interval: Duration) -> usize {
    let total = events.len();
    let mut sent = 0;

    for event in events {
        if sent > 0 && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        if let Err(rejected) = sender.send(event).await {
            warn!(
                "Session ended before '{}', {} event(s) not replayed",
                rejected.kind(),
                total - sent
            );
            break;
        }
        sent += 1;
    }

    sent
}
