//! Error types for tuner frontend settings and scan frames.

use thiserror::Error;

/// Errors raised while encoding, decoding or converting wire values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Invalid magic bytes in frame header.
    #[error("Invalid magic bytes: expected 'TSCN', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Message type is unknown or unsupported.
    #[error("Unknown message type: 0x{0:04X}")]
    UnknownMessageType(u16),

    /// Frame payload is too large.
    #[error("Frame too large: {0} bytes (max: {1})")]
    FrameTooLarge(u32, u32),

    /// Frame payload is incomplete.
    #[error("Incomplete frame: expected {expected} bytes, got {actual}")]
    IncompleteFrame { expected: usize, actual: usize },

    /// The payload is longer than its message type allows.
    #[error("Trailing bytes in 0x{message_type:04X} payload: {remaining} left over")]
    TrailingBytes { message_type: u16, remaining: usize },

    /// A raw HAL value does not belong to the enumeration.
    #[error("Invalid {kind} value: 0x{value:X}")]
    InvalidEnumValue { kind: &'static str, value: u32 },

    /// A valid frame arrived where a different kind was expected.
    #[error("Unexpected message type: 0x{0:04X}")]
    UnexpectedMessage(u16),
}

/// Authorization failures at settings-builder acquisition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The caller does not hold the required capability.
    #[error("Permission denied: missing capability '{capability}'")]
    PermissionDenied { capability: String },
}
