//! Enumerations mirrored from the tuner HAL, plus frame constants.
//!
//! Every enumeration keeps the numeric value the HAL uses on the wire. Most of
//! them are bit flags (`UNDEFINED = 0`, `AUTO = 1 << 0`, then one bit per
//! member) so that capability masks can be expressed with the same values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Magic bytes for frame header: "TSCN" (Tuner SCaN).
pub const MAGIC: [u8; 4] = *b"TSCN";

/// Maximum frame payload size (1 MB).
pub const MAX_FRAME_SIZE: u32 = 1024 * 1024;

/// Declares a closed HAL enumeration with its wire value and canonical name.
///
/// The generated type converts to `u32` infallibly, from `u32` through
/// `TryFrom`, serializes as the canonical name and lists its members in `ALL`.
macro_rules! hal_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:expr => $label:literal,
            )+
        }
        $(default $default:ident;)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u32)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant = $value,
            )+
        }

        impl $name {
            /// Every member, in HAL declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical upper-case name.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        $(
            impl Default for $name {
                fn default() -> Self {
                    $name::$default
                }
            }
        )?

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value as u32
            }
        }

        impl TryFrom<u32> for $name {
            type Error = ProtocolError;

            fn try_from(value: u32) -> Result<Self, ProtocolError> {
                $(
                    if value == $name::$variant as u32 {
                        return Ok($name::$variant);
                    }
                )+
                Err(ProtocolError::InvalidEnumValue { kind: $kind, value })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

hal_enum! {
    /// Frontend variant discriminator.
    ///
    /// Unlike the parameter enumerations this is a plain index, not a flag.
    pub enum FrontendType ("frontend type") {
        Undefined = 0 => "UNDEFINED",
        Analog = 1 => "ANALOG",
        Atsc = 2 => "ATSC",
        Atsc3 = 3 => "ATSC3",
        Dvbc = 4 => "DVBC",
        Dvbs = 5 => "DVBS",
        Dvbt = 6 => "DVBT",
        Isdbs = 7 => "ISDBS",
        Isdbs3 = 8 => "ISDBS3",
        Isdbt = 9 => "ISDBT",
    }
    default Undefined;
}

hal_enum! {
    /// DVB-T OFDM transmission mode (FFT size).
    pub enum TransmissionMode ("transmission mode") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        Mode2K = 1 << 1 => "MODE_2K",
        Mode8K = 1 << 2 => "MODE_8K",
        Mode4K = 1 << 3 => "MODE_4K",
        Mode1K = 1 << 4 => "MODE_1K",
        Mode16K = 1 << 5 => "MODE_16K",
        Mode32K = 1 << 6 => "MODE_32K",
    }
    default Undefined;
}

hal_enum! {
    /// DVB-T channel bandwidth.
    #[allow(non_camel_case_types)]
    pub enum Bandwidth ("bandwidth") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        Mhz8 = 1 << 1 => "8MHZ",
        Mhz7 = 1 << 2 => "7MHZ",
        Mhz6 = 1 << 3 => "6MHZ",
        Mhz5 = 1 << 4 => "5MHZ",
        Mhz1_7 = 1 << 5 => "1_7MHZ",
        Mhz10 = 1 << 6 => "10MHZ",
    }
    default Undefined;
}

hal_enum! {
    /// DVB-T subcarrier constellation.
    pub enum Constellation ("constellation") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        Qpsk = 1 << 1 => "QPSK",
        Qam16 = 1 << 2 => "16QAM",
        Qam64 = 1 << 3 => "64QAM",
        Qam256 = 1 << 4 => "256QAM",
    }
    default Undefined;
}

hal_enum! {
    /// DVB-T hierarchical modulation (alpha value and interleaver depth).
    pub enum Hierarchy ("hierarchy") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        NonNative = 1 << 1 => "NON_NATIVE",
        Native1 = 1 << 2 => "1_NATIVE",
        Native2 = 1 << 3 => "2_NATIVE",
        Native4 = 1 << 4 => "4_NATIVE",
        NonIndepth = 1 << 5 => "NON_INDEPTH",
        Indepth1 = 1 << 6 => "1_INDEPTH",
        Indepth2 = 1 << 7 => "2_INDEPTH",
        Indepth4 = 1 << 8 => "4_INDEPTH",
    }
    default Undefined;
}

hal_enum! {
    /// Forward error correction code rate, used for both HP and LP streams.
    #[allow(non_camel_case_types)]
    pub enum CodeRate ("code rate") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        Rate1_2 = 1 << 1 => "1_2",
        Rate2_3 = 1 << 2 => "2_3",
        Rate3_4 = 1 << 3 => "3_4",
        Rate5_6 = 1 << 4 => "5_6",
        Rate7_8 = 1 << 5 => "7_8",
        Rate3_5 = 1 << 6 => "3_5",
        Rate4_5 = 1 << 7 => "4_5",
        Rate6_7 = 1 << 8 => "6_7",
        Rate8_9 = 1 << 9 => "8_9",
    }
    default Undefined;
}

hal_enum! {
    /// OFDM guard interval as a fraction of the useful symbol duration.
    #[allow(non_camel_case_types)]
    pub enum GuardInterval ("guard interval") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        Interval1_32 = 1 << 1 => "1_32",
        Interval1_16 = 1 << 2 => "1_16",
        Interval1_8 = 1 << 3 => "1_8",
        Interval1_4 = 1 << 4 => "1_4",
        Interval1_128 = 1 << 5 => "1_128",
        Interval19_128 = 1 << 6 => "19_128",
        Interval19_256 = 1 << 7 => "19_256",
    }
    default Undefined;
}

hal_enum! {
    /// DVB-T signal standard.
    ///
    /// The HAL defines no zero member; `Undefined` stands for a builder on
    /// which the standard was never set.
    pub enum DvbtStandard ("DVB-T standard") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        T = 1 << 1 => "T",
        T2 = 1 << 2 => "T2",
    }
    default Undefined;
}

hal_enum! {
    /// Physical layer pipe selection mode for DVB-T2.
    pub enum PlpMode ("PLP mode") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        Manual = 1 << 1 => "MANUAL",
    }
    default Undefined;
}

hal_enum! {
    /// DVB-S signal standard, reported while scanning satellite frontends.
    pub enum DvbsStandard ("DVB-S standard") {
        Auto = 1 << 0 => "AUTO",
        S = 1 << 1 => "S",
        S2 = 1 << 2 => "S2",
        S2x = 1 << 3 => "S2X",
    }
}

hal_enum! {
    /// Analog video signal type.
    pub enum AnalogSignalType ("analog signal type") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        Pal = 1 << 1 => "PAL",
        Ntsc = 1 << 2 => "NTSC",
        Secam = 1 << 3 => "SECAM",
    }
    default Undefined;
}

hal_enum! {
    /// Analog sound intermediate frequency standard.
    pub enum AnalogSifStandard ("analog SIF standard") {
        Undefined = 0 => "UNDEFINED",
        Auto = 1 << 0 => "AUTO",
        Bg = 1 << 1 => "BG",
        BgA2 = 1 << 2 => "BG_A2",
        BgNicam = 1 << 3 => "BG_NICAM",
        I = 1 << 4 => "I",
        Dk = 1 << 5 => "DK",
        Dk1A2 = 1 << 6 => "DK1_A2",
        Dk2A2 = 1 << 7 => "DK2_A2",
        Dk3A2 = 1 << 8 => "DK3_A2",
        DkNicam = 1 << 9 => "DK_NICAM",
        L = 1 << 10 => "L",
        M = 1 << 11 => "M",
        MBtsc = 1 << 12 => "M_BTSC",
        MA2 = 1 << 13 => "M_A2",
        MEiaj = 1 << 14 => "M_EIAJ",
        INicam = 1 << 15 => "I_NICAM",
        LNicam = 1 << 16 => "L_NICAM",
        LPrime = 1 << 17 => "L_PRIME",
    }
    default Undefined;
}

/// Message type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MessageType {
    // Settings (0x01xx)
    /// DVB-T frontend settings.
    DvbtSettings = 0x0100,

    // Scan notifications (0x02xx)
    /// Signal lock gained or lost.
    ScanLocked = 0x0200,
    /// Scan ended or continuing.
    ScanEnd = 0x0201,
    /// Scan progress percentage.
    ScanProgress = 0x0202,
    /// Discovered frequencies.
    ScanFrequencies = 0x0203,
    /// Discovered symbol rates.
    ScanSymbolRates = 0x0204,
    /// Locked PLP ids.
    ScanPlpIds = 0x0205,
    /// Locked PLP group ids.
    ScanGroupIds = 0x0206,
    /// Input stream ids.
    ScanInputStreamIds = 0x0207,
    /// Locked DVB-S standard.
    ScanDvbsStandard = 0x0208,
    /// Locked DVB-T standard.
    ScanDvbtStandard = 0x0209,
    /// Locked analog SIF standard.
    ScanAnalogSifStandard = 0x020A,
    /// Analog signal type.
    ScanSignalType = 0x020B,
    /// Frontend hierarchy.
    ScanHierarchy = 0x020C,
    /// ATSC3 PLP status list.
    ScanAtsc3PlpInfos = 0x020D,
}

impl TryFrom<u16> for MessageType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, u16> {
        match value {
            0x0100 => Ok(MessageType::DvbtSettings),
            0x0200 => Ok(MessageType::ScanLocked),
            0x0201 => Ok(MessageType::ScanEnd),
            0x0202 => Ok(MessageType::ScanProgress),
            0x0203 => Ok(MessageType::ScanFrequencies),
            0x0204 => Ok(MessageType::ScanSymbolRates),
            0x0205 => Ok(MessageType::ScanPlpIds),
            0x0206 => Ok(MessageType::ScanGroupIds),
            0x0207 => Ok(MessageType::ScanInputStreamIds),
            0x0208 => Ok(MessageType::ScanDvbsStandard),
            0x0209 => Ok(MessageType::ScanDvbtStandard),
            0x020A => Ok(MessageType::ScanAnalogSifStandard),
            0x020B => Ok(MessageType::ScanSignalType),
            0x020C => Ok(MessageType::ScanHierarchy),
            0x020D => Ok(MessageType::ScanAtsc3PlpInfos),
            _ => Err(value),
        }
    }
}

impl From<MessageType> for u16 {
    fn from(value: MessageType) -> Self {
        value as u16
    }
}
