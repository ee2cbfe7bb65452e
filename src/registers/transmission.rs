//! TRANSMISSION_MODE register byte
//!
//! Packs the transmission policy into one byte:
//! - bit 7: append an RSSI byte to every delivered packet
//! - bit 6: fixed addressing (address + channel header on the air)
//! - bit 4: listen-before-talk
//! - bits 2-0: wake-on-radio period
//!
//! Bits 5 and 3 are reserved and always read back as zero.

use bitflags::bitflags;

bitflags! {
    /// Single-bit enables of the TRANSMISSION_MODE byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TransmissionFlags: u8 {
        /// Deliver a trailing signal-strength byte with every packet
        const RSSI_BYTE = 1 << 7;
        /// Transmit `[addr_high, addr_low, channel]` ahead of the payload
        const FIXED_ADDRESS = 1 << 6;
        /// Carrier-sense before transmitting
        const LISTEN_BEFORE_TALK = 1 << 4;
    }
}

impl Default for TransmissionFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransmissionFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TransmissionFlags({=u8:b})", self.bits());
    }
}

/// Wake-on-radio duty-cycle period (TRANSMISSION_MODE bits 2-0).
///
/// Configured but not actively scheduled by this driver; the module
/// applies it in [`WakeOnRadio`](crate::OperatingMode::WakeOnRadio) mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorPeriod {
    Ms500 = 0b000,
    Ms1000 = 0b001,
    Ms1500 = 0b010,
    /// Factory default
    #[default]
    Ms2000 = 0b011,
    Ms2500 = 0b100,
    Ms3000 = 0b101,
    Ms3500 = 0b110,
    Ms4000 = 0b111,
}

impl WorPeriod {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::Ms500,
            0b001 => Self::Ms1000,
            0b010 => Self::Ms1500,
            0b011 => Self::Ms2000,
            0b100 => Self::Ms2500,
            0b101 => Self::Ms3000,
            0b110 => Self::Ms3500,
            _ => Self::Ms4000,
        }
    }

    /// Period length in milliseconds.
    pub fn milliseconds(self) -> u32 {
        500 * (self as u32 + 1)
    }
}

/// Decoded TRANSMISSION_MODE register byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmissionMode {
    pub flags: TransmissionFlags,
    pub wor_period: WorPeriod,
}

impl TransmissionMode {
    /// Whether fixed addressing is active.
    pub fn is_fixed(self) -> bool {
        self.flags.contains(TransmissionFlags::FIXED_ADDRESS)
    }

    /// Whether delivered packets carry a trailing RSSI byte.
    pub fn rssi_byte_enabled(self) -> bool {
        self.flags.contains(TransmissionFlags::RSSI_BYTE)
    }

    pub(crate) fn to_byte(self) -> u8 {
        self.flags.bits() | self.wor_period as u8
    }

    pub(crate) fn from_byte(byte: u8) -> Self {
        Self {
            flags: TransmissionFlags::from_bits_truncate(byte),
            wor_period: WorPeriod::from_bits(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_byte_matches_factory_settings() {
        // transparent, no RSSI byte, no LBT, 2000 ms WOR
        assert_eq!(TransmissionMode::default().to_byte(), 0b011);
    }

    #[test]
    fn flags_and_period_round_trip() {
        let mode = TransmissionMode {
            flags: TransmissionFlags::RSSI_BYTE | TransmissionFlags::FIXED_ADDRESS,
            wor_period: WorPeriod::Ms1500,
        };
        let byte = mode.to_byte();
        assert_eq!(byte, 0b1100_0010);
        assert_eq!(TransmissionMode::from_byte(byte), mode);
    }

    #[test]
    fn wor_period_milliseconds() {
        assert_eq!(WorPeriod::Ms500.milliseconds(), 500);
        assert_eq!(WorPeriod::Ms4000.milliseconds(), 4000);
    }
}
