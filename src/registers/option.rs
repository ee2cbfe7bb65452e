//! OPTION register byte
//!
//! Packs radio-side transmission options into one byte:
//! - bits 7-6: sub-packet size
//! - bit 5: ambient-noise RSSI reporting
//! - bits 1-0: transmission power (meaning depends on the module's
//!   output stage, see [`ModuleModel`](crate::ModuleModel))
//!
//! The power field is the one place the register block is not
//! self-describing: the same 2-bit code selects 22 dBm on a T22 module
//! and 30 dBm on a T30 module, so conversion to and from the wire code
//! goes through the model's level table.

use crate::{Error, ModuleModel};

/// Maximum radio-layer unit the module transmits in one go (OPTION bits 7-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubPacketSize {
    /// Factory default
    #[default]
    Bytes200 = 0b00,
    Bytes128 = 0b01,
    Bytes64 = 0b10,
    Bytes32 = 0b11,
}

impl SubPacketSize {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Bytes200,
            0b01 => Self::Bytes128,
            0b10 => Self::Bytes64,
            _ => Self::Bytes32,
        }
    }

    /// Maximum frame length in bytes for this setting.
    pub fn max_len(self) -> usize {
        match self {
            Self::Bytes200 => 200,
            Self::Bytes128 => 128,
            Self::Bytes64 => 64,
            Self::Bytes32 => 32,
        }
    }
}

/// Transmission power in dBm, across all supported output stages.
///
/// Which four of these a module can emit is a property of its
/// [`ModuleModel`]; encoding validates the level against the model's
/// table and fails before any byte reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmissionPower {
    Dbm30,
    Dbm27,
    Dbm24,
    Dbm22,
    Dbm21,
    Dbm17,
    Dbm13,
    Dbm10,
}

impl TransmissionPower {
    /// Output power in dBm.
    pub fn dbm(self) -> u8 {
        match self {
            Self::Dbm30 => 30,
            Self::Dbm27 => 27,
            Self::Dbm24 => 24,
            Self::Dbm22 => 22,
            Self::Dbm21 => 21,
            Self::Dbm17 => 17,
            Self::Dbm13 => 13,
            Self::Dbm10 => 10,
        }
    }
}

/// Decoded OPTION register byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmitOption {
    pub sub_packet: SubPacketSize,
    /// Report ambient noise RSSI via the register interface
    pub rssi_ambient_noise: bool,
    pub transmission_power: TransmissionPower,
}

impl TransmitOption {
    /// Factory defaults for a model: 200-byte sub-packets, ambient RSSI
    /// off, maximum output power.
    pub fn default_for(model: ModuleModel) -> Self {
        Self {
            sub_packet: SubPacketSize::default(),
            rssi_ambient_noise: false,
            transmission_power: model.power_from_code(0),
        }
    }

    pub(crate) fn to_byte(self, model: ModuleModel) -> Result<u8, Error> {
        let code = model
            .power_code(self.transmission_power)
            .ok_or(Error::InvalidConfigurationValue("transmission_power"))?;
        Ok(((self.sub_packet as u8) << 6) | (u8::from(self.rssi_ambient_noise) << 5) | code)
    }

    pub(crate) fn from_byte(model: ModuleModel, byte: u8) -> Self {
        Self {
            sub_packet: SubPacketSize::from_bits(byte >> 6),
            rssi_ambient_noise: byte & (1 << 5) != 0,
            transmission_power: model.power_from_code(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_option_byte_is_zero() {
        let byte = TransmitOption::default_for(ModuleModel::E220_400T22D)
            .to_byte(ModuleModel::E220_400T22D)
            .unwrap();
        assert_eq!(byte, 0x00);
    }

    #[test]
    fn power_outside_model_table_is_rejected() {
        let option = TransmitOption {
            transmission_power: TransmissionPower::Dbm30,
            ..TransmitOption::default_for(ModuleModel::E220_400T22D)
        };
        assert_eq!(
            option.to_byte(ModuleModel::E220_400T22D),
            Err(Error::InvalidConfigurationValue("transmission_power"))
        );
    }

    #[test]
    fn option_byte_round_trips() {
        let model = ModuleModel::E220_900T30D;
        let option = TransmitOption {
            sub_packet: SubPacketSize::Bytes64,
            rssi_ambient_noise: true,
            transmission_power: TransmissionPower::Dbm24,
        };
        let byte = option.to_byte(model).unwrap();
        assert_eq!(byte, 0b10_1_000_10);
        assert_eq!(TransmitOption::from_byte(model, byte), option);
    }
}
