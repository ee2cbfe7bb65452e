//! Module model capability lookup
//!
//! The E220 family ships in several hardware variants that differ in RF band
//! and output stage. The protocol is identical across them, but the meaning
//! of the channel register and the 2-bit transmission power field is not:
//! a 400 MHz module maps channel 23 to 433 MHz while a 900 MHz module maps
//! it to 873 MHz, and the power codes select from a different dBm table on
//! 22 dBm and 30 dBm output stages.
//!
//! [`ModuleModel`] is a pure lookup from variant to those capabilities. The
//! driver consults it when validating and encoding a
//! [`Configuration`](crate::Configuration); there is no per-model behavior
//! anywhere else.

use crate::registers::TransmissionPower;

/// Supported E220 hardware variants.
///
/// The name encodes the RF band (400/900 MHz) and the maximum output
/// power (22/30 dBm), matching the vendor part numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleModel {
    /// E220-400T22D: 410-493 MHz, 22 dBm output stage
    E220_400T22D,
    /// E220-400T30D: 410-493 MHz, 30 dBm output stage
    E220_400T30D,
    /// E220-900T22D: 850-930 MHz, 22 dBm output stage
    E220_900T22D,
    /// E220-900T30D: 850-930 MHz, 30 dBm output stage
    E220_900T30D,
}

impl ModuleModel {
    /// Base frequency in MHz: the frequency of channel 0.
    pub fn base_frequency_mhz(self) -> u16 {
        match self {
            Self::E220_400T22D | Self::E220_400T30D => 410,
            Self::E220_900T22D | Self::E220_900T30D => 850,
        }
    }

    /// Channel step in MHz.
    pub fn channel_step_mhz(self) -> u16 {
        1
    }

    /// Highest addressable channel for this band.
    pub fn max_channel(self) -> u8 {
        match self {
            Self::E220_400T22D | Self::E220_400T30D => 83,
            Self::E220_900T22D | Self::E220_900T30D => 80,
        }
    }

    /// Operating frequency in MHz for a channel on this model.
    pub fn frequency_mhz(self, channel: u8) -> u16 {
        self.base_frequency_mhz() + self.channel_step_mhz() * u16::from(channel)
    }

    /// Legal transmission power levels, indexed by the 2-bit wire code.
    pub fn power_levels(self) -> [TransmissionPower; 4] {
        match self {
            Self::E220_400T22D | Self::E220_900T22D => [
                TransmissionPower::Dbm22,
                TransmissionPower::Dbm17,
                TransmissionPower::Dbm13,
                TransmissionPower::Dbm10,
            ],
            Self::E220_400T30D | Self::E220_900T30D => [
                TransmissionPower::Dbm30,
                TransmissionPower::Dbm27,
                TransmissionPower::Dbm24,
                TransmissionPower::Dbm21,
            ],
        }
    }

    /// Wire code for a power level, or `None` if this model cannot emit it.
    pub fn power_code(self, power: TransmissionPower) -> Option<u8> {
        self.power_levels()
            .iter()
            .position(|&p| p == power)
            .map(|i| i as u8)
    }

    /// Power level selected by a 2-bit wire code on this model.
    pub fn power_from_code(self, code: u8) -> TransmissionPower {
        self.power_levels()[usize::from(code & 0b11)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_model_channel_to_frequency() {
        assert_eq!(ModuleModel::E220_400T22D.frequency_mhz(23), 433);
        assert_eq!(ModuleModel::E220_400T22D.frequency_mhz(0), 410);
    }

    #[test]
    fn band_900_base_frequency() {
        assert_eq!(ModuleModel::E220_900T22D.frequency_mhz(0), 850);
    }

    #[test]
    fn power_codes_round_trip() {
        for model in [
            ModuleModel::E220_400T22D,
            ModuleModel::E220_400T30D,
            ModuleModel::E220_900T22D,
            ModuleModel::E220_900T30D,
        ] {
            for code in 0..4u8 {
                let power = model.power_from_code(code);
                assert_eq!(model.power_code(power), Some(code));
            }
        }
    }

    #[test]
    fn power_outside_output_stage_has_no_code() {
        assert_eq!(ModuleModel::E220_400T22D.power_code(TransmissionPower::Dbm30), None);
        assert_eq!(ModuleModel::E220_400T30D.power_code(TransmissionPower::Dbm10), None);
    }
}
