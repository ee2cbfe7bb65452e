//! SPED register byte
//!
//! Packs the UART framing and the air data rate into one byte:
//! - bits 7-5: UART baud rate
//! - bits 4-3: UART parity
//! - bits 2-0: air data rate
//!
//! All bit patterns are meaningful on the E220, so decoding is total;
//! the vendor aliases several patterns to the same rate (e.g. the three
//! lowest air-rate codes all select 2.4 kbps).

/// UART baud rate (SPED bits 7-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBaudRate {
    Bps1200 = 0b000,
    Bps2400 = 0b001,
    Bps4800 = 0b010,
    /// Factory default
    #[default]
    Bps9600 = 0b011,
    Bps19200 = 0b100,
    Bps38400 = 0b101,
    Bps57600 = 0b110,
    Bps115200 = 0b111,
}

impl UartBaudRate {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::Bps1200,
            0b001 => Self::Bps2400,
            0b010 => Self::Bps4800,
            0b011 => Self::Bps9600,
            0b100 => Self::Bps19200,
            0b101 => Self::Bps38400,
            0b110 => Self::Bps57600,
            _ => Self::Bps115200,
        }
    }

    /// Serial rate in bits per second.
    pub fn bps(self) -> u32 {
        match self {
            Self::Bps1200 => 1200,
            Self::Bps2400 => 2400,
            Self::Bps4800 => 4800,
            Self::Bps9600 => 9600,
            Self::Bps19200 => 19200,
            Self::Bps38400 => 38400,
            Self::Bps57600 => 57600,
            Self::Bps115200 => 115_200,
        }
    }
}

/// UART parity (SPED bits 4-3).
///
/// Code `0b11` is a vendor alias for 8N1 and is kept distinct so a
/// decoded configuration re-encodes to the same byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartParity {
    /// 8N1, factory default
    #[default]
    None8N1 = 0b00,
    Odd8O1 = 0b01,
    Even8E1 = 0b10,
    /// Alias for 8N1
    None8N1Alt = 0b11,
}

impl UartParity {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::None8N1,
            0b01 => Self::Odd8O1,
            0b10 => Self::Even8E1,
            _ => Self::None8N1Alt,
        }
    }
}

/// Over-the-air data rate (SPED bits 2-0).
///
/// Codes `0b000` and `0b001` are vendor aliases for 2.4 kbps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AirDataRate {
    /// Alias for 2.4 kbps
    Bps2400Alt0 = 0b000,
    /// Alias for 2.4 kbps
    Bps2400Alt1 = 0b001,
    /// Factory default
    #[default]
    Bps2400 = 0b010,
    Bps4800 = 0b011,
    Bps9600 = 0b100,
    Bps19200 = 0b101,
    Bps38400 = 0b110,
    Bps62500 = 0b111,
}

impl AirDataRate {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::Bps2400Alt0,
            0b001 => Self::Bps2400Alt1,
            0b010 => Self::Bps2400,
            0b011 => Self::Bps4800,
            0b100 => Self::Bps9600,
            0b101 => Self::Bps19200,
            0b110 => Self::Bps38400,
            _ => Self::Bps62500,
        }
    }

    /// Air rate in bits per second.
    pub fn bps(self) -> u32 {
        match self {
            Self::Bps2400Alt0 | Self::Bps2400Alt1 | Self::Bps2400 => 2400,
            Self::Bps4800 => 4800,
            Self::Bps9600 => 9600,
            Self::Bps19200 => 19_200,
            Self::Bps38400 => 38_400,
            Self::Bps62500 => 62_500,
        }
    }
}

/// Decoded SPED register byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Speed {
    pub uart_baud_rate: UartBaudRate,
    pub uart_parity: UartParity,
    pub air_data_rate: AirDataRate,
}

impl Speed {
    pub(crate) fn to_byte(self) -> u8 {
        ((self.uart_baud_rate as u8) << 5)
            | ((self.uart_parity as u8) << 3)
            | self.air_data_rate as u8
    }

    pub(crate) fn from_byte(byte: u8) -> Self {
        Self {
            uart_baud_rate: UartBaudRate::from_bits(byte >> 5),
            uart_parity: UartParity::from_bits(byte >> 3),
            air_data_rate: AirDataRate::from_bits(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_speed_byte_matches_factory_settings() {
        // 9600 bps UART, 8N1, 2.4 kbps air rate
        assert_eq!(Speed::default().to_byte(), 0b011_00_010);
    }

    #[test]
    fn every_byte_round_trips() {
        for byte in 0..=u8::MAX {
            assert_eq!(Speed::from_byte(byte).to_byte(), byte);
        }
    }
}
