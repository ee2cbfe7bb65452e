//! Configuration register block
//!
//! The module's persistent settings live in an 8-register block that the
//! command protocol reads and writes as one unit, in wire order:
//!
//! | offset | register          |
//! |--------|-------------------|
//! | 0      | ADDH              |
//! | 1      | ADDL              |
//! | 2      | CHAN              |
//! | 3      | SPED              |
//! | 4      | OPTION            |
//! | 5      | TRANSMISSION_MODE |
//! | 6      | CRYPT_H           |
//! | 7      | CRYPT_L           |
//!
//! SPED, OPTION, and TRANSMISSION_MODE are densely bit-packed; their
//! layouts live in the sibling modules. The crypt registers are
//! write-only key material: the module accepts them on write but always
//! reports them as zero, so a decoded [`Configuration`] always carries a
//! zero key.
//!
//! [`Configuration`] is an immutable value: build one with
//! [`Configuration::builder`], or receive one decoded from a device
//! response, and replace it wholesale rather than mutating in place.

mod option;
mod speed;
mod transmission;

pub use option::*;
pub use speed::*;
pub use transmission::*;

use crate::{Error, ModuleModel};

/// Number of registers in the configuration block.
pub const REGISTER_BLOCK_LEN: usize = 8;

/// The module's configuration register block, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    /// Hardware variant the block is interpreted against
    pub model: ModuleModel,
    /// Command echo `[code, start, length]` from the last device
    /// response; zero on a freshly built value
    pub head: [u8; 3],
    /// High byte of the device address
    pub addr_high: u8,
    /// Low byte of the device address
    pub addr_low: u8,
    /// Channel offset from the model's base frequency
    pub channel: u8,
    pub speed: Speed,
    pub option: TransmitOption,
    pub transmission_mode: TransmissionMode,
    /// Write-only encryption key; reads back as zero
    pub crypt: u16,
}

impl Configuration {
    /// Factory-default configuration for a model.
    pub fn new(model: ModuleModel) -> Self {
        Self {
            model,
            head: [0; 3],
            addr_high: 0,
            addr_low: 0,
            channel: 0,
            speed: Speed::default(),
            option: TransmitOption::default_for(model),
            transmission_mode: TransmissionMode::default(),
            crypt: 0,
        }
    }

    /// Start building a configuration from the model's factory defaults.
    pub fn builder(model: ModuleModel) -> ConfigurationBuilder {
        ConfigurationBuilder {
            configuration: Self::new(model),
        }
    }

    /// Operating frequency in MHz selected by this configuration.
    pub fn frequency_mhz(&self) -> u16 {
        self.model.frequency_mhz(self.channel)
    }

    /// Pack the block into wire order, validating every model-dependent
    /// field first.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidConfigurationValue`] - `channel` exceeds the
    ///   model's maximum or `transmission_power` is outside the model's
    ///   level table; no bytes are produced
    pub fn to_registers(&self) -> Result<[u8; REGISTER_BLOCK_LEN], Error> {
        if self.channel > self.model.max_channel() {
            return Err(Error::InvalidConfigurationValue("channel"));
        }
        let option = self.option.to_byte(self.model)?;
        let crypt = self.crypt.to_be_bytes();

        Ok([
            self.addr_high,
            self.addr_low,
            self.channel,
            self.speed.to_byte(),
            option,
            self.transmission_mode.to_byte(),
            crypt[0],
            crypt[1],
        ])
    }

    /// Unpack a register block from a device response.
    ///
    /// `head` is the 3-byte command echo preceding the block. The crypt
    /// registers are not taken from the wire; the device never reports
    /// them, so the decoded key is always zero.
    pub fn from_registers(
        model: ModuleModel,
        head: [u8; 3],
        registers: &[u8; REGISTER_BLOCK_LEN],
    ) -> Self {
        Self {
            model,
            head,
            addr_high: registers[0],
            addr_low: registers[1],
            channel: registers[2],
            speed: Speed::from_byte(registers[3]),
            option: TransmitOption::from_byte(model, registers[4]),
            transmission_mode: TransmissionMode::from_byte(registers[5]),
            crypt: 0,
        }
    }
}

/// Validating builder for [`Configuration`].
///
/// Typed field enums make most settings legal by construction; the two
/// model-dependent fields (`channel`, `transmission_power`) are checked
/// at set time, so [`build`](Self::build) cannot fail.
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    configuration: Configuration,
}

impl ConfigurationBuilder {
    /// Set the device address used for fixed-addressing delivery.
    pub fn address(mut self, high: u8, low: u8) -> Self {
        self.configuration.addr_high = high;
        self.configuration.addr_low = low;
        self
    }

    /// Set the channel offset from the model's base frequency.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidConfigurationValue`] - channel exceeds the
    ///   model's maximum
    pub fn channel(mut self, channel: u8) -> Result<Self, Error> {
        if channel > self.configuration.model.max_channel() {
            return Err(Error::InvalidConfigurationValue("channel"));
        }
        self.configuration.channel = channel;
        Ok(self)
    }

    pub fn uart_baud_rate(mut self, rate: UartBaudRate) -> Self {
        self.configuration.speed.uart_baud_rate = rate;
        self
    }

    pub fn uart_parity(mut self, parity: UartParity) -> Self {
        self.configuration.speed.uart_parity = parity;
        self
    }

    pub fn air_data_rate(mut self, rate: AirDataRate) -> Self {
        self.configuration.speed.air_data_rate = rate;
        self
    }

    pub fn sub_packet(mut self, size: SubPacketSize) -> Self {
        self.configuration.option.sub_packet = size;
        self
    }

    pub fn rssi_ambient_noise(mut self, enabled: bool) -> Self {
        self.configuration.option.rssi_ambient_noise = enabled;
        self
    }

    /// Set the output power.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidConfigurationValue`] - the model's output stage
    ///   cannot emit this level
    pub fn transmission_power(mut self, power: TransmissionPower) -> Result<Self, Error> {
        if self.configuration.model.power_code(power).is_none() {
            return Err(Error::InvalidConfigurationValue("transmission_power"));
        }
        self.configuration.option.transmission_power = power;
        Ok(self)
    }

    pub fn wor_period(mut self, period: WorPeriod) -> Self {
        self.configuration.transmission_mode.wor_period = period;
        self
    }

    pub fn listen_before_talk(mut self, enabled: bool) -> Self {
        self.configuration
            .transmission_mode
            .flags
            .set(TransmissionFlags::LISTEN_BEFORE_TALK, enabled);
        self
    }

    /// Enable the trailing per-packet RSSI byte on delivered packets.
    pub fn rssi_byte(mut self, enabled: bool) -> Self {
        self.configuration
            .transmission_mode
            .flags
            .set(TransmissionFlags::RSSI_BYTE, enabled);
        self
    }

    /// Select fixed addressing instead of transparent transmission.
    pub fn fixed_address(mut self, enabled: bool) -> Self {
        self.configuration
            .transmission_mode
            .flags
            .set(TransmissionFlags::FIXED_ADDRESS, enabled);
        self
    }

    /// Set the write-only encryption key.
    pub fn crypt(mut self, key: u16) -> Self {
        self.configuration.crypt = key;
        self
    }

    pub fn build(self) -> Configuration {
        self.configuration
    }
}
