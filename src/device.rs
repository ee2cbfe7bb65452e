//! E220 device facade
//!
//! [`Device`] owns the serial channel, the mode controller, and the
//! last-known configuration, and exposes the driver's whole surface:
//! register commands on the configuration plane, framed send/receive on
//! the data plane.
//!
//! Every register command runs the same exchange:
//! 1. Enter `Configuration` mode and wait for AUX
//! 2. Write the command frame, then read the echoed response within the
//!    bounded response window
//! 3. Drop back to `Normal` mode
//!
//! The data plane never changes modes; it frames payloads according to
//! the last-known configuration and leaves the caller in charge of the
//! `available()`/receive poll loop.
//!
//! Everything here blocks the calling thread for at most its configured
//! timeout and never retries internally. A `Device` is single-owner,
//! single-threaded; wrap it in an external lock if it must be shared.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use heapless::Vec;

use crate::commands::{
    command_frame, validate_response, SaveMode, CMD_READ_CONFIGURATION, CMD_RESET, HEAD_LEN,
    MAX_EXCHANGE_LEN, WRONG_FORMAT_HEAD,
};
use crate::frame::{build_frame, split_frame, FrameTarget, Rssi, MAX_FRAME_LEN};
use crate::mode::{ModeController, OperatingMode, Timeouts};
use crate::payload::{decode_mapping, decode_text, encode_mapping, Mapping, MAX_MESSAGE_LEN};
use crate::registers::{Configuration, REGISTER_BLOCK_LEN};
use crate::serial::SerialPort;
use crate::{Error, ModuleModel};

/// Fixed-addressing destination that every module on a channel accepts.
pub const BROADCAST_ADDRESS: u8 = 0xFF;

/// Serial poll step while waiting for a command response.
const RESPONSE_POLL_STEP_MS: u32 = 2;

/// Crypt registers start at this address; they are write-only and
/// excluded from write verification.
const CRYPT_START_ADDRESS: u8 = 6;

/// A received text message, with its optional signal-strength reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub text: heapless::String<MAX_MESSAGE_LEN>,
    pub rssi: Option<Rssi>,
}

/// A received mapping message, with its optional signal-strength reading.
#[derive(Debug, Clone)]
pub struct ReceivedMapping {
    pub mapping: Mapping,
    pub rssi: Option<Rssi>,
}

/// Driver facade for an E220 module.
///
/// Owns the serial channel and the three control pins exclusively for
/// its lifetime. The last configuration read from or written to the
/// module is cached and drives data-plane framing (sub-packet limit,
/// addressing mode); it starts out as the model's factory defaults, so
/// call [`read_configuration`](Self::read_configuration) after
/// [`begin`](Self::begin) if the module may hold non-default settings.
pub struct Device<S, M0, M1, AUX, D> {
    serial: S,
    mode: ModeController<M0, M1, AUX, D>,
    model: ModuleModel,
    configuration: Configuration,
}

impl<S, M0, M1, AUX, D> Device<S, M0, M1, AUX, D>
where
    S: SerialPort,
    M0: OutputPin,
    M1: OutputPin,
    AUX: InputPin,
    D: DelayNs,
{
    /// Create a driver with default timeouts.
    pub fn new(model: ModuleModel, serial: S, m0: M0, m1: M1, aux: AUX, delay: D) -> Self {
        Self::with_timeouts(model, serial, m0, m1, aux, delay, Timeouts::default())
    }

    /// Create a driver with explicit timing bounds.
    pub fn with_timeouts(
        model: ModuleModel,
        serial: S,
        m0: M0,
        m1: M1,
        aux: AUX,
        delay: D,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            serial,
            mode: ModeController::new(m0, m1, aux, delay, timeouts),
            model,
            configuration: Configuration::new(model),
        }
    }

    /// Bring the module into `Normal` mode and wait until it is ready.
    ///
    /// # Errors
    ///
    /// * [`Error::InitializationFailed`] - the module never reported
    ///   ready; retry after checking wiring and power
    pub fn begin(&mut self) -> Result<(), Error> {
        self.mode.enter(OperatingMode::Normal).map_err(|e| match e {
            Error::AuxTimeout => Error::InitializationFailed,
            other => other,
        })
    }

    /// Number of received bytes currently buffered. Never blocks.
    pub fn available(&mut self) -> usize {
        self.serial.available()
    }

    /// The last-known configuration.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn model(&self) -> ModuleModel {
        self.model
    }

    /// Read the configuration register block from the module.
    ///
    /// The decoded block replaces the cached configuration.
    pub fn read_configuration(&mut self) -> Result<Configuration, Error> {
        let length = REGISTER_BLOCK_LEN as u8;
        let response = self.exchange(CMD_READ_CONFIGURATION, 0x00, length, &[])?;
        let registers = validate_response(&response, 0x00, length)?;

        let head = [response[0], response[1], response[2]];
        let mut block = [0u8; REGISTER_BLOCK_LEN];
        block.copy_from_slice(registers);

        let configuration = Configuration::from_registers(self.model, head, &block);
        self.configuration = configuration;
        Ok(configuration)
    }

    /// Write the configuration register block to the module.
    ///
    /// Success means the module echoed the just-written block unchanged
    /// (crypt excluded, it reads back as zero); mere acceptance of the
    /// request is not enough. The echoed block replaces the cached
    /// configuration and is returned.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidConfigurationValue`] - a field is illegal for
    ///   the model; nothing was transmitted
    /// * [`Error::WriteVerificationFailed`] - the echo differs from the
    ///   written block
    pub fn write_configuration(
        &mut self,
        configuration: &Configuration,
        save: SaveMode,
    ) -> Result<Configuration, Error> {
        if configuration.model != self.model {
            return Err(Error::InvalidConfigurationValue("model"));
        }
        let registers = configuration.to_registers()?;

        let length = REGISTER_BLOCK_LEN as u8;
        let response = self.exchange(save.command_code(), 0x00, length, &registers)?;
        let echoed = validate_response(&response, 0x00, length)?;

        if echoed[..usize::from(CRYPT_START_ADDRESS)]
            != registers[..usize::from(CRYPT_START_ADDRESS)]
        {
            return Err(Error::WriteVerificationFailed);
        }

        let head = [response[0], response[1], response[2]];
        let mut block = [0u8; REGISTER_BLOCK_LEN];
        block.copy_from_slice(echoed);

        let configuration = Configuration::from_registers(self.model, head, &block);
        self.configuration = configuration;
        Ok(configuration)
    }

    /// Read `length` raw registers starting at `start`.
    pub fn read_registers(
        &mut self,
        start: u8,
        length: u8,
    ) -> Result<Vec<u8, REGISTER_BLOCK_LEN>, Error> {
        check_register_range(start, length)?;
        let response = self.exchange(CMD_READ_CONFIGURATION, start, length, &[])?;
        let registers = validate_response(&response, start, length)?;

        let mut out = Vec::new();
        out.extend_from_slice(registers)
            .map_err(|_| Error::HeadNotRecognized)?;
        Ok(out)
    }

    /// Write raw registers starting at `start`, echo-verified like
    /// [`write_configuration`](Self::write_configuration).
    pub fn write_registers(
        &mut self,
        start: u8,
        registers: &[u8],
        save: SaveMode,
    ) -> Result<Vec<u8, REGISTER_BLOCK_LEN>, Error> {
        let length =
            u8::try_from(registers.len()).map_err(|_| Error::InvalidConfigurationValue("length"))?;
        check_register_range(start, length)?;

        let response = self.exchange(save.command_code(), start, length, registers)?;
        let echoed = validate_response(&response, start, length)?;

        for (offset, (&written, &read_back)) in registers.iter().zip(echoed).enumerate() {
            let address = start + offset as u8;
            if address < CRYPT_START_ADDRESS && written != read_back {
                return Err(Error::WriteVerificationFailed);
            }
        }

        let mut out = Vec::new();
        out.extend_from_slice(echoed)
            .map_err(|_| Error::HeadNotRecognized)?;
        Ok(out)
    }

    /// Reboot the module.
    ///
    /// The module sends no reply; completion is signalled by AUX going
    /// ready again. Temporary settings revert on reboot, so a follow-up
    /// [`read_configuration`](Self::read_configuration) is advisable.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.mode.enter(OperatingMode::Configuration)?;

        let result = {
            let frame = command_frame(CMD_RESET, 0x00, 0x00, &[]);
            self.serial
                .write(&frame)
                .and_then(|()| self.mode.wait_ready())
        };

        // drop back to Normal even when the reset wait failed
        let back = self.mode.enter(OperatingMode::Normal);
        result?;
        back
    }

    /// Send a text message with no addressing header.
    pub fn send_transparent_message(&mut self, text: &str) -> Result<(), Error> {
        self.send_frame(None, text.as_bytes())
    }

    /// Send a text message to a fixed address and channel.
    pub fn send_fixed_message(
        &mut self,
        addr_high: u8,
        addr_low: u8,
        channel: u8,
        text: &str,
    ) -> Result<(), Error> {
        let target = self.target(addr_high, addr_low, channel)?;
        self.send_frame(Some(target), text.as_bytes())
    }

    /// Send a text message to every module on a channel.
    pub fn send_broadcast_message(&mut self, channel: u8, text: &str) -> Result<(), Error> {
        self.send_fixed_message(BROADCAST_ADDRESS, BROADCAST_ADDRESS, channel, text)
    }

    /// Send a mapping message with no addressing header.
    pub fn send_transparent_mapping(&mut self, mapping: &Mapping) -> Result<(), Error> {
        let mut payload: Vec<u8, MAX_FRAME_LEN> = Vec::new();
        encode_mapping(mapping, &mut payload)?;
        self.send_frame(None, &payload)
    }

    /// Send a mapping message to a fixed address and channel.
    pub fn send_fixed_mapping(
        &mut self,
        addr_high: u8,
        addr_low: u8,
        channel: u8,
        mapping: &Mapping,
    ) -> Result<(), Error> {
        let target = self.target(addr_high, addr_low, channel)?;
        let mut payload: Vec<u8, MAX_FRAME_LEN> = Vec::new();
        encode_mapping(mapping, &mut payload)?;
        self.send_frame(Some(target), &payload)
    }

    /// Send a mapping message to every module on a channel.
    pub fn send_broadcast_mapping(&mut self, channel: u8, mapping: &Mapping) -> Result<(), Error> {
        self.send_fixed_mapping(BROADCAST_ADDRESS, BROADCAST_ADDRESS, channel, mapping)
    }

    /// Receive a buffered text message, if any.
    ///
    /// Non-blocking: `Ok(None)` means nothing has arrived yet and the
    /// caller should poll again. Pass `with_rssi` when the sender's
    /// configuration enables the trailing RSSI byte.
    pub fn receive_message(&mut self, with_rssi: bool) -> Result<Option<ReceivedMessage>, Error> {
        let buffer = self.drain_serial()?;
        if buffer.is_empty() {
            return Ok(None);
        }
        let (payload, rssi) = split_frame(&buffer, with_rssi);
        Ok(Some(ReceivedMessage {
            text: decode_text(payload)?,
            rssi,
        }))
    }

    /// Receive a buffered mapping message, if any.
    ///
    /// Non-blocking, like [`receive_message`](Self::receive_message).
    pub fn receive_mapping(&mut self, with_rssi: bool) -> Result<Option<ReceivedMapping>, Error> {
        let buffer = self.drain_serial()?;
        if buffer.is_empty() {
            return Ok(None);
        }
        let (payload, rssi) = split_frame(&buffer, with_rssi);
        Ok(Some(ReceivedMapping {
            mapping: decode_mapping(payload)?,
            rssi,
        }))
    }

    /// Release the owned serial channel.
    pub fn release(self) -> S {
        self.serial
    }

    fn target(&self, addr_high: u8, addr_low: u8, channel: u8) -> Result<FrameTarget, Error> {
        if channel > self.model.max_channel() {
            return Err(Error::InvalidConfigurationValue("channel"));
        }
        Ok(FrameTarget {
            addr_high,
            addr_low,
            channel,
        })
    }

    /// Frame and transmit a payload, then wait for the module to finish.
    fn send_frame(&mut self, target: Option<FrameTarget>, payload: &[u8]) -> Result<(), Error> {
        let frame = build_frame(target, payload, self.configuration.option.sub_packet)?;
        self.serial.write(&frame)?;
        self.mode.wait_ready()
    }

    /// Read everything currently buffered, without blocking for more.
    fn drain_serial(&mut self) -> Result<Vec<u8, MAX_FRAME_LEN>, Error> {
        let mut buffer: Vec<u8, MAX_FRAME_LEN> = Vec::new();
        while self.serial.available() > 0 {
            let mut chunk = [0u8; 32];
            let n = self.serial.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            buffer
                .extend_from_slice(&chunk[..n])
                .map_err(|_| Error::PayloadTooLarge)?;
        }
        Ok(buffer)
    }

    /// Run one command exchange under the Configuration-mode bracket.
    fn exchange(
        &mut self,
        code: u8,
        start: u8,
        length: u8,
        payload: &[u8],
    ) -> Result<Vec<u8, MAX_EXCHANGE_LEN>, Error> {
        self.mode.enter(OperatingMode::Configuration)?;
        let result = self.write_then_read(code, start, length, payload);

        // drop back to Normal even when the exchange failed
        let back = self.mode.enter(OperatingMode::Normal);
        let response = result?;
        back?;
        Ok(response)
    }

    fn write_then_read(
        &mut self,
        code: u8,
        start: u8,
        length: u8,
        payload: &[u8],
    ) -> Result<Vec<u8, MAX_EXCHANGE_LEN>, Error> {
        self.serial.clear()?;
        let frame = command_frame(code, start, length, payload);
        self.serial.write(&frame)?;
        self.read_response(HEAD_LEN + usize::from(length))
    }

    /// Accumulate `expected` response bytes within the response window.
    ///
    /// The wrong-format reply is a bare head with no register bytes, so
    /// it is rejected as soon as the head arrives rather than waiting
    /// out the window for a payload that will never come.
    fn read_response(&mut self, expected: usize) -> Result<Vec<u8, MAX_EXCHANGE_LEN>, Error> {
        let mut response: Vec<u8, MAX_EXCHANGE_LEN> = Vec::new();
        let mut waited = 0;

        while response.len() < expected {
            let mut chunk = [0u8; MAX_EXCHANGE_LEN];
            let want = expected - response.len();
            let n = self.serial.read(&mut chunk[..want])?;
            if n > 0 {
                response
                    .extend_from_slice(&chunk[..n])
                    .map_err(|_| Error::ResponseTimeout)?;
                if response.len() >= HEAD_LEN && response[..HEAD_LEN] == WRONG_FORMAT_HEAD {
                    return Err(Error::HeadNotRecognized);
                }
                continue;
            }
            if waited >= self.mode.timeouts().response_timeout_ms {
                return Err(Error::ResponseTimeout);
            }
            self.mode.pause_ms(RESPONSE_POLL_STEP_MS);
            waited += RESPONSE_POLL_STEP_MS;
        }
        Ok(response)
    }
}

fn check_register_range(start: u8, length: u8) -> Result<(), Error> {
    let end = usize::from(start) + usize::from(length);
    if length == 0 || end > REGISTER_BLOCK_LEN {
        return Err(Error::InvalidConfigurationValue("length"));
    }
    Ok(())
}
