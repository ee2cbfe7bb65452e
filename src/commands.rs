//! Register command protocol
//!
//! Configuration commands travel over the UART as a 3-byte head
//! `[code, start_address, length]`, followed by `length` register bytes
//! for writes. The module answers every accepted register command with a
//! read-style echo: the head `[0xC1, start_address, length]` and the
//! `length` registers as it now holds them. A module that does not
//! recognize the command answers `0xFF 0xFF 0xFF` instead, which the
//! head check rejects.
//!
//! Commands are only accepted in
//! [`Configuration`](crate::OperatingMode::Configuration) mode; the
//! device facade brackets each exchange with the mode controller and
//! performs the bounded response read. This module owns the frame
//! layout and the head validation.

use heapless::Vec;

use crate::registers::REGISTER_BLOCK_LEN;
use crate::Error;

/// Read registers starting at an address.
pub const CMD_READ_CONFIGURATION: u8 = 0xC1;
/// Write registers, persisted across power-down.
pub const CMD_WRITE_PERSISTENT: u8 = 0xC0;
/// Write registers, lost on power-down.
pub const CMD_WRITE_TEMPORARY: u8 = 0xC2;
/// Reboot the module.
pub const CMD_RESET: u8 = 0xC4;

/// Length of the command/response head.
pub(crate) const HEAD_LEN: usize = 3;

/// Bare head the module answers with when it does not recognize a
/// command; no register bytes follow it.
pub(crate) const WRONG_FORMAT_HEAD: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Largest command or response frame: head plus the full register block.
pub(crate) const MAX_EXCHANGE_LEN: usize = HEAD_LEN + REGISTER_BLOCK_LEN;

/// Persistence of a configuration write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SaveMode {
    /// Settings survive power-down (`0xC0`)
    Persistent,
    /// Settings revert on power-down (`0xC2`)
    Temporary,
}

impl SaveMode {
    pub(crate) fn command_code(self) -> u8 {
        match self {
            Self::Persistent => CMD_WRITE_PERSISTENT,
            Self::Temporary => CMD_WRITE_TEMPORARY,
        }
    }
}

/// Assemble a command frame: head plus optional write payload.
pub(crate) fn command_frame(
    code: u8,
    start: u8,
    length: u8,
    payload: &[u8],
) -> Vec<u8, MAX_EXCHANGE_LEN> {
    let mut frame = Vec::new();
    // capacity covers the largest legal exchange; callers never pass more
    let _ = frame.extend_from_slice(&[code, start, length]);
    let _ = frame.extend_from_slice(payload);
    frame
}

/// Check a response head against the issued command and return the
/// trailing register bytes.
///
/// # Errors
///
/// * [`Error::HeadNotRecognized`] - the echo does not match the issued
///   start address and length, or is not a register echo at all;
///   protocol desync or unsupported firmware
pub(crate) fn validate_response(response: &[u8], start: u8, length: u8) -> Result<&[u8], Error> {
    if response.len() != HEAD_LEN + usize::from(length) {
        return Err(Error::HeadNotRecognized);
    }
    if response[0] != CMD_READ_CONFIGURATION || response[1] != start || response[2] != length {
        return Err(Error::HeadNotRecognized);
    }
    Ok(&response[HEAD_LEN..])
}
