#![cfg_attr(not(test), no_std)]
//! E220 LoRa Module Driver
//!
//! This crate provides a type-safe driver for the EBYTE E220 family of
//! sub-GHz UART LoRa transceiver modules. The E220 is a half-duplex
//! module controlled over three wires beside the UART: two mode-select
//! inputs (M0/M1) and the AUX busy-status output.
//!
//! # Features
//! - Binary register command protocol (read, volatile/persistent write,
//!   reset) with echo verification
//! - Densely bit-packed configuration block decoded into typed fields
//!   and rebuilt through a validating builder
//! - Transparent and fixed-address transmission framing, with broadcast
//!   as a fixed send to the all-ones address
//! - Per-packet RSSI byte extraction with dBm conversion
//! - Text and key/value mapping payload serialization
//! - Model-aware capability lookup (frequency band, channel range,
//!   output power table)
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Main device facade composing the rest
//!   - Configuration-plane commands under the mode bracket
//!   - Data-plane send/receive with caller-driven polling
//!
//! - [`registers`]: The configuration register block
//!   - [`registers::Speed`]: UART framing and air data rate
//!   - [`registers::TransmitOption`]: sub-packets, ambient RSSI, power
//!   - [`registers::TransmissionMode`]: addressing, RSSI byte, LBT, WOR
//!
//! - [`commands`]: Command frame layout and response validation
//! - [`mode`]: M0/M1/AUX control and transition timing
//! - [`frame`]: Application frame assembly and teardown
//! - [`payload`]: Text and mapping payload serialization
//! - [`model`]: Per-variant capability lookup
//!
//! # Usage
//! The driver is hardware-agnostic: it takes any `embedded-hal` 1.0
//! digital pins and delay plus an implementation of [`SerialPort`] for
//! the UART.
//!
//! ```ignore
//! use lora_e220::{Device, ModuleModel, SaveMode, Configuration};
//!
//! let mut lora = Device::new(ModuleModel::E220_400T22D, serial, m0, m1, aux, delay);
//! lora.begin()?;
//!
//! let current = lora.read_configuration()?;
//! let wanted = Configuration::builder(current.model)
//!     .address(0x00, 0x01)
//!     .channel(23)?
//!     .fixed_address(true)
//!     .rssi_byte(true)
//!     .build();
//! lora.write_configuration(&wanted, SaveMode::Persistent)?;
//!
//! lora.send_fixed_message(0x00, 0x02, 23, "Hello, world!")?;
//! if lora.available() > 0 {
//!     if let Some(received) = lora.receive_message(true)? {
//!         // received.text, received.rssi
//!     }
//! }
//! ```
//!
//! # Important Notes
//! - Register commands only work in Configuration mode; the driver
//!   brackets every exchange with the mode controller automatically
//! - All waits are bounded by explicit [`Timeouts`]; nothing blocks
//!   indefinitely and nothing retries internally
//! - The driver never splits payloads; frames larger than the active
//!   sub-packet size are rejected before transmission
//! - The crypt registers are write-only and always read back as zero

pub mod commands;
pub mod device;
pub mod error;
pub mod frame;
pub mod mode;
pub mod model;
pub mod payload;
pub mod registers;
pub mod serial;

pub use commands::SaveMode;
pub use device::{Device, ReceivedMapping, ReceivedMessage, BROADCAST_ADDRESS};
pub use error::Error;
pub use frame::{FrameTarget, Rssi};
pub use mode::{ModeController, OperatingMode, Timeouts};
pub use model::ModuleModel;
pub use payload::Mapping;
pub use registers::*;
pub use serial::SerialPort;
