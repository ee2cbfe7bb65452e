//! Application frame assembly and teardown
//!
//! Outgoing frames depend on the addressing scheme: transparent
//! transmission puts the payload on the UART unchanged, fixed addressing
//! prepends a `[addr_high, addr_low, channel]` header that the module
//! consumes for delivery filtering. The driver never splits a payload;
//! a frame longer than the configured sub-packet size is a caller error,
//! since sub-packetization is radio policy, not framing.
//!
//! Incoming frames are the mirror image, with one twist: when the
//! sender's configuration enables the per-packet RSSI byte, the module
//! appends a raw signal-strength reading after the payload.

use heapless::Vec;

use crate::{Error, SubPacketSize};

/// Largest frame the driver will assemble or buffer: the maximum
/// sub-packet size plus the fixed-addressing header.
pub const MAX_FRAME_LEN: usize = 200 + ADDRESS_HEADER_LEN;

/// Length of the fixed-addressing header.
pub const ADDRESS_HEADER_LEN: usize = 3;

/// Destination of a fixed-addressing frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameTarget {
    pub addr_high: u8,
    pub addr_low: u8,
    pub channel: u8,
}

/// Raw per-packet signal-strength reading.
///
/// The module reports received strength as a single byte; the vendor
/// datasheet defines the reading as `raw - 256` dBm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rssi(pub u8);

impl Rssi {
    /// Signal strength in dBm.
    pub fn dbm(self) -> i16 {
        i16::from(self.0) - 256
    }
}

/// Assemble an outgoing frame.
///
/// With a `target` the fixed-addressing header is prepended; without one
/// the payload is emitted unchanged. The finished frame must fit the
/// active sub-packet size.
///
/// # Errors
///
/// * [`Error::PayloadTooLarge`] - the frame would exceed `sub_packet`
pub fn build_frame(
    target: Option<FrameTarget>,
    payload: &[u8],
    sub_packet: SubPacketSize,
) -> Result<Vec<u8, MAX_FRAME_LEN>, Error> {
    let header_len = if target.is_some() { ADDRESS_HEADER_LEN } else { 0 };
    if header_len + payload.len() > sub_packet.max_len() {
        return Err(Error::PayloadTooLarge);
    }

    let mut frame = Vec::new();
    if let Some(target) = target {
        frame
            .extend_from_slice(&[target.addr_high, target.addr_low, target.channel])
            .map_err(|_| Error::PayloadTooLarge)?;
    }
    frame
        .extend_from_slice(payload)
        .map_err(|_| Error::PayloadTooLarge)?;
    Ok(frame)
}

/// Tear down an incoming frame into payload and optional RSSI reading.
///
/// With `rssi` set, the final byte is split off as the signal-strength
/// reading; the rest is the application payload. An empty buffer yields
/// an empty payload and no reading, which callers treat as "nothing
/// available yet".
pub fn split_frame(buffer: &[u8], rssi: bool) -> (&[u8], Option<Rssi>) {
    if rssi {
        match buffer.split_last() {
            Some((&raw, payload)) => (payload, Some(Rssi(raw))),
            None => (buffer, None),
        }
    } else {
        (buffer, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_frame_is_byte_identical_to_payload() {
        let frame = build_frame(None, b"hello", SubPacketSize::Bytes200).unwrap();
        assert_eq!(frame.as_slice(), b"hello");
    }

    #[test]
    fn fixed_frame_prepends_address_header() {
        let target = FrameTarget {
            addr_high: 0x00,
            addr_low: 0x01,
            channel: 23,
        };
        let frame = build_frame(Some(target), b"hello", SubPacketSize::Bytes200).unwrap();
        assert_eq!(frame.len(), 3 + 5);
        assert_eq!(&frame[..3], &[0x00, 0x01, 23]);
        assert_eq!(&frame[3..], b"hello");
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let payload = [0u8; 62];
        let target = FrameTarget {
            addr_high: 0,
            addr_low: 0,
            channel: 0,
        };
        // 62 bytes fit transparently but not with a 3-byte header
        assert!(build_frame(None, &payload, SubPacketSize::Bytes64).is_ok());
        assert_eq!(
            build_frame(Some(target), &payload, SubPacketSize::Bytes64),
            Err(Error::PayloadTooLarge)
        );
    }

    #[test]
    fn rssi_byte_is_split_from_the_tail() {
        let (payload, rssi) = split_frame(&[b'h', b'i', 0x64], true);
        assert_eq!(payload, b"hi");
        assert_eq!(rssi, Some(Rssi(0x64)));
        assert_eq!(rssi.unwrap().dbm(), -156);
    }

    #[test]
    fn without_rssi_the_buffer_is_the_payload() {
        let (payload, rssi) = split_frame(b"hi", false);
        assert_eq!(payload, b"hi");
        assert_eq!(rssi, None);
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let (payload, rssi) = split_frame(&[], true);
        assert!(payload.is_empty());
        assert_eq!(rssi, None);
    }
}
