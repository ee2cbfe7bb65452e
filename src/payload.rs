//! Message payload serialization
//!
//! Two payload shapes ride inside application frames:
//!
//! - **Text**: the message's UTF-8 bytes, no framing at all. Decoding is
//!   a UTF-8 validation of the received payload.
//! - **Mapping**: string keys to string values, length-prefixed on the
//!   wire. The format is a stable contract between sender and receiver:
//!
//!   ```text
//!   [count: u8] then count x ( [key_len: u8] key [value_len: u8] value )
//!   ```
//!
//!   Keys and values are UTF-8. Entry order on the wire follows the
//!   mapping's iteration order but carries no meaning; decoding
//!   reconstructs the same set of pairs regardless. A buffer that ends
//!   mid-pair, or carries bytes past the final pair, is malformed and
//!   rejected outright rather than truncated.

use heapless::{LinearMap, String, Vec};

use crate::Error;

/// Most entries a mapping payload may carry.
pub const MAX_MAPPING_ENTRIES: usize = 16;
/// Longest mapping key, in bytes.
pub const MAX_KEY_LEN: usize = 32;
/// Longest mapping value, in bytes.
pub const MAX_VALUE_LEN: usize = 64;
/// Longest text message, in bytes.
pub const MAX_MESSAGE_LEN: usize = 200;

/// A string-to-string mapping message.
///
/// Iteration follows insertion order.
pub type Mapping = LinearMap<String<MAX_KEY_LEN>, String<MAX_VALUE_LEN>, MAX_MAPPING_ENTRIES>;

/// Decode a text payload.
///
/// # Errors
///
/// * [`Error::MalformedText`] - the bytes are not valid UTF-8 or exceed
///   [`MAX_MESSAGE_LEN`]
pub fn decode_text(bytes: &[u8]) -> Result<String<MAX_MESSAGE_LEN>, Error> {
    let text = core::str::from_utf8(bytes).map_err(|_| Error::MalformedText)?;
    String::try_from(text).map_err(|_| Error::MalformedText)
}

/// Serialize a mapping into `out`.
///
/// # Errors
///
/// * [`Error::PayloadTooLarge`] - the serialized form exceeds the
///   output buffer's capacity, or a key/value exceeds 255 bytes
pub fn encode_mapping<const N: usize>(
    mapping: &Mapping,
    out: &mut Vec<u8, N>,
) -> Result<(), Error> {
    let count = u8::try_from(mapping.len()).map_err(|_| Error::PayloadTooLarge)?;
    out.push(count).map_err(|_| Error::PayloadTooLarge)?;

    for (key, value) in mapping.iter() {
        push_str(out, key.as_str())?;
        push_str(out, value.as_str())?;
    }
    Ok(())
}

fn push_str<const N: usize>(out: &mut Vec<u8, N>, s: &str) -> Result<(), Error> {
    let len = u8::try_from(s.len()).map_err(|_| Error::PayloadTooLarge)?;
    out.push(len).map_err(|_| Error::PayloadTooLarge)?;
    out.extend_from_slice(s.as_bytes())
        .map_err(|_| Error::PayloadTooLarge)
}

/// Deserialize a mapping payload.
///
/// # Errors
///
/// * [`Error::MalformedMapping`] - the buffer ends mid-pair, carries
///   trailing bytes, repeats a key, or overflows the mapping's capacity
/// * [`Error::MalformedText`] - a key or value is not valid UTF-8
pub fn decode_mapping(bytes: &[u8]) -> Result<Mapping, Error> {
    let (&count, mut rest) = bytes.split_first().ok_or(Error::MalformedMapping)?;

    let mut mapping = Mapping::new();
    for _ in 0..count {
        let (key, after_key) = take_str::<MAX_KEY_LEN>(rest)?;
        let (value, after_value) = take_str::<MAX_VALUE_LEN>(after_key)?;
        rest = after_value;
        if mapping.insert(key, value).map_err(|_| Error::MalformedMapping)?.is_some() {
            return Err(Error::MalformedMapping);
        }
    }
    if !rest.is_empty() {
        return Err(Error::MalformedMapping);
    }
    Ok(mapping)
}

fn take_str<const N: usize>(bytes: &[u8]) -> Result<(String<N>, &[u8]), Error> {
    let (&len, rest) = bytes.split_first().ok_or(Error::MalformedMapping)?;
    let len = usize::from(len);
    if rest.len() < len {
        return Err(Error::MalformedMapping);
    }
    let (raw, rest) = rest.split_at(len);
    let s = core::str::from_utf8(raw).map_err(|_| Error::MalformedText)?;
    let s = String::try_from(s).map_err(|_| Error::MalformedMapping)?;
    Ok((s, rest))
}
