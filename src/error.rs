//! Driver error and status codes
//!
//! Every fallible driver operation returns `Result<T, Error>`; the `Ok` arm
//! is the "success" status of the module's command protocol and [`Error`]
//! enumerates every way an exchange can fail. Each variant carries a fixed
//! human-readable description so callers can report outcomes without
//! maintaining their own lookup table.
//!
//! The variants fall into three groups:
//! - Caller errors detected before any byte reaches the wire
//!   ([`Error::InvalidConfigurationValue`], [`Error::PayloadTooLarge`]).
//!   These are never worth retrying unchanged.
//! - Transient/environmental failures ([`Error::AuxTimeout`],
//!   [`Error::ResponseTimeout`]) that a caller may retry with backoff.
//! - Protocol-level inconsistencies ([`Error::HeadNotRecognized`],
//!   [`Error::WriteVerificationFailed`]) that suggest desync or
//!   incompatible firmware; re-run [`begin`](crate::Device::begin) before
//!   retrying.

/// Errors returned by driver operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The module never reported ready after power-up or reset
    InitializationFailed,
    /// The AUX busy line did not clear within the configured bound
    AuxTimeout,
    /// No reply, or an incomplete reply, within the response read window
    ResponseTimeout,
    /// The reply head did not echo the issued command
    HeadNotRecognized,
    /// A configuration field value is outside its legal set for the model.
    /// Carries the name of the offending field.
    InvalidConfigurationValue(&'static str),
    /// An outgoing frame would exceed the configured sub-packet size
    PayloadTooLarge,
    /// Incoming mapping bytes were truncated mid-pair or carried trailing data
    MalformedMapping,
    /// Incoming text bytes were not valid UTF-8
    MalformedText,
    /// The module echoed a different register block than was written
    WriteVerificationFailed,
    /// The serial channel reported an I/O failure
    Serial,
    /// A mode-select or busy-status pin reported an I/O failure
    Pin,
}

impl Error {
    /// Fixed description for this status code.
    pub fn description(self) -> &'static str {
        match self {
            Self::InitializationFailed => "Device did not become ready during initialization",
            Self::AuxTimeout => "Timeout waiting for AUX busy line to clear",
            Self::ResponseTimeout => "Timeout waiting for command response",
            Self::HeadNotRecognized => "Response head does not match the issued command",
            Self::InvalidConfigurationValue(_) => "Configuration value out of range for model",
            Self::PayloadTooLarge => "Payload exceeds the configured sub-packet size",
            Self::MalformedMapping => "Mapping payload is truncated or has trailing bytes",
            Self::MalformedText => "Text payload is not valid UTF-8",
            Self::WriteVerificationFailed => "Device echoed a different configuration than written",
            Self::Serial => "Serial channel I/O failure",
            Self::Pin => "Mode or busy pin I/O failure",
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidConfigurationValue(field) => {
                write!(f, "{}: {}", self.description(), field)
            }
            _ => f.write_str(self.description()),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display_names_the_field() {
        let rendered = std::format!("{}", Error::InvalidConfigurationValue("channel"));
        assert!(rendered.ends_with("channel"));
    }

    #[test]
    fn every_variant_has_a_description() {
        let variants = [
            Error::InitializationFailed,
            Error::AuxTimeout,
            Error::ResponseTimeout,
            Error::HeadNotRecognized,
            Error::InvalidConfigurationValue("channel"),
            Error::PayloadTooLarge,
            Error::MalformedMapping,
            Error::MalformedText,
            Error::WriteVerificationFailed,
            Error::Serial,
            Error::Pin,
        ];
        for v in variants {
            assert!(!v.description().is_empty());
        }
    }
}
