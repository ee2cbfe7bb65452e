//! Operating mode control
//!
//! The module selects its operating mode from the combined level of the two
//! mode-select inputs M0/M1 and signals readiness on the AUX line: AUX is
//! held low while the module is busy and released high when it can accept
//! the next command or data.
//!
//! Mode transitions have hardware timing requirements:
//! 1. Drive M0/M1 to the target mode's levels
//! 2. Wait a fixed settle delay for the module to latch the pins
//! 3. Poll AUX until it reports ready, bounded by a timeout
//!
//! [`ModeController::enter`] performs all three steps and is idempotent:
//! entering the already-active mode still waits on AUX, which guarantees
//! any prior operation has drained before the caller proceeds.
//!
//! Configuration commands are only accepted in [`OperatingMode::Configuration`];
//! the command layer brackets every exchange with
//! `enter(Configuration)` … `enter(Normal)`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::Error;

/// AUX poll step while waiting for ready.
const AUX_POLL_STEP_MS: u32 = 1;

/// Operating modes of the module, selected via M0/M1.
///
/// The module's deep-sleep state (both pins high) is also the only state
/// that accepts register commands, so `Configuration` and `Sleep` share a
/// pin code; they stay distinct here because the driver treats them
/// differently (commands versus power-down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// UART and radio both active; transparent/fixed transmission
    Normal,
    /// Transmissions carry a wake-up preamble for duty-cycled receivers
    WakeOnRadio,
    /// Radio off, UART at fixed parameters; accepts register commands
    Configuration,
    /// Lowest power state; UART and radio off
    Sleep,
}

impl OperatingMode {
    /// M0/M1 levels selecting this mode, as `(m0, m1)`.
    ///
    /// `(0, 1)` is the module's WOR-receive state, which treats register
    /// command frames as air data; the driver never selects it.
    fn pin_levels(self) -> (bool, bool) {
        match self {
            Self::Normal => (false, false),
            Self::WakeOnRadio => (true, false),
            Self::Configuration | Self::Sleep => (true, true),
        }
    }
}

/// Timing bounds for mode transitions and command exchanges.
///
/// Defaults are derived from the vendor datasheet and sit in the
/// low-second range; pass a custom value to the device constructor to
/// tighten or relax them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeouts {
    /// Delay after driving M0/M1 before AUX is sampled, in ms
    pub mode_settle_ms: u32,
    /// Bound on waiting for AUX to report ready, in ms
    pub aux_timeout_ms: u32,
    /// Bound on waiting for a command response, in ms
    pub response_timeout_ms: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            mode_settle_ms: 40,
            aux_timeout_ms: 1000,
            response_timeout_ms: 1000,
        }
    }
}

/// Owns the M0/M1 mode-select outputs and the AUX busy-status input.
#[derive(Debug)]
pub struct ModeController<M0, M1, AUX, D> {
    m0: M0,
    m1: M1,
    aux: AUX,
    delay: D,
    timeouts: Timeouts,
}

impl<M0, M1, AUX, D> ModeController<M0, M1, AUX, D>
where
    M0: OutputPin,
    M1: OutputPin,
    AUX: InputPin,
    D: DelayNs,
{
    pub fn new(m0: M0, m1: M1, aux: AUX, delay: D, timeouts: Timeouts) -> Self {
        Self {
            m0,
            m1,
            aux,
            delay,
            timeouts,
        }
    }

    /// Switch the module to `mode` and block until it reports ready.
    ///
    /// # Errors
    ///
    /// * [`Error::AuxTimeout`] - AUX never cleared within the bound; the
    ///   module is left in an indeterminate mode and the caller should
    ///   re-run initialization
    /// * [`Error::Pin`] - a pin handle reported an I/O failure
    pub fn enter(&mut self, mode: OperatingMode) -> Result<(), Error> {
        let (m0, m1) = mode.pin_levels();
        self.m0.set_state(m0.into()).map_err(|_| Error::Pin)?;
        self.m1.set_state(m1.into()).map_err(|_| Error::Pin)?;

        self.delay.delay_ms(self.timeouts.mode_settle_ms);
        self.wait_ready()
    }

    /// Block until AUX reports ready or the configured bound elapses.
    pub fn wait_ready(&mut self) -> Result<(), Error> {
        let mut waited = 0;
        loop {
            if self.aux.is_high().map_err(|_| Error::Pin)? {
                return Ok(());
            }
            if waited >= self.timeouts.aux_timeout_ms {
                return Err(Error::AuxTimeout);
            }
            self.delay.delay_ms(AUX_POLL_STEP_MS);
            waited += AUX_POLL_STEP_MS;
        }
    }

    /// Delay for `ms` milliseconds using the owned delay provider.
    pub(crate) fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    pub(crate) fn timeouts(&self) -> Timeouts {
        self.timeouts
    }
}
