//! Serial channel abstraction
//!
//! The E220 is driven over a plain half-duplex UART. Rather than binding to
//! one HAL's UART type, the driver talks to anything implementing
//! [`SerialPort`]: a blocking write, a non-blocking read, and a buffered
//! byte count. Platform crates adapt their UART handle to this trait;
//! tests substitute a scripted mock.
//!
//! `read` must never block: it copies whatever is already buffered (up to
//! the slice length) and returns the count, 0 included. Bounded blocking
//! reads are built on top of it by the driver's own poll loops, keeping
//! every timeout under the driver's control.

use crate::Error;

/// A byte channel to the module's UART.
pub trait SerialPort {
    /// Write all of `bytes` to the UART.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Copy buffered received bytes into `buf`, returning how many were
    /// copied. Returns 0 immediately when nothing is buffered.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    /// Number of received bytes currently buffered.
    fn available(&mut self) -> usize;

    /// Discard all buffered received bytes.
    fn clear(&mut self) -> Result<(), Error> {
        let mut scratch = [0u8; 16];
        while self.available() > 0 {
            self.read(&mut scratch)?;
        }
        Ok(())
    }
}
