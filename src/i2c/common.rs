// Licensed under the Apache-2.0 license

//! Common types and constants for the `MiniSoC` I2C driver.
//!
//! This module provides shared definitions for error handling and controller
//! configuration used across the I2C driver implementation.

use fugit::HertzU32;

use crate::memmap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum I2cSpeed {
    Standard = 100_000,
    Fast = 400_000,
}

/// I2C driver failure kinds.
///
/// [`Error::code`] gives the integer channel the rest of the board firmware
/// historically consumed: `OK` is `0` (the `Ok(())` arm), every variant here
/// is a distinct negative value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Invalid argument, or the ERROR status flag asserted mid-transfer.
    Bus,
    /// Another master won the bus (ARB_LOST status flag).
    ArbitrationLost,
    /// Transfer completed but the peer did not acknowledge.
    Nack,
    /// Bus never became free at operation entry (requires a poll budget).
    Busy,
    /// DONE never asserted within the configured poll budget.
    Timeout,
}

impl Error {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Error::Bus => -1,
            Error::ArbitrationLost => -2,
            Error::Nack => -3,
            Error::Busy => -4,
            Error::Timeout => -5,
        }
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
        match self {
            Error::Bus => ErrorKind::Bus,
            Error::ArbitrationLost => ErrorKind::ArbitrationLoss,
            Error::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Error::Busy | Error::Timeout => ErrorKind::Other,
        }
    }
}

/// Controller configuration.
///
/// `poll_budget` bounds every status-poll loop; `None` spins forever, which
/// matches the hardware bring-up default. Tests and fail-fast firmware set a
/// budget so a dead peripheral surfaces as [`Error::Busy`] or
/// [`Error::Timeout`] instead of a hang.
pub struct I2cConfig {
    pub speed: I2cSpeed,
    pub clk: HertzU32,
    pub prescale: Option<u32>,
    pub poll_budget: Option<u32>,
}

impl I2cConfig {
    /// Clock-divider value written to PRESCALE during `init`.
    #[must_use]
    pub fn prescale(&self) -> u32 {
        match self.prescale {
            Some(raw) => raw,
            None => (self.clk.raw() / (5 * self.speed as u32)).saturating_sub(1),
        }
    }
}

pub struct I2cConfigBuilder {
    speed: I2cSpeed,
    clk: HertzU32,
    prescale: Option<u32>,
    poll_budget: Option<u32>,
}

impl Default for I2cConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: I2cSpeed::Standard,
            clk: memmap::CLK,
            prescale: None,
            poll_budget: None,
        }
    }
    #[must_use]
    pub fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }
    #[must_use]
    pub fn clk(mut self, clk: HertzU32) -> Self {
        self.clk = clk;
        self
    }
    /// Override the computed divider with a raw register value.
    #[must_use]
    pub fn prescale_raw(mut self, raw: u32) -> Self {
        self.prescale = Some(raw);
        self
    }
    #[must_use]
    pub fn poll_budget(mut self, polls: u32) -> Self {
        self.poll_budget = Some(polls);
        self
    }
    #[must_use]
    pub fn build(self) -> I2cConfig {
        I2cConfig {
            speed: self.speed,
            clk: self.clk,
            prescale: self.prescale,
            poll_budget: self.poll_budget,
        }
    }
}
