// Licensed under the Apache-2.0 license

//! `MiniSoC` I2C master driver.
//!
//! The controller is a simple byte-at-a-time master: software writes one
//! byte to DATA, kicks it off through CTRL, and polls STATUS for completion
//! and the peer's acknowledge. This module owns the protocol state machine
//! on top of that register interface, including the full-bus device scan.

pub mod common;
pub mod controller;
pub mod registers;

#[cfg(test)]
pub(crate) mod mock;

pub use common::{Error, I2cConfig, I2cConfigBuilder, I2cSpeed};
pub use controller::{I2cController, SCAN_CAPACITY, SCAN_FIRST, SCAN_LAST};
pub use registers::{I2cMmio, I2cRegisters};
