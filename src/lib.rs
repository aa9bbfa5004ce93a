// Licensed under the Apache-2.0 license

//! Board-support crate for the `MiniSoC` reference platform.
//!
//! Provides register-level drivers for the on-chip I2C master controller,
//! GPIO port, machine timer, and debug UART. All drivers own their register
//! block through a small register-access trait, so the same code runs against
//! memory-mapped hardware on target and against mock registers in host tests.

// Enforce Copilot coding guidelines - prevent panic-prone patterns in production code only
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::indexing_slicing))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), no_std)]
pub mod common;
pub mod gpio;
pub mod i2c;
pub mod memmap;
pub mod timer;
pub mod uart;
