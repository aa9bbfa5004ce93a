// Licensed under the Apache-2.0 license

//! Peripheral memory map for the `MiniSoC` reference bitstream.
//!
//! Base addresses are fixed by the bitstream; the demo binaries build their
//! MMIO handles from these constants. Boards with a different map construct
//! the handles from their own addresses instead.

use fugit::HertzU32;

pub const UART0_BASE: usize = 0x1000_0000;
pub const GPIO0_BASE: usize = 0x1001_0000;
pub const I2C0_BASE: usize = 0x1002_0000;
/// Free-running machine timer, LO word at +0x0, HI word at +0x4.
pub const MTIME_BASE: usize = 0x1003_0000;

/// System clock feeding the machine timer and the I2C prescaler.
pub const CLK_HZ: u32 = 50_000_000;
pub const CLK: HertzU32 = HertzU32::from_raw(CLK_HZ);
