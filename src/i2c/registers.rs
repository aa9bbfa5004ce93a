// Licensed under the Apache-2.0 license

//! Register-level interface of the `MiniSoC` I2C controller.
//!
//! The controller exposes four word-sized registers:
//!
//! | offset | register | access |
//! |--------|----------|--------|
//! | 0x0    | CTRL     | WO     |
//! | 0x4    | STATUS   | RO     |
//! | 0x8    | DATA     | RW     |
//! | 0xC    | PRESCALE | WO     |
//!
//! [`I2cRegisters`] abstracts the block so the driver state machine runs
//! unchanged against [`I2cMmio`] on target and against a scripted mock in
//! host tests.

use core::ptr;

/// CTRL command bits, independently combinable in one write.
pub mod ctrl {
    /// Begin a byte transfer. Also re-used mid-transaction to clock out the
    /// next byte; the controller does not emit a repeated START for it.
    pub const START: u32 = 1 << 0;
    pub const STOP: u32 = 1 << 1;
    pub const READ: u32 = 1 << 2;
    pub const ACK_EN: u32 = 1 << 3;
}

/// STATUS flags.
pub mod status {
    pub const BUSY: u32 = 1 << 0;
    pub const DONE: u32 = 1 << 1;
    pub const ERROR: u32 = 1 << 2;
    pub const ARB_LOST: u32 = 1 << 3;
    pub const ACK: u32 = 1 << 4;
}

/// Access to the controller register block.
pub trait I2cRegisters {
    fn write_ctrl(&mut self, value: u32);
    fn read_status(&self) -> u32;
    fn write_data(&mut self, value: u32);
    fn read_data(&self) -> u32;
    fn write_prescale(&mut self, value: u32);
}

/// Memory-mapped register block, the production implementation.
///
/// Owning this handle is owning the peripheral: construct it once per
/// controller instance and hand it to [`I2cController`](super::I2cController).
pub struct I2cMmio {
    base: *mut u32,
}

impl I2cMmio {
    /// # Safety
    ///
    /// `base` must be the base address of an I2C controller register block,
    /// and the caller must ensure no other handle to the same block exists.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            base: base as *mut u32,
        }
    }
}

// One logical owner per register block; the handle may move between contexts.
unsafe impl Send for I2cMmio {}

impl I2cRegisters for I2cMmio {
    fn write_ctrl(&mut self, value: u32) {
        unsafe { ptr::write_volatile(self.base, value) }
    }

    fn read_status(&self) -> u32 {
        unsafe { ptr::read_volatile(self.base.add(1)) }
    }

    fn write_data(&mut self, value: u32) {
        unsafe { ptr::write_volatile(self.base.add(2), value) }
    }

    fn read_data(&self) -> u32 {
        unsafe { ptr::read_volatile(self.base.add(2)) }
    }

    fn write_prescale(&mut self, value: u32) {
        unsafe { ptr::write_volatile(self.base.add(3), value) }
    }
}
