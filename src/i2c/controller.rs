// Licensed under the Apache-2.0 license

//! I2C master controller state machine.
//!
//! Every public operation drives the controller through a bounded sequence of
//! register writes and status polls. The driver keeps no mirrored bus state;
//! each decision re-reads STATUS. The load-bearing invariant: each operation
//! that reached the bus issues a STOP and waits for BUSY to clear on every
//! exit path, success or failure, so back-to-back operations never deadlock
//! on a half-finished transaction.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Operation, SevenBitAddress};

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{Error, I2cConfig};
use crate::i2c::registers::{ctrl, status, I2cRegisters};

/// First probed address of the 7-bit range; 0x00..=0x07 are reserved.
pub const SCAN_FIRST: u8 = 0x08;
/// Last probed address; above 0x77 is reserved.
pub const SCAN_LAST: u8 = 0x77;
/// Size of the full scan range, capacity of [`I2cController::scan_devices`].
pub const SCAN_CAPACITY: usize = (SCAN_LAST - SCAN_FIRST + 1) as usize;

/// Settle time after writing the prescaler during `init`.
const INIT_SETTLE_US: u32 = 5;

/// I2C master driver owning one controller register block.
pub struct I2cController<R: I2cRegisters, L: Logger = NoOpLogger> {
    regs: R,
    config: I2cConfig,
    logger: L,
}

impl<R: I2cRegisters> I2cController<R> {
    pub fn new(regs: R, config: I2cConfig) -> Self {
        Self::with_logger(regs, config, NoOpLogger)
    }
}

impl<R: I2cRegisters, L: Logger> I2cController<R, L> {
    pub fn with_logger(regs: R, config: I2cConfig, logger: L) -> Self {
        Self {
            regs,
            config,
            logger,
        }
    }

    /// Program the clock divider and let the peripheral settle.
    pub fn init(&mut self, delay: &mut impl DelayNs) {
        self.regs.write_prescale(self.config.prescale());
        delay.delay_us(INIT_SETTLE_US);
    }

    /// Release the register block.
    #[must_use]
    pub fn release(self) -> R {
        self.regs
    }

    /// Write `bytes` to the device at `addr`.
    ///
    /// An empty slice is rejected with [`Error::Bus`] before any register
    /// access. The first NACK or error flag aborts the transfer; STOP is
    /// issued regardless of outcome.
    pub fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Err(Error::Bus);
        }
        self.wait_not_busy()?;
        let result = self.write_frames(addr, bytes);
        self.finish(result)
    }

    /// Read `buffer.len()` bytes from the device at `addr`.
    ///
    /// All bytes except the last are acknowledged to request more data;
    /// the final byte is read with ACK disabled, the standard termination
    /// cue. Same guards and STOP discipline as [`write`](Self::write).
    pub fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<(), Error> {
        if buffer.is_empty() {
            return Err(Error::Bus);
        }
        self.wait_not_busy()?;
        let result = self.read_frames(addr, buffer);
        self.finish(result)
    }

    /// Single-byte convenience form of [`write`](Self::write).
    pub fn write_byte(&mut self, addr: u8, byte: u8) -> Result<(), Error> {
        self.write(addr, &[byte])
    }

    /// Single-byte convenience form of [`read`](Self::read).
    pub fn read_byte(&mut self, addr: u8) -> Result<u8, Error> {
        let mut byte = 0u8;
        self.read(addr, core::slice::from_mut(&mut byte))?;
        Ok(byte)
    }

    /// Probe every address in [`SCAN_FIRST`]..=[`SCAN_LAST`] with an
    /// address-only write and record the ones that acknowledge into
    /// `found`, up to its capacity. Returns the number recorded.
    ///
    /// An empty slice returns 0 without touching the hardware.
    pub fn scan(&mut self, found: &mut [u8]) -> usize {
        if found.is_empty() {
            return 0;
        }
        let mut count = 0;
        for addr in SCAN_FIRST..=SCAN_LAST {
            if count == found.len() {
                break;
            }
            if self.wait_not_busy().is_err() {
                self.logger.log("i2c: scan aborted, bus busy");
                break;
            }
            let probe = self.send_byte(addr << 1);
            self.stop();
            if probe.is_ok() {
                if let Some(slot) = found.get_mut(count) {
                    *slot = addr;
                }
                count += 1;
            }
        }
        count
    }

    /// [`scan`](Self::scan) over the full range into an owned vector.
    pub fn scan_devices(&mut self) -> heapless::Vec<u8, SCAN_CAPACITY> {
        let mut found = [0u8; SCAN_CAPACITY];
        let count = self.scan(&mut found);
        let mut devices = heapless::Vec::new();
        for &addr in found.iter().take(count) {
            let _ = devices.push(addr);
        }
        devices
    }

    /// AddressPhase then DataPhase(write): one `send_byte` per frame.
    fn write_frames(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Error> {
        self.send_byte(addr << 1)?;
        for &byte in bytes {
            self.send_byte(byte)?;
        }
        Ok(())
    }

    /// AddressPhase with the read-direction bit, then DataPhase(read).
    fn read_frames(&mut self, addr: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.send_byte((addr << 1) | 0x01)?;
        let last = buffer.len() - 1;
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = self.recv_byte(i < last)?;
        }
        Ok(())
    }

    /// Clock one byte out and check the peer's acknowledge.
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.regs.write_data(u32::from(byte));
        self.regs.write_ctrl(ctrl::START);
        self.wait_done()?;
        if self.regs.read_status() & status::ACK == 0 {
            return Err(Error::Nack);
        }
        Ok(())
    }

    /// Clock one byte in; `ack` requests a further byte from the peer.
    fn recv_byte(&mut self, ack: bool) -> Result<u8, Error> {
        let mut command = ctrl::READ | ctrl::START;
        if ack {
            command |= ctrl::ACK_EN;
        }
        self.regs.write_ctrl(command);
        self.wait_done()?;
        Ok((self.regs.read_data() & 0xff) as u8)
    }

    /// StopPending: issue STOP, wait for it to complete, then wait for the
    /// bus to go free. Runs on every exit path once a transfer started, so
    /// poll failures here have nowhere to go and are dropped.
    fn stop(&mut self) {
        self.regs.write_ctrl(ctrl::STOP);
        let _ = self.wait_done();
        let _ = self.wait_not_busy();
    }

    fn finish(&mut self, result: Result<(), Error>) -> Result<(), Error> {
        self.stop();
        if result.is_err() {
            self.logger.log("i2c: transfer aborted");
        }
        result
    }

    /// Spin until BUSY clears. With a poll budget configured, exhaustion
    /// reports [`Error::Busy`].
    fn wait_not_busy(&mut self) -> Result<(), Error> {
        let mut budget = self.config.poll_budget;
        loop {
            if self.regs.read_status() & status::BUSY == 0 {
                return Ok(());
            }
            if let Some(polls) = budget.as_mut() {
                if *polls == 0 {
                    return Err(Error::Busy);
                }
                *polls -= 1;
            }
        }
    }

    /// Spin until DONE asserts, surfacing error flags seen along the way.
    /// With a poll budget configured, exhaustion reports [`Error::Timeout`].
    fn wait_done(&mut self) -> Result<(), Error> {
        let mut budget = self.config.poll_budget;
        loop {
            let flags = self.regs.read_status();
            if flags & status::DONE != 0 {
                return Ok(());
            }
            if flags & status::ERROR != 0 {
                return Err(Error::Bus);
            }
            if flags & status::ARB_LOST != 0 {
                return Err(Error::ArbitrationLost);
            }
            if let Some(polls) = budget.as_mut() {
                if *polls == 0 {
                    return Err(Error::Timeout);
                }
                *polls -= 1;
            }
        }
    }
}

impl<R: I2cRegisters, L: Logger> embedded_hal::i2c::ErrorType for I2cController<R, L> {
    type Error = Error;
}

/// The controller cannot generate a repeated START (the START bit doubles as
/// "begin next byte"), so `write_read` and multi-operation transactions run
/// as separate bus transactions with a STOP between phases.
impl<R: I2cRegisters, L: Logger> embedded_hal::i2c::I2c for I2cController<R, L> {
    fn read(&mut self, address: SevenBitAddress, read: &mut [u8]) -> Result<(), Self::Error> {
        self.read(address, read)
    }

    fn write(&mut self, address: SevenBitAddress, write: &[u8]) -> Result<(), Self::Error> {
        self.write(address, write)
    }

    fn write_read(
        &mut self,
        address: SevenBitAddress,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write(address, write)?;
        self.read(address, read)
    }

    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Read(buffer) => self.read(address, buffer)?,
                Operation::Write(bytes) => self.write(address, bytes)?,
            }
        }
        Ok(())
    }
}
