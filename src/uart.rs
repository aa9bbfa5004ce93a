// Licensed under the Apache-2.0 license

//! Polled debug UART.
//!
//! Minimal transmit/receive over two registers: STATUS at +0x0 (TX_READY
//! bit 0, RX_VALID bit 1) and DATA at +0x4. Transmit blocks on TX_READY;
//! receive is non-blocking in the `nb` style. The demos and
//! [`WriteLogger`](crate::common::WriteLogger) write through the
//! `embedded_io::Write` impl.

use core::convert::Infallible;
use core::ptr;

pub const TX_READY: u32 = 1 << 0;
pub const RX_VALID: u32 = 1 << 1;

/// Access to the UART register pair.
pub trait UartRegisters {
    fn read_status(&self) -> u32;
    fn write_data(&mut self, value: u32);
    fn read_data(&self) -> u32;
}

/// Memory-mapped UART registers.
pub struct UartMmio {
    base: *mut u32,
}

impl UartMmio {
    /// # Safety
    ///
    /// `base` must be the base address of a UART register block, and the
    /// caller must ensure no other handle to the same block exists.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            base: base as *mut u32,
        }
    }
}

unsafe impl Send for UartMmio {}

impl UartRegisters for UartMmio {
    fn read_status(&self) -> u32 {
        unsafe { ptr::read_volatile(self.base) }
    }

    fn write_data(&mut self, value: u32) {
        unsafe { ptr::write_volatile(self.base.add(1), value) }
    }

    fn read_data(&self) -> u32 {
        unsafe { ptr::read_volatile(self.base.add(1)) }
    }
}

pub struct UartController<R: UartRegisters> {
    regs: R,
}

impl<R: UartRegisters> UartController<R> {
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Release the register block.
    #[must_use]
    pub fn release(self) -> R {
        self.regs
    }

    /// Blocking transmit of one byte.
    pub fn write_byte(&mut self, byte: u8) {
        while self.regs.read_status() & TX_READY == 0 {}
        self.regs.write_data(u32::from(byte));
    }

    /// Non-blocking receive of one byte.
    pub fn read(&mut self) -> nb::Result<u8, Infallible> {
        if self.regs.read_status() & RX_VALID == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok((self.regs.read_data() & 0xff) as u8)
    }
}

impl<R: UartRegisters> embedded_io::ErrorType for UartController<R> {
    type Error = Infallible;
}

impl<R: UartRegisters> embedded_io::Write for UartController<R> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            self.write_byte(byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Bytes are pushed synchronously; nothing is buffered in software.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use embedded_io::Write;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct MockUart {
        tx: Vec<u8>,
        rx: RefCell<VecDeque<u8>>,
    }

    impl UartRegisters for MockUart {
        fn read_status(&self) -> u32 {
            let mut flags = TX_READY;
            if !self.rx.borrow().is_empty() {
                flags |= RX_VALID;
            }
            flags
        }

        fn write_data(&mut self, value: u32) {
            self.tx.push(value as u8);
        }

        fn read_data(&self) -> u32 {
            u32::from(self.rx.borrow_mut().pop_front().unwrap_or(0))
        }
    }

    #[test]
    fn write_all_transmits_every_byte() {
        let mut uart = UartController::new(MockUart::default());
        uart.write_all(b"scan done\r\n").unwrap();
        assert_eq!(uart.release().tx, b"scan done\r\n");
    }

    #[test]
    fn formatted_writes_work_through_embedded_io() {
        let mut uart = UartController::new(MockUart::default());
        write!(uart, "addr 0x{:02x}", 0x50).unwrap();
        assert_eq!(uart.release().tx, b"addr 0x50");
    }

    #[test]
    fn read_is_nonblocking() {
        let mut uart = UartController::new(MockUart::default());
        assert_eq!(uart.read(), Err(nb::Error::WouldBlock));

        uart.regs.rx.borrow_mut().extend([0x41, 0x42]);
        assert_eq!(nb::block!(uart.read()), Ok(0x41));
        assert_eq!(nb::block!(uart.read()), Ok(0x42));
        assert_eq!(uart.read(), Err(nb::Error::WouldBlock));
    }
}
