// Licensed under the Apache-2.0 license

//! `MiniSoC` GPIO port driver.
//!
//! One 32-bit port with direction, output, and input registers. Every per-pin
//! operation is a single register read/modify/write, bounds-checked against
//! [`PIN_MAX`]; there is no state machine and no retry logic. Pin handles for
//! the embedded-hal digital traits are borrowed from the port via
//! [`GpioPort::pin`].

use core::ptr;

/// Highest valid pin index.
pub const PIN_MAX: u32 = 31;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    InvalidPin,
}

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Access to the port register block: DIR at +0x0, OUT at +0x4, IN at +0x8.
pub trait GpioRegisters {
    fn read_dir(&self) -> u32;
    fn write_dir(&mut self, value: u32);
    fn read_out(&self) -> u32;
    fn write_out(&mut self, value: u32);
    fn read_in(&self) -> u32;
}

/// Memory-mapped port registers.
pub struct GpioMmio {
    base: *mut u32,
}

impl GpioMmio {
    /// # Safety
    ///
    /// `base` must be the base address of a GPIO port register block, and the
    /// caller must ensure no other handle to the same block exists.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            base: base as *mut u32,
        }
    }
}

unsafe impl Send for GpioMmio {}

impl GpioRegisters for GpioMmio {
    fn read_dir(&self) -> u32 {
        unsafe { ptr::read_volatile(self.base) }
    }

    fn write_dir(&mut self, value: u32) {
        unsafe { ptr::write_volatile(self.base, value) }
    }

    fn read_out(&self) -> u32 {
        unsafe { ptr::read_volatile(self.base.add(1)) }
    }

    fn write_out(&mut self, value: u32) {
        unsafe { ptr::write_volatile(self.base.add(1), value) }
    }

    fn read_in(&self) -> u32 {
        unsafe { ptr::read_volatile(self.base.add(2)) }
    }
}

/// Driver owning one GPIO port register block.
pub struct GpioPort<R: GpioRegisters> {
    regs: R,
}

impl<R: GpioRegisters> GpioPort<R> {
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Release the register block.
    #[must_use]
    pub fn release(self) -> R {
        self.regs
    }

    pub fn set_direction(&mut self, pin: u32, direction: Direction) -> Result<(), Error> {
        let mask = Self::mask(pin)?;
        let dir = self.regs.read_dir();
        match direction {
            Direction::Output => self.regs.write_dir(dir | mask),
            Direction::Input => self.regs.write_dir(dir & !mask),
        }
        Ok(())
    }

    /// Replace the whole direction register; bit set = output.
    pub fn set_direction_all(&mut self, mask: u32) {
        self.regs.write_dir(mask);
    }

    pub fn set_pin(&mut self, pin: u32) -> Result<(), Error> {
        let mask = Self::mask(pin)?;
        let out = self.regs.read_out();
        self.regs.write_out(out | mask);
        Ok(())
    }

    pub fn clear_pin(&mut self, pin: u32) -> Result<(), Error> {
        let mask = Self::mask(pin)?;
        let out = self.regs.read_out();
        self.regs.write_out(out & !mask);
        Ok(())
    }

    pub fn toggle_pin(&mut self, pin: u32) -> Result<(), Error> {
        let mask = Self::mask(pin)?;
        let out = self.regs.read_out();
        self.regs.write_out(out ^ mask);
        Ok(())
    }

    pub fn write_pin(&mut self, pin: u32, high: bool) -> Result<(), Error> {
        if high {
            self.set_pin(pin)
        } else {
            self.clear_pin(pin)
        }
    }

    pub fn read_pin(&self, pin: u32) -> Result<bool, Error> {
        let mask = Self::mask(pin)?;
        Ok(self.regs.read_in() & mask != 0)
    }

    /// Replace the whole output register.
    pub fn write_all(&mut self, value: u32) {
        self.regs.write_out(value);
    }

    pub fn read_all(&self) -> u32 {
        self.regs.read_in()
    }

    /// Borrow a validated pin handle implementing the embedded-hal digital
    /// traits. The port stays exclusively borrowed for the handle's lifetime.
    pub fn pin(&mut self, pin: u32) -> Result<Pin<'_, R>, Error> {
        Self::mask(pin)?;
        Ok(Pin { port: self, pin })
    }

    fn mask(pin: u32) -> Result<u32, Error> {
        if pin > PIN_MAX {
            return Err(Error::InvalidPin);
        }
        Ok(1 << pin)
    }
}

/// Borrowed handle to a single validated pin.
pub struct Pin<'a, R: GpioRegisters> {
    port: &'a mut GpioPort<R>,
    pin: u32,
}

impl<R: GpioRegisters> Pin<'_, R> {
    pub fn make_output(&mut self) {
        // Pin index was validated when the handle was created.
        let _ = self.port.set_direction(self.pin, Direction::Output);
    }

    pub fn make_input(&mut self) {
        let _ = self.port.set_direction(self.pin, Direction::Input);
    }
}

impl<R: GpioRegisters> embedded_hal::digital::ErrorType for Pin<'_, R> {
    type Error = Error;
}

impl<R: GpioRegisters> embedded_hal::digital::OutputPin for Pin<'_, R> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.port.clear_pin(self.pin)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.port.set_pin(self.pin)
    }
}

impl<R: GpioRegisters> embedded_hal::digital::StatefulOutputPin for Pin<'_, R> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        let mask = GpioPort::<R>::mask(self.pin)?;
        Ok(self.port.regs.read_out() & mask != 0)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }
}

impl<R: GpioRegisters> embedded_hal::digital::InputPin for Pin<'_, R> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.port.read_pin(self.pin)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
