// Licensed under the Apache-2.0 license

//! Shared infrastructure for the driver modules.
//!
//! The drivers report coarse events through the [`Logger`] trait instead of
//! depending on a concrete output device. Production firmware routes logs to
//! the UART via [`WriteLogger`]; library defaults and tests use [`NoOpLogger`].

/// Sink for coarse driver events.
pub trait Logger {
    fn log(&mut self, msg: &str);
}

/// Logger that discards everything. Default for all drivers.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&mut self, _msg: &str) {}
}

/// Logger writing lines to any `embedded_io::Write` sink, typically the
/// debug UART.
pub struct WriteLogger<W: embedded_io::Write> {
    writer: W,
}

impl<W: embedded_io::Write> WriteLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give the underlying writer back.
    pub fn release(self) -> W {
        self.writer
    }
}

impl<W: embedded_io::Write> Logger for WriteLogger<W> {
    fn log(&mut self, msg: &str) {
        // Logging never propagates errors into the driver that logs.
        let _ = self.writer.write_all(msg.as_bytes());
        let _ = self.writer.write_all(b"\r\n");
    }
}
