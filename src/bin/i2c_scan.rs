// Licensed under the Apache-2.0 license

//! Scan the I2C bus and print every responding address over the UART.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use embedded_io::Write;
use panic_halt as _;

use minisoc_ddk::i2c::{I2cConfigBuilder, I2cController, I2cMmio};
use minisoc_ddk::memmap;
use minisoc_ddk::timer::{MachineTimer, MachineTimerMmio};
use minisoc_ddk::uart::{UartController, UartMmio};

#[entry]
fn main() -> ! {
    // Sole owner of each peripheral block; created once here.
    let (uart_regs, i2c_regs, counter) = unsafe {
        (
            UartMmio::new(memmap::UART0_BASE),
            I2cMmio::new(memmap::I2C0_BASE),
            MachineTimerMmio::new(memmap::MTIME_BASE),
        )
    };
    let mut uart = UartController::new(uart_regs);
    let mut timer = MachineTimer::new(counter, memmap::CLK);
    let mut i2c = I2cController::new(i2c_regs, I2cConfigBuilder::new().clk(memmap::CLK).build());

    i2c.init(&mut timer);

    writeln!(uart, "i2c: scanning 0x08..=0x77\r").unwrap();
    let devices = i2c.scan_devices();
    for addr in &devices {
        writeln!(uart, "i2c: device at 0x{addr:02x}\r").unwrap();
    }
    writeln!(uart, "i2c: {} device(s) found\r", devices.len()).unwrap();

    loop {
        cortex_m::asm::wfi();
    }
}
