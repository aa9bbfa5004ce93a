// Licensed under the Apache-2.0 license

//! Blink the board LED using the GPIO port and the machine timer.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use panic_halt as _;

use minisoc_ddk::gpio::{Direction, GpioMmio, GpioPort};
use minisoc_ddk::memmap;
use minisoc_ddk::timer::{MachineTimer, MachineTimerMmio};

const LED_PIN: u32 = 0;

#[entry]
fn main() -> ! {
    let (gpio_regs, counter) = unsafe {
        (
            GpioMmio::new(memmap::GPIO0_BASE),
            MachineTimerMmio::new(memmap::MTIME_BASE),
        )
    };
    let mut port = GpioPort::new(gpio_regs);
    let mut timer = MachineTimer::new(counter, memmap::CLK);

    port.set_direction(LED_PIN, Direction::Output).unwrap();

    loop {
        port.toggle_pin(LED_PIN).unwrap();
        timer.delay_ms(500);
    }
}
