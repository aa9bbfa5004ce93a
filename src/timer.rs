// Licensed under the Apache-2.0 license

//! Machine-timer driver: monotonic tick source and busy-wait delays.
//!
//! The hardware is a free-running 64-bit counter clocked at the system rate,
//! exposed as two 32-bit halves. [`MachineTimer::ticks`] re-reads the high
//! word to get a coherent 64-bit value across the low-word carry. Delays are
//! busy-waits until a computed deadline; there is no interrupt path.

use core::ptr;

use embedded_hal::delay::DelayNs;
use fugit::HertzU32;

/// Access to the counter halves: LO at +0x0, HI at +0x4.
pub trait TickCounter {
    fn lo(&self) -> u32;
    fn hi(&self) -> u32;
}

/// Memory-mapped counter registers.
pub struct MachineTimerMmio {
    base: *const u32,
}

impl MachineTimerMmio {
    /// # Safety
    ///
    /// `base` must be the base address of the machine-timer register pair.
    /// The counter is read-only, so multiple handles are harmless, but the
    /// address must stay valid.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            base: base as *const u32,
        }
    }
}

unsafe impl Send for MachineTimerMmio {}

impl TickCounter for MachineTimerMmio {
    fn lo(&self) -> u32 {
        unsafe { ptr::read_volatile(self.base) }
    }

    fn hi(&self) -> u32 {
        unsafe { ptr::read_volatile(self.base.add(1)) }
    }
}

/// Timing driver over a free-running counter at a known clock rate.
pub struct MachineTimer<C: TickCounter> {
    counter: C,
    clk: HertzU32,
}

impl<C: TickCounter> MachineTimer<C> {
    pub fn new(counter: C, clk: HertzU32) -> Self {
        Self { counter, clk }
    }

    /// Coherent 64-bit counter value.
    pub fn ticks(&self) -> u64 {
        loop {
            let hi = self.counter.hi();
            let lo = self.counter.lo();
            // A carry between the two reads shows up as a changed high word.
            if hi == self.counter.hi() {
                return (u64::from(hi) << 32) | u64::from(lo);
            }
        }
    }

    /// Milliseconds since the counter started.
    pub fn now_ms(&self) -> u64 {
        self.ticks() / u64::from(self.clk.raw() / 1_000)
    }

    /// Microseconds since the counter started.
    pub fn now_us(&self) -> u64 {
        self.ticks() / u64::from(self.clk.raw() / 1_000_000)
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay_ticks(u64::from(ms) * u64::from(self.clk.raw() / 1_000));
    }

    pub fn delay_us(&mut self, us: u32) {
        self.delay_ticks(u64::from(us) * u64::from(self.clk.raw() / 1_000_000));
    }

    /// Release the counter handle.
    #[must_use]
    pub fn release(self) -> C {
        self.counter
    }

    fn delay_ticks(&self, ticks: u64) {
        let deadline = self.ticks().saturating_add(ticks);
        while self.ticks() < deadline {}
    }
}

impl<C: TickCounter> DelayNs for MachineTimer<C> {
    fn delay_ns(&mut self, ns: u32) {
        // Round up so short waits never complete early.
        let ticks = (u64::from(ns) * u64::from(self.clk.raw())).div_ceil(1_000_000_000);
        self.delay_ticks(ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Counter fed by a script of 64-bit snapshots, one per register read.
    /// Once the script runs out, the value advances by `auto_inc` per read.
    struct MockCounter {
        script: RefCell<VecDeque<u64>>,
        last: Cell<u64>,
        auto_inc: u64,
    }

    impl MockCounter {
        fn new(script: &[u64], auto_inc: u64) -> Self {
            Self {
                script: RefCell::new(script.iter().copied().collect()),
                last: Cell::new(0),
                auto_inc,
            }
        }

        fn current(&self) -> u64 {
            if let Some(value) = self.script.borrow_mut().pop_front() {
                self.last.set(value);
                value
            } else {
                let value = self.last.get().wrapping_add(self.auto_inc);
                self.last.set(value);
                value
            }
        }
    }

    impl TickCounter for MockCounter {
        fn lo(&self) -> u32 {
            self.current() as u32
        }

        fn hi(&self) -> u32 {
            (self.current() >> 32) as u32
        }
    }

    fn clk() -> HertzU32 {
        HertzU32::from_raw(50_000_000)
    }

    #[test]
    fn ticks_is_coherent_across_low_word_carry() {
        // Read order is hi, lo, hi. The first round straddles the carry
        // (high word changes), forcing a retry that returns the settled
        // value.
        let counter = MockCounter::new(
            &[
                0x0000_0000_ffff_ffff, // hi = 0
                0x0000_0001_0000_0005, // lo = 5
                0x0000_0001_0000_0005, // hi = 1, mismatch -> retry
                0x0000_0001_0000_0007, // hi = 1
                0x0000_0001_0000_0008, // lo = 8
                0x0000_0001_0000_0009, // hi = 1, match
            ],
            0,
        );
        let timer = MachineTimer::new(counter, clk());
        assert_eq!(timer.ticks(), 0x0000_0001_0000_0008);
    }

    #[test]
    fn tick_queries_scale_by_clock_rate() {
        // 50 MHz: 50_000 ticks per millisecond.
        let counter = MockCounter::new(&[500_000, 500_000, 500_000], 0);
        let timer = MachineTimer::new(counter, clk());
        assert_eq!(timer.now_ms(), 10);

        let counter = MockCounter::new(&[500_000, 500_000, 500_000], 0);
        let timer = MachineTimer::new(counter, clk());
        assert_eq!(timer.now_us(), 10_000);
    }

    #[test]
    fn delay_waits_until_deadline() {
        // Auto-advancing counter; the delay loop must terminate once the
        // deadline passes without consuming more reads than the advance
        // allows.
        let counter = MockCounter::new(&[], 25_000);
        let mut timer = MachineTimer::new(counter, clk());
        timer.delay_us(10); // 500 ticks at 50 MHz
        let final_ticks = timer.ticks();
        assert!(final_ticks >= 500);
    }

    #[test]
    fn zero_delay_returns_immediately() {
        let counter = MockCounter::new(&[], 1);
        let mut timer = MachineTimer::new(counter, clk());
        timer.delay_ms(0);
        timer.delay_us(0);
        // Only the deadline computations read the counter.
        assert!(timer.ticks() < 64);
    }

    #[test]
    fn delay_ns_rounds_up_to_one_tick() {
        // 1 ns at 50 MHz is a fraction of a tick; the wait must still be
        // at least one tick long rather than zero.
        let counter = MockCounter::new(&[], 1);
        let mut timer = MachineTimer::new(counter, clk());
        timer.delay_ns(1);
        assert!(timer.ticks() >= 1);
    }
}
