// Licensed under the Apache-2.0 license

//! Scripted mock of the I2C controller register block for host tests.
//!
//! The mock plays the peripheral side of the register protocol: a CTRL write
//! with START "transfers" the byte most recently written to DATA (or latches
//! an incoming byte in read mode) and updates STATUS the way the hardware
//! would. Every register write is recorded so tests can assert on the exact
//! sequence the driver produced.

use core::cell::Cell;

use crate::i2c::registers::{ctrl, status, I2cRegisters};

pub struct MockI2c {
    status: Cell<u32>,
    /// Status reads left that still report BUSY, for entry-rejection tests.
    busy_reads: Cell<u32>,
    /// When set, START never completes: BUSY asserted, DONE never.
    hang: bool,
    /// 7-bit addresses that acknowledge their address byte.
    ack_addresses: Vec<u8>,
    /// Transaction byte index (0 = address byte) that raises ERROR.
    error_at: Option<usize>,
    /// Transaction byte index that raises ARB_LOST.
    arb_lost_at: Option<usize>,
    /// Transaction byte index that is not acknowledged.
    nack_at: Option<usize>,
    /// Bytes handed out on read transfers, in order.
    read_bytes: Vec<u8>,
    read_pos: usize,
    data_reg: u32,
    txn_bytes: usize,

    pub ctrl_log: Vec<u32>,
    pub data_log: Vec<u32>,
    pub prescale_log: Vec<u32>,
    /// ACK_EN bit of each read command, in order.
    pub ack_en_log: Vec<bool>,
    pub stop_count: usize,
}

impl MockI2c {
    pub fn new() -> Self {
        Self {
            status: Cell::new(0),
            busy_reads: Cell::new(0),
            hang: false,
            ack_addresses: Vec::new(),
            error_at: None,
            arb_lost_at: None,
            nack_at: None,
            read_bytes: Vec::new(),
            read_pos: 0,
            data_reg: 0,
            txn_bytes: 0,
            ctrl_log: Vec::new(),
            data_log: Vec::new(),
            prescale_log: Vec::new(),
            ack_en_log: Vec::new(),
            stop_count: 0,
        }
    }

    pub fn acks(mut self, addrs: &[u8]) -> Self {
        self.ack_addresses = addrs.to_vec();
        self
    }

    pub fn reads(mut self, bytes: &[u8]) -> Self {
        self.read_bytes = bytes.to_vec();
        self
    }

    pub fn error_at(mut self, index: usize) -> Self {
        self.error_at = Some(index);
        self
    }

    pub fn arb_lost_at(mut self, index: usize) -> Self {
        self.arb_lost_at = Some(index);
        self
    }

    pub fn nack_at(mut self, index: usize) -> Self {
        self.nack_at = Some(index);
        self
    }

    pub fn busy_for(self, reads: u32) -> Self {
        self.busy_reads.set(reads);
        self
    }

    pub fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Raw STATUS as the driver would see it on its next poll.
    pub fn status(&self) -> u32 {
        self.status.get()
    }
}

impl I2cRegisters for MockI2c {
    fn write_ctrl(&mut self, value: u32) {
        self.ctrl_log.push(value);

        if value & ctrl::STOP != 0 {
            // STOP always completes and frees the bus.
            self.stop_count += 1;
            self.txn_bytes = 0;
            self.status.set(status::DONE);
            return;
        }
        if value & ctrl::START == 0 {
            return;
        }
        if self.hang {
            self.status.set(status::BUSY);
            return;
        }

        if value & ctrl::READ != 0 {
            self.ack_en_log.push(value & ctrl::ACK_EN != 0);
            let byte = self.read_bytes.get(self.read_pos).copied().unwrap_or(0xff);
            self.read_pos += 1;
            self.data_reg = u32::from(byte);
            self.txn_bytes += 1;
            self.status.set(status::BUSY | status::DONE);
            return;
        }

        let index = self.txn_bytes;
        self.txn_bytes += 1;
        if self.error_at == Some(index) {
            self.status.set(status::BUSY | status::ERROR);
            return;
        }
        if self.arb_lost_at == Some(index) {
            self.status.set(status::BUSY | status::ARB_LOST);
            return;
        }

        let byte = self.data_log.last().copied().unwrap_or(0) as u8;
        let acked = if index == 0 {
            // Address byte: the direction bit does not affect the match.
            self.ack_addresses.contains(&(byte >> 1))
        } else {
            self.nack_at != Some(index)
        };
        let mut flags = status::BUSY | status::DONE;
        if acked {
            flags |= status::ACK;
        }
        self.status.set(flags);
    }

    fn read_status(&self) -> u32 {
        let busy = self.busy_reads.get();
        if busy > 0 {
            self.busy_reads.set(busy - 1);
            return self.status.get() | status::BUSY;
        }
        self.status.get()
    }

    fn write_data(&mut self, value: u32) {
        self.data_log.push(value);
    }

    fn read_data(&self) -> u32 {
        self.data_reg
    }

    fn write_prescale(&mut self, value: u32) {
        self.prescale_log.push(value);
    }
}
