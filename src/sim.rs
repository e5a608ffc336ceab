// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Simulated Sentinel board.
//!
//! [`SimBus`] implements `embedded_hal::i2c::I2c` and answers at the PCA9685, MCP23017 and MCP3221
//! addresses with register-level models of each chip, so the whole driver stack can run on a
//! desktop without hardware. [`SimDelay`] records requested delays instead of sleeping.
//!
//! The models cover what the board uses:
//! - PCA9685: register pointer auto-increment only while `MODE1.AI` is set, and `PRESCALE` only
//!   writable while `MODE1.SLEEP` is set.
//! - MCP23017: sequential register access, GPIO writes landing in OLAT, input levels with IPOL,
//!   interrupt-on-change with INTF/INTCAP, and a rising-edge counter per pin.
//! - MCP3221: returns a settable 12-bit sample.

use embedded_hal::{
    delay::DelayNs,
    i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation},
};

use crate::drivers::{mcp23017, mcp3221, pca9685};
use crate::hw::NUM_PINS;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SimError {
    /// Nothing answered at this address.
    NoAcknowledge(u8),
}

impl i2c::Error for SimError {
    fn kind(&self) -> ErrorKind {
        match self {
            SimError::NoAcknowledge(_) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
        }
    }
}

impl core::fmt::Display for SimError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SimError::NoAcknowledge(addr) => write!(f, "no device at {:#04x}", addr),
        }
    }
}

/// Power-on MODE1: SLEEP | ALLCALL.
const PCA_MODE1_POR: u8 = 0x11;
const MCP_REGS: usize = 0x16;

struct SimPca9685 {
    address: u8,
    regs: [u8; 256],
    pointer: u8,
}

impl SimPca9685 {
    fn new(address: u8) -> Self {
        let mut regs = [0u8; 256];
        regs[pca9685::reg::MODE1 as usize] = PCA_MODE1_POR;
        regs[pca9685::reg::PRESCALE as usize] = 0x1E;
        Self {
            address,
            regs,
            pointer: 0,
        }
    }

    fn auto_increment(&self) -> bool {
        self.regs[pca9685::reg::MODE1 as usize] & pca9685::mode1::AI != 0
    }

    fn advance(&mut self) {
        if self.auto_increment() {
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        let Some((&reg, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = reg;

        for &byte in data {
            let reg = self.pointer;
            let sleeping = self.regs[pca9685::reg::MODE1 as usize] & pca9685::mode1::SLEEP != 0;

            match reg {
                pca9685::reg::PRESCALE if !sleeping => {}
                // RESTART is cleared by writing 1 and never reads back set here.
                pca9685::reg::MODE1 => self.regs[reg as usize] = byte & !pca9685::mode1::RESTART,
                _ => self.regs[reg as usize] = byte,
            }
            self.advance();
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.regs[self.pointer as usize];
            self.advance();
        }
    }
}

struct SimMcp23017 {
    address: u8,
    regs: [u8; MCP_REGS],
    pointer: u8,
    inputs: u16,
    rising_edges: [u32; NUM_PINS as usize],
}

impl SimMcp23017 {
    fn new(address: u8) -> Self {
        let mut regs = [0u8; MCP_REGS];
        // IODIR resets to all inputs
        regs[mcp23017::reg::IODIR as usize] = 0xFF;
        regs[mcp23017::reg::IODIR as usize + 1] = 0xFF;
        Self {
            address,
            regs,
            pointer: 0,
            inputs: 0,
            rising_edges: [0; NUM_PINS as usize],
        }
    }

    fn port(&self, reg: u8) -> u16 {
        u16::from_le_bytes([self.regs[reg as usize], self.regs[reg as usize + 1]])
    }

    fn set_port(&mut self, reg: u8, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs[reg as usize] = lo;
        self.regs[reg as usize + 1] = hi;
    }

    /// Pin levels as seen through the GPIO register.
    fn gpio(&self) -> u16 {
        let iodir = self.port(mcp23017::reg::IODIR);
        let ipol = self.port(mcp23017::reg::IPOL);
        let olat = self.port(mcp23017::reg::OLAT);
        (olat & !iodir) | ((self.inputs ^ ipol) & iodir)
    }

    fn advance(&mut self) {
        self.pointer = (self.pointer + 1) % MCP_REGS as u8;
    }

    fn write_olat_byte(&mut self, reg: u8, byte: u8) {
        let before = self.port(mcp23017::reg::OLAT);
        self.regs[reg as usize] = byte;
        let after = self.port(mcp23017::reg::OLAT);

        let rising = !before & after;
        for pin in 0..NUM_PINS {
            if rising & (1 << pin) != 0 {
                self.rising_edges[pin as usize] += 1;
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        let Some((&reg, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = reg % MCP_REGS as u8;

        for &byte in data {
            let reg = self.pointer;
            match reg {
                // GPIO writes go to the output latch
                r if r == mcp23017::reg::GPIO || r == mcp23017::reg::GPIO + 1 => {
                    self.write_olat_byte(r + 2, byte)
                }
                r if r == mcp23017::reg::OLAT || r == mcp23017::reg::OLAT + 1 => {
                    self.write_olat_byte(r, byte)
                }
                // read-only
                r if (mcp23017::reg::INTF..mcp23017::reg::GPIO).contains(&r) => {}
                // IOCON is mirrored at 0x0B
                r if r == mcp23017::reg::IOCON || r == mcp23017::reg::IOCON + 1 => {
                    self.regs[mcp23017::reg::IOCON as usize] = byte;
                    self.regs[mcp23017::reg::IOCON as usize + 1] = byte;
                }
                r => self.regs[r as usize] = byte,
            }
            self.advance();
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            let reg = self.pointer;
            *byte = match reg {
                r if r == mcp23017::reg::GPIO => self.gpio().to_le_bytes()[0],
                r if r == mcp23017::reg::GPIO + 1 => self.gpio().to_le_bytes()[1],
                r if r == mcp23017::reg::INTCAP || r == mcp23017::reg::INTCAP + 1 => {
                    let value = self.regs[r as usize];
                    // Reading INTCAPx clears the port's interrupt
                    self.regs[(mcp23017::reg::INTF + (r - mcp23017::reg::INTCAP)) as usize] = 0;
                    value
                }
                r => self.regs[r as usize],
            };
            self.advance();
        }
    }

    fn set_input(&mut self, pin: u8, high: bool) {
        let mask = 1u16 << pin;
        let before = self.gpio();
        if high {
            self.inputs |= mask;
        } else {
            self.inputs &= !mask;
        }
        let after = self.gpio();

        let enabled = self.port(mcp23017::reg::GPINTEN) & self.port(mcp23017::reg::IODIR);
        let intcon = self.port(mcp23017::reg::INTCON);
        let defval = self.port(mcp23017::reg::DEFVAL);

        // INTCON set: compare against DEFVAL. Clear: fire on any change.
        let triggered = enabled & ((intcon & (after ^ defval)) | (!intcon & (after ^ before)));
        if triggered & mask != 0 {
            let intf = self.port(mcp23017::reg::INTF) | mask;
            self.set_port(mcp23017::reg::INTF, intf);
            self.set_port(mcp23017::reg::INTCAP, after);
        }
    }
}

/// In-memory I2C bus with the three Sentinel devices attached.
pub struct SimBus {
    pca: SimPca9685,
    mcp: SimMcp23017,
    adc_address: u8,
    adc_raw: u16,
    transactions: usize,
}

impl SimBus {
    /// A board with devices at the default addresses.
    pub fn new() -> Self {
        Self::with_addresses(
            pca9685::DEFAULT_ADDRESS,
            mcp23017::DEFAULT_ADDRESS,
            mcp3221::DEFAULT_ADDRESS,
        )
    }

    pub fn with_addresses(pwm: u8, ioe: u8, adc: u8) -> Self {
        Self {
            pca: SimPca9685::new(pwm),
            mcp: SimMcp23017::new(ioe),
            adc_address: adc,
            adc_raw: 0,
            transactions: 0,
        }
    }

    /// Number of transactions addressed to any device so far.
    #[inline]
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    pub fn pca9685_register(&self, reg: u8) -> u8 {
        self.pca.regs[reg as usize]
    }

    pub fn mcp23017_register(&self, reg: u8) -> u8 {
        self.mcp.regs[reg as usize % MCP_REGS]
    }

    /// Duty of a PWM channel decoded from the simulated counters.
    pub fn pwm_duty(&self, channel: u8) -> u16 {
        let base = pca9685::channel_reg(channel) as usize;
        let r = &self.pca.regs[base..base + 4];
        pca9685::duty_for_counters(
            u16::from_le_bytes([r[0], r[1]]),
            u16::from_le_bytes([r[2], r[3]]),
        )
    }

    /// Drive an external level onto an expander pin. Pins past 15 are ignored.
    pub fn set_input(&mut self, pin: u8, high: bool) {
        if pin >= NUM_PINS {
            log::warn!("sim: no expander pin {}", pin);
            return;
        }
        self.mcp.set_input(pin, high);
    }

    /// Level an expander pin shows to the outside world. Pins past 15 read low.
    pub fn pin_level(&self, pin: u8) -> bool {
        pin < NUM_PINS && self.mcp.gpio() & (1 << pin) != 0
    }

    /// Whether an expander pin is configured as an output. Pins past 15 never are.
    pub fn is_output(&self, pin: u8) -> bool {
        pin < NUM_PINS && self.mcp.port(mcp23017::reg::IODIR) & (1 << pin) == 0
    }

    /// Low-to-high transitions of a pin's output latch, 0 for pins past 15.
    pub fn rising_edges(&self, pin: u8) -> u32 {
        self.mcp
            .rising_edges
            .get(pin as usize)
            .copied()
            .unwrap_or(0)
    }

    pub fn set_adc_raw(&mut self, raw: u16) {
        self.adc_raw = raw & mcp3221::FULL_SCALE;
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for SimBus {
    type Error = SimError;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.pca.address && address != self.mcp.address && address != self.adc_address
        {
            return Err(SimError::NoAcknowledge(address));
        }
        self.transactions += 1;

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) if address == self.pca.address => self.pca.write(bytes),
                Operation::Read(buf) if address == self.pca.address => self.pca.read(buf),
                Operation::Write(bytes) if address == self.mcp.address => self.mcp.write(bytes),
                Operation::Read(buf) if address == self.mcp.address => self.mcp.read(buf),
                Operation::Write(_) => {}
                Operation::Read(buf) => {
                    let sample = self.adc_raw.to_be_bytes();
                    for (i, byte) in buf.iter_mut().enumerate() {
                        *byte = sample.get(i).copied().unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay that only records how long it was asked to wait.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimDelay {
    elapsed_ns: u64,
}

impl SimDelay {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }

    #[inline]
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns / 1_000
    }

    pub fn reset(&mut self) {
        self.elapsed_ns = 0;
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_ns += us as u64 * 1_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ns += ms as u64 * 1_000_000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_address_is_not_acknowledged() {
        let mut bus = SimBus::new();
        assert_eq!(bus.write(0x70, &[0x00]), Err(SimError::NoAcknowledge(0x70)));
        assert_eq!(bus.transactions(), 0);
    }

    #[test]
    fn pca_pointer_stays_put_without_auto_increment() {
        let mut bus = SimBus::new();
        bus.write(0x40, &[pca9685::reg::MODE1, 0x00]).unwrap();
        bus.write(0x40, &[0x06, 0xAA, 0xBB]).unwrap();
        assert_eq!(bus.pca9685_register(0x06), 0xBB);
        assert_eq!(bus.pca9685_register(0x07), 0x00);
    }

    #[test]
    fn pca_prescale_ignored_while_awake() {
        let mut bus = SimBus::new();
        bus.write(0x40, &[pca9685::reg::MODE1, 0x00]).unwrap();
        bus.write(0x40, &[pca9685::reg::PRESCALE, 0x79]).unwrap();
        assert_eq!(bus.pca9685_register(pca9685::reg::PRESCALE), 0x1E);
    }

    #[test]
    fn mcp_counts_rising_edges() {
        let mut bus = SimBus::new();
        for level in [1u8, 0, 1, 1, 0] {
            bus.write(0x20, &[mcp23017::reg::OLAT, level]).unwrap();
        }
        assert_eq!(bus.rising_edges(0), 2);
    }

    #[test]
    fn adc_returns_big_endian_sample() {
        let mut bus = SimBus::new();
        bus.set_adc_raw(0x0123);
        let mut buf = [0u8; 2];
        bus.read(0x4D, &mut buf).unwrap();
        assert_eq!(buf, [0x01, 0x23]);
    }

    #[test]
    fn missing_expander_pins_are_ignored() {
        let mut bus = SimBus::new();
        bus.set_input(16, true);
        bus.set_input(200, true);

        assert!(!bus.pin_level(16));
        assert!(!bus.is_output(16));
        assert_eq!(bus.rising_edges(16), 0);
        assert_eq!(bus.mcp23017_register(mcp23017::reg::INTF), 0);
    }

    #[test]
    fn delay_accumulates() {
        let mut delay = SimDelay::new();
        delay.delay_ms(2);
        delay.delay_us(500);
        assert_eq!(delay.elapsed_us(), 2_500);
    }
}
