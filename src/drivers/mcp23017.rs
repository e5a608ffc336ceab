// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCP23017 16-bit I2C GPIO expander.
//!
//! Registers are used in the power-on `IOCON.BANK = 0` layout, where every port-A register is
//! directly followed by its port-B twin. All port registers are therefore accessed as one
//! little-endian `u16` with GPA0 in bit 0 and GPB7 in bit 15.

use embedded_hal::i2c::I2c;

use crate::hw::{i2c, pin, Direction, Pull, NUM_PINS};
use crate::Error;

// Register addresses (port A; port B is +1)
pub mod reg {
    pub const IODIR: u8 = 0x00;
    pub const IPOL: u8 = 0x02;
    pub const GPINTEN: u8 = 0x04;
    pub const DEFVAL: u8 = 0x06;
    pub const INTCON: u8 = 0x08;
    pub const IOCON: u8 = 0x0A;
    pub const GPPU: u8 = 0x0C;
    pub const INTF: u8 = 0x0E;
    pub const INTCAP: u8 = 0x10;
    pub const GPIO: u8 = 0x12;
    pub const OLAT: u8 = 0x14;
}

pub const DEFAULT_ADDRESS: u8 = 0x20;

/// IOCON.ODR: INT pins are open-drain.
pub const IOCON_ODR: u8 = 1 << 2;

/// MCP23017 bound to an I2C address. The bus is passed to every call.
#[derive(Copy, Clone, Debug)]
pub struct Mcp23017 {
    address: u8,
}

macro_rules! port_register {
    ($(#[$doc:meta])* $get:ident, $set:ident, $reg:expr) => {
        $(#[$doc])*
        pub fn $get<I: I2c>(&self, bus: &mut I) -> Result<u16, Error<I::Error>> {
            self.read_port(bus, $reg)
        }

        $(#[$doc])*
        pub fn $set<I: I2c>(&self, bus: &mut I, value: u16) -> Result<(), Error<I::Error>> {
            self.write_port(bus, $reg, value)
        }
    };
}

impl Mcp23017 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Put the expander into a known state: all pins inputs, no pull-ups, no inversion, open-drain
    /// interrupt outputs.
    pub fn init<I: I2c>(&self, bus: &mut I) -> Result<(), Error<I::Error>> {
        self.set_iodir(bus, 0xFFFF)?;
        self.set_gppu(bus, 0x0000)?;
        self.set_io_control(bus, IOCON_ODR)?;
        self.set_ipol(bus, 0x0000)
    }

    fn read_port<I: I2c>(&self, bus: &mut I, reg: u8) -> Result<u16, Error<I::Error>> {
        i2c::read_u16_le(bus, self.address, reg).map_err(Error::I2c)
    }

    fn write_port<I: I2c>(&self, bus: &mut I, reg: u8, value: u16) -> Result<(), Error<I::Error>> {
        i2c::write_u16_le(bus, self.address, reg, value).map_err(Error::I2c)
    }

    port_register!(
        /// Pin levels (GPIO). Writing sets the output latch.
        gpio, set_gpio, reg::GPIO
    );
    port_register!(
        /// Pin directions (IODIR). A set bit is an input.
        iodir, set_iodir, reg::IODIR
    );
    port_register!(
        /// Pull-up enables (GPPU).
        gppu, set_gppu, reg::GPPU
    );
    port_register!(
        /// Input polarity inversion (IPOL).
        ipol, set_ipol, reg::IPOL
    );
    port_register!(
        /// Interrupt-on-change enables (GPINTEN).
        interrupt_enable, set_interrupt_enable, reg::GPINTEN
    );
    port_register!(
        /// Interrupt compare mode (INTCON). A set bit compares against DEFVAL, a clear bit against
        /// the previous pin value.
        interrupt_configuration, set_interrupt_configuration, reg::INTCON
    );
    port_register!(
        /// Interrupt compare values (DEFVAL).
        default_value, set_default_value, reg::DEFVAL
    );

    /// Output latches (OLAT).
    pub fn olat<I: I2c>(&self, bus: &mut I) -> Result<u16, Error<I::Error>> {
        self.read_port(bus, reg::OLAT)
    }

    pub fn io_control<I: I2c>(&self, bus: &mut I) -> Result<u8, Error<I::Error>> {
        i2c::read_u8(bus, self.address, reg::IOCON).map_err(Error::I2c)
    }

    pub fn set_io_control<I: I2c>(&self, bus: &mut I, value: u8) -> Result<(), Error<I::Error>> {
        i2c::write_u8(bus, self.address, reg::IOCON, value).map_err(Error::I2c)
    }

    /// Pins that caused the pending interrupt (INTF).
    pub fn int_flag<I: I2c>(&self, bus: &mut I) -> Result<u16, Error<I::Error>> {
        self.read_port(bus, reg::INTF)
    }

    /// Pin levels captured when the interrupt fired (INTCAP). Reading clears the interrupt.
    pub fn int_cap<I: I2c>(&self, bus: &mut I) -> Result<u16, Error<I::Error>> {
        self.read_port(bus, reg::INTCAP)
    }

    /// Clear pending interrupts on both ports.
    pub fn clear_ints<I: I2c>(&self, bus: &mut I) -> Result<(), Error<I::Error>> {
        self.int_cap(bus).map(|_| ())
    }

    /// Clear the pending interrupt on port A only.
    pub fn clear_inta<I: I2c>(&self, bus: &mut I) -> Result<(), Error<I::Error>> {
        i2c::read_u8(bus, self.address, reg::INTCAP)
            .map(|_| ())
            .map_err(Error::I2c)
    }

    /// Clear the pending interrupt on port B only.
    pub fn clear_intb<I: I2c>(&self, bus: &mut I) -> Result<(), Error<I::Error>> {
        i2c::read_u8(bus, self.address, reg::INTCAP + 1)
            .map(|_| ())
            .map_err(Error::I2c)
    }

    pub fn set_direction<I: I2c>(
        &self,
        bus: &mut I,
        pin: u8,
        direction: Direction,
    ) -> Result<(), Error<I::Error>> {
        let mask = check_pin(pin)?;
        let iodir = self.iodir(bus)?;
        let iodir = match direction {
            Direction::Input => iodir | mask,
            Direction::Output => iodir & !mask,
        };
        self.set_iodir(bus, iodir)
    }

    pub fn set_pull<I: I2c>(
        &self,
        bus: &mut I,
        pin: u8,
        pull: Pull,
    ) -> Result<(), Error<I::Error>> {
        let mask = check_pin(pin)?;
        let gppu = self.gppu(bus)?;
        let gppu = match pull {
            Pull::Up => gppu | mask,
            Pull::Floating => gppu & !mask,
        };
        self.set_gppu(bus, gppu)
    }

    /// Logic level of a pin, whether configured as input or output.
    pub fn value<I: I2c>(&self, bus: &mut I, pin: u8) -> Result<bool, Error<I::Error>> {
        let mask = check_pin(pin)?;
        Ok(self.gpio(bus)? & mask != 0)
    }

    /// Drive an output pin. Other outputs keep their latched level.
    pub fn set_value<I: I2c>(
        &self,
        bus: &mut I,
        pin: u8,
        high: bool,
    ) -> Result<(), Error<I::Error>> {
        let mask = check_pin(pin)?;
        let olat = self.olat(bus)?;
        let olat = if high { olat | mask } else { olat & !mask };
        self.set_gpio(bus, olat)
    }
}

impl Default for Mcp23017 {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

#[inline]
fn check_pin<E>(pin: u8) -> Result<u16, Error<E>> {
    if pin < NUM_PINS {
        Ok(pin::bit(pin))
    } else {
        Err(Error::InvalidPin(pin))
    }
}
