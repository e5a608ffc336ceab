// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCP3221 12-bit I2C ADC.
//!
//! The chip has no registers: every 2-byte read returns a fresh conversion, most significant byte
//! first, with the upper 4 bits zero.

use embedded_hal::i2c::I2c;

use crate::Error;

/// Address of the MCP3221A5 fitted on the board.
pub const DEFAULT_ADDRESS: u8 = 0x4D;

/// Full-scale conversion result.
pub const FULL_SCALE: u16 = 0x0FFF;

#[derive(Copy, Clone, Debug)]
pub struct Mcp3221 {
    address: u8,
}

impl Mcp3221 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Perform one conversion.
    pub fn read_raw<I: I2c>(&self, bus: &mut I) -> Result<u16, Error<I::Error>> {
        let mut buf = [0u8; 2];
        bus.read(self.address, &mut buf).map_err(Error::I2c)?;
        Ok(u16::from_be_bytes(buf) & FULL_SCALE)
    }

    /// Convert a raw sample into volts at the ADC pin, given the supply (reference) voltage.
    #[inline]
    pub fn to_volts(raw: u16, supply_volts: f32) -> f32 {
        supply_volts * raw as f32 / FULL_SCALE as f32
    }
}

impl Default for Mcp3221 {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}
