// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Register access helpers over any `embedded_hal` I2C bus.
//!
//! All three devices on the board use the "write register pointer, then read/write data" pattern.
//! The bus is never owned here and is passed in as `&mut` so every device can share it.

use embedded_hal::i2c::I2c;

/// Largest burst the board ever writes in one transaction (register + 4 data bytes for a PCA9685
/// channel).
const MAX_WRITE: usize = 8;

/// Write `data` starting at register `reg`.
pub fn write_reg<I: I2c>(i2c: &mut I, addr: u8, reg: u8, data: &[u8]) -> Result<(), I::Error> {
    debug_assert!(data.len() < MAX_WRITE);

    let mut buf = [0u8; MAX_WRITE];
    buf[0] = reg;
    buf[1..=data.len()].copy_from_slice(data);
    i2c.write(addr, &buf[..=data.len()])
}

/// Read `buf.len()` bytes starting at register `reg`.
#[inline]
pub fn read_reg<I: I2c>(i2c: &mut I, addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), I::Error> {
    i2c.write_read(addr, &[reg], buf)
}

#[inline]
pub fn read_u8<I: I2c>(i2c: &mut I, addr: u8, reg: u8) -> Result<u8, I::Error> {
    let mut buf = [0u8; 1];
    read_reg(i2c, addr, reg, &mut buf)?;
    Ok(buf[0])
}

#[inline]
pub fn write_u8<I: I2c>(i2c: &mut I, addr: u8, reg: u8, value: u8) -> Result<(), I::Error> {
    write_reg(i2c, addr, reg, &[value])
}

/// Read a little-endian register pair: low byte at `reg`, high byte at `reg + 1`.
#[inline]
pub fn read_u16_le<I: I2c>(i2c: &mut I, addr: u8, reg: u8) -> Result<u16, I::Error> {
    let mut buf = [0u8; 2];
    read_reg(i2c, addr, reg, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Write a little-endian register pair: low byte at `reg`, high byte at `reg + 1`.
#[inline]
pub fn write_u16_le<I: I2c>(i2c: &mut I, addr: u8, reg: u8, value: u16) -> Result<(), I::Error> {
    write_reg(i2c, addr, reg, &value.to_le_bytes())
}
