// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PCA9685 16-channel, 12-bit PWM driver.
//!
//! Duty cycles are exposed as 16-bit values (0..=0xFFFF) and scaled down to the 12-bit hardware
//! resolution on write. `0xFFFF` is special-cased to the chip's "full on" bit so a channel can be
//! used as a logic-high output.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::hw::{i2c, NUM_CHANNELS};
use crate::Error;

// Register addresses
pub mod reg {
    pub const MODE1: u8 = 0x00;
    pub const LED0_ON_L: u8 = 0x06;
    pub const PRESCALE: u8 = 0xFE;
}

// MODE1 bits
pub mod mode1 {
    pub const RESTART: u8 = 1 << 7;
    pub const AI: u8 = 1 << 5;
    pub const SLEEP: u8 = 1 << 4;
}

pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Internal oscillator frequency.
pub const DEFAULT_REFERENCE_CLOCK_HZ: u32 = 25_000_000;

/// Duty value that sets a channel permanently on.
pub const FULL_ON: u16 = 0xFFFF;

/// Bit 12 of the ON/OFF counters selects "full on"/"full off".
const FULL_BIT: u16 = 0x1000;

const PRESCALE_MIN: u32 = 3;
const PRESCALE_MAX: u32 = 255;

/// Oscillator settle time after leaving sleep.
const WAKE_DELAY_US: u32 = 5_000;

/// PCA9685 bound to an I2C address. The bus is passed to every call.
#[derive(Copy, Clone, Debug)]
pub struct Pca9685 {
    address: u8,
    reference_clock_hz: u32,
}

impl Pca9685 {
    pub fn new(address: u8, reference_clock_hz: u32) -> Self {
        Self {
            address,
            reference_clock_hz,
        }
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Prescale register value for a PWM frequency, or `None` if the chip cannot produce it.
    pub fn prescale_for(&self, freq_hz: f32) -> Option<u8> {
        if !(freq_hz > 0.0) {
            return None;
        }
        let rounded = (self.reference_clock_hz as f32 / 4096.0 / freq_hz + 0.5) as u32;
        let prescale = rounded.checked_sub(1)?;
        if (PRESCALE_MIN..=PRESCALE_MAX).contains(&prescale) {
            Some(prescale as u8)
        } else {
            None
        }
    }

    /// Clear MODE1, returning the chip to its power-on mode.
    pub fn reset<I: I2c>(&self, bus: &mut I) -> Result<(), Error<I::Error>> {
        i2c::write_u8(bus, self.address, reg::MODE1, 0x00).map_err(Error::I2c)
    }

    pub fn mode1<I: I2c>(&self, bus: &mut I) -> Result<u8, Error<I::Error>> {
        i2c::read_u8(bus, self.address, reg::MODE1).map_err(Error::I2c)
    }

    /// Set the PWM output frequency.
    ///
    /// The prescaler can only be written while the oscillator is asleep, so this walks MODE1
    /// through sleep -> prescale -> wake -> restart with auto-increment enabled.
    pub fn set_frequency<I: I2c, D: DelayNs>(
        &self,
        bus: &mut I,
        delay: &mut D,
        freq_hz: f32,
    ) -> Result<(), Error<I::Error>> {
        let prescale = self
            .prescale_for(freq_hz)
            .ok_or(Error::FrequencyOutOfRange(freq_hz))?;

        let old_mode = self.mode1(bus)?;
        let addr = self.address;

        i2c::write_u8(bus, addr, reg::MODE1, (old_mode & 0x7F) | mode1::SLEEP)
            .map_err(Error::I2c)?;
        i2c::write_u8(bus, addr, reg::PRESCALE, prescale).map_err(Error::I2c)?;
        i2c::write_u8(bus, addr, reg::MODE1, old_mode).map_err(Error::I2c)?;

        delay.delay_us(WAKE_DELAY_US);

        i2c::write_u8(
            bus,
            addr,
            reg::MODE1,
            old_mode | mode1::RESTART | mode1::AI,
        )
        .map_err(Error::I2c)?;

        log::debug!("pca9685@{:#04x}: {} Hz (prescale {})", addr, freq_hz, prescale);
        Ok(())
    }

    /// Read back the PWM frequency from the prescale register.
    pub fn frequency<I: I2c>(&self, bus: &mut I) -> Result<f32, Error<I::Error>> {
        let prescale = i2c::read_u8(bus, self.address, reg::PRESCALE).map_err(Error::I2c)?;
        Ok(self.reference_clock_hz as f32 / 4096.0 / (prescale as f32 + 1.0))
    }

    /// Set a channel's duty cycle as a 16-bit value.
    pub fn set_duty_cycle<I: I2c>(
        &self,
        bus: &mut I,
        channel: u8,
        duty: u16,
    ) -> Result<(), Error<I::Error>> {
        check_channel(channel)?;

        let (on, off) = counters_for_duty(duty);
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();

        i2c::write_reg(
            bus,
            self.address,
            channel_reg(channel),
            &[on_l, on_h, off_l, off_h],
        )
        .map_err(Error::I2c)
    }

    /// Read a channel's duty cycle back as a 16-bit value.
    ///
    /// The 4 low bits lost to the 12-bit hardware are not recoverable.
    pub fn duty_cycle<I: I2c>(&self, bus: &mut I, channel: u8) -> Result<u16, Error<I::Error>> {
        check_channel(channel)?;

        let mut buf = [0u8; 4];
        i2c::read_reg(bus, self.address, channel_reg(channel), &mut buf).map_err(Error::I2c)?;

        let on = u16::from_le_bytes([buf[0], buf[1]]);
        let off = u16::from_le_bytes([buf[2], buf[3]]);
        Ok(duty_for_counters(on, off))
    }
}

impl Default for Pca9685 {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS, DEFAULT_REFERENCE_CLOCK_HZ)
    }
}

#[inline]
fn check_channel<E>(channel: u8) -> Result<(), Error<E>> {
    if channel < NUM_CHANNELS {
        Ok(())
    } else {
        Err(Error::InvalidChannel(channel))
    }
}

/// First of the four ON_L/ON_H/OFF_L/OFF_H registers for `channel`.
#[inline]
pub fn channel_reg(channel: u8) -> u8 {
    reg::LED0_ON_L + 4 * channel
}

/// Map a 16-bit duty onto the (ON, OFF) counter pair.
pub fn counters_for_duty(duty: u16) -> (u16, u16) {
    if duty == FULL_ON {
        (FULL_BIT, 0)
    } else {
        (0, ((duty as u32 + 1) >> 4) as u16)
    }
}

/// Inverse of [`counters_for_duty`], up to the dropped low bits.
pub fn duty_for_counters(on: u16, off: u16) -> u16 {
    if on & FULL_BIT != 0 {
        FULL_ON
    } else {
        (off & 0x0FFF) << 4
    }
}
