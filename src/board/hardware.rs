// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Low-level access to the Sentinel board's devices.
//!
//! `SentinelHardware` owns the shared I2C bus and a delay provider, and routes every PWM write
//! through [`SentinelHardware::set_pwm_pulse_length`] so the last value written to each channel can
//! be read back without touching the bus.
//!
//! It does *not* pulse the watchdog. Code using it directly has to keep the watchdog alive itself
//! or the PWM outputs will be cut after about a second.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::config::{Config, VoltageCalibration};
use crate::drivers::{pca9685, Mcp23017, Mcp3221, Pca9685};
use crate::hw::{Direction, PinMode, NUM_CHANNELS, NUM_PINS};
use crate::Error;

/// Supply voltage of the Pi, which is also the MCP3221 reference.
pub const PI_SUPPLY_VOLTS: f32 = 5.2;

/// Ratio of the 10 kΩ / 1.24 kΩ divider in front of the ADC.
pub const DIVIDER_RATIO: f32 = 8.0645;

pub struct SentinelHardware<I2C, D> {
    i2c: I2C,
    delay: D,
    pwm: Pca9685,
    ioe: Mcp23017,
    adc: Mcp3221,
    pulse_lengths: [u16; NUM_CHANNELS as usize],
    voltage: VoltageCalibration,
}

impl<I2C, D> SentinelHardware<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Bring up the PWM driver and IO expander.
    ///
    /// The PCA9685 is reset and set to `config.pwm_frequency_hz`; the MCP23017 is reset to all
    /// floating inputs. If a watchdog pin is configured it is made an output and driven low.
    pub fn new(i2c: I2C, delay: D, config: &Config) -> Result<Self, Error<I2C::Error>> {
        let mut hw = Self {
            i2c,
            delay,
            pwm: Pca9685::new(config.pwm_address, config.pwm_reference_clock_hz),
            ioe: Mcp23017::new(config.ioe_address),
            adc: Mcp3221::new(config.adc_address),
            pulse_lengths: [0; NUM_CHANNELS as usize],
            voltage: config.voltage,
        };

        hw.pwm.reset(&mut hw.i2c)?;
        hw.pwm
            .set_frequency(&mut hw.i2c, &mut hw.delay, config.pwm_frequency_hz)?;

        hw.ioe.init(&mut hw.i2c)?;

        if let Some(pin) = config.watchdog_pin {
            hw.configure_io(pin, PinMode::OUTPUT_LOW)?;
        }

        log::info!(
            "sentinel: pwm@{:#04x} ioe@{:#04x} adc@{:#04x}, watchdog pin {:?}",
            hw.pwm.address(),
            hw.ioe.address(),
            hw.adc.address(),
            config.watchdog_pin
        );

        Ok(hw)
    }

    /// Release the bus and delay.
    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    #[inline]
    pub fn i2c(&self) -> &I2C {
        &self.i2c
    }

    #[inline]
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    #[inline]
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Set any PWM channel's raw 16-bit duty.
    ///
    /// All PWM writes go through here so that `pulse_lengths` always mirrors the hardware.
    pub fn set_pwm_pulse_length(
        &mut self,
        channel: u8,
        pulse: u16,
    ) -> Result<(), Error<I2C::Error>> {
        self.pwm.set_duty_cycle(&mut self.i2c, channel, pulse)?;
        self.pulse_lengths[channel as usize] = pulse;
        log::trace!("pwm ch{} = {}", channel, pulse);
        Ok(())
    }

    /// Set the fraction of each PWM period a channel is on, in percent.
    ///
    /// Values below 0 turn the channel off and values above 100 turn it fully on.
    pub fn set_percentage_on(
        &mut self,
        channel: u8,
        percent: f32,
    ) -> Result<(), Error<I2C::Error>> {
        self.set_pwm_pulse_length(channel, pulse_for_percent(percent))
    }

    /// Set a channel permanently on (logic high).
    pub fn set_constant_on(&mut self, channel: u8) -> Result<(), Error<I2C::Error>> {
        self.set_pwm_pulse_length(channel, pca9685::FULL_ON)
    }

    /// Turn every PWM channel off.
    pub fn all_off(&mut self) -> Result<(), Error<I2C::Error>> {
        for channel in 0..NUM_CHANNELS {
            self.set_pwm_pulse_length(channel, 0)?;
        }
        Ok(())
    }

    /// Last duty written to `channel`, or `None` for an invalid channel.
    #[inline]
    pub fn pulse_length(&self, channel: u8) -> Option<u16> {
        self.pulse_lengths.get(channel as usize).copied()
    }

    #[inline]
    pub fn pulse_lengths(&self) -> &[u16; NUM_CHANNELS as usize] {
        &self.pulse_lengths
    }

    /// PWM frequency as programmed in the chip.
    pub fn pwm_frequency(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.pwm.frequency(&mut self.i2c)
    }

    /// Change the PWM frequency.
    pub fn set_pwm_frequency(&mut self, hz: f32) -> Result<(), Error<I2C::Error>> {
        self.pwm.set_frequency(&mut self.i2c, &mut self.delay, hz)
    }

    /// Configure an IO expander pin as an output (with initial level) or an input (with bias).
    pub fn configure_io(&mut self, pin: u8, mode: PinMode) -> Result<(), Error<I2C::Error>> {
        if pin >= NUM_PINS {
            return Err(Error::InvalidPin(pin));
        }

        match mode {
            PinMode::Output { high } => {
                self.ioe.set_direction(&mut self.i2c, pin, Direction::Output)?;
                self.ioe.set_value(&mut self.i2c, pin, high)?;
            }
            PinMode::Input { pull } => {
                self.ioe.set_direction(&mut self.i2c, pin, Direction::Input)?;
                self.ioe.set_pull(&mut self.i2c, pin, pull)?;
            }
        }

        log::debug!("ioe pin {} -> {:?}", pin, mode);
        Ok(())
    }

    /// Logic level of an IO expander pin, input or output.
    pub fn read_io_pin(&mut self, pin: u8) -> Result<bool, Error<I2C::Error>> {
        self.ioe.value(&mut self.i2c, pin)
    }

    /// Drive an IO expander pin configured as an output.
    pub fn set_output(&mut self, pin: u8, high: bool) -> Result<(), Error<I2C::Error>> {
        self.ioe.set_value(&mut self.i2c, pin, high)
    }

    /// Run `f` with direct access to the MCP23017 and the bus, e.g. to set up interrupts or to
    /// read/write whole ports at once.
    pub fn with_mcp23017<R>(&mut self, f: impl FnOnce(&Mcp23017, &mut I2C) -> R) -> R {
        f(&self.ioe, &mut self.i2c)
    }

    /// Raw 12-bit sample of the motor supply divider.
    pub fn read_adc(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.adc.read_raw(&mut self.i2c)
    }

    /// Motor supply voltage, calibrated.
    pub fn motor_voltage(&mut self) -> Result<f32, Error<I2C::Error>> {
        let raw = self.read_adc()?;
        Ok(motor_volts(raw, &self.voltage))
    }

    #[inline]
    pub fn voltage_multiplier(&self) -> f32 {
        self.voltage.multiplier
    }

    #[inline]
    pub fn set_voltage_multiplier(&mut self, multiplier: f32) {
        self.voltage.multiplier = multiplier;
    }

    #[inline]
    pub fn voltage_floor(&self) -> f32 {
        self.voltage.floor
    }

    #[inline]
    pub fn set_voltage_floor(&mut self, floor: f32) {
        self.voltage.floor = floor;
    }
}

/// Map a percentage onto a 16-bit duty, saturating at both ends.
pub fn pulse_for_percent(percent: f32) -> u16 {
    if percent < 0.0 {
        0
    } else if percent > 100.0 {
        pca9685::FULL_ON
    } else {
        (percent * pca9685::FULL_ON as f32 / 100.0) as u16
    }
}

/// Convert a raw ADC sample into motor supply volts.
pub fn motor_volts(raw: u16, cal: &VoltageCalibration) -> f32 {
    let adc_volts = Mcp3221::to_volts(raw, PI_SUPPLY_VOLTS);
    (adc_volts * DIVIDER_RATIO - cal.floor) * cal.multiplier
}
