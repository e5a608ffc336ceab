// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! High-level control of a Sentinel board: servos, motors and the watchdog.
//!
//! Typical usage:
//!
//! ```ignore
//! let mut board = SentinelBoard::new(i2c, delay, Config::default())?;
//!
//! board.pulse_watchdog_default()?;
//! board.set_servo_position(0, 90.0)?;
//! board.set_motors_power(50.0, -50.0)?;
//! board.watchdog_pause(Duration::from_secs(1))?;
//! board.all_off()?;
//! ```

use core::time::Duration;

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::board::SentinelHardware;
use crate::config::Config;
use crate::hw::PinMode;
use crate::motors::{dc_motor, Motor, MotorLayout, Servo};
use crate::watchdog::{self, PausePlan};
use crate::Error;

pub struct SentinelBoard<I2C, D> {
    hardware: SentinelHardware<I2C, D>,
    servo: Servo,
    motors: MotorLayout,
    watchdog_pin: Option<u8>,
    /// Max motor power as a percentage of the supply (0..=100).
    motor_power_limit: f32,
}

impl<I2C, D> SentinelBoard<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, config: Config) -> Result<Self, Error<I2C::Error>> {
        if let Some(pin) = config.watchdog_pin {
            if pin >= crate::hw::NUM_PINS {
                return Err(Error::InvalidPin(pin));
            }
        }

        let hardware = SentinelHardware::new(i2c, delay, &config)?;

        Ok(Self {
            hardware,
            servo: config.servo,
            motors: config.motors,
            watchdog_pin: config.watchdog_pin,
            motor_power_limit: 100.0,
        })
    }

    /// Tear down the board and return the bus and delay.
    pub fn free(self) -> (I2C, D) {
        self.hardware.free()
    }

    #[inline]
    pub fn hardware(&self) -> &SentinelHardware<I2C, D> {
        &self.hardware
    }

    #[inline]
    pub fn hardware_mut(&mut self) -> &mut SentinelHardware<I2C, D> {
        &mut self.hardware
    }

    /// Move a servo on channel 0–11 to `degrees`.
    ///
    /// Returns the pulse written. Nothing is written if the angle falls outside the servo's pulse
    /// range or the channel belongs to a motor driver.
    pub fn set_servo_position(
        &mut self,
        channel: u8,
        degrees: f32,
    ) -> Result<u16, Error<I2C::Error>> {
        let pulse = self
            .servo
            .checked_pulse::<I2C::Error>(channel, degrees)
            .inspect_err(|e| log::warn!("servo ch{} to {}°: {}", channel, degrees, e))?;

        log::debug!("setting servo {} pulse to {}", channel, pulse);
        self.hardware.set_pwm_pulse_length(channel, pulse)?;
        Ok(pulse)
    }

    /// Limit motor output to a percentage of the supply voltage.
    ///
    /// With a 50% limit, `set_motor_power(_, 100.0)` drives a 50% duty. Useful for fine speed
    /// control and for running motors from a supply above their rating. Clamped to 0..=100.
    pub fn set_motor_power_limiting(&mut self, percent: f32) {
        self.motor_power_limit = dc_motor::clamp_power_limit(percent);
    }

    #[inline]
    pub fn motor_power_limiting(&self) -> f32 {
        self.motor_power_limit
    }

    /// Set a motor's direction and power, -100..=100.
    ///
    /// The power is scaled by the limit in force at the time of the call.
    pub fn set_motor_power(&mut self, motor: Motor, percent: f32) -> Result<(), Error<I2C::Error>> {
        let scaled = dc_motor::scale_power(percent, self.motor_power_limit);
        let drive = self.motors.bridge(motor).drive(scaled);

        self.hardware.set_percentage_on(drive.zero_channel, 0.0)?;
        self.hardware
            .set_percentage_on(drive.power_channel, drive.percent)
    }

    /// Update both motors, motor 1 first.
    pub fn set_motors_power(&mut self, motor1: f32, motor2: f32) -> Result<(), Error<I2C::Error>> {
        self.set_motor_power(Motor::One, motor1)?;
        self.set_motor_power(Motor::Two, motor2)
    }

    /// Send one keep-alive pulse of width `duration` to the watchdog.
    pub fn pulse_watchdog(&mut self, duration: Duration) -> Result<(), Error<I2C::Error>> {
        let pin = self.watchdog_pin.ok_or(Error::NoWatchdog)?;

        self.hardware.set_output(pin, true)?;
        watchdog::delay_for(self.hardware.delay_mut(), duration);
        self.hardware.set_output(pin, false)
    }

    /// Send a 1 ms keep-alive pulse.
    #[inline]
    pub fn pulse_watchdog_default(&mut self) -> Result<(), Error<I2C::Error>> {
        self.pulse_watchdog(watchdog::DEFAULT_PULSE)
    }

    /// Wait for `duration` while keeping the watchdog alive, so PWM outputs stay powered.
    pub fn watchdog_pause(&mut self, duration: Duration) -> Result<(), Error<I2C::Error>> {
        if self.watchdog_pin.is_none() {
            return Err(Error::NoWatchdog);
        }

        let plan = PausePlan::new(duration);

        for _ in 0..plan.cycles {
            self.pulse_watchdog(watchdog::PULSE_WIDTH)?;
            watchdog::delay_for(self.hardware.delay_mut(), plan.low);
        }

        self.pulse_watchdog(watchdog::PULSE_WIDTH)?;
        watchdog::delay_for(self.hardware.delay_mut(), plan.remainder);
        Ok(())
    }

    #[inline]
    pub fn watchdog_pin(&self) -> Option<u8> {
        self.watchdog_pin
    }

    pub fn configure_io(&mut self, pin: u8, mode: PinMode) -> Result<(), Error<I2C::Error>> {
        if Some(pin) == self.watchdog_pin {
            log::warn!("reconfiguring watchdog pin {}", pin);
        }
        self.hardware.configure_io(pin, mode)
    }

    #[inline]
    pub fn read_io_pin(&mut self, pin: u8) -> Result<bool, Error<I2C::Error>> {
        self.hardware.read_io_pin(pin)
    }

    #[inline]
    pub fn set_output(&mut self, pin: u8, high: bool) -> Result<(), Error<I2C::Error>> {
        self.hardware.set_output(pin, high)
    }

    #[inline]
    pub fn all_off(&mut self) -> Result<(), Error<I2C::Error>> {
        self.hardware.all_off()
    }

    #[inline]
    pub fn motor_voltage(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.hardware.motor_voltage()
    }
}
