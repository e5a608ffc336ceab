// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hobby servo geometry.
//!
//! Converts a commanded angle into a 16-bit PCA9685 duty value using the pulse limits of the
//! servo model in use. At 50 Hz, one 12-bit tick is ~4.9 µs, and the duty value is that tick
//! count × 16.

use crate::Error;

/// Highest PWM channel that may carry a servo. 12–15 are hard-wired to the motor drivers.
pub const MAX_SERVO_CHANNEL: u8 = 11;

/// Pulse limits and travel of a servo model.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Servo {
    /// Duty value at 0° (105 of 4096 ticks × 16).
    pub min_pulse: u16,
    /// Duty value at full travel (~500 of 4096 ticks × 16).
    pub max_pulse: u16,
    /// Travel in degrees between `min_pulse` and `max_pulse`.
    pub range_deg: f32,
}

impl Servo {
    pub const fn new(min_pulse: u16, max_pulse: u16, range_deg: f32) -> Self {
        Self {
            min_pulse,
            max_pulse,
            range_deg,
        }
    }

    /// Unchecked pulse for an angle. Truncates toward zero.
    pub fn pulse_for_degrees(&self, degrees: f32) -> i32 {
        let span = self.max_pulse as f32 - self.min_pulse as f32;
        (span * degrees / self.range_deg + self.min_pulse as f32) as i32
    }

    /// Angle that a pulse corresponds to.
    pub fn degrees_for_pulse(&self, pulse: u16) -> f32 {
        let span = self.max_pulse as f32 - self.min_pulse as f32;
        (pulse as f32 - self.min_pulse as f32) * self.range_deg / span
    }

    /// Pulse for an angle on a given channel, rejecting out-of-range angles and motor channels.
    pub fn checked_pulse<E>(&self, channel: u8, degrees: f32) -> Result<u16, Error<E>> {
        let pulse = self.pulse_for_degrees(degrees);

        if pulse < self.min_pulse as i32 || pulse > self.max_pulse as i32 {
            return Err(Error::ServoPulseOutOfRange {
                pulse,
                min: self.min_pulse,
                max: self.max_pulse,
            });
        }
        if channel > MAX_SERVO_CHANNEL {
            return Err(Error::InvalidServoChannel(channel));
        }

        Ok(pulse as u16)
    }
}

impl Default for Servo {
    fn default() -> Self {
        Self::new(1680, 8000, 180.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type E = Error<()>;

    #[test]
    fn default_servo_spans_its_pulse_range() {
        let servo = Servo::default();
        assert_eq!(servo.pulse_for_degrees(0.0), 1680);
        assert_eq!(servo.pulse_for_degrees(90.0), 4840);
        assert_eq!(servo.pulse_for_degrees(180.0), 8000);
    }

    #[test]
    fn fractional_pulses_truncate() {
        let servo = Servo::default();
        // 6320 * 65 / 180 + 1680 = 3962.22
        assert_eq!(servo.pulse_for_degrees(65.0), 3962);
        assert!((servo.degrees_for_pulse(4840) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn out_of_travel_is_rejected_before_channel() {
        let servo = Servo::default();
        let err = servo.checked_pulse::<()>(14, 200.0).unwrap_err();
        assert!(matches!(
            err,
            E::ServoPulseOutOfRange {
                min: 1680,
                max: 8000,
                ..
            }
        ));
        assert!(servo.checked_pulse::<()>(0, -1.0).is_err());
    }

    #[test]
    fn motor_channels_cannot_carry_servos() {
        let servo = Servo::default();
        assert!(matches!(
            servo.checked_pulse::<()>(12, 90.0),
            Err(E::InvalidServoChannel(12))
        ));
        assert_eq!(servo.checked_pulse::<()>(11, 90.0).unwrap(), 4840);
    }
}
