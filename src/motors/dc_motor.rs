// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Brushed DC motors on PWM-driven H-bridges.
//!
//! Each motor driver takes two PWM inputs. Driving one input while holding the other at zero turns
//! the motor one way; swapping them reverses it. This module only decides *which* channel gets
//! *how much* duty; the board writes the result to the PCA9685.

use micromath::F32Ext;

/// One of the two motor outputs on the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Motor {
    One,
    Two,
}

/// Pair of PWM channels feeding one H-bridge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct HBridge {
    /// Channel driven for negative (reverse) power.
    pub a: u8,
    /// Channel driven for zero or positive (forward) power.
    pub b: u8,
}

/// Result of resolving a power command against an H-bridge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Drive {
    /// Channel that must be set to 0% first.
    pub zero_channel: u8,
    /// Channel that carries the power.
    pub power_channel: u8,
    /// Duty in percent, always >= 0.
    pub percent: f32,
}

impl HBridge {
    pub const fn new(a: u8, b: u8) -> Self {
        Self { a, b }
    }

    /// Resolve an already-scaled signed power (percent) into channel assignments.
    pub fn drive(&self, scaled_power: f32) -> Drive {
        let (power_channel, zero_channel) = if scaled_power < 0.0 {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        };

        Drive {
            zero_channel,
            power_channel,
            percent: F32Ext::abs(scaled_power),
        }
    }
}

/// Which PWM channels each motor is wired to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct MotorLayout {
    pub motor1: HBridge,
    pub motor2: HBridge,
}

impl MotorLayout {
    /// Sentinel board wiring.
    pub const SENTINEL: MotorLayout = MotorLayout {
        motor1: HBridge::new(12, 13),
        motor2: HBridge::new(14, 15),
    };

    /// Rocky Rover r1.2 wiring, where motor 2's inputs are swapped.
    pub const ROCKY_ROVER: MotorLayout = MotorLayout {
        motor1: HBridge::new(12, 13),
        motor2: HBridge::new(15, 14),
    };

    #[inline]
    pub fn bridge(&self, motor: Motor) -> HBridge {
        match motor {
            Motor::One => self.motor1,
            Motor::Two => self.motor2,
        }
    }
}

impl Default for MotorLayout {
    fn default() -> Self {
        Self::SENTINEL
    }
}

/// Clamp a power limit into 0..=100 percent.
pub fn clamp_power_limit(percent: f32) -> f32 {
    if percent > 0.0 {
        if percent > 100.0 {
            100.0
        } else {
            percent
        }
    } else {
        0.0
    }
}

/// Scale a requested power (-100..=100) by the active limit.
#[inline]
pub fn scale_power(power: f32, limit: f32) -> f32 {
    power * limit / 100.0
}
