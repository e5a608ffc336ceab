// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin-level configuration types for the IO expander.

/// Number of IO expander pins (GPA0–GPA7, GPB0–GPB7).
pub const NUM_PINS: u8 = 16;

/// Number of PWM channels on the PCA9685.
pub const NUM_CHANNELS: u8 = 16;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Input,
    Output,
}

/// Input bias. The MCP23017 only has pull-ups, so "not pulled up" means floating.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Pull {
    Up,
    Floating,
}

/// Full configuration of one IO expander pin.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PinMode {
    /// Output, initialised to `high` (true) or low.
    Output { high: bool },
    /// Input with the given bias.
    Input { pull: Pull },
}

impl PinMode {
    pub const OUTPUT_LOW: PinMode = PinMode::Output { high: false };
}

/// Bit mask for `pin` in a 16-bit port register.
#[inline]
pub fn bit(pin: u8) -> u16 {
    1 << pin
}
