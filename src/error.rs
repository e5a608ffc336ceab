// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board-level error type.
//!
//! The register helpers in [`crate::hw::i2c`] return the raw bus error `E`. Drivers and the board
//! wrap it in [`Error`] together with the argument checks they perform before touching the bus.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error<E> {
    /// The underlying I2C transaction failed.
    #[error("i2c bus error: {0:?}")]
    I2c(E),

    /// PWM channel outside 0–15.
    #[error("invalid PWM channel {0}")]
    InvalidChannel(u8),

    /// PWM channel that cannot carry a servo (12–15 are wired to the motor drivers).
    #[error("channel {0} is not a servo channel")]
    InvalidServoChannel(u8),

    /// IO expander pin outside 0–15.
    #[error("invalid IO expander pin {0}")]
    InvalidPin(u8),

    /// Angle maps to a pulse outside the servo's configured limits.
    #[error("calculated servo pulse {pulse} is outside supported range of {min} to {max}")]
    ServoPulseOutOfRange { pulse: i32, min: u16, max: u16 },

    /// The requested PWM frequency needs a prescale outside 3..=255.
    #[error("PCA9685 cannot output at {0} Hz")]
    FrequencyOutOfRange(f32),

    /// A watchdog call was made on a board configured without one.
    #[error("no watchdog pin configured")]
    NoWatchdog,
}
