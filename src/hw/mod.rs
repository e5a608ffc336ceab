// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Bus-Level Helpers
//!
//! Thin helpers shared by every device driver: register reads/writes over an `embedded_hal` I2C bus
//! and the pin configuration types of the IO expander.

pub mod i2c;
pub mod pin;

pub use pin::{Direction, PinMode, Pull, NUM_CHANNELS, NUM_PINS};
