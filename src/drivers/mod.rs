// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! board logic. None of them own the I2C bus: it is passed in as `&mut` on every call so the three
//! devices on the Sentinel board can share it.
//!
//! ## Existing drivers
//!
//! - [`pca9685`] – NXP PCA9685 16-channel PWM driver (servos, motor H-bridges)
//! - [`mcp23017`] – Microchip MCP23017 16-bit GPIO expander (watchdog, user IO)
//! - [`mcp3221`] – Microchip MCP3221 12-bit ADC (motor supply voltage)

pub mod mcp23017;
pub mod mcp3221;
pub mod pca9685;

pub use mcp23017::Mcp23017;
pub use mcp3221::Mcp3221;
pub use pca9685::Pca9685;
