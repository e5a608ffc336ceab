// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! This module contains actuator-level logic that sits above the PCA9685 driver in `drivers`.
//!
//! ## Modules
//!
//! - [`servo`] - Angle to pulse conversion for hobby servos on channels 0–11.
//! - [`dc_motor`] - H-bridge channel selection and power limiting for the two motor outputs.

pub mod dc_motor;
pub mod servo;

pub use dc_motor::{HBridge, Motor, MotorLayout};
pub use servo::Servo;
