// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Sentinel Board Driver
//!
//! This crate drives the Footleg Robotics Sentinel robot controller board from any host with an
//! `embedded-hal` 1.0 I2C bus, typically a Raspberry Pi through `linux-embedded-hal`.
//!
//! The board carries three I2C devices:
//!
//! | Device | Address | Use |
//! | ------ | ------- | --- |
//! | PCA9685 | `0x40` | 16 PWM channels: servos on 0–11, two H-bridge motor drivers on 12–15 |
//! | MCP23017 | `0x20` | 16 GPIO pins, one of which keeps the PWM power watchdog alive |
//! | MCP3221 | `0x4D` | Motor supply voltage |
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | I2C register helpers and pin configuration types |
//! | [`drivers`] | Device-level drivers (PCA9685, MCP23017, MCP3221) |
//! | [`motors`] | Servo geometry and H-bridge motor channel selection |
//! | [`watchdog`] | Keep-alive pulse timing |
//! | [`board`] | `SentinelHardware` (low level) and `SentinelBoard` (high level) |
//! | [`sim`] | Simulated bus and delay for running without hardware |
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Run the motor test on a Pi:
//!
//! ```bash
//! cargo run --release --features linux -- motors
//! ```
//!
//! Or without a board attached:
//!
//! ```bash
//! cargo run --features linux -- --sim demo
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod board;
pub mod config;
pub mod drivers;
pub mod error;
pub mod hw;
pub mod motors;
pub mod sim;
pub mod watchdog;

pub use board::{SentinelBoard, SentinelHardware};
pub use config::Config;
pub use error::Error;
pub use hw::{Direction, PinMode, Pull};
pub use motors::Motor;
