// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Board Interfaces
//!
//! - [`SentinelHardware`] – direct access to PWM channels, IO pins and the supply ADC.
//! - [`SentinelBoard`] – servos, motors and watchdog handling on top of `SentinelHardware`.

pub mod hardware;
pub mod sentinel;

pub use hardware::SentinelHardware;
pub use sentinel::SentinelBoard;
