// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PWM power watchdog.
//!
//! The board cuts power to the PWM outputs unless the watchdog input sees a pulse at least once a
//! second. The input is wired to one of the IO expander pins, which is toggled high then low to
//! keep the outputs alive.
//!
//! Long pauses are split into 250 ms slices with a 1 ms keep-alive pulse at the start of each one:
//!
//! ```text
//!  pulse   low      pulse   low      pulse  remainder
//!  |‾|____________|‾|____________|‾|_________
//!  <-- 250 ms -->  <-- 250 ms -->
//! ```

use core::time::Duration;

use embedded_hal::delay::DelayNs;

/// Width of the keep-alive pulse used by pauses.
pub const PULSE_WIDTH: Duration = Duration::from_millis(1);

/// Longest stretch between keep-alive pulses during a pause.
pub const MAX_SLICE: Duration = Duration::from_millis(250);

/// Default width of a single [`pulse`](crate::SentinelBoard::pulse_watchdog).
pub const DEFAULT_PULSE: Duration = PULSE_WIDTH;

/// Default pause length.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(1);

/// Default IO expander pin feeding the watchdog.
pub const DEFAULT_PIN: u8 = 7;

/// Timing of a watchdog-safe pause.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PausePlan {
    /// Number of pulse + low slices.
    pub cycles: u32,
    /// Low time after each slice's pulse.
    pub low: Duration,
    /// Idle time after the final pulse.
    pub remainder: Duration,
}

impl PausePlan {
    pub fn new(duration: Duration) -> Self {
        if duration.is_zero() {
            return Self {
                cycles: 0,
                low: Duration::ZERO,
                remainder: Duration::ZERO,
            };
        }

        let slice = duration.min(MAX_SLICE);
        let low = slice.saturating_sub(PULSE_WIDTH);
        let cycles = (duration.as_nanos() / slice.as_nanos()) as u32;

        // duration - pulse - cycles * slice, clamped at zero
        let remainder = duration
            .saturating_sub(PULSE_WIDTH)
            .saturating_sub(slice * cycles);

        Self {
            cycles,
            low,
            remainder,
        }
    }

    /// Wall time the pause takes, counting pulses.
    pub fn total(&self) -> Duration {
        (PULSE_WIDTH + self.low) * self.cycles + PULSE_WIDTH + self.remainder
    }
}

/// Wait for exactly `duration`: whole milliseconds in `u32`-sized chunks, then the nanoseconds.
pub(crate) fn delay_for<D: DelayNs>(delay: &mut D, duration: Duration) {
    let mut ms = duration.as_millis();
    while ms > 0 {
        let chunk = ms.min(u32::MAX as u128) as u32;
        delay.delay_ms(chunk);
        ms -= chunk as u128;
    }

    let ns = duration.subsec_nanos() % 1_000_000;
    if ns > 0 {
        delay.delay_ns(ns);
    }
}
