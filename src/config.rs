// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board configuration.
//!
//! Defaults match a stock Sentinel board with SG90-class servos. Everything can be overridden with
//! the `with_*` builders, or deserialized from a config file when the `serde` feature is enabled:
//!
//! ```toml
//! pwm_frequency_hz = 50.0
//! # Any pin outside 0..=15, e.g. -1, means no watchdog is fitted.
//! watchdog_pin = 7
//!
//! [servo]
//! min_pulse = 1680
//! max_pulse = 8000
//! range_deg = 180.0
//!
//! [voltage]
//! multiplier = 1.11
//! floor = 0.195
//! ```

use crate::drivers::{mcp23017, mcp3221, pca9685};
#[cfg(feature = "serde")]
use crate::hw::NUM_PINS;
use crate::motors::{MotorLayout, Servo};
use crate::watchdog;

/// Calibration of the motor supply voltage reading.
///
/// `volts = (adc_volts * divider - floor) * multiplier`, where `floor` and `multiplier` absorb the
/// tolerance of the divider resistors on a particular board.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VoltageCalibration {
    pub multiplier: f32,
    pub floor: f32,
}

impl Default for VoltageCalibration {
    fn default() -> Self {
        Self {
            multiplier: 1.1,
            floor: 0.24,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub pwm_address: u8,
    pub ioe_address: u8,
    pub adc_address: u8,

    /// PWM output frequency. 50 Hz suits analog servos.
    pub pwm_frequency_hz: f32,
    pub pwm_reference_clock_hz: u32,

    pub servo: Servo,
    pub motors: MotorLayout,

    /// IO expander pin wired to the watchdog input, or `None` if the watchdog is not fitted.
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "watchdog_pin_from_file")
    )]
    pub watchdog_pin: Option<u8>,

    pub voltage: VoltageCalibration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pwm_address: pca9685::DEFAULT_ADDRESS,
            ioe_address: mcp23017::DEFAULT_ADDRESS,
            adc_address: mcp3221::DEFAULT_ADDRESS,
            pwm_frequency_hz: 50.0,
            pwm_reference_clock_hz: pca9685::DEFAULT_REFERENCE_CLOCK_HZ,
            servo: Servo::default(),
            motors: MotorLayout::SENTINEL,
            watchdog_pin: Some(watchdog::DEFAULT_PIN),
            voltage: VoltageCalibration::default(),
        }
    }
}

impl Config {
    /// Rocky Rover r1.2 board: same chips, motor 2 inputs swapped.
    pub fn rocky_rover() -> Self {
        Self {
            motors: MotorLayout::ROCKY_ROVER,
            ..Self::default()
        }
    }

    pub fn with_addresses(mut self, pwm: u8, ioe: u8) -> Self {
        self.pwm_address = pwm;
        self.ioe_address = ioe;
        self
    }

    pub fn with_pwm_frequency(mut self, hz: f32) -> Self {
        self.pwm_frequency_hz = hz;
        self
    }

    pub fn with_servo(mut self, min_pulse: u16, max_pulse: u16, range_deg: f32) -> Self {
        self.servo = Servo::new(min_pulse, max_pulse, range_deg);
        self
    }

    pub fn with_watchdog_pin(mut self, pin: Option<u8>) -> Self {
        self.watchdog_pin = pin;
        self
    }

    pub fn with_motor_layout(mut self, layout: MotorLayout) -> Self {
        self.motors = layout;
        self
    }

    pub fn with_voltage_calibration(mut self, multiplier: f32, floor: f32) -> Self {
        self.voltage = VoltageCalibration { multiplier, floor };
        self
    }
}

/// Config files have no null, so any pin number the expander lacks disables the watchdog.
#[cfg(feature = "serde")]
fn watchdog_pin_from_file<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let pin = <i64 as serde::Deserialize>::deserialize(deserializer)?;
    Ok(u8::try_from(pin).ok().filter(|&pin| pin < NUM_PINS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_board() {
        let cfg = Config::default();
        assert_eq!(cfg.pwm_address, 0x40);
        assert_eq!(cfg.ioe_address, 0x20);
        assert_eq!(cfg.adc_address, 0x4D);
        assert_eq!(cfg.pwm_frequency_hz, 50.0);
        assert_eq!(cfg.watchdog_pin, Some(7));
        assert_eq!(cfg.servo, Servo::new(1680, 8000, 180.0));
        assert_eq!(cfg.motors, MotorLayout::SENTINEL);
    }

    #[test]
    fn builders_override_single_fields() {
        let cfg = Config::default()
            .with_addresses(0x41, 0x21)
            .with_watchdog_pin(None)
            .with_voltage_calibration(1.11, 0.195);

        assert_eq!(cfg.pwm_address, 0x41);
        assert_eq!(cfg.ioe_address, 0x21);
        assert_eq!(cfg.watchdog_pin, None);
        assert_eq!(cfg.voltage.floor, 0.195);
        assert_eq!(cfg.pwm_frequency_hz, 50.0);
    }

    #[test]
    fn rocky_rover_only_changes_wiring() {
        let cfg = Config::rocky_rover();
        assert_eq!(cfg.motors, MotorLayout::ROCKY_ROVER);
        assert_eq!(cfg.watchdog_pin, Some(7));
    }

    #[cfg(feature = "serde")]
    mod from_toml {
        use super::*;

        #[test]
        fn documented_example_parses() {
            let text = r#"
                pwm_frequency_hz = 50.0
                watchdog_pin = 7

                [servo]
                min_pulse = 1680
                max_pulse = 8000
                range_deg = 180.0

                [voltage]
                multiplier = 1.11
                floor = 0.195
            "#;
            let cfg: Config = toml::from_str(text).unwrap();

            assert_eq!(cfg.watchdog_pin, Some(7));
            assert_eq!(cfg.servo, Servo::default());
            assert_eq!(cfg.voltage.multiplier, 1.11);
            assert_eq!(cfg.voltage.floor, 0.195);
            assert_eq!(cfg.pwm_address, 0x40);
        }

        #[test]
        fn partial_file_keeps_defaults() {
            let text = r#"
                ioe_address = 0x21

                [servo]
                max_pulse = 7000

                [motors]
                motor1 = { a = 12, b = 13 }
                motor2 = { a = 15, b = 14 }
            "#;
            let cfg: Config = toml::from_str(text).unwrap();

            assert_eq!(cfg.ioe_address, 0x21);
            assert_eq!(cfg.pwm_address, 0x40);
            assert_eq!(cfg.servo, Servo::new(1680, 7000, 180.0));
            assert_eq!(cfg.motors, MotorLayout::ROCKY_ROVER);
            assert_eq!(cfg.watchdog_pin, Some(7));
            assert_eq!(cfg.voltage, VoltageCalibration::default());
        }

        #[test]
        fn unusable_watchdog_pin_disables_the_watchdog() {
            for text in ["watchdog_pin = -1", "watchdog_pin = 16", "watchdog_pin = 99"] {
                let cfg: Config = toml::from_str(text).unwrap();
                assert_eq!(cfg.watchdog_pin, None, "{text}");
            }

            let cfg: Config = toml::from_str("watchdog_pin = 3").unwrap();
            assert_eq!(cfg.watchdog_pin, Some(3));
        }
    }
}
