// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! End-to-end tests of `SentinelBoard` against the simulated bus.

use std::time::Duration;

use sentinel_board::drivers::pca9685;
use sentinel_board::sim::{SimBus, SimDelay, SimError};
use sentinel_board::{Config, Error, Motor, PinMode, Pull, SentinelBoard};

const WATCHDOG_PIN: u8 = 7;

fn board() -> SentinelBoard<SimBus, SimDelay> {
    board_with(Config::default())
}

fn board_with(config: Config) -> SentinelBoard<SimBus, SimDelay> {
    let mut board = SentinelBoard::new(SimBus::new(), SimDelay::new(), config).unwrap();
    board.hardware_mut().delay_mut().reset();
    board
}

#[test]
fn startup_configures_pwm_and_watchdog() {
    let mut board = board();

    let freq = board.hardware_mut().pwm_frequency().unwrap();
    assert!((freq - 50.0).abs() < 0.5, "pwm at {freq} Hz");

    let bus = board.hardware().i2c();
    assert!(bus.is_output(WATCHDOG_PIN));
    assert!(!bus.pin_level(WATCHDOG_PIN));
    assert!(!bus.is_output(0));
    assert_eq!(board.hardware().pulse_lengths(), &[0u16; 16]);
}

#[test]
fn missing_device_surfaces_bus_error() {
    let bus = SimBus::with_addresses(0x41, 0x20, 0x4D);
    let result = SentinelBoard::new(bus, SimDelay::new(), Config::default());
    assert!(matches!(
        result,
        Err(Error::I2c(SimError::NoAcknowledge(0x40)))
    ));
}

#[test]
fn out_of_range_watchdog_pin_is_rejected() {
    let config = Config::default().with_watchdog_pin(Some(16));
    let result = SentinelBoard::new(SimBus::new(), SimDelay::new(), config);
    assert!(matches!(result, Err(Error::InvalidPin(16))));
}

#[test]
fn percentage_and_constant_outputs_are_tracked() {
    let mut board = board();
    let hw = board.hardware_mut();

    hw.set_percentage_on(2, 25.0).unwrap();
    hw.set_constant_on(5).unwrap();
    hw.set_percentage_on(6, 180.0).unwrap();
    hw.set_percentage_on(7, -3.0).unwrap();

    assert_eq!(hw.pulse_length(2), Some(16383));
    assert_eq!(hw.pulse_length(5), Some(0xFFFF));
    assert_eq!(hw.pulse_length(6), Some(0xFFFF));
    assert_eq!(hw.pulse_length(7), Some(0));
    assert_eq!(hw.pulse_length(16), None);

    let bus = hw.i2c();
    assert_eq!(bus.pwm_duty(2), 16384);
    assert_eq!(bus.pwm_duty(5), 0xFFFF);
}

#[test]
fn all_off_clears_every_channel() {
    let mut board = board();
    for channel in 0..16 {
        board.hardware_mut().set_constant_on(channel).unwrap();
    }

    board.all_off().unwrap();

    assert_eq!(board.hardware().pulse_lengths(), &[0u16; 16]);
    for channel in 0..16 {
        assert_eq!(board.hardware().i2c().pwm_duty(channel), 0);
    }
}

#[test]
fn servo_position_writes_pulse() {
    let mut board = board();

    assert_eq!(board.set_servo_position(3, 90.0).unwrap(), 4840);
    assert_eq!(board.hardware().pulse_length(3), Some(4840));
    // 4841 >> 4 = 302 ticks
    assert_eq!(board.hardware().i2c().pwm_duty(3), 302 << 4);
}

#[test]
fn rejected_servo_moves_do_not_touch_the_bus() {
    let mut board = board();
    let before = board.hardware().i2c().transactions();

    assert!(matches!(
        board.set_servo_position(0, 270.0),
        Err(Error::ServoPulseOutOfRange { pulse: 11160, .. })
    ));
    assert!(matches!(
        board.set_servo_position(12, 90.0),
        Err(Error::InvalidServoChannel(12))
    ));

    assert_eq!(board.hardware().i2c().transactions(), before);
    assert_eq!(board.hardware().pulse_length(0), Some(0));
}

#[test]
fn custom_servo_limits_are_honoured() {
    let mut board = board_with(Config::default().with_servo(2000, 6000, 90.0));
    assert_eq!(board.set_servo_position(1, 45.0).unwrap(), 4000);
}

#[test]
fn motor_power_selects_bridge_side() {
    let mut board = board();

    board.set_motor_power(Motor::One, 50.0).unwrap();
    assert_eq!(board.hardware().pulse_length(12), Some(0));
    assert_eq!(board.hardware().pulse_length(13), Some(32767));

    board.set_motor_power(Motor::One, -100.0).unwrap();
    assert_eq!(board.hardware().pulse_length(12), Some(0xFFFF));
    assert_eq!(board.hardware().pulse_length(13), Some(0));
}

#[test]
fn motor_power_is_limited() {
    let mut board = board();
    board.set_motor_power_limiting(50.0);

    board.set_motors_power(100.0, -100.0).unwrap();

    let hw = board.hardware();
    assert_eq!(hw.pulse_length(13), Some(32767));
    assert_eq!(hw.pulse_length(12), Some(0));
    assert_eq!(hw.pulse_length(14), Some(32767));
    assert_eq!(hw.pulse_length(15), Some(0));

    board.set_motor_power_limiting(250.0);
    assert_eq!(board.motor_power_limiting(), 100.0);
    board.set_motor_power_limiting(-1.0);
    assert_eq!(board.motor_power_limiting(), 0.0);
}

#[test]
fn rocky_rover_layout_swaps_motor_two() {
    let mut board = board_with(Config::rocky_rover());
    board.set_motor_power(Motor::Two, 100.0).unwrap();
    assert_eq!(board.hardware().pulse_length(14), Some(0xFFFF));
    assert_eq!(board.hardware().pulse_length(15), Some(0));
}

#[test]
fn watchdog_pulse_toggles_pin_once() {
    let mut board = board();

    board.pulse_watchdog(Duration::from_millis(100)).unwrap();

    let bus = board.hardware().i2c();
    assert_eq!(bus.rising_edges(WATCHDOG_PIN), 1);
    assert!(!bus.pin_level(WATCHDOG_PIN));

    let (_, delay) = board.free();
    assert_eq!(delay.elapsed_us(), 100_000);
}

#[test]
fn short_watchdog_pulse_is_not_rounded_away() {
    let mut board = board();

    board.pulse_watchdog(Duration::from_nanos(500)).unwrap();

    assert_eq!(board.hardware().i2c().rising_edges(WATCHDOG_PIN), 1);
    let (_, delay) = board.free();
    assert_eq!(delay.elapsed_ns(), 500);
}

#[test]
fn watchdog_pause_pulses_every_quarter_second() {
    let mut board = board();

    board.watchdog_pause(Duration::from_secs(1)).unwrap();

    assert_eq!(board.hardware().i2c().rising_edges(WATCHDOG_PIN), 5);
    assert!(!board.hardware().i2c().pin_level(WATCHDOG_PIN));

    let (_, delay) = board.free();
    assert_eq!(delay.elapsed_us(), 1_001_000);
}

#[test]
fn watchdog_pause_sleeps_the_remainder() {
    let mut board = board();
    board.watchdog_pause(Duration::from_millis(600)).unwrap();

    assert_eq!(board.hardware().i2c().rising_edges(WATCHDOG_PIN), 3);
    let (_, delay) = board.free();
    assert_eq!(delay.elapsed_us(), 600_000);
}

#[test]
fn watchdog_calls_fail_without_a_pin() {
    let mut board = board_with(Config::default().with_watchdog_pin(None));

    assert!(matches!(
        board.pulse_watchdog_default(),
        Err(Error::NoWatchdog)
    ));
    assert!(matches!(
        board.watchdog_pause(Duration::from_secs(1)),
        Err(Error::NoWatchdog)
    ));
    assert!(!board.hardware().i2c().is_output(WATCHDOG_PIN));
}

#[test]
fn io_pins_can_be_outputs_or_inputs() {
    let mut board = board();

    board.configure_io(0, PinMode::Output { high: true }).unwrap();
    assert!(board.read_io_pin(0).unwrap());
    board.set_output(0, false).unwrap();
    assert!(!board.read_io_pin(0).unwrap());

    board
        .configure_io(3, PinMode::Input { pull: Pull::Up })
        .unwrap();
    board.hardware_mut().i2c_mut().set_input(3, true);
    assert!(board.read_io_pin(3).unwrap());

    assert!(matches!(
        board.configure_io(16, PinMode::OUTPUT_LOW),
        Err(Error::InvalidPin(16))
    ));
}

#[test]
fn driving_one_output_leaves_the_watchdog_latch_alone() {
    let mut board = board();
    board.configure_io(0, PinMode::OUTPUT_LOW).unwrap();

    board.set_output(0, true).unwrap();
    board.pulse_watchdog_default().unwrap();

    let bus = board.hardware().i2c();
    assert!(bus.pin_level(0));
    assert!(!bus.pin_level(WATCHDOG_PIN));
}

#[test]
fn mcp23017_interrupts_are_reachable() {
    let mut board = board();

    board
        .hardware_mut()
        .with_mcp23017(|ioe, bus| {
            ioe.set_interrupt_enable(bus, 1 << 10)?;
            ioe.set_default_value(bus, 0)?;
            ioe.set_interrupt_configuration(bus, 1 << 10)
        })
        .unwrap();

    board.hardware_mut().i2c_mut().set_input(10, true);

    let (flags, captured) = board
        .hardware_mut()
        .with_mcp23017(|ioe, bus| Ok::<_, Error<SimError>>((ioe.int_flag(bus)?, ioe.int_cap(bus)?)))
        .unwrap();
    assert_eq!(flags, 1 << 10);
    assert_eq!(captured & (1 << 10), 1 << 10);
}

#[test]
fn motor_voltage_uses_calibration() {
    let mut board = board();
    board.hardware_mut().i2c_mut().set_adc_raw(0x300);

    let v = board.motor_voltage().unwrap();
    assert!((v - 8.387).abs() < 0.01, "got {v}");

    let hw = board.hardware_mut();
    hw.set_voltage_floor(0.195);
    hw.set_voltage_multiplier(1.11);
    assert_eq!(hw.voltage_floor(), 0.195);
    assert_eq!(hw.voltage_multiplier(), 1.11);

    let v = hw.motor_voltage().unwrap();
    assert!((v - 8.514).abs() < 0.01, "got {v}");
}

#[test]
fn frequency_can_be_changed_at_runtime() {
    let mut board = board();
    let hw = board.hardware_mut();

    hw.set_pwm_frequency(100.0).unwrap();
    let freq = hw.pwm_frequency().unwrap();
    assert!((freq - 100.0).abs() < 0.5, "pwm at {freq} Hz");
    // round(25 MHz / 4096 / 100) - 1
    assert_eq!(hw.i2c().pca9685_register(pca9685::reg::PRESCALE), 60);

    assert!(matches!(
        hw.set_pwm_frequency(5.0),
        Err(Error::FrequencyOutOfRange(_))
    ));
}
