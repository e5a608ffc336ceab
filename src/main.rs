// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `sentinel` – exercise a Sentinel board from the command line.
//!
//! Runs on a Raspberry Pi against `/dev/i2c-1`, or anywhere with `--sim`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use embedded_hal::{delay::DelayNs, i2c::I2c};
use linux_embedded_hal::{Delay, I2cdev};
use log::info;

use sentinel_board::sim::{SimBus, SimDelay};
use sentinel_board::{Config, Error, Motor, PinMode, SentinelBoard, SentinelHardware};

#[derive(Parser, Debug)]
#[command(name = "sentinel", version, about = "Footleg Robotics Sentinel board tool")]
struct Cli {
    /// I2C bus device.
    #[arg(long, default_value = "/dev/i2c-1")]
    bus: PathBuf,

    /// TOML board configuration (addresses, servo limits, watchdog pin, voltage calibration).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run against a simulated board instead of real hardware.
    #[arg(long)]
    sim: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sweep a servo, ramp both motors, let the watchdog lapse, then turn everything off.
    Demo {
        #[arg(long, default_value_t = 0)]
        servo_channel: u8,
    },
    /// Ramp each motor forwards, reverse it, then run both and let the watchdog time out.
    Motors,
    /// Print the motor supply voltage.
    Voltage {
        #[arg(long)]
        floor: Option<f32>,
        #[arg(long)]
        multiplier: Option<f32>,
    },
    /// Blink one IO expander pin.
    IoBlink {
        #[arg(long, default_value_t = 0)]
        pin: u8,
        #[arg(long, default_value_t = 10)]
        count: u32,
    },
    /// Pulse every IO expander pin twice in turn.
    IoWalk,
    /// Cycle a bank of 4 PWM outputs through their duty range, then check the watchdog cut-off.
    PwmBank {
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
        bank: u8,
    },
    /// Turn all PWM outputs off.
    Off,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    if cli.sim {
        let mut bus =
            SimBus::with_addresses(config.pwm_address, config.ioe_address, config.adc_address);
        bus.set_adc_raw(0x300);
        let board = SentinelBoard::new(bus, SimDelay::new(), config)
            .context("bringing up simulated board")?;
        run(board, cli.command).context("simulated board")?;
    } else {
        let bus = I2cdev::new(&cli.bus)
            .with_context(|| format!("opening {}", cli.bus.display()))?;
        let board = SentinelBoard::new(bus, Delay, config)
            .with_context(|| format!("bringing up board on {}", cli.bus.display()))?;
        run(board, cli.command).with_context(|| format!("board on {}", cli.bus.display()))?;
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn run<I2C, D>(mut board: SentinelBoard<I2C, D>, command: Command) -> Result<(), Error<I2C::Error>>
where
    I2C: I2c,
    D: DelayNs,
{
    match command {
        Command::Demo { servo_channel } => demo(&mut board, servo_channel),
        Command::Motors => motors(&mut board),
        Command::Voltage { floor, multiplier } => {
            let hw = board.hardware_mut();
            println!("Motor supply voltage: {:.2}", hw.motor_voltage()?);

            if floor.is_some() || multiplier.is_some() {
                if let Some(floor) = floor {
                    hw.set_voltage_floor(floor);
                }
                if let Some(multiplier) = multiplier {
                    hw.set_voltage_multiplier(multiplier);
                }
                println!("Motor supply voltage: {:.2}", hw.motor_voltage()?);
            }
            Ok(())
        }
        Command::IoBlink { pin, count } => {
            board.configure_io(pin, PinMode::OUTPUT_LOW)?;
            board.hardware_mut().delay_mut().delay_ms(1_000);

            for _ in 0..count {
                board.set_output(pin, true)?;
                board.hardware_mut().delay_mut().delay_ms(200);
                board.set_output(pin, false)?;
                board.hardware_mut().delay_mut().delay_ms(800);
            }
            Ok(())
        }
        Command::IoWalk => io_walk(board.hardware_mut()),
        Command::PwmBank { bank } => {
            let watchdog = board.watchdog_pin();
            pwm_bank(board.hardware_mut(), bank, watchdog)
        }
        Command::Off => board.all_off(),
    }
}

fn demo<I2C: I2c, D: DelayNs>(
    board: &mut SentinelBoard<I2C, D>,
    channel: u8,
) -> Result<(), Error<I2C::Error>> {
    let start = Instant::now();
    let pause = Duration::from_secs(1);

    board.pulse_watchdog_default()?;

    let (min_deg, max_deg) = (65.0, 155.0);
    for deg in [min_deg, max_deg, min_deg + (max_deg - min_deg) / 2.0] {
        info!(
            "t={:.2}s: servo on channel {} to {}°",
            start.elapsed().as_secs_f32(),
            channel,
            deg
        );
        board.set_servo_position(channel, deg)?;
        board.watchdog_pause(pause)?;
    }

    motors(board)?;

    info!("turning off all PWM channels");
    board.all_off()?;

    info!("reactivating watchdog for 1 s, outputs should stay idle");
    board.watchdog_pause(pause)
}

fn motors<I2C: I2c, D: DelayNs>(
    board: &mut SentinelBoard<I2C, D>,
) -> Result<(), Error<I2C::Error>> {
    let start = Instant::now();
    let t = || start.elapsed().as_secs_f32();
    let pause = Duration::from_secs(1);

    info!("activate watchdog");
    board.pulse_watchdog_default()?;

    for motor in [Motor::One, Motor::Two] {
        for power in (0..=100).step_by(5) {
            board.set_motor_power(motor, power as f32)?;
            info!("t={:.2}s: {:?} +{}", t(), motor, power);
            board.watchdog_pause(Duration::from_millis(100))?;
        }

        board.set_motor_power(motor, 0.0)?;
        board.watchdog_pause(pause)?;

        board.set_motor_power(motor, -50.0)?;
        info!("t={:.2}s: {:?} -50%", t(), motor);
        board.watchdog_pause(pause)?;

        board.set_motor_power(motor, -100.0)?;
        info!("t={:.2}s: {:?} -100%", t(), motor);
        board.watchdog_pause(pause)?;

        board.set_motor_power(motor, 0.0)?;
    }

    info!("t={:.2}s: both motors on with keep-alive", t());
    board.set_motors_power(50.0, -50.0)?;
    board.watchdog_pause(pause)?;

    for _ in 0..2 {
        info!("t={:.2}s: letting watchdog time out", t());
        for _ in 0..12 {
            board.hardware_mut().delay_mut().delay_ms(250);
        }
        info!("t={:.2}s: reactivate watchdog", t());
        board.pulse_watchdog_default()?;
    }

    board.set_motors_power(0.0, 0.0)
}

fn io_walk<I2C: I2c, D: DelayNs>(
    hw: &mut SentinelHardware<I2C, D>,
) -> Result<(), Error<I2C::Error>> {
    for pin in 0..16 {
        hw.configure_io(pin, PinMode::OUTPUT_LOW)?;
    }

    for pin in 0..16 {
        info!("pulsing pin {}", pin);
        for _ in 0..2 {
            hw.set_output(pin, true)?;
            hw.delay_mut().delay_ms(150);
            hw.set_output(pin, false)?;
            hw.delay_mut().delay_ms(300);
        }
    }
    Ok(())
}

/// Drives the watchdog by hand, since `SentinelHardware` does not.
fn pwm_bank<I2C: I2c, D: DelayNs>(
    hw: &mut SentinelHardware<I2C, D>,
    bank: u8,
    watchdog: Option<u8>,
) -> Result<(), Error<I2C::Error>> {
    let watchdog = watchdog.ok_or(Error::NoWatchdog)?;
    let channels = bank * 4..bank * 4 + 4;

    let keep_alive = |hw: &mut SentinelHardware<I2C, D>| -> Result<(), Error<I2C::Error>> {
        hw.set_output(watchdog, true)?;
        hw.delay_mut().delay_ms(10);
        hw.set_output(watchdog, false)
    };

    for channel in channels.clone() {
        info!("channel {}", channel);
        for percent in (0..100).step_by(5) {
            keep_alive(hw)?;
            hw.set_percentage_on(channel, percent as f32)?;
            hw.delay_mut().delay_ms(100);
        }
        hw.set_percentage_on(channel, 0.0)?;
    }

    hw.all_off()?;
    hw.delay_mut().delay_ms(500);

    for channel in channels {
        hw.set_constant_on(channel)?;
    }

    for _ in 0..5 {
        keep_alive(hw)?;
        info!("sleeping <1s so watchdog stays alive");
        hw.delay_mut().delay_ms(800);
    }
    for _ in 0..5 {
        keep_alive(hw)?;
        info!("sleeping >1s so watchdog disables pwm outputs");
        hw.delay_mut().delay_ms(1_500);
    }

    hw.all_off()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_name_the_file() {
        let missing = Path::new("/nonexistent/sentinel.toml");
        let err = load_config(missing).unwrap_err();
        assert!(
            format!("{err:#}").contains("reading config /nonexistent/sentinel.toml"),
            "{err:#}"
        );

        let bad = std::env::temp_dir().join("sentinel-bad-config.toml");
        std::fs::write(&bad, "watchdog_pin = \"seven\"").unwrap();
        let err = load_config(&bad).unwrap_err();
        assert!(format!("{err:#}").starts_with("parsing config "), "{err:#}");
        std::fs::remove_file(&bad).unwrap();
    }

    #[test]
    fn config_file_can_disable_the_watchdog() {
        let path = std::env::temp_dir().join("sentinel-no-watchdog.toml");
        std::fs::write(&path, "watchdog_pin = -1\n").unwrap();
        let config = load_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.watchdog_pin, None);
    }
}
