use std::process::ExitCode;

use ad9850_hal::gpio::SysfsPin;
use ad9850_hal::{Ad9850, MAX_FREQUENCY_HZ, Phase};
use anyhow::Context;
use clap::{CommandFactory, Parser};

mod cli;

use cli::Cli;

/// Exit status for a frequency above the chip ceiling, distinct from the
/// general I/O failure status (1).
const FREQUENCY_REJECTED: u8 = 2;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    if cli.off {
        let mut dds = connect(&cli)?;
        dds.power_down().context("sending the shutdown frame")?;
        return Ok(0);
    }

    let Some(hz) = cli.frequency else {
        Cli::command()
            .print_help()
            .context("writing the help text")?;
        return Ok(0);
    };

    // Rejected before any control line is touched.
    if hz > MAX_FREQUENCY_HZ {
        eprintln!("Frequency max:{MAX_FREQUENCY_HZ}");
        return Ok(FREQUENCY_REJECTED);
    }

    let phase = cli.phase.unwrap_or(Phase::ZERO);
    let mut dds = connect(&cli)?;
    if cli.sweep {
        dds.sweep(hz, &cli.sweep_config())
            .context("sweeping the output")?;
    } else {
        dds.set_frequency(hz, phase)
            .context("loading the frequency")?;
    }
    Ok(0)
}

/// Open the four control lines and run the serial-mode reset handshake.
fn connect(cli: &Cli) -> anyhow::Result<Ad9850<SysfsPin>> {
    let mut dds =
        Ad9850::connect(cli.pin_assignment()).context("opening the GPIO control lines")?;
    dds.initialize()
        .context("resetting the chip into serial-load mode")?;
    Ok(dds)
}

#[cfg(test)]
mod test {
    use clap::{CommandFactory, Parser};

    use crate::cli::Cli;

    #[test]
    fn check_cli_debug_asserts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn over_ceiling_frequency_is_rejected_before_any_gpio_work() {
        // 40 MHz + 1 Hz turns around at the validation step; no sysfs path is
        // opened, so this runs fine on machines with no GPIO at all.
        let cli = Cli::try_parse_from(["ad9850-cli", "40000001"]).unwrap();
        assert_eq!(crate::run(cli).unwrap(), crate::FREQUENCY_REJECTED);
    }
}
