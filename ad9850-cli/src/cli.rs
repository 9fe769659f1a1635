use ad9850_hal::gpio::PinAssignment;
use ad9850_hal::{Phase, SweepConfig};

use clap::Parser;

/// Program an AD9850 DDS synthesizer wired to sysfs GPIO lines.
///
/// With a frequency, resets the chip and loads that frequency (and an
/// optional phase offset). With --off, sends the shutdown command instead:
/// zero frequency with the power-down bit set. Run without arguments to see
/// this help.
///
/// The four control lines default to the classic Raspberry Pi wiring
/// (BCM numbering) and can be moved with the per-line options, so alternate
/// wiring needs no rebuild.
#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Cli {
    /// Output frequency in hertz (at most 40000000)
    pub(crate) frequency: Option<u64>,
    /// Phase offset in steps of 11.25 degrees (0-31)
    #[arg(value_parser = parse_phase)]
    pub(crate) phase: Option<Phase>,
    /// Shut the chip down instead of loading a frequency
    #[arg(short = 'o', long = "off", conflicts_with = "frequency")]
    pub(crate) off: bool,
    /// Kernel GPIO number of the W_CLK (word clock) line
    #[arg(long, default_value_t = PinAssignment::default().w_clk)]
    pub(crate) w_clk: u32,
    /// Kernel GPIO number of the FQ_UD (frequency update) line
    #[arg(long, default_value_t = PinAssignment::default().fq_ud)]
    pub(crate) fq_ud: u32,
    /// Kernel GPIO number of the DATA line
    #[arg(long, default_value_t = PinAssignment::default().data)]
    pub(crate) data: u32,
    /// Kernel GPIO number of the RESET line
    #[arg(long, default_value_t = PinAssignment::default().reset)]
    pub(crate) reset: u32,
    /// Sweep repeatedly through a band above FREQUENCY instead of holding it
    #[arg(long, requires = "frequency")]
    pub(crate) sweep: bool,
    /// Width of the swept band in hertz
    #[arg(long, requires = "sweep", default_value_t = SweepConfig::default().span_hz)]
    pub(crate) sweep_span: u64,
    /// Step between sweep points in hertz
    #[arg(
        long,
        requires = "sweep",
        value_parser = clap::value_parser!(u64).range(1..),
        default_value_t = SweepConfig::default().step_hz
    )]
    pub(crate) sweep_step: u64,
    /// Number of passes through the band
    #[arg(long, requires = "sweep", default_value_t = 1)]
    pub(crate) sweep_cycles: u32,
}

impl Cli {
    pub(crate) fn pin_assignment(&self) -> PinAssignment {
        PinAssignment {
            w_clk: self.w_clk,
            fq_ud: self.fq_ud,
            data: self.data,
            reset: self.reset,
        }
    }

    pub(crate) fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            span_hz: self.sweep_span,
            step_hz: self.sweep_step,
            cycles: self.sweep_cycles,
            ..SweepConfig::default()
        }
    }
}

fn parse_phase(value: &str) -> Result<Phase, String> {
    let steps: u8 = value.parse().map_err(|e| format!("{e}"))?;
    Phase::new(steps).ok_or_else(|| format!("phase is {steps}, the chip supports at most 31"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_parses_with_nothing_requested() {
        let cli = Cli::try_parse_from(["ad9850-cli"]).unwrap();
        assert!(!cli.off);
        assert!(cli.frequency.is_none());
    }

    #[test]
    fn frequency_and_phase_are_positional() {
        let cli = Cli::try_parse_from(["ad9850-cli", "1000000", "10"]).unwrap();
        assert_eq!(cli.frequency, Some(1_000_000));
        assert_eq!(cli.phase, Phase::new(10));
    }

    #[test]
    fn phase_above_five_bits_is_rejected() {
        assert!(Cli::try_parse_from(["ad9850-cli", "1000000", "32"]).is_err());
    }

    #[test]
    fn off_conflicts_with_a_frequency() {
        let cli = Cli::try_parse_from(["ad9850-cli", "-o"]).unwrap();
        assert!(cli.off);
        assert!(Cli::try_parse_from(["ad9850-cli", "-o", "1000000"]).is_err());
    }

    #[test]
    fn pin_overrides_reach_the_assignment() {
        let cli = Cli::try_parse_from(["ad9850-cli", "--data", "21", "1000"]).unwrap();
        let wiring = cli.pin_assignment();
        assert_eq!(wiring.data, 21);
        assert_eq!(wiring.w_clk, PinAssignment::default().w_clk);
    }

    #[test]
    fn sweep_options_require_sweep_mode() {
        assert!(Cli::try_parse_from(["ad9850-cli", "--sweep-span", "100", "1000"]).is_err());
        let cli =
            Cli::try_parse_from(["ad9850-cli", "--sweep", "--sweep-cycles", "3", "1000"]).unwrap();
        assert!(cli.sweep);
        assert_eq!(cli.sweep_config().cycles, 3);
    }
}
