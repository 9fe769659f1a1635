use std::thread;
use std::time::Duration;

use bit_field::BitField;
use embedded_hal::digital::{OutputPin, PinState};
use log::debug;

use crate::Error;
use crate::frame::{CommandFrame, Phase};
use crate::gpio::{self, PinAssignment, SysfsPin};

/// Driver for the AD9850's serial-load interface.
///
/// # Quick start
///
/// Create the driver with [`Ad9850::connect`] to open the sysfs lines named
/// by a [`PinAssignment`], call [`Ad9850::initialize`] once, then issue
/// frequency commands:
///
/// ```no_run
/// use ad9850_hal::{Ad9850, Phase};
/// use ad9850_hal::gpio::PinAssignment;
///
/// # fn main() -> Result<(), ad9850_hal::Error> {
/// let mut dds = Ad9850::connect(PinAssignment::default())?;
/// dds.initialize()?;
/// dds.set_frequency(14_000_000, Phase::ZERO)?;
/// # Ok(())
/// # }
/// ```
///
/// The struct is generic over [`OutputPin`], so the same protocol logic runs
/// against any pin implementation; [`Ad9850::new`] assembles a driver from
/// arbitrary pins.
///
/// # Exclusive access
///
/// The driver assumes it is the only thing toggling these lines. There is no
/// locking between processes; two invocations against the same pins will
/// interleave writes and corrupt the chip's shift register.
#[derive(Debug)]
pub struct Ad9850<P> {
    w_clk: P,
    fq_ud: P,
    data: P,
    reset: P,
}

impl Ad9850<SysfsPin> {
    /// Open the four control lines named by `wiring` as sysfs outputs.
    ///
    /// Each line is exported (if it is not already) and configured as an
    /// output. Any failure is fatal; there is no partially connected driver.
    pub fn connect(wiring: PinAssignment) -> Result<Self, Error> {
        Ok(Self::new(
            SysfsPin::open(wiring.w_clk)?,
            SysfsPin::open(wiring.fq_ud)?,
            SysfsPin::open(wiring.data)?,
            SysfsPin::open(wiring.reset)?,
        ))
    }
}

impl<P: OutputPin> Ad9850<P> {
    /// Assemble a driver from four already-configured output pins.
    ///
    /// Nothing is written to the pins here. [`Ad9850::initialize`] must run
    /// before the first frequency command.
    pub fn new(w_clk: P, fq_ud: P, data: P, reset: P) -> Self {
        Self {
            w_clk,
            fq_ud,
            data,
            reset,
        }
    }

    /// Put the chip into a known serial-load state.
    ///
    /// Drives all four lines low, then pulses RESET, W_CLK and FQ_UD, in that
    /// order. The reset clears the frequency and phase registers; the W_CLK
    /// and FQ_UD pulses select serial-load mode on boards strapped for it.
    /// Nothing else may be sent until this sequence has completed.
    ///
    /// Fail-fast: an error part-way leaves the chip in an unknown state and
    /// the whole sequence must be re-run.
    ///
    /// # Datasheet
    ///
    /// See figure 10 ("Serial Load Enable Sequence") in the AD9850 datasheet.
    pub fn initialize(&mut self) -> Result<(), P::Error> {
        self.w_clk.set_low()?;
        self.fq_ud.set_low()?;
        self.data.set_low()?;
        self.reset.set_low()?;

        gpio::pulse(&mut self.reset)?;
        gpio::pulse(&mut self.w_clk)?;
        gpio::pulse(&mut self.fq_ud)?;
        Ok(())
    }

    /// Program the output frequency and phase offset.
    ///
    /// No bounds check is applied here; callers enforce the
    /// [`MAX_FREQUENCY_HZ`] interface ceiling before getting this far. A
    /// request above the Nyquist limit aliases rather than failing.
    ///
    /// [`MAX_FREQUENCY_HZ`]: crate::MAX_FREQUENCY_HZ
    pub fn set_frequency(&mut self, hz: u64, phase: Phase) -> Result<(), P::Error> {
        let frame = CommandFrame::frequency(hz, phase);
        debug!(
            "{hz} Hz -> tuning word {:#010x}, control byte {:#04x}",
            frame.tuning_word(),
            frame.control_byte()
        );
        self.write_frame(&frame)
    }

    /// Send the shutdown command: zero frequency with the power-down bit set.
    pub fn power_down(&mut self) -> Result<(), P::Error> {
        debug!("sending power-down frame");
        self.write_frame(&CommandFrame::power_down())
    }

    /// Clock a complete frame into the chip and latch it.
    ///
    /// The five bytes go into the shift register over DATA/W_CLK; the single
    /// FQ_UD pulse at the end transfers the shift register into the active
    /// frequency and phase registers. A pin failure part-way abandons the
    /// frame and leaves the shift register indeterminate; re-send the whole
    /// frame rather than resuming.
    pub fn write_frame(&mut self, frame: &CommandFrame) -> Result<(), P::Error> {
        for byte in frame.bytes() {
            self.shift_out(byte)?;
        }
        gpio::pulse(&mut self.fq_ud)
    }

    /// Shift one byte into the chip, least-significant bit first.
    ///
    /// The chip samples DATA on the rising edge of W_CLK.
    fn shift_out(&mut self, byte: u8) -> Result<(), P::Error> {
        for bit in 0..8 {
            self.data.set_state(PinState::from(byte.get_bit(bit)))?;
            gpio::pulse(&mut self.w_clk)?;
        }
        Ok(())
    }

    /// Step the output repeatedly through a band above `base_hz`.
    ///
    /// For each of `config.cycles` passes, the output is programmed to
    /// `base_hz`, `base_hz + step`, ... up to `base_hz + span`, resting
    /// `config.dwell` on each point. Returns once the passes are done; there
    /// is no open-ended mode.
    pub fn sweep(&mut self, base_hz: u64, config: &SweepConfig) -> Result<(), P::Error> {
        // A zero step would never advance through the span.
        let step = config.step_hz.max(1);
        for _ in 0..config.cycles {
            let mut offset = 0;
            while offset <= config.span_hz {
                self.set_frequency(base_hz + offset, Phase::ZERO)?;
                thread::sleep(config.dwell);
                offset += step;
            }
        }
        Ok(())
    }
}

/// Shape of one [`Ad9850::sweep`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Width of the swept band above the base frequency, in hertz.
    pub span_hz: u64,
    /// Increment between sweep points, in hertz.
    pub step_hz: u64,
    /// Time the output rests on each point.
    pub dwell: Duration,
    /// Number of passes through the band.
    pub cycles: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            span_hz: 500_000,
            step_hz: 80_000,
            dwell: Duration::from_millis(1),
            cycles: 1,
        }
    }
}
