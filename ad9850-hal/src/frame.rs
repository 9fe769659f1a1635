//! Construction of the AD9850's 40-bit serial-load word.
//!
//! In serial mode the chip shifts in 40 bits: the 32-bit frequency tuning
//! word (least-significant bit first), two factory-test bits that must be
//! zero, the power-down bit, and the 5-bit phase offset. Grouped into bytes
//! for transmission, that is four tuning-word bytes in little-endian order
//! followed by one control byte.
//!
//! # Datasheet
//!
//! See the "40-Bit Serial Load Data/Control Word" table in the AD9850
//! datasheet for the W0-W39 bit assignment.

use bit_field::BitField;

/// Frequency of the reference oscillator feeding the chip, in hertz.
///
/// The common AD9850 breakout boards carry a 125 MHz crystal oscillator.
pub const SYSTEM_CLOCK_HZ: u64 = 125_000_000;

/// Highest output frequency the interface layer accepts, in hertz.
///
/// The chip itself synthesizes anything below the Nyquist limit of
/// [`SYSTEM_CLOCK_HZ`] / 2, but output quality degrades well before that;
/// 40 MHz is the usable ceiling for the reference reconstruction filter on
/// the breakout boards.
pub const MAX_FREQUENCY_HZ: u64 = 40_000_000;

/// Power-down flag position within the control byte (W34 on the wire).
const POWER_DOWN_BIT: usize = 2;

/// Phase field within the control byte (W35-W39 on the wire).
const PHASE_BITS: core::ops::Range<usize> = 3..8;

/// Five-bit phase offset applied to the synthesized output.
///
/// Each step advances the output phase by 11.25 degrees; 32 steps cover the
/// full circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase(u8);

impl Phase {
    /// No phase offset.
    pub const ZERO: Phase = Phase(0);

    /// Create a phase offset from a raw step count.
    ///
    /// Returns `None` if `steps` does not fit the chip's five-bit phase
    /// field (0..=31).
    pub fn new(steps: u8) -> Option<Self> {
        (steps <= 0x1F).then_some(Self(steps))
    }

    /// The raw step count.
    pub fn steps(self) -> u8 {
        self.0
    }
}

/// Convert an output frequency in hertz to the chip's 32-bit tuning word.
///
/// The chip synthesizes `tuning_word * SYSTEM_CLOCK_HZ / 2^32` hertz. The
/// conversion here truncates toward zero, so the programmed output is never
/// above the requested frequency.
pub fn tuning_word(hz: u64) -> u32 {
    ((u128::from(hz) << 32) / u128::from(SYSTEM_CLOCK_HZ)) as u32
}

/// Pack a phase offset and the power-down flag into the control byte.
///
/// The two low bits are factory-test bits and must stay zero.
pub fn control_byte(phase: Phase, power_down: bool) -> u8 {
    let mut byte = 0u8;
    byte.set_bits(PHASE_BITS, phase.steps());
    byte.set_bit(POWER_DOWN_BIT, power_down);
    byte
}

/// One complete 40-bit serial-load word, in wire order.
///
/// Frames are built fresh for every chip update and have no identity beyond
/// the single transmission that consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame([u8; 5]);

impl CommandFrame {
    /// The frame programming `hz` with the given phase offset.
    pub fn frequency(hz: u64, phase: Phase) -> Self {
        Self::from_parts(tuning_word(hz), control_byte(phase, false))
    }

    /// The designated shutdown frame: zero frequency, power-down bit set.
    pub fn power_down() -> Self {
        Self::from_parts(0, control_byte(Phase::ZERO, true))
    }

    /// Assemble a frame from a raw tuning word and control byte.
    pub fn from_parts(tuning_word: u32, control: u8) -> Self {
        let mut bytes = [0u8; 5];
        bytes[..4].copy_from_slice(&tuning_word.to_le_bytes());
        bytes[4] = control;
        Self(bytes)
    }

    /// The frame bytes in transmission order.
    pub fn bytes(&self) -> [u8; 5] {
        self.0
    }

    /// Decode the tuning word back out of the frame.
    pub fn tuning_word(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// The trailing control byte.
    pub fn control_byte(&self) -> u8 {
        self.0[4]
    }
}
