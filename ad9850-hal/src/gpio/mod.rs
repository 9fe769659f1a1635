//! Control of the four AD9850 lines over the Linux sysfs GPIO interface.

mod common;
mod sysfs;
mod wiring;

pub use common::{LogicLevel, PinDirection};
pub use sysfs::SysfsPin;
pub use wiring::PinAssignment;

use embedded_hal::digital::OutputPin;

/// Strobe a control line: high, then immediately low.
///
/// No delay is inserted between the two writes. The chip's minimum pulse
/// widths are single-digit nanoseconds, and a sysfs value write costs far
/// more than that on any host this runs on.
pub fn pulse<P: OutputPin>(pin: &mut P) -> Result<(), P::Error> {
    pin.set_high()?;
    pin.set_low()
}
