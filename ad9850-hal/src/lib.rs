#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod driver;
mod error;
mod frame;
pub mod gpio;

pub use driver::{Ad9850, SweepConfig};
pub use error::Error;
pub use frame::{CommandFrame, MAX_FREQUENCY_HZ, Phase, SYSTEM_CLOCK_HZ, control_byte, tuning_word};
