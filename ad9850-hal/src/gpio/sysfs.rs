//! Pins exposed through the legacy `/sys/class/gpio` control tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, OutputPin};
use log::trace;

use super::{LogicLevel, PinDirection};
use crate::Error;

/// Mount point of the sysfs GPIO control tree.
const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Export attempts made before concluding the pin will never materialize.
const EXPORT_ATTEMPTS: u32 = 5;

/// Settle time between export attempts; the kernel creates `gpio<N>/`
/// asynchronously after the export write.
const EXPORT_SETTLE: Duration = Duration::from_millis(100);

/// One exported, output-configured GPIO line.
///
/// The line is assumed to be exclusively ours for the life of the process.
/// Nothing un-exports it afterwards; the pin stays claimed in sysfs until
/// something else releases it.
#[derive(Debug)]
pub struct SysfsPin {
    number: u32,
    root: PathBuf,
}

impl SysfsPin {
    /// Export the pin and configure it as an output.
    pub fn open(number: u32) -> Result<Self, Error> {
        Self::open_in(Path::new(SYSFS_GPIO_ROOT), number)
    }

    /// As [`SysfsPin::open`], with the control tree rooted at `root` instead
    /// of `/sys/class/gpio`.
    pub fn open_in(root: &Path, number: u32) -> Result<Self, Error> {
        let pin = Self {
            number,
            root: root.to_path_buf(),
        };
        pin.set_direction(PinDirection::Output)?;
        Ok(pin)
    }

    /// Kernel GPIO number of this line.
    pub fn number(&self) -> u32 {
        self.number
    }

    fn pin_dir(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.number))
    }

    /// Ask the kernel to export the pin, then wait for its control directory.
    ///
    /// Idempotent: a pin whose directory is already present, or whose export
    /// write reports busy (claimed by an earlier run), counts as success.
    /// A directory still absent right after the export write is retried after
    /// a settle delay rather than treated as a failure; only exhausting the
    /// attempt cap or an unexpected I/O error surfaces.
    pub fn ensure_exported(&self) -> Result<(), Error> {
        for attempt in 1..=EXPORT_ATTEMPTS {
            if self.pin_dir().exists() {
                return Ok(());
            }
            trace!(
                "gpio{} not present yet, export attempt {attempt}/{EXPORT_ATTEMPTS}",
                self.number
            );
            match fs::write(self.root.join("export"), self.number.to_string()) {
                Ok(()) => {}
                // Already exported; the directory check decides.
                Err(e) if e.kind() == io::ErrorKind::ResourceBusy => {}
                Err(e) => return Err(Error::Io(e)),
            }
            thread::sleep(EXPORT_SETTLE);
        }
        if self.pin_dir().exists() {
            Ok(())
        } else {
            Err(Error::ExportTimedOut {
                pin: self.number,
                attempts: EXPORT_ATTEMPTS,
            })
        }
    }

    /// Set the pin direction.
    ///
    /// Exports the pin first if needed; the `direction` file only exists once
    /// the pin is exported. Idempotent.
    pub fn set_direction(&self, direction: PinDirection) -> Result<(), Error> {
        self.ensure_exported()?;
        fs::write(self.pin_dir().join("direction"), direction.sysfs_token())?;
        Ok(())
    }

    /// Drive the pin to the given level.
    pub fn write_level(&self, level: LogicLevel) -> Result<(), Error> {
        fs::write(self.pin_dir().join("value"), level.sysfs_token())?;
        Ok(())
    }
}

impl ErrorType for SysfsPin {
    type Error = Error;
}

impl OutputPin for SysfsPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_level(LogicLevel::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_level(LogicLevel::High)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    /// Fresh scratch directory standing in for /sys/class/gpio.
    fn scratch_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ad9850-hal-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Pre-create the control files the kernel would provide for a pin.
    fn provision(root: &Path, number: u32) {
        let dir = root.join(format!("gpio{number}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("direction"), "in").unwrap();
        fs::write(dir.join("value"), "0").unwrap();
    }

    #[test]
    fn open_configures_an_existing_export_as_output() {
        let root = scratch_root("open");
        provision(&root, 7);
        let pin = SysfsPin::open_in(&root, 7).unwrap();
        assert_eq!(
            fs::read_to_string(root.join("gpio7/direction")).unwrap(),
            "out"
        );
        pin.write_level(LogicLevel::High).unwrap();
        assert_eq!(fs::read_to_string(root.join("gpio7/value")).unwrap(), "1");
        pin.write_level(LogicLevel::Low).unwrap();
        assert_eq!(fs::read_to_string(root.join("gpio7/value")).unwrap(), "0");
    }

    #[test]
    fn ensure_exported_short_circuits_for_present_pins() {
        let root = scratch_root("present");
        provision(&root, 3);
        let pin = SysfsPin::open_in(&root, 3).unwrap();
        pin.ensure_exported().unwrap();
        pin.ensure_exported().unwrap();
        // The directory was already there, so no export request was made.
        assert!(!root.join("export").exists());
    }

    #[test]
    fn export_requests_are_retried_then_time_out() {
        let root = scratch_root("timeout");
        let err = SysfsPin::open_in(&root, 9).unwrap_err();
        match err {
            Error::ExportTimedOut { pin: 9, attempts } => {
                assert_eq!(attempts, EXPORT_ATTEMPTS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Every attempt asked the kernel for pin 9.
        assert_eq!(fs::read_to_string(root.join("export")).unwrap(), "9");
    }

    #[test]
    fn pulse_leaves_the_line_low() {
        let root = scratch_root("pulse");
        provision(&root, 4);
        let mut pin = SysfsPin::open_in(&root, 4).unwrap();
        crate::gpio::pulse(&mut pin).unwrap();
        assert_eq!(fs::read_to_string(root.join("gpio4/value")).unwrap(), "0");
    }
}
