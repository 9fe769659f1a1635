use std::fmt;
use std::io;

/// Wrapper for problems when driving the AD9850's control lines.
#[derive(Debug)]
pub enum Error {
    /// A pin's sysfs control directory never appeared after an export request.
    ///
    /// The kernel creates `gpio<N>/` asynchronously after a write to the
    /// `export` control file, so the driver retries for a while before giving
    /// up. Seeing this error usually means the pin number is not provided by
    /// any GPIO controller on this machine.
    ExportTimedOut {
        /// Kernel GPIO number of the line.
        pin: u32,
        /// Export attempts made before giving up.
        attempts: u32,
    },
    /// An error occurred reading or writing a sysfs GPIO control file.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ExportTimedOut { pin, attempts } => write!(
                f,
                "gpio{pin} did not appear after {attempts} export attempts"
            ),
            Error::Io(inner) => inner.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(inner) => Some(inner),
            Error::ExportTimedOut { .. } => None,
        }
    }
}

#[doc(hidden)]
impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        // Currently no variant maps to a more specific kind.
        embedded_hal::digital::ErrorKind::Other
    }
}
