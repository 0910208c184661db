use std::{error, fmt, io};

use armature_core::ChainError;

#[derive(Debug)]
pub enum Error {
    /// Configuration file could not be read.
    Io(io::Error),
    /// Configuration file is not valid TOML or has unexpected fields.
    Config(toml::de::Error),
    /// Link chain could not be constructed.
    Chain(ChainError),
    /// Step factor range is empty or not positive.
    StepRange { min: f32, max: f32 },
    /// Solver threshold is not a finite positive number.
    Threshold(f32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{}", e),
            Error::Config(e) => write!(f, "invalid configuration: {}", e),
            Error::Chain(e) => write!(f, "invalid arm: {}", e),
            Error::StepRange { min, max } => {
                write!(f, "invalid step factor range: {} to {}", min, max)
            }
            Error::Threshold(threshold) => write!(f, "invalid solver threshold: {}", threshold),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Chain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Error::Config(value)
    }
}

impl From<ChainError> for Error {
    fn from(value: ChainError) -> Self {
        Error::Chain(value)
    }
}
