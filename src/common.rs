//! Types needed in multiple modules

use serde::{Deserialize, Serialize};

/// Enumeration of binary symbol values
#[derive(Clone, Eq, Hash, PartialEq, Debug, Copy, Default, Deserialize, Serialize)]
pub enum Bit {
    /// Binary symbol `0`
    #[default]
    Zero = 0,
    /// Binary symbol `1`
    One = 1,
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        match bit {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }
}

impl std::fmt::Display for Bit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Custom error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid input error
    #[error("{0}")]
    InvalidInput(String),
    /// Edge list inconsistent with the declared numbers of bit and check nodes
    #[error("Invalid graph structure: {0}")]
    InvalidGraphStructure(String),
    /// File read/write error
    #[error("{0}")]
    FileReadWriteError(#[from] std::io::Error),
    /// Serde read/write error
    #[error("{0}")]
    SerdeReadWriteError(#[from] serde_json::Error),
}
