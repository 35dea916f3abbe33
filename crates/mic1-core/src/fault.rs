use std::path::PathBuf;

use thiserror::Error;

/// Fault classes used for logging severity and diagnostics aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// An address fell outside the range its store accepts.
    Bounds,
    /// The core's own logic reached a state it should never reach.
    Internal,
}

/// Stable taxonomy of faults raised inside a microcycle.
///
/// Faults never abort execution: the offending operation is skipped and the
/// fault is latched on the CPU for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Memory or cache access outside `0..=4095`.
    #[error("memory address out of range")]
    MemoryAddressOutOfRange = 0x01,
    /// Micro-address at or beyond the loaded microprogram length.
    #[error("micro-address beyond loaded control memory")]
    MicroAddressOutOfRange = 0x02,
    /// Register-select value with no entry in the decoder table.
    #[error("decoder index outside register table")]
    DecoderIndexOutOfRange = 0x03,
}

impl FaultCode {
    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::MemoryAddressOutOfRange),
            0x02 => Some(Self::MicroAddressOutOfRange),
            0x03 => Some(Self::DecoderIndexOutOfRange),
            _ => None,
        }
    }

    /// Returns the class of this fault.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::MemoryAddressOutOfRange | Self::MicroAddressOutOfRange => FaultClass::Bounds,
            Self::DecoderIndexOutOfRange => FaultClass::Internal,
        }
    }
}

/// Failure to load a microprogram or a program image.
///
/// Loads are all-or-nothing: when one of these is returned, nothing was stored.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A microprogram line did not hold exactly 32 binary digits.
    #[error("line {line}: expected 32 binary digits, found {found}")]
    BadDigitCount {
        /// 1-based line number in the source text.
        line: usize,
        /// Number of binary digits present.
        found: usize,
    },
    /// A microprogram line held a character other than `0`, `1` or whitespace.
    #[error("line {line}: unexpected character {character:?}")]
    BadCharacter {
        /// 1-based line number in the source text.
        line: usize,
        /// Offending character.
        character: char,
    },
    /// The microprogram held no instruction lines.
    #[error("microprogram contains no instructions")]
    EmptyMicroprogram,
    /// The microprogram does not fit in control memory.
    #[error("microprogram has {count} instructions, control memory holds {capacity}")]
    MicroprogramTooLong {
        /// Instructions found.
        count: usize,
        /// Control memory capacity.
        capacity: usize,
    },
    /// A program image had an odd number of bytes.
    #[error("program image has odd length {len}")]
    OddProgramLength {
        /// Image length in bytes.
        len: usize,
    },
    /// A program image does not fit in memory.
    #[error("program has {words} words, memory holds {capacity}")]
    ProgramTooLarge {
        /// Words in the image.
        words: usize,
        /// Memory capacity in words.
        capacity: usize,
    },
}
