//! Program images: flat big-endian 16-bit words, loaded at address 0.

use super::MEMORY_WORDS;
use crate::LoadError;

/// Decodes a program image into words, high byte first.
///
/// # Errors
///
/// Returns [`LoadError::OddProgramLength`] when a trailing byte has no partner
/// and [`LoadError::ProgramTooLarge`] when the image exceeds memory.
pub fn decode_program(bytes: &[u8]) -> Result<Vec<u16>, LoadError> {
    if bytes.len() % 2 != 0 {
        return Err(LoadError::OddProgramLength { len: bytes.len() });
    }
    let words = bytes.len() / 2;
    if words > MEMORY_WORDS {
        return Err(LoadError::ProgramTooLarge {
            words,
            capacity: MEMORY_WORDS,
        });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encodes words into a program image, high byte first.
#[must_use]
pub fn encode_program(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}
