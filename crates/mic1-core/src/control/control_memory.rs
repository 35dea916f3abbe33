use std::path::Path;

use tracing::debug;

use super::mac1::MICROPROGRAM;
use super::microinstruction::{MicroFields, Microinstruction, MICROINSTRUCTION_BITS};
use crate::{FaultCode, LoadError};

/// Capacity of control memory (the MPC is 8 bits wide).
pub const CONTROL_MEMORY_WORDS: usize = 256;

/// The loaded microprogram.
///
/// Fixed-size storage; only the first [`ControlMemory::len`] words are
/// addressable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMemory {
    words: [Microinstruction; CONTROL_MEMORY_WORDS],
    len: usize,
}

impl Default for ControlMemory {
    fn default() -> Self {
        Self {
            words: [Microinstruction::NOP; CONTROL_MEMORY_WORDS],
            len: 0,
        }
    }
}

impl ControlMemory {
    /// Control memory holding the built-in MAC-1 microprogram.
    #[must_use]
    pub fn mac1() -> Self {
        let mut memory = Self::default();
        for (slot, fields) in memory.words.iter_mut().zip(MICROPROGRAM) {
            *slot = fields.encode();
        }
        memory.len = MICROPROGRAM.len();
        memory
    }

    /// Parses microprogram text.
    ///
    /// Each instruction line holds 32 binary digits, bit 31 first; whitespace
    /// between digits is ignored. Text after `;` or `#` is a comment, and
    /// blank or comment-only lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] naming the first malformed line, or when the
    /// text holds no instructions or more than fit in control memory.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut words = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let code = line.split(['#', ';']).next().unwrap_or_default();
            if code.trim().is_empty() {
                continue;
            }
            words.push(parse_line(code, index + 1)?);
        }
        Self::from_words(&words)
    }

    /// Reads and parses a microprogram file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the file cannot be read, otherwise as
    /// [`ControlMemory::parse`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let memory = Self::parse(&text)?;
        debug!(path = %path.display(), words = memory.len, "microprogram loaded");
        Ok(memory)
    }

    /// Builds control memory from raw words.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::EmptyMicroprogram`] or
    /// [`LoadError::MicroprogramTooLong`].
    pub fn from_words(words: &[u32]) -> Result<Self, LoadError> {
        if words.is_empty() {
            return Err(LoadError::EmptyMicroprogram);
        }
        if words.len() > CONTROL_MEMORY_WORDS {
            return Err(LoadError::MicroprogramTooLong {
                count: words.len(),
                capacity: CONTROL_MEMORY_WORDS,
            });
        }
        let mut memory = Self::default();
        for (slot, &raw) in memory.words.iter_mut().zip(words) {
            *slot = Microinstruction(raw);
        }
        memory.len = words.len();
        Ok(memory)
    }

    /// Builds control memory from decoded fields.
    ///
    /// # Errors
    ///
    /// As [`ControlMemory::from_words`].
    pub fn from_fields(fields: &[MicroFields]) -> Result<Self, LoadError> {
        let words: Vec<u32> = fields.iter().map(|f| f.encode().raw()).collect();
        Self::from_words(&words)
    }

    /// Fetches the word at `mpc`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MicroAddressOutOfRange`] at or beyond [`ControlMemory::len`].
    pub fn fetch(&self, mpc: u8) -> Result<Microinstruction, FaultCode> {
        let address = usize::from(mpc);
        if address < self.len {
            Ok(self.words[address])
        } else {
            Err(FaultCode::MicroAddressOutOfRange)
        }
    }

    /// Number of loaded words.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when nothing is loaded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The loaded words.
    #[must_use]
    pub fn words(&self) -> &[Microinstruction] {
        &self.words[..self.len]
    }
}

fn parse_line(code: &str, line: usize) -> Result<u32, LoadError> {
    let mut raw = 0_u32;
    let mut found = 0;
    for character in code.chars().filter(|c| !c.is_whitespace()) {
        let bit = match character {
            '0' => 0,
            '1' => 1,
            _ => return Err(LoadError::BadCharacter { line, character }),
        };
        found += 1;
        raw = (raw << 1) | bit;
    }
    if found == MICROINSTRUCTION_BITS {
        Ok(raw)
    } else {
        Err(LoadError::BadDigitCount { line, found })
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlMemory, CONTROL_MEMORY_WORDS};
    use crate::{FaultCode, LoadError, Microinstruction};

    #[test]
    fn comments_blank_lines_and_inner_whitespace_are_skipped() {
        let text = "# header\n\n; note\n1000 0000 0000 0000 0000 0000 0000 0001  ; trailing\n\
                    00000000000000000000000000000010 # also trailing\n";
        let memory = ControlMemory::parse(text).expect("valid microprogram");
        assert_eq!(memory.len(), 2);
        assert_eq!(memory.fetch(0), Ok(Microinstruction(0x8000_0001)));
        assert_eq!(memory.fetch(1), Ok(Microinstruction(2)));
    }

    #[test]
    fn wrong_digit_count_reports_the_line() {
        let text = "; comment\n0101\n";
        assert!(matches!(
            ControlMemory::parse(text),
            Err(LoadError::BadDigitCount { line: 2, found: 4 })
        ));
        let long = format!("{}0\n", "1".repeat(32));
        assert!(matches!(
            ControlMemory::parse(&long),
            Err(LoadError::BadDigitCount { line: 1, found: 33 })
        ));
    }

    #[test]
    fn foreign_characters_are_rejected() {
        let text = format!("{}\n{}2\n", "0".repeat(32), "0".repeat(31));
        assert!(matches!(
            ControlMemory::parse(&text),
            Err(LoadError::BadCharacter {
                line: 2,
                character: '2'
            })
        ));
    }

    #[test]
    fn empty_and_oversized_programs_are_rejected() {
        assert!(matches!(
            ControlMemory::parse("# nothing here\n\n"),
            Err(LoadError::EmptyMicroprogram)
        ));
        assert!(matches!(
            ControlMemory::from_words(&[0; CONTROL_MEMORY_WORDS + 1]),
            Err(LoadError::MicroprogramTooLong {
                count: 257,
                capacity: 256
            })
        ));
        assert!(ControlMemory::from_words(&[0; CONTROL_MEMORY_WORDS]).is_ok());
    }

    #[test]
    fn fetch_past_the_loaded_words_faults() {
        let memory = ControlMemory::from_words(&[7, 8]).expect("two words");
        assert_eq!(memory.fetch(1), Ok(Microinstruction(8)));
        assert_eq!(memory.fetch(2), Err(FaultCode::MicroAddressOutOfRange));
        assert_eq!(
            ControlMemory::default().fetch(0),
            Err(FaultCode::MicroAddressOutOfRange)
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = ControlMemory::from_path("/nonexistent/mic1/microprogram.mic");
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn file_loading_reads_the_same_words_as_text() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("mac1.mic");
        std::fs::write(&path, super::super::mac1::MAC1_SOURCE).expect("temp file writable");
        let loaded = ControlMemory::from_path(&path).expect("bundled microprogram loads");
        assert_eq!(loaded, ControlMemory::mac1());
    }
}
