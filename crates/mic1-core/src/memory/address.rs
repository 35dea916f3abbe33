use core::fmt;

use crate::bits::ADDRESS_MASK;
use crate::FaultCode;

/// Number of words in main memory.
pub const MEMORY_WORDS: usize = 1 << crate::bits::ADDRESS_BITS;
/// Words per cache line.
pub const LINE_WORDS: usize = 4;
/// Lines in the cache.
pub const CACHE_LINES: usize = 8;

const OFFSET_BITS: u32 = 2;
const LINE_BITS: u32 = 3;

/// A validated 12-bit memory address.
///
/// Reading the address MSB-first, bits `[0..6]` are the tag, `[7..9]` the
/// line index and `[10..11]` the word offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Address(u16);

impl Address {
    /// Validates a raw address.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for values above `0x0FFF`.
    pub const fn new(raw: u16) -> Result<Self, FaultCode> {
        if raw as usize >= MEMORY_WORDS {
            Err(FaultCode::MemoryAddressOutOfRange)
        } else {
            Ok(Self(raw))
        }
    }

    /// Takes the low 12 bits of a bus word, as MAR does when loading from Latch B.
    #[must_use]
    pub const fn from_bus(word: u16) -> Self {
        Self(word & ADDRESS_MASK)
    }

    /// Raw address value.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Address as a memory index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 7-bit cache tag.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn tag(self) -> u8 {
        (self.0 >> (OFFSET_BITS + LINE_BITS)) as u8
    }

    /// 3-bit cache line index.
    #[must_use]
    pub const fn line(self) -> usize {
        ((self.0 >> OFFSET_BITS) as usize) & (CACHE_LINES - 1)
    }

    /// 2-bit word offset within a line.
    #[must_use]
    pub const fn offset(self) -> usize {
        (self.0 as usize) & (LINE_WORDS - 1)
    }

    /// First address of the 4-word block holding this address.
    #[must_use]
    pub const fn block_base(self) -> Self {
        Self(self.0 & !((LINE_WORDS as u16) - 1))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Address, MEMORY_WORDS};
    use crate::FaultCode;
    use proptest::prelude::*;

    #[test]
    fn range_is_enforced() {
        assert_eq!(
            Address::new(0x1000),
            Err(FaultCode::MemoryAddressOutOfRange)
        );
        assert_eq!(Address::new(0x0FFF).map(Address::value), Ok(0x0FFF));
        assert_eq!(Address::from_bus(0xF123).value(), 0x0123);
    }

    #[test]
    fn decomposition_of_a_known_address() {
        let addr = Address::from_bus(0b1010101_110_01);
        assert_eq!(addr.tag(), 0b1010101);
        assert_eq!(addr.line(), 0b110);
        assert_eq!(addr.offset(), 0b01);
        assert_eq!(addr.block_base().value(), 0b1010101_110_00);
        assert_eq!(addr.to_string(), "0xab9");
    }

    proptest! {
        #[test]
        fn fields_recompose_to_the_address(raw in 0u16..(MEMORY_WORDS as u16)) {
            let addr = Address::from_bus(raw);
            let base = (usize::from(addr.tag()) * 8 + addr.line()) * 4;
            prop_assert_eq!(base, addr.block_base().index());
            prop_assert_eq!(base + addr.offset(), addr.index());
        }
    }
}
