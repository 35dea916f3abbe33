//! Main memory, the MAR/MBR interface registers and the cache in front of them.

mod address;
/// Direct-mapped write-through cache.
pub mod cache;
/// Program image encoding.
pub mod loader;

pub use address::{Address, CACHE_LINES, LINE_WORDS, MEMORY_WORDS};
pub use cache::{Cache, CacheLine, CacheRead, CacheStats};
pub use loader::{decode_program, encode_program};

use crate::FaultCode;

/// 4096 x 16-bit backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    words: Box<[u16]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            words: vec![0; MEMORY_WORDS].into_boxed_slice(),
        }
    }
}

impl Memory {
    /// Reads one word.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above `0x0FFF`.
    pub fn peek(&self, addr: u16) -> Result<u16, FaultCode> {
        let addr = Address::new(addr)?;
        Ok(self.words[addr.index()])
    }

    /// Writes one word.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above
    /// `0x0FFF`; memory is unchanged.
    pub fn poke(&mut self, addr: u16, value: u16) -> Result<(), FaultCode> {
        let addr = Address::new(addr)?;
        self.words[addr.index()] = value;
        Ok(())
    }

    /// Copies out the aligned block starting at `base`.
    #[must_use]
    pub fn block(&self, base: Address) -> [u16; LINE_WORDS] {
        let base = base.block_base().index();
        let mut block = [0; LINE_WORDS];
        block.copy_from_slice(&self.words[base..base + LINE_WORDS]);
        block
    }

    /// Replaces the leading words with `image` and zeroes the rest.
    ///
    /// Callers validate the length; words past the end of memory are ignored.
    pub fn load_image(&mut self, image: &[u16]) {
        self.words.fill(0);
        let count = image.len().min(MEMORY_WORDS);
        self.words[..count].copy_from_slice(&image[..count]);
    }

    /// Every word in address order.
    #[must_use]
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    /// Zeroes every word.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}

/// Memory Address Register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mar {
    /// Latched address.
    pub address: Address,
    /// Load enable for this cycle.
    pub load: bool,
}

impl Mar {
    /// Loads the low 12 bits of `latch_b` when enabled.
    pub const fn latch(&mut self, latch_b: u16) {
        if self.load {
            self.address = Address::from_bus(latch_b);
        }
    }
}

/// Memory Buffer Register with its three independent controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mbr {
    /// Buffered word.
    pub data: u16,
    /// Read from memory into `data` this cycle.
    pub rd: bool,
    /// Write `data` to memory this cycle.
    pub wr: bool,
    /// Load `data` from the shifter this cycle.
    pub load: bool,
}

impl Mbr {
    /// Takes the shifter output when the load control is set.
    pub const fn latch(&mut self, shifter: u16) {
        if self.load {
            self.data = shifter;
        }
    }

    /// Opcode field of the buffered word (bits 15..12).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn opcode(&self) -> u8 {
        (self.data >> 12) as u8
    }
}

/// Word delivered by a [`MemoryBus`] read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusRead {
    /// Word read.
    pub value: u16,
    /// Cache outcome, or `None` when the cache is bypassed.
    pub hit: Option<bool>,
}

/// Memory with the cache in front of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBus {
    /// Backing store.
    pub memory: Memory,
    /// Cache between MBR and memory.
    pub cache: Cache,
    /// Routes MBR traffic through the cache when set.
    pub cache_enabled: bool,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self {
            memory: Memory::default(),
            cache: Cache::default(),
            cache_enabled: true,
        }
    }
}

impl MemoryBus {
    /// Reads through the cache, or straight from memory when it is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above `0x0FFF`.
    pub fn read(&mut self, addr: u16) -> Result<BusRead, FaultCode> {
        if self.cache_enabled {
            let read = self.cache.read(&self.memory, addr)?;
            Ok(BusRead {
                value: read.value,
                hit: Some(read.hit),
            })
        } else {
            Ok(BusRead {
                value: self.memory.peek(addr)?,
                hit: None,
            })
        }
    }

    /// Writes through the cache, or straight to memory when it is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above `0x0FFF`.
    pub fn write(&mut self, addr: u16, data: u16) -> Result<(), FaultCode> {
        if self.cache_enabled {
            self.cache.write(&mut self.memory, addr, data).map(|_| ())
        } else {
            self.memory.poke(addr, data)
        }
    }
}
