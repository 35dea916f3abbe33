//! Direct-mapped, write-through cache between MAR/MBR and main memory.
//!
//! Eight lines of four words. A read miss fills the whole block; a write goes
//! to memory unconditionally and updates the resident line only when its tag
//! matches. A mismatching line is left stale, not invalidated.

use tracing::trace;

use super::address::{Address, CACHE_LINES, LINE_WORDS};
use super::Memory;
use crate::FaultCode;

/// One cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CacheLine {
    /// Set once the line holds a block.
    pub valid: bool,
    /// Tag of the resident block.
    pub tag: u8,
    /// Words of the resident block.
    pub data: [u16; LINE_WORDS],
}

impl CacheLine {
    /// Returns `true` when this line holds the block containing `addr`.
    #[must_use]
    pub const fn holds(&self, addr: Address) -> bool {
        self.valid && self.tag == addr.tag()
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CacheStats {
    /// Lookups that found their block resident.
    pub hits: u64,
    /// Lookups that did not.
    pub misses: u64,
}

impl CacheStats {
    /// Total lookups.
    #[must_use]
    pub const fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// `hits / (hits + misses)`, or `0.0` before any access.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }
}

/// Result of a cached read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRead {
    /// Word read.
    pub value: u16,
    /// Whether the block was already resident.
    pub hit: bool,
}

/// The cache itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cache {
    lines: [CacheLine; CACHE_LINES],
    stats: CacheStats,
}

impl Cache {
    /// Checks residency of `addr` and counts the lookup as a hit or a miss.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above
    /// `0x0FFF`; nothing is counted.
    pub fn lookup(&mut self, addr: u16) -> Result<bool, FaultCode> {
        let addr = Address::new(addr)?;
        let hit = self.lines[addr.line()].holds(addr);
        if hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        Ok(hit)
    }

    /// Reads a word, filling its block from `memory` on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above
    /// `0x0FFF`; cache and counters are untouched.
    pub fn read(&mut self, memory: &Memory, addr: u16) -> Result<CacheRead, FaultCode> {
        let hit = self.lookup(addr)?;
        let addr = Address::from_bus(addr);
        let line = &mut self.lines[addr.line()];
        if !hit {
            let base = addr.block_base();
            trace!(block = %base, line = addr.line(), "cache fill");
            line.data = memory.block(base);
            line.tag = addr.tag();
            line.valid = true;
        }
        Ok(CacheRead {
            value: line.data[addr.offset()],
            hit,
        })
    }

    /// Writes a word through to `memory`, updating the resident line on a tag match.
    ///
    /// Returns whether the line was updated.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above
    /// `0x0FFF`; neither memory nor cache is touched.
    pub fn write(&mut self, memory: &mut Memory, addr: u16, data: u16) -> Result<bool, FaultCode> {
        memory.poke(addr, data)?;
        let addr = Address::from_bus(addr);
        let line = &mut self.lines[addr.line()];
        let resident = line.holds(addr);
        if resident {
            line.data[addr.offset()] = data;
        }
        Ok(resident)
    }

    /// Returns one line, or `None` past the last line.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&CacheLine> {
        self.lines.get(index)
    }

    /// All lines in index order.
    #[must_use]
    pub const fn lines(&self) -> &[CacheLine; CACHE_LINES] {
        &self.lines
    }

    /// Current counters.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    /// See [`CacheStats::hit_rate`].
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        self.stats.hit_rate()
    }

    /// Zeroes the counters, keeping resident lines.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Invalidates every line and zeroes the counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
