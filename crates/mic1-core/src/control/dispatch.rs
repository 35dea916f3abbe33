use super::mac1::entry;

/// Number of primary opcodes.
pub const OPCODE_COUNT: usize = 16;

/// Opcode to micro-address table used by the dispatch branch.
///
/// The opcode is `MBR[15:12]`; the table holds the first micro-address of each
/// opcode's routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DispatchTable {
    entries: [u8; OPCODE_COUNT],
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::MAC1
    }
}

impl DispatchTable {
    /// Entry points of the built-in MAC-1 microprogram.
    pub const MAC1: Self = Self::new([
        entry::LODD,
        entry::STOD,
        entry::ADDD,
        entry::SUBD,
        entry::JPOS,
        entry::JZER,
        entry::JUMP,
        entry::LOCO,
        entry::LODL,
        entry::STOL,
        entry::ADDL,
        entry::SUBL,
        entry::JNEG,
        entry::JNZE,
        entry::CALL,
        entry::EXTENDED,
    ]);

    /// Builds a table for a custom microprogram.
    #[must_use]
    pub const fn new(entries: [u8; OPCODE_COUNT]) -> Self {
        Self { entries }
    }

    /// Micro-address for `opcode`; only the low four bits are read.
    #[must_use]
    pub const fn entry(&self, opcode: u8) -> u8 {
        self.entries[(opcode & 0x0F) as usize]
    }

    /// All entries in opcode order.
    #[must_use]
    pub const fn entries(&self) -> &[u8; OPCODE_COUNT] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::DispatchTable;
    use rstest::rstest;

    #[rstest]
    #[case(0x0, 0x03)]
    #[case(0x1, 0x05)]
    #[case(0x2, 0x06)]
    #[case(0x3, 0x08)]
    #[case(0x4, 0x0C)]
    #[case(0x5, 0x0E)]
    #[case(0x6, 0x11)]
    #[case(0x7, 0x12)]
    #[case(0x8, 0x13)]
    #[case(0x9, 0x16)]
    #[case(0xA, 0x18)]
    #[case(0xB, 0x1B)]
    #[case(0xC, 0x20)]
    #[case(0xD, 0x23)]
    #[case(0xE, 0x25)]
    #[case(0xF, 0x28)]
    fn mac1_entries(#[case] opcode: u8, #[case] micro_address: u8) {
        assert_eq!(DispatchTable::MAC1.entry(opcode), micro_address);
        assert_eq!(DispatchTable::MAC1.entry(opcode | 0xF0), micro_address);
    }

    #[test]
    fn entries_are_distinct() {
        let mut entries = DispatchTable::default().entries().to_vec();
        entries.sort_unstable();
        entries.dedup();
        assert_eq!(entries.len(), 16);
    }
}
