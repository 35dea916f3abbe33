//! Mac-1 macro instructions as executed by the built-in microprogram.

use core::fmt;

use crate::bits::ADDRESS_MASK;

/// One decoded Mac-1 instruction.
///
/// Operands of the memory-reference and jump forms are 12-bit; `INSP` and
/// `DESP` take an 8-bit operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Instruction {
    Lodd(u16),
    Stod(u16),
    Addd(u16),
    Subd(u16),
    Jpos(u16),
    Jzer(u16),
    Jump(u16),
    Loco(u16),
    Lodl(u16),
    Stol(u16),
    Addl(u16),
    Subl(u16),
    Jneg(u16),
    Jnze(u16),
    Call(u16),
    Pshi,
    Popi,
    Push,
    Pop,
    Retn,
    Swap,
    Insp(u8),
    Desp(u8),
    Halt,
}

impl Instruction {
    /// Decodes a word the same way the microprogram does.
    ///
    /// Every word decodes: the extended group (`0xF...`) is selected by bits
    /// 11..9, and bit 8 only separates `DESP` from `HALT`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn decode(word: u16) -> Self {
        let x = word & ADDRESS_MASK;
        let y = word as u8;
        match word >> 12 {
            0x0 => Self::Lodd(x),
            0x1 => Self::Stod(x),
            0x2 => Self::Addd(x),
            0x3 => Self::Subd(x),
            0x4 => Self::Jpos(x),
            0x5 => Self::Jzer(x),
            0x6 => Self::Jump(x),
            0x7 => Self::Loco(x),
            0x8 => Self::Lodl(x),
            0x9 => Self::Stol(x),
            0xA => Self::Addl(x),
            0xB => Self::Subl(x),
            0xC => Self::Jneg(x),
            0xD => Self::Jnze(x),
            0xE => Self::Call(x),
            _ => match (word >> 9) & 0b111 {
                0 => Self::Pshi,
                1 => Self::Popi,
                2 => Self::Push,
                3 => Self::Pop,
                4 => Self::Retn,
                5 => Self::Swap,
                6 => Self::Insp(y),
                _ if word & 0x0100 == 0 => Self::Desp(y),
                _ => Self::Halt,
            },
        }
    }

    /// Canonical encoding. Operands wider than their field are truncated.
    #[must_use]
    pub const fn encode(self) -> u16 {
        match self {
            Self::Lodd(x) => x & ADDRESS_MASK,
            Self::Stod(x) => 0x1000 | (x & ADDRESS_MASK),
            Self::Addd(x) => 0x2000 | (x & ADDRESS_MASK),
            Self::Subd(x) => 0x3000 | (x & ADDRESS_MASK),
            Self::Jpos(x) => 0x4000 | (x & ADDRESS_MASK),
            Self::Jzer(x) => 0x5000 | (x & ADDRESS_MASK),
            Self::Jump(x) => 0x6000 | (x & ADDRESS_MASK),
            Self::Loco(x) => 0x7000 | (x & ADDRESS_MASK),
            Self::Lodl(x) => 0x8000 | (x & ADDRESS_MASK),
            Self::Stol(x) => 0x9000 | (x & ADDRESS_MASK),
            Self::Addl(x) => 0xA000 | (x & ADDRESS_MASK),
            Self::Subl(x) => 0xB000 | (x & ADDRESS_MASK),
            Self::Jneg(x) => 0xC000 | (x & ADDRESS_MASK),
            Self::Jnze(x) => 0xD000 | (x & ADDRESS_MASK),
            Self::Call(x) => 0xE000 | (x & ADDRESS_MASK),
            Self::Pshi => 0xF000,
            Self::Popi => 0xF200,
            Self::Push => 0xF400,
            Self::Pop => 0xF600,
            Self::Retn => 0xF800,
            Self::Swap => 0xFA00,
            Self::Insp(y) => 0xFC00 | y as u16,
            Self::Desp(y) => 0xFE00 | y as u16,
            Self::Halt => 0xFF00,
        }
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Lodd(_) => "LODD",
            Self::Stod(_) => "STOD",
            Self::Addd(_) => "ADDD",
            Self::Subd(_) => "SUBD",
            Self::Jpos(_) => "JPOS",
            Self::Jzer(_) => "JZER",
            Self::Jump(_) => "JUMP",
            Self::Loco(_) => "LOCO",
            Self::Lodl(_) => "LODL",
            Self::Stol(_) => "STOL",
            Self::Addl(_) => "ADDL",
            Self::Subl(_) => "SUBL",
            Self::Jneg(_) => "JNEG",
            Self::Jnze(_) => "JNZE",
            Self::Call(_) => "CALL",
            Self::Pshi => "PSHI",
            Self::Popi => "POPI",
            Self::Push => "PUSH",
            Self::Pop => "POP",
            Self::Retn => "RETN",
            Self::Swap => "SWAP",
            Self::Insp(_) => "INSP",
            Self::Desp(_) => "DESP",
            Self::Halt => "HALT",
        }
    }

    /// Operand, if the instruction takes one.
    #[must_use]
    pub const fn operand(self) -> Option<u16> {
        match self {
            Self::Lodd(x)
            | Self::Stod(x)
            | Self::Addd(x)
            | Self::Subd(x)
            | Self::Jpos(x)
            | Self::Jzer(x)
            | Self::Jump(x)
            | Self::Loco(x)
            | Self::Lodl(x)
            | Self::Stol(x)
            | Self::Addl(x)
            | Self::Subl(x)
            | Self::Jneg(x)
            | Self::Jnze(x)
            | Self::Call(x) => Some(x),
            Self::Insp(y) | Self::Desp(y) => Some(y as u16),
            Self::Pshi
            | Self::Popi
            | Self::Push
            | Self::Pop
            | Self::Retn
            | Self::Swap
            | Self::Halt => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{} {operand}", self.mnemonic()),
            None => f.write_str(self.mnemonic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x0064, Instruction::Lodd(100))]
    #[case(0x7005, Instruction::Loco(5))]
    #[case(0x6FFF, Instruction::Jump(0xFFF))]
    #[case(0xE123, Instruction::Call(0x123))]
    #[case(0xF000, Instruction::Pshi)]
    #[case(0xF200, Instruction::Popi)]
    #[case(0xF400, Instruction::Push)]
    #[case(0xF600, Instruction::Pop)]
    #[case(0xF800, Instruction::Retn)]
    #[case(0xFA00, Instruction::Swap)]
    #[case(0xFC05, Instruction::Insp(5))]
    #[case(0xFE10, Instruction::Desp(0x10))]
    #[case(0xFF00, Instruction::Halt)]
    #[case(0xFFAB, Instruction::Halt)]
    #[case(0xF1FF, Instruction::Pshi)]
    #[case(0xFD07, Instruction::Insp(7))]
    fn decoding(#[case] word: u16, #[case] expected: Instruction) {
        assert_eq!(Instruction::decode(word), expected);
    }

    #[rstest]
    #[case(Instruction::Loco(5), "LOCO 5")]
    #[case(Instruction::Addd(100), "ADDD 100")]
    #[case(Instruction::Insp(3), "INSP 3")]
    #[case(Instruction::Halt, "HALT")]
    #[case(Instruction::Retn, "RETN")]
    fn disassembly(#[case] instruction: Instruction, #[case] expected: &str) {
        assert_eq!(instruction.to_string(), expected);
    }

    proptest! {
        #[test]
        fn canonical_encodings_decode_to_themselves(word in any::<u16>()) {
            let instruction = Instruction::decode(word);
            prop_assert_eq!(Instruction::decode(instruction.encode()), instruction);
        }
    }
}
