use crate::bits::WORD_SIGN_BIT;

/// Shift selected by the 2-bit SH field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum ShiftOp {
    /// Pass through.
    #[default]
    None = 0,
    /// Shift left one bit, zero fill.
    Left = 1,
    /// Arithmetic shift right one bit, sign fill.
    Right = 2,
    /// Unassigned code; behaves as [`ShiftOp::None`].
    Reserved = 3,
}

impl ShiftOp {
    /// Decodes the 2-bit SH field. Only the low two bits are read.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::None,
            1 => Self::Left,
            2 => Self::Right,
            _ => Self::Reserved,
        }
    }

    /// Field value of this shift.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Applies the shift to a word.
    #[must_use]
    pub const fn apply(self, word: u16) -> u16 {
        match self {
            Self::None | Self::Reserved => word,
            Self::Left => word << 1,
            Self::Right => (word >> 1) | (word & WORD_SIGN_BIT),
        }
    }
}

/// Post-ALU shifter; holds the word it last produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shifter {
    /// Selected shift.
    pub op: ShiftOp,
    data: u16,
}

impl Shifter {
    /// Shifts `input` by the selected operation and latches the result.
    pub const fn shift(&mut self, input: u16) -> u16 {
        self.data = self.op.apply(input);
        self.data
    }

    /// Word produced by the last shift.
    #[must_use]
    pub const fn data(&self) -> u16 {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::{ShiftOp, Shifter};
    use crate::bits::word_to_int;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(ShiftOp::Right, 0x0004, 0x0002)]
    #[case(ShiftOp::Left, 0x0001, 0x0002)]
    #[case(ShiftOp::Left, 0x8001, 0x0002)]
    #[case(ShiftOp::Right, 0x8000, 0xC000)]
    #[case(ShiftOp::Right, 0xFFFF, 0xFFFF)]
    #[case(ShiftOp::None, 0x1234, 0x1234)]
    #[case(ShiftOp::Reserved, 0x1234, 0x1234)]
    fn vectors(#[case] op: ShiftOp, #[case] input: u16, #[case] expected: u16) {
        let mut shifter = Shifter { op, data: 0 };
        assert_eq!(shifter.shift(input), expected);
        assert_eq!(shifter.data(), expected);
    }

    proptest! {
        #[test]
        fn right_shift_preserves_sign(value in i16::MIN..=i16::MAX) {
            #[allow(clippy::cast_sign_loss)]
            let shifted = word_to_int(ShiftOp::Right.apply(value as u16));
            prop_assert_eq!(shifted < 0, value < 0);
            prop_assert_eq!(shifted, value >> 1);
        }
    }
}
