use crate::bits::WORD_SIGN_BIT;

/// ALU function selected by the 2-bit ALU field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum AluOp {
    /// `A + B`, wrapping modulo 2^16.
    #[default]
    Add = 0,
    /// Bitwise `A AND B`.
    And = 1,
    /// `A` unchanged.
    PassA = 2,
    /// Bitwise complement of `A`.
    NotA = 3,
}

impl AluOp {
    /// Decodes the 2-bit ALU field. Only the low two bits are read.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Add,
            1 => Self::And,
            2 => Self::PassA,
            _ => Self::NotA,
        }
    }

    /// Field value of this operation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Applies the operation to two words.
    #[must_use]
    pub const fn apply(self, a: u16, b: u16) -> u16 {
        match self {
            Self::Add => a.wrapping_add(b),
            Self::And => a & b,
            Self::PassA => a,
            Self::NotA => !a,
        }
    }
}

/// Combinational 16-bit ALU.
///
/// Inputs and the operation are latched by the orchestrator before
/// [`Alu::evaluate`]; the output and both flags are recomputed on every
/// evaluation so they are never stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Alu {
    /// A input (Latch A or MBR, through the AMUX).
    pub input_a: u16,
    /// B input (Latch B).
    pub input_b: u16,
    /// Selected function.
    pub op: AluOp,
    output: u16,
    flag_n: bool,
    flag_z: bool,
}

impl Alu {
    /// Computes the output and N/Z flags from the current inputs.
    pub const fn evaluate(&mut self) -> u16 {
        self.output = self.op.apply(self.input_a, self.input_b);
        self.flag_n = self.output & WORD_SIGN_BIT != 0;
        self.flag_z = self.output == 0;
        self.output
    }

    /// Latches inputs and operation, then evaluates.
    pub const fn compute(&mut self, op: AluOp, a: u16, b: u16) -> u16 {
        self.op = op;
        self.input_a = a;
        self.input_b = b;
        self.evaluate()
    }

    /// Output of the last evaluation.
    #[must_use]
    pub const fn output(&self) -> u16 {
        self.output
    }

    /// Sign bit of the last output.
    #[must_use]
    pub const fn flag_n(&self) -> bool {
        self.flag_n
    }

    /// Set when the last output was zero.
    #[must_use]
    pub const fn flag_z(&self) -> bool {
        self.flag_z
    }
}

#[cfg(test)]
mod tests {
    use super::{Alu, AluOp};
    use crate::bits::int_to_word;
    use rstest::rstest;

    #[rstest]
    #[case(AluOp::Add, 5, 3, 8, false, false)]
    #[case(AluOp::Add, -1, 1, 0, false, true)]
    #[case(AluOp::Add, 5, -10, -5, true, false)]
    #[case(AluOp::Add, 0x7FFF, 1, -0x8000, true, false)]
    #[case(AluOp::And, 0xFF00, 0x0FFF, 0x0F00, false, false)]
    #[case(AluOp::PassA, 0xABCD, 0x1234, 0xABCD, true, false)]
    #[case(AluOp::NotA, 0, 0x1234, 0xFFFF, true, false)]
    #[case(AluOp::NotA, -1, 0, 0, false, true)]
    fn vectors(
        #[case] op: AluOp,
        #[case] a: i32,
        #[case] b: i32,
        #[case] expected: i32,
        #[case] n: bool,
        #[case] z: bool,
    ) {
        let mut alu = Alu::default();
        let out = alu.compute(op, int_to_word(a), int_to_word(b));
        assert_eq!(out, int_to_word(expected));
        assert_eq!(alu.output(), out);
        assert_eq!(alu.flag_n(), n);
        assert_eq!(alu.flag_z(), z);
    }

    #[test]
    fn flags_follow_the_latest_evaluation() {
        let mut alu = Alu::default();
        alu.compute(AluOp::Add, 0, 0);
        assert!(alu.flag_z());
        alu.input_a = 0x8000;
        alu.evaluate();
        assert!(!alu.flag_z());
        assert!(alu.flag_n());
    }

    #[test]
    fn field_bits_roundtrip() {
        for bits in 0..4 {
            assert_eq!(AluOp::from_bits(bits).bits(), bits);
        }
        assert_eq!(AluOp::from_bits(0b110), AluOp::PassA);
    }
}
