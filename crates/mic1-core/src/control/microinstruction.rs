//! 32-bit microinstruction encoding.
//!
//! | bits  | field | meaning                                   |
//! |-------|-------|-------------------------------------------|
//! | 31    | AMUX  | 0 = Latch A, 1 = MBR                      |
//! | 30-29 | COND  | 0 none, 1 if N, 2 if Z, 3 always          |
//! | 28-27 | ALU   | 0 A+B, 1 A AND B, 2 A, 3 NOT A            |
//! | 26-25 | SH    | 0 none, 1 left, 2 right, 3 reserved       |
//! | 24    | MBR   | load MBR from the shifter                 |
//! | 23    | MAR   | load MAR from Latch B                     |
//! | 22    | RD    | read memory into MBR                      |
//! | 21    | WR    | write MBR to memory                       |
//! | 20    | ENC   | enable the C bus                          |
//! | 19-16 | C     | destination register                      |
//! | 15-12 | B     | B-bus source                              |
//! | 11-8  | A     | A-bus source                              |
//! | 7-0   | ADDR  | branch target                             |
//!
//! Register-select fields hold the register number with bit 0 as LSB.

use core::fmt;

use crate::bits::{extract_field, format_bits, insert_field};
use crate::{AluOp, Register, ShiftOp};

/// Bit position of the AMUX field.
pub const AMUX_SHIFT: u32 = 31;
/// Bit position of the COND field.
pub const COND_SHIFT: u32 = 29;
/// Bit position of the ALU field.
pub const ALU_SHIFT: u32 = 27;
/// Bit position of the SH field.
pub const SH_SHIFT: u32 = 25;
/// Bit position of the MBR-load field.
pub const MBR_SHIFT: u32 = 24;
/// Bit position of the MAR-load field.
pub const MAR_SHIFT: u32 = 23;
/// Bit position of the RD field.
pub const RD_SHIFT: u32 = 22;
/// Bit position of the WR field.
pub const WR_SHIFT: u32 = 21;
/// Bit position of the ENC field.
pub const ENC_SHIFT: u32 = 20;
/// Bit position of the C field.
pub const C_SHIFT: u32 = 16;
/// Bit position of the B field.
pub const B_SHIFT: u32 = 12;
/// Bit position of the A field.
pub const A_SHIFT: u32 = 8;
/// Bit position of the ADDR field.
pub const ADDR_SHIFT: u32 = 0;
/// ADDR value that, with [`Condition::Always`], selects opcode dispatch.
pub const DISPATCH_SENTINEL: u8 = 0xFF;
/// Width of a microinstruction in bits.
pub const MICROINSTRUCTION_BITS: usize = 32;

/// Source of the ALU's A input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AmuxSelect {
    /// Latch A.
    #[default]
    LatchA,
    /// Memory Buffer Register.
    Mbr,
}

/// Branch condition tested by the MMUX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Condition {
    /// Fall through to `MPC + 1`.
    #[default]
    None = 0,
    /// Branch when the ALU output was negative.
    IfN = 1,
    /// Branch when the ALU output was zero.
    IfZ = 2,
    /// Always branch.
    Always = 3,
}

impl Condition {
    /// Decodes the 2-bit COND field. Only the low two bits are read.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::None,
            1 => Self::IfN,
            2 => Self::IfZ,
            _ => Self::Always,
        }
    }

    /// Field value of this condition.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// One raw microinstruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Microinstruction(pub u32);

impl Microinstruction {
    /// The all-zero word: no register write, no memory access, fall through.
    pub const NOP: Self = Self(0);

    /// Raw word.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Decoded view of the word.
    #[must_use]
    pub const fn fields(self) -> MicroFields {
        MicroFields::decode(self)
    }

    /// The word as 32 binary digits, bit 31 first.
    #[must_use]
    pub fn to_bit_string(self) -> String {
        format_bits(self.0, MICROINSTRUCTION_BITS)
    }
}

impl From<MicroFields> for Microinstruction {
    fn from(fields: MicroFields) -> Self {
        fields.encode()
    }
}

impl fmt::Display for Microinstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fields(), f)
    }
}

/// Every field of a microinstruction, decoded.
///
/// Register selects are kept as raw 4-bit values; the decoders map them to
/// registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MicroFields {
    /// ALU A input source.
    pub amux: AmuxSelect,
    /// Branch condition.
    pub cond: Condition,
    /// ALU function.
    pub alu: AluOp,
    /// Shifter function.
    pub shift: ShiftOp,
    /// Load MBR from the shifter.
    pub mbr: bool,
    /// Load MAR from Latch B.
    pub mar: bool,
    /// Memory read.
    pub rd: bool,
    /// Memory write.
    pub wr: bool,
    /// C-bus write enable.
    pub enc: bool,
    /// C-bus destination select.
    pub c: u8,
    /// B-bus source select.
    pub b: u8,
    /// A-bus source select.
    pub a: u8,
    /// Branch target.
    pub addr: u8,
}

#[allow(clippy::cast_possible_truncation)]
const fn field(word: u32, shift: u32, width: u32) -> u8 {
    extract_field(word, shift, width) as u8
}

const fn flag(word: u32, shift: u32) -> bool {
    extract_field(word, shift, 1) == 1
}

impl MicroFields {
    /// Fields of [`Microinstruction::NOP`]; the starting point of the builder.
    pub const NOP: Self = Self::decode(Microinstruction::NOP);

    /// Extracts every field from a raw word.
    #[must_use]
    pub const fn decode(word: Microinstruction) -> Self {
        let raw = word.0;
        Self {
            amux: if flag(raw, AMUX_SHIFT) {
                AmuxSelect::Mbr
            } else {
                AmuxSelect::LatchA
            },
            cond: Condition::from_bits(field(raw, COND_SHIFT, 2)),
            alu: AluOp::from_bits(field(raw, ALU_SHIFT, 2)),
            shift: ShiftOp::from_bits(field(raw, SH_SHIFT, 2)),
            mbr: flag(raw, MBR_SHIFT),
            mar: flag(raw, MAR_SHIFT),
            rd: flag(raw, RD_SHIFT),
            wr: flag(raw, WR_SHIFT),
            enc: flag(raw, ENC_SHIFT),
            c: field(raw, C_SHIFT, 4),
            b: field(raw, B_SHIFT, 4),
            a: field(raw, A_SHIFT, 4),
            addr: field(raw, ADDR_SHIFT, 8),
        }
    }

    /// Packs the fields into a raw word. Out-of-width values are truncated.
    #[must_use]
    pub const fn encode(self) -> Microinstruction {
        let amux = matches!(self.amux, AmuxSelect::Mbr);
        let mut raw = 0;
        raw = insert_field(raw, AMUX_SHIFT, 1, amux as u32);
        raw = insert_field(raw, COND_SHIFT, 2, self.cond.bits() as u32);
        raw = insert_field(raw, ALU_SHIFT, 2, self.alu.bits() as u32);
        raw = insert_field(raw, SH_SHIFT, 2, self.shift.bits() as u32);
        raw = insert_field(raw, MBR_SHIFT, 1, self.mbr as u32);
        raw = insert_field(raw, MAR_SHIFT, 1, self.mar as u32);
        raw = insert_field(raw, RD_SHIFT, 1, self.rd as u32);
        raw = insert_field(raw, WR_SHIFT, 1, self.wr as u32);
        raw = insert_field(raw, ENC_SHIFT, 1, self.enc as u32);
        raw = insert_field(raw, C_SHIFT, 4, self.c as u32);
        raw = insert_field(raw, B_SHIFT, 4, self.b as u32);
        raw = insert_field(raw, A_SHIFT, 4, self.a as u32);
        raw = insert_field(raw, ADDR_SHIFT, 8, self.addr as u32);
        Microinstruction(raw)
    }

    /// Drives `register` onto the A bus.
    #[must_use]
    pub const fn a(mut self, register: Register) -> Self {
        self.a = register as u8;
        self
    }

    /// Drives `register` onto the B bus.
    #[must_use]
    pub const fn b(mut self, register: Register) -> Self {
        self.b = register as u8;
        self
    }

    /// Feeds MBR instead of Latch A into the ALU.
    #[must_use]
    pub const fn from_mbr(mut self) -> Self {
        self.amux = AmuxSelect::Mbr;
        self
    }

    /// Selects the ALU function.
    #[must_use]
    pub const fn alu(mut self, op: AluOp) -> Self {
        self.alu = op;
        self
    }

    /// Selects the shifter function.
    #[must_use]
    pub const fn shift(mut self, op: ShiftOp) -> Self {
        self.shift = op;
        self
    }

    /// Writes the shifter output into `register`.
    #[must_use]
    pub const fn write(mut self, register: Register) -> Self {
        self.c = register as u8;
        self.enc = true;
        self
    }

    /// Loads MBR from the shifter.
    #[must_use]
    pub const fn load_mbr(mut self) -> Self {
        self.mbr = true;
        self
    }

    /// Loads MAR from Latch B.
    #[must_use]
    pub const fn load_mar(mut self) -> Self {
        self.mar = true;
        self
    }

    /// Asserts RD.
    #[must_use]
    pub const fn rd(mut self) -> Self {
        self.rd = true;
        self
    }

    /// Asserts WR.
    #[must_use]
    pub const fn wr(mut self) -> Self {
        self.wr = true;
        self
    }

    /// Branches unconditionally to `addr`.
    #[must_use]
    pub const fn goto(self, addr: u8) -> Self {
        self.branch(Condition::Always, addr)
    }

    /// Branches to `addr` when the ALU output is negative.
    #[must_use]
    pub const fn if_n(self, addr: u8) -> Self {
        self.branch(Condition::IfN, addr)
    }

    /// Branches to `addr` when the ALU output is zero.
    #[must_use]
    pub const fn if_z(self, addr: u8) -> Self {
        self.branch(Condition::IfZ, addr)
    }

    /// Branches through the opcode dispatch table.
    #[must_use]
    pub const fn dispatch(self) -> Self {
        self.branch(Condition::Always, DISPATCH_SENTINEL)
    }

    const fn branch(mut self, cond: Condition, addr: u8) -> Self {
        self.cond = cond;
        self.addr = addr;
        self
    }

    /// Returns `true` for the opcode-dispatch branch.
    #[must_use]
    pub const fn is_dispatch(&self) -> bool {
        matches!(self.cond, Condition::Always) && self.addr == DISPATCH_SENTINEL
    }
}

fn register_name(select: u8) -> String {
    Register::from_index(select).map_or_else(|| format!("r{select}"), |r| r.name().to_owned())
}

impl fmt::Display for MicroFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = match self.amux {
            AmuxSelect::LatchA => register_name(self.a),
            AmuxSelect::Mbr => "mbr".to_owned(),
        };
        let b = register_name(self.b);
        let mut expr = match self.alu {
            AluOp::Add => format!("{a} + {b}"),
            AluOp::And => format!("band({a}, {b})"),
            AluOp::PassA => a,
            AluOp::NotA => format!("inv({a})"),
        };
        expr = match self.shift {
            ShiftOp::Left => format!("lshift({expr})"),
            ShiftOp::Right => format!("rshift({expr})"),
            ShiftOp::None | ShiftOp::Reserved => expr,
        };

        let mut parts = Vec::new();
        if self.mar {
            parts.push(format!("mar := {b}"));
        }
        if self.enc {
            parts.push(format!("{} := {expr}", register_name(self.c)));
        }
        if self.mbr {
            parts.push(format!("mbr := {expr}"));
        }
        if !self.enc && !self.mbr && matches!(self.cond, Condition::IfN | Condition::IfZ) {
            parts.push(format!("alu := {expr}"));
        }
        if self.rd {
            parts.push("rd".to_owned());
        }
        if self.wr {
            parts.push("wr".to_owned());
        }
        match self.cond {
            Condition::None => {}
            Condition::IfN => parts.push(format!("if n goto {}", self.addr)),
            Condition::IfZ => parts.push(format!("if z goto {}", self.addr)),
            Condition::Always if self.is_dispatch() => parts.push("goto dispatch".to_owned()),
            Condition::Always => parts.push(format!("goto {}", self.addr)),
        }

        if parts.is_empty() {
            f.write_str("nop")
        } else {
            f.write_str(&parts.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AmuxSelect, Condition, MicroFields, Microinstruction};
    use crate::{AluOp, Register, ShiftOp};
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn single_bit_fields_sit_at_their_documented_positions() {
        let fields = Microinstruction(1 << 31).fields();
        assert_eq!(fields.amux, AmuxSelect::Mbr);
        assert!(Microinstruction(1 << 24).fields().mbr);
        assert!(Microinstruction(1 << 23).fields().mar);
        assert!(Microinstruction(1 << 22).fields().rd);
        assert!(Microinstruction(1 << 21).fields().wr);
        assert!(Microinstruction(1 << 20).fields().enc);
    }

    #[test]
    fn multi_bit_fields_are_lsb_first_numbers() {
        let fields = Microinstruction(0b0_10_01_10_0_0_0_0_0_0011_0101_1001_1010_0101).fields();
        assert_eq!(fields.cond, Condition::IfZ);
        assert_eq!(fields.alu, AluOp::And);
        assert_eq!(fields.shift, ShiftOp::Right);
        assert_eq!(fields.c, 0b0011);
        assert_eq!(fields.b, 0b0101);
        assert_eq!(fields.a, 0b1001);
        assert_eq!(fields.addr, 0b1010_0101);
    }

    #[test]
    fn zero_word_is_a_nop() {
        assert_eq!(MicroFields::NOP, MicroFields::default());
        assert_eq!(Microinstruction::NOP.to_string(), "nop");
        assert_eq!(Microinstruction::NOP.to_bit_string(), "0".repeat(32));
    }

    #[test]
    fn builder_sets_only_what_it_names() {
        let fields = MicroFields::NOP
            .a(Register::Sp)
            .b(Register::Rm1)
            .write(Register::Sp);
        assert_eq!(fields.a, 4);
        assert_eq!(fields.b, 9);
        assert_eq!(fields.c, 4);
        assert!(fields.enc);
        assert!(!fields.mar && !fields.mbr && !fields.rd && !fields.wr);
        assert_eq!(fields.cond, Condition::None);
        assert_eq!(fields.encode().raw(), 0x0014_9400);
    }

    #[rstest]
    #[case(MicroFields::NOP.b(Register::Pc).load_mar().rd(), "mar := pc; rd")]
    #[case(MicroFields::NOP.from_mbr().alu(AluOp::PassA).write(Register::Ir), "ir := mbr")]
    #[case(
        MicroFields::NOP.a(Register::Pc).b(Register::R1).write(Register::Pc).dispatch(),
        "pc := pc + 1; goto dispatch"
    )]
    #[case(
        MicroFields::NOP
            .a(Register::Ac)
            .b(Register::Ir)
            .alu(AluOp::PassA)
            .load_mbr()
            .load_mar()
            .wr()
            .goto(0),
        "mar := ir; mbr := ac; wr; goto 0"
    )]
    #[case(MicroFields::NOP.a(Register::Ac).alu(AluOp::PassA).if_z(16), "alu := ac; if z goto 16")]
    #[case(
        MicroFields::NOP.a(Register::Ir).b(Register::Ir).shift(ShiftOp::Left).write(Register::Tir),
        "tir := lshift(ir + ir)"
    )]
    #[case(
        MicroFields::NOP.a(Register::Pc).b(Register::Rm1).write(Register::Pc).goto(0),
        "pc := pc + (-1); goto 0"
    )]
    #[case(MicroFields::NOP.a(Register::A).alu(AluOp::NotA).write(Register::A), "a := inv(a)")]
    fn register_transfer_notation(#[case] fields: MicroFields, #[case] expected: &str) {
        assert_eq!(fields.to_string(), expected);
        assert_eq!(fields.encode().to_string(), expected);
    }

    proptest! {
        #[test]
        fn decode_then_encode_is_identity(raw in any::<u32>()) {
            let word = Microinstruction(raw);
            prop_assert_eq!(word.fields().encode(), word);
        }
    }
}
