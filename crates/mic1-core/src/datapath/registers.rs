/// Number of registers in the bank.
pub const REGISTER_COUNT: usize = 16;
/// Power-on value of `AMASK` (low 12 bits: the address part of an instruction).
pub const AMASK_RESET: u16 = 0x0FFF;
/// Power-on value of `SMASK` (low 8 bits: the `INSP`/`DESP` operand).
pub const SMASK_RESET: u16 = 0x00FF;
/// Power-on value of the stack pointer (top of memory).
pub const SP_RESET: u16 = 0x0FFF;

/// One of the sixteen named datapath registers.
///
/// The discriminant is the value a 4-bit register-select field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    Pc = 0,
    Ac = 1,
    Ir = 2,
    Tir = 3,
    Sp = 4,
    Amask = 5,
    Smask = 6,
    R0 = 7,
    R1 = 8,
    Rm1 = 9,
    A = 10,
    B = 11,
    C = 12,
    D = 13,
    E = 14,
    F = 15,
}

impl Register {
    /// All registers in select-field order.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::Pc,
        Self::Ac,
        Self::Ir,
        Self::Tir,
        Self::Sp,
        Self::Amask,
        Self::Smask,
        Self::R0,
        Self::R1,
        Self::Rm1,
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
    ];

    /// Returns the array index for this register (`0..=15`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Maps a register-select value to a register.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < REGISTER_COUNT {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Lower-case name used in register-transfer notation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pc => "pc",
            Self::Ac => "ac",
            Self::Ir => "ir",
            Self::Tir => "tir",
            Self::Sp => "sp",
            Self::Amask => "amask",
            Self::Smask => "smask",
            Self::R0 => "0",
            Self::R1 => "1",
            Self::Rm1 => "(-1)",
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::F => "f",
        }
    }

    /// Value the register holds after reset.
    #[must_use]
    pub const fn reset_value(self) -> u16 {
        match self {
            Self::Sp => SP_RESET,
            Self::Amask => AMASK_RESET,
            Self::Smask => SMASK_RESET,
            Self::R1 => 1,
            Self::Rm1 => 0xFFFF,
            _ => 0,
        }
    }
}

/// The sixteen 16-bit datapath registers.
///
/// Constant registers (`R0`, `R1`, `Rm1`, `AMASK`, `SMASK`) are only constant
/// by convention; a C-bus write replaces them like any other register.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterBank {
    values: [u16; REGISTER_COUNT],
}

impl Default for RegisterBank {
    fn default() -> Self {
        let mut values = [0; REGISTER_COUNT];
        for register in Register::ALL {
            values[register.index()] = register.reset_value();
        }
        Self { values }
    }
}

impl RegisterBank {
    /// Reads a register.
    #[must_use]
    pub const fn get(&self, register: Register) -> u16 {
        self.values[register.index()]
    }

    /// Writes a register.
    pub const fn set(&mut self, register: Register, value: u16) {
        self.values[register.index()] = value;
    }

    /// Returns every register value in select-field order.
    #[must_use]
    pub const fn values(&self) -> &[u16; REGISTER_COUNT] {
        &self.values
    }

    /// Restores the power-on values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{Register, RegisterBank, REGISTER_COUNT};
    use rstest::rstest;

    #[rstest]
    #[case(Register::Pc, 0x0000)]
    #[case(Register::Ac, 0x0000)]
    #[case(Register::Sp, 0x0FFF)]
    #[case(Register::Amask, 0x0FFF)]
    #[case(Register::Smask, 0x00FF)]
    #[case(Register::R0, 0x0000)]
    #[case(Register::R1, 0x0001)]
    #[case(Register::Rm1, 0xFFFF)]
    #[case(Register::F, 0x0000)]
    fn power_on_values(#[case] register: Register, #[case] expected: u16) {
        assert_eq!(RegisterBank::default().get(register), expected);
    }

    #[test]
    fn select_values_map_onto_the_fixed_table() {
        for (index, register) in Register::ALL.iter().enumerate() {
            let select = u8::try_from(index).expect("index fits in u8");
            assert_eq!(Register::from_index(select), Some(*register));
            assert_eq!(register.index(), index);
        }
        let past_end = u8::try_from(REGISTER_COUNT).expect("count fits in u8");
        assert_eq!(Register::from_index(past_end), None);
    }

    #[test]
    fn constant_registers_can_be_overwritten_and_reset() {
        let mut bank = RegisterBank::default();
        bank.set(Register::R1, 42);
        bank.set(Register::Amask, 0);
        assert_eq!(bank.get(Register::R1), 42);
        bank.reset();
        assert_eq!(bank, RegisterBank::default());
    }
}
