use super::registers::{Register, RegisterBank};
use crate::FaultCode;

/// Maps a 4-bit register-select value (bit 0 = LSB) to its register.
///
/// # Errors
///
/// Returns [`FaultCode::DecoderIndexOutOfRange`] when `control` has no table
/// entry. A value extracted from a microinstruction field never does.
pub const fn control_to_index(control: u8) -> Result<Register, FaultCode> {
    match Register::from_index(control) {
        Some(register) => Ok(register),
        None => Err(FaultCode::DecoderIndexOutOfRange),
    }
}

/// Read decoder driving Latch A or Latch B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoder {
    /// Register-select value.
    pub control: u8,
}

impl Decoder {
    /// Reads the selected register.
    ///
    /// # Errors
    ///
    /// Propagates [`control_to_index`] failures; the latch is left unchanged.
    pub const fn read(&self, bank: &RegisterBank) -> Result<u16, FaultCode> {
        match control_to_index(self.control) {
            Ok(register) => Ok(bank.get(register)),
            Err(fault) => Err(fault),
        }
    }
}

/// Write decoder driving the C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderC {
    /// Register-select value.
    pub control: u8,
    /// Write enable (ENC).
    pub enable: bool,
}

impl DecoderC {
    /// Writes `data` into the selected register when enabled.
    ///
    /// Returns the register written, or `None` when the decoder is disabled.
    ///
    /// # Errors
    ///
    /// Propagates [`control_to_index`] failures; no register is written.
    pub fn write(&self, bank: &mut RegisterBank, data: u16) -> Result<Option<Register>, FaultCode> {
        if !self.enable {
            return Ok(None);
        }
        let register = control_to_index(self.control)?;
        bank.set(register, data);
        Ok(Some(register))
    }
}

#[cfg(test)]
mod tests {
    use super::{control_to_index, Decoder, DecoderC};
    use crate::{FaultCode, Register, RegisterBank};

    #[test]
    fn decoders_read_the_selected_register() {
        let bank = RegisterBank::default();
        assert_eq!(Decoder { control: 5 }.read(&bank), Ok(0x0FFF));
        assert_eq!(Decoder { control: 9 }.read(&bank), Ok(0xFFFF));
    }

    #[test]
    fn disabled_write_is_a_no_op_not_a_zero_write() {
        let mut bank = RegisterBank::default();
        let decoder = DecoderC {
            control: Register::Sp as u8,
            enable: false,
        };
        assert_eq!(decoder.write(&mut bank, 0), Ok(None));
        assert_eq!(bank.get(Register::Sp), 0x0FFF);
    }

    #[test]
    fn enabled_write_lands_in_the_selected_register() {
        let mut bank = RegisterBank::default();
        let decoder = DecoderC {
            control: 1,
            enable: true,
        };
        assert_eq!(decoder.write(&mut bank, 77), Ok(Some(Register::Ac)));
        assert_eq!(bank.get(Register::Ac), 77);
    }

    #[test]
    fn out_of_table_index_is_reported_and_skipped() {
        let mut bank = RegisterBank::default();
        assert_eq!(control_to_index(16), Err(FaultCode::DecoderIndexOutOfRange));
        assert_eq!(
            Decoder { control: 200 }.read(&bank),
            Err(FaultCode::DecoderIndexOutOfRange)
        );
        let decoder = DecoderC {
            control: 16,
            enable: true,
        };
        assert_eq!(
            decoder.write(&mut bank, 1),
            Err(FaultCode::DecoderIndexOutOfRange)
        );
        assert_eq!(bank, RegisterBank::default());
    }
}
