//! Datapath components: register bank with its decoders, ALU and shifter.

mod alu;
mod decoder;
mod registers;
mod shifter;

pub use alu::{Alu, AluOp};
pub use decoder::{control_to_index, Decoder, DecoderC};
pub use registers::{
    Register, RegisterBank, AMASK_RESET, REGISTER_COUNT, SMASK_RESET, SP_RESET,
};
pub use shifter::{ShiftOp, Shifter};

/// Every combinational and storage element between the register bank and the
/// memory interface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Datapath {
    /// The sixteen registers.
    pub registers: RegisterBank,
    /// Read decoder feeding Latch A.
    pub decoder_a: Decoder,
    /// Read decoder feeding Latch B.
    pub decoder_b: Decoder,
    /// Write decoder on the C bus.
    pub decoder_c: DecoderC,
    /// A-bus latch.
    pub latch_a: u16,
    /// B-bus latch.
    pub latch_b: u16,
    /// Arithmetic/logic unit.
    pub alu: Alu,
    /// Post-ALU shifter.
    pub shifter: Shifter,
}

impl Datapath {
    /// Fills both latches from the registers selected by decoders A and B.
    ///
    /// # Errors
    ///
    /// Returns the first decoder fault. A latch whose decoder faulted keeps its
    /// previous value.
    pub fn fill_latches(&mut self) -> Result<(), crate::FaultCode> {
        let a = self.decoder_a.read(&self.registers);
        let b = self.decoder_b.read(&self.registers);
        if let Ok(value) = a {
            self.latch_a = value;
        }
        if let Ok(value) = b {
            self.latch_b = value;
        }
        a.and(b).map(|_| ())
    }

    /// Restores power-on state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
