//! Cycle-accurate simulator core for the MIC-1 microarchitecture.
//!
//! A 16-bit datapath driven by a stored microprogram, with a direct-mapped
//! write-through cache over 4096 words of memory. [`Cpu`] owns one of every
//! component and executes one microcycle per [`Cpu::step`].

/// Two's-complement and bit-field helpers.
pub mod bits;

/// Fault and load-error taxonomy.
pub mod fault;
pub use fault::{FaultClass, FaultCode, LoadError};

/// Register bank, decoders, ALU and shifter.
pub mod datapath;
pub use datapath::{
    control_to_index, Alu, AluOp, Datapath, Decoder, DecoderC, Register, RegisterBank, ShiftOp,
    Shifter, REGISTER_COUNT,
};

/// Memory, MAR/MBR and the cache.
pub mod memory;
pub use memory::{
    decode_program, encode_program, Address, Cache, CacheLine, CacheStats, Mar, Mbr, Memory,
    MemoryBus, MEMORY_WORDS,
};

/// Microprogrammed control unit and the built-in MAC-1 microprogram.
pub mod control;
pub use control::{
    AmuxSelect, Condition, ControlMemory, ControlUnit, DispatchTable, MicroFields,
    Microinstruction, Mmux,
};

/// Mac-1 instruction decoding and encoding.
pub mod isa;
pub use isa::Instruction;

/// Host-facing configuration, outcome and trace types.
pub mod api;
pub use api::{
    CpuConfig, CpuSnapshot, HaltPolicy, HaltReason, RunOutcome, StepOutcome, TraceEvent,
    TraceSink, DEFAULT_CYCLE_BUDGET,
};

/// The machine and its cycle routine.
pub mod cpu;
pub use cpu::Cpu;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
