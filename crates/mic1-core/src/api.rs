//! Host-facing configuration, outcome and observation types.

use crate::bits::ADDRESS_MASK;
use crate::{CacheStats, DispatchTable, FaultCode, Instruction, Microinstruction, Register};

/// Microcycles [`crate::Cpu::run_default`] allows before giving up.
pub const DEFAULT_CYCLE_BUDGET: u64 = 100_000;

/// When a retired instruction counts as the end of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct HaltPolicy {
    /// Stop on `HALT`.
    pub halt_instruction: bool,
    /// Stop on `JUMP` to the instruction's own address.
    pub self_jump: bool,
}

impl Default for HaltPolicy {
    fn default() -> Self {
        Self {
            halt_instruction: true,
            self_jump: true,
        }
    }
}

impl HaltPolicy {
    /// Checks an instruction `word` that retired from address `pc`.
    #[must_use]
    pub const fn check(&self, pc: u16, word: u16) -> Option<HaltReason> {
        match Instruction::decode(word) {
            Instruction::Halt if self.halt_instruction => Some(HaltReason::HaltInstruction),
            Instruction::Jump(target) if self.self_jump && target == pc & ADDRESS_MASK => {
                Some(HaltReason::SelfJump)
            }
            _ => None,
        }
    }
}

/// Top-level configuration for a CPU instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuConfig {
    /// Route MBR traffic through the cache; otherwise straight to memory.
    pub cache_enabled: bool,
    /// Opcode to micro-address table for the dispatch branch.
    pub dispatch: DispatchTable,
    /// Budget used by [`crate::Cpu::run_default`].
    pub cycle_budget: u64,
    /// Stop conditions checked by the run loop.
    pub halt_policy: HaltPolicy,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            dispatch: DispatchTable::MAC1,
            cycle_budget: DEFAULT_CYCLE_BUDGET,
            halt_policy: HaltPolicy::default(),
        }
    }
}

/// Result of one microcycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The cycle stayed inside an instruction's microcode.
    Microcycle,
    /// The cycle returned control to the fetch entry.
    InstructionRetired {
        /// Address the instruction was fetched from.
        pc: u16,
        /// Instruction word (`IR`).
        word: u16,
    },
}

/// Why [`crate::Cpu::run`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HaltReason {
    /// A `HALT` instruction retired.
    HaltInstruction,
    /// A `JUMP` to its own address retired.
    SelfJump,
    /// The cycle budget ran out first.
    BudgetExhausted,
}

/// Totals from one [`crate::Cpu::run`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunOutcome {
    /// Microcycles executed by this call.
    pub cycles: u64,
    /// Instructions retired by this call.
    pub instructions: u64,
    /// Stop condition.
    pub reason: HaltReason,
}

/// Events reported by [`crate::Cpu::step_traced`], in datapath order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// A microinstruction was latched into MIR.
    MicroinstructionFetched {
        /// Micro-address fetched from.
        mpc: u8,
        /// Word latched.
        mir: Microinstruction,
    },
    /// The C bus wrote a register.
    RegisterWrite {
        /// Destination.
        register: Register,
        /// Value written.
        value: u16,
    },
    /// MBR was filled from memory.
    MemoryRead {
        /// Address read.
        addr: u16,
        /// Word read.
        value: u16,
        /// Cache outcome, `None` with the cache disabled.
        hit: Option<bool>,
    },
    /// MBR was stored to memory.
    MemoryWrite {
        /// Address written.
        addr: u16,
        /// Word written.
        value: u16,
    },
    /// An operation was skipped because of a fault.
    FaultRaised {
        /// Fault raised.
        cause: FaultCode,
        /// Micro-address of the faulting cycle.
        mpc: u8,
    },
    /// The cycle returned control to the fetch entry.
    InstructionRetired {
        /// Address the instruction was fetched from.
        pc: u16,
        /// Instruction word.
        word: u16,
    },
}

/// Sink trait for trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Point-in-time copy of the machine state a debugger renders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuSnapshot {
    /// Register values in select-field order.
    pub registers: [u16; crate::REGISTER_COUNT],
    /// Next micro-address.
    pub mpc: u8,
    /// Last latched microinstruction.
    pub mir: u32,
    /// Memory Address Register.
    pub mar: u16,
    /// Memory Buffer Register.
    pub mbr: u16,
    /// A-bus latch.
    pub latch_a: u16,
    /// B-bus latch.
    pub latch_b: u16,
    /// Last ALU output.
    pub alu_output: u16,
    /// N flag latched in the MMUX.
    pub flag_n: bool,
    /// Z flag latched in the MMUX.
    pub flag_z: bool,
    /// Microcycles since the last reset or statistics reset.
    pub cycle_count: u64,
    /// Microcycles since the last reset.
    pub clock: u64,
    /// Cache counters.
    pub cache: CacheStats,
    /// Most recent fault, if any.
    pub last_fault: Option<FaultCode>,
    /// Faults since the last reset.
    pub fault_count: u64,
    /// True while [`crate::Cpu::run`] is executing.
    pub running: bool,
}

impl CpuSnapshot {
    /// Value of one register.
    #[must_use]
    pub const fn register(&self, register: Register) -> u16 {
        self.registers[register.index()]
    }
}
