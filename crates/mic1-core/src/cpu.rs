//! The machine: one of every component, wired through a single cycle routine.

use std::path::Path;

use tracing::{debug, error, trace, warn};

use crate::api::{
    CpuConfig, CpuSnapshot, HaltReason, RunOutcome, StepOutcome, TraceEvent, TraceSink,
};
use crate::control::mac1::entry;
use crate::control::{AmuxSelect, ControlMemory, ControlUnit, Microinstruction};
use crate::datapath::{Datapath, Register, RegisterBank};
use crate::memory::{decode_program, Cache, Mar, Mbr, Memory, MemoryBus, MEMORY_WORDS};
use crate::{FaultClass, FaultCode, LoadError};

struct NoTrace;

impl TraceSink for NoTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// A complete MIC-1 machine.
///
/// Each instance owns all of its state; independent instances never share
/// anything.
#[derive(Debug, Clone)]
pub struct Cpu {
    config: CpuConfig,
    datapath: Datapath,
    control: ControlUnit,
    control_memory: ControlMemory,
    bus: MemoryBus,
    mar: Mar,
    mbr: Mbr,
    cycle_count: u64,
    clock: u64,
    running: bool,
    last_fault: Option<FaultCode>,
    fault_count: u64,
    fetch_pc: Option<u16>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::with_mac1()
    }
}

impl Cpu {
    /// Creates a machine in its power-on state running `control_memory`.
    #[must_use]
    pub fn new(config: CpuConfig, control_memory: ControlMemory) -> Self {
        Self {
            config,
            datapath: Datapath::default(),
            control: ControlUnit::default(),
            control_memory,
            bus: MemoryBus {
                cache_enabled: config.cache_enabled,
                ..MemoryBus::default()
            },
            mar: Mar::default(),
            mbr: Mbr::default(),
            cycle_count: 0,
            clock: 0,
            running: false,
            last_fault: None,
            fault_count: 0,
            fetch_pc: None,
        }
    }

    /// Creates a machine with the default configuration and the built-in
    /// MAC-1 microprogram.
    #[must_use]
    pub fn with_mac1() -> Self {
        Self::new(CpuConfig::default(), ControlMemory::mac1())
    }

    /// Restores the power-on state of every component in place.
    ///
    /// Registers, latches, MIR/MPC, memory, cache and counters are cleared.
    /// Configuration and the loaded microprogram are kept. Main memory is
    /// zeroed too, so a program must be loaded again before the next run.
    pub fn reset(&mut self) {
        self.datapath.reset();
        self.control.reset();
        self.bus.memory.clear();
        self.bus.cache.reset();
        self.bus.cache_enabled = self.config.cache_enabled;
        self.mar = Mar::default();
        self.mbr = Mbr::default();
        self.cycle_count = 0;
        self.clock = 0;
        self.running = false;
        self.last_fault = None;
        self.fault_count = 0;
        self.fetch_pc = None;
        debug!("cpu reset");
    }

    /// Replaces the microprogram and returns the control unit to micro-address 0.
    pub fn load_microprogram(&mut self, control_memory: ControlMemory) {
        debug!(words = control_memory.len(), "microprogram installed");
        self.control_memory = control_memory;
        self.control.reset();
        self.fetch_pc = None;
    }

    /// Parses and installs microprogram text.
    ///
    /// # Errors
    ///
    /// Returns the parse failure; the current microprogram stays installed.
    pub fn load_microprogram_text(&mut self, text: &str) -> Result<(), LoadError> {
        self.load_microprogram(ControlMemory::parse(text)?);
        Ok(())
    }

    /// Reads and installs a microprogram file.
    ///
    /// # Errors
    ///
    /// Returns the read or parse failure; the current microprogram stays
    /// installed.
    pub fn load_microprogram_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.load_microprogram(ControlMemory::from_path(path)?);
        Ok(())
    }

    /// Places a program at address 0, zeroing the rest of memory and
    /// invalidating the cache.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ProgramTooLarge`] when the program exceeds memory;
    /// nothing is stored.
    pub fn load_program_words(&mut self, words: &[u16]) -> Result<(), LoadError> {
        if words.len() > MEMORY_WORDS {
            return Err(LoadError::ProgramTooLarge {
                words: words.len(),
                capacity: MEMORY_WORDS,
            });
        }
        self.bus.memory.load_image(words);
        self.bus.cache.reset();
        debug!(words = words.len(), "program loaded");
        Ok(())
    }

    /// Decodes a big-endian program image and loads it at address 0.
    ///
    /// # Errors
    ///
    /// As [`crate::decode_program`]; nothing is stored on failure.
    pub fn load_program_bytes(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let words = decode_program(bytes)?;
        self.load_program_words(&words)
    }

    /// Reads a program image file and loads it at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the file cannot be read, otherwise as
    /// [`Cpu::load_program_bytes`].
    pub fn load_program_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_program_bytes(&bytes)
    }

    /// The instruction word stored at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above `0x0FFF`.
    pub fn instruction_at(&self, address: u16) -> Result<u16, FaultCode> {
        self.bus.memory.peek(address)
    }

    /// Reads memory directly, bypassing the cache and its counters.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above `0x0FFF`.
    pub fn read_memory(&self, address: u16) -> Result<u16, FaultCode> {
        self.bus.memory.peek(address)
    }

    /// Writes memory as the datapath would, keeping a resident cache line
    /// coherent.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::MemoryAddressOutOfRange`] for addresses above `0x0FFF`.
    pub fn write_memory(&mut self, address: u16, value: u16) -> Result<(), FaultCode> {
        self.bus.write(address, value)
    }

    /// Executes one microcycle.
    pub fn step(&mut self) -> StepOutcome {
        self.step_traced(&mut NoTrace)
    }

    /// Executes one microcycle, reporting what happened to `sink`.
    pub fn step_traced<S: TraceSink + ?Sized>(&mut self, sink: &mut S) -> StepOutcome {
        let mpc = self.control.mpc;
        if mpc == entry::FETCH {
            self.fetch_pc = Some(self.datapath.registers.get(Register::Pc));
        }

        let mir = match self.control_memory.fetch(mpc) {
            Ok(word) => word,
            Err(cause) => {
                self.raise(cause, mpc, sink);
                Microinstruction::NOP
            }
        };
        trace!(mpc, mir = mir.raw(), "microcycle");
        sink.on_event(TraceEvent::MicroinstructionFetched { mpc, mir });
        self.control.load_mir(mir);
        self.control
            .run_mir(&mut self.datapath, &mut self.mar, &mut self.mbr);

        if let Err(cause) = self.datapath.fill_latches() {
            self.raise(cause, mpc, sink);
        }
        self.datapath.alu.input_a = match self.control.amux {
            AmuxSelect::LatchA => self.datapath.latch_a,
            AmuxSelect::Mbr => self.mbr.data,
        };
        self.datapath.alu.input_b = self.datapath.latch_b;
        let output = self.datapath.alu.evaluate();
        self.control
            .latch_flags(self.datapath.alu.flag_n(), self.datapath.alu.flag_z());
        let shifted = self.datapath.shifter.shift(output);

        match self
            .datapath
            .decoder_c
            .write(&mut self.datapath.registers, shifted)
        {
            Ok(Some(register)) => sink.on_event(TraceEvent::RegisterWrite {
                register,
                value: shifted,
            }),
            Ok(None) => {}
            Err(cause) => self.raise(cause, mpc, sink),
        }
        self.mar.latch(self.datapath.latch_b);

        // A read observes memory before the shifter word is staged for WR.
        let addr = self.mar.address.value();
        if self.mbr.rd {
            match self.bus.read(addr) {
                Ok(read) => {
                    self.mbr.data = read.value;
                    sink.on_event(TraceEvent::MemoryRead {
                        addr,
                        value: read.value,
                        hit: read.hit,
                    });
                }
                Err(cause) => self.raise(cause, mpc, sink),
            }
        }
        self.mbr.latch(shifted);
        if self.mbr.wr {
            match self.bus.write(addr, self.mbr.data) {
                Ok(()) => sink.on_event(TraceEvent::MemoryWrite {
                    addr,
                    value: self.mbr.data,
                }),
                Err(cause) => self.raise(cause, mpc, sink),
            }
        }

        let next = self
            .control
            .resolve_next_address(&self.mbr, &self.config.dispatch);
        self.cycle_count += 1;
        self.clock += 1;

        if next == entry::FETCH {
            if let Some(pc) = self.fetch_pc.take() {
                let word = self.datapath.registers.get(Register::Ir);
                sink.on_event(TraceEvent::InstructionRetired { pc, word });
                return StepOutcome::InstructionRetired { pc, word };
            }
        }
        StepOutcome::Microcycle
    }

    /// Steps until the halt policy fires or `budget` microcycles have run.
    pub fn run(&mut self, budget: u64) -> RunOutcome {
        self.run_traced(budget, &mut NoTrace)
    }

    /// [`Cpu::run`] with the configured cycle budget.
    pub fn run_default(&mut self) -> RunOutcome {
        self.run(self.config.cycle_budget)
    }

    /// [`Cpu::run`], reporting every cycle to `sink`.
    pub fn run_traced<S: TraceSink + ?Sized>(&mut self, budget: u64, sink: &mut S) -> RunOutcome {
        self.running = true;
        let mut cycles = 0;
        let mut instructions = 0;
        let reason = loop {
            if cycles >= budget {
                break HaltReason::BudgetExhausted;
            }
            let outcome = self.step_traced(sink);
            cycles += 1;
            if let StepOutcome::InstructionRetired { pc, word } = outcome {
                instructions += 1;
                if let Some(reason) = self.config.halt_policy.check(pc, word) {
                    break reason;
                }
            }
        };
        self.running = false;
        debug!(cycles, instructions, ?reason, "run finished");
        RunOutcome {
            cycles,
            instructions,
            reason,
        }
    }

    fn raise<S: TraceSink + ?Sized>(&mut self, cause: FaultCode, mpc: u8, sink: &mut S) {
        match cause.class() {
            FaultClass::Bounds => {
                warn!(%cause, mpc, mar = self.mar.address.value(), "operation skipped");
            }
            FaultClass::Internal => error!(%cause, mpc, "internal fault, operation skipped"),
        }
        self.last_fault = Some(cause);
        self.fault_count += 1;
        sink.on_event(TraceEvent::FaultRaised { cause, mpc });
    }

    /// Clears `cycle_count` and the cache counters; machine state is untouched.
    pub fn reset_statistics(&mut self) {
        self.cycle_count = 0;
        self.bus.cache.reset_stats();
    }

    /// Turns the cache on or off for subsequent cycles.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.config.cache_enabled = enabled;
        self.bus.cache_enabled = enabled;
    }

    /// Overwrites a register, as a debugger would.
    pub const fn set_register(&mut self, register: Register, value: u16) {
        self.datapath.registers.set(register, value);
    }

    /// Captures the machine state.
    #[must_use]
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            registers: *self.datapath.registers.values(),
            mpc: self.control.mpc,
            mir: self.control.mir.raw(),
            mar: self.mar.address.value(),
            mbr: self.mbr.data,
            latch_a: self.datapath.latch_a,
            latch_b: self.datapath.latch_b,
            alu_output: self.datapath.alu.output(),
            flag_n: self.control.mmux.alu_n,
            flag_z: self.control.mmux.alu_z,
            cycle_count: self.cycle_count,
            clock: self.clock,
            cache: self.bus.cache.stats(),
            last_fault: self.last_fault,
            fault_count: self.fault_count,
            running: self.running,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// Register bank.
    #[must_use]
    pub const fn registers(&self) -> &RegisterBank {
        &self.datapath.registers
    }

    /// Value of one register.
    #[must_use]
    pub const fn register(&self, register: Register) -> u16 {
        self.datapath.registers.get(register)
    }

    /// Datapath components.
    #[must_use]
    pub const fn datapath(&self) -> &Datapath {
        &self.datapath
    }

    /// Control unit state.
    #[must_use]
    pub const fn control(&self) -> &ControlUnit {
        &self.control
    }

    /// Installed microprogram.
    #[must_use]
    pub const fn control_memory(&self) -> &ControlMemory {
        &self.control_memory
    }

    /// Next micro-address.
    #[must_use]
    pub const fn mpc(&self) -> u8 {
        self.control.mpc
    }

    /// Memory Address Register.
    #[must_use]
    pub const fn mar(&self) -> u16 {
        self.mar.address.value()
    }

    /// Memory Buffer Register.
    #[must_use]
    pub const fn mbr(&self) -> u16 {
        self.mbr.data
    }

    /// Main memory.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.bus.memory
    }

    /// The cache.
    #[must_use]
    pub const fn cache(&self) -> &Cache {
        &self.bus.cache
    }

    /// Microcycles since the last reset or [`Cpu::reset_statistics`].
    #[must_use]
    pub const fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Microcycles since the last reset.
    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// True only while [`Cpu::run`] is executing.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Most recent fault.
    #[must_use]
    pub const fn last_fault(&self) -> Option<FaultCode> {
        self.last_fault
    }

    /// Faults since the last reset.
    #[must_use]
    pub const fn fault_count(&self) -> u64 {
        self.fault_count
    }
}
