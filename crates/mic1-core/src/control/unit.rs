use super::dispatch::DispatchTable;
use super::microinstruction::{AmuxSelect, Condition, MicroFields, Microinstruction};
use crate::datapath::Datapath;
use crate::memory::{Mar, Mbr};

/// Branch resolver: condition bits plus the flags latched from the ALU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mmux {
    /// Condition from the current microinstruction.
    pub cond: Condition,
    /// ALU N flag.
    pub alu_n: bool,
    /// ALU Z flag.
    pub alu_z: bool,
}

impl Mmux {
    /// Whether the next micro-address comes from ADDR instead of `MPC + 1`.
    #[must_use]
    pub const fn should_branch(&self) -> bool {
        match self.cond {
            Condition::None => false,
            Condition::IfN => self.alu_n,
            Condition::IfZ => self.alu_z,
            Condition::Always => true,
        }
    }
}

/// MIR, MPC, MMUX and AMUX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlUnit {
    /// Current microinstruction.
    pub mir: Microinstruction,
    /// Decoded view of `mir`.
    pub fields: MicroFields,
    /// Micro-address of the next fetch.
    pub mpc: u8,
    /// Branch resolver.
    pub mmux: Mmux,
    /// ALU A-input selector.
    pub amux: AmuxSelect,
}

impl ControlUnit {
    /// Latches a fetched word into MIR and decodes it.
    pub const fn load_mir(&mut self, word: Microinstruction) {
        self.mir = word;
        self.fields = MicroFields::decode(word);
    }

    /// Fans the decoded fields out to every control input.
    pub const fn run_mir(&mut self, datapath: &mut Datapath, mar: &mut Mar, mbr: &mut Mbr) {
        let fields = self.fields;
        self.amux = fields.amux;
        self.mmux.cond = fields.cond;
        datapath.alu.op = fields.alu;
        datapath.shifter.op = fields.shift;
        datapath.decoder_a.control = fields.a;
        datapath.decoder_b.control = fields.b;
        datapath.decoder_c.control = fields.c;
        datapath.decoder_c.enable = fields.enc;
        mar.load = fields.mar;
        mbr.rd = fields.rd;
        mbr.wr = fields.wr;
        mbr.load = fields.mbr;
    }

    /// Captures the ALU flags into the MMUX.
    pub const fn latch_flags(&mut self, alu_n: bool, alu_z: bool) {
        self.mmux.alu_n = alu_n;
        self.mmux.alu_z = alu_z;
    }

    /// Computes the next micro-address without committing it.
    ///
    /// Falls through to `MPC + 1` (mod 256) unless the MMUX branches. A branch
    /// takes ADDR, except the dispatch branch, which looks up the opcode in
    /// `MBR[15:12]`.
    #[must_use]
    pub const fn next_address(&self, mbr: &Mbr, dispatch: &DispatchTable) -> u8 {
        if !self.mmux.should_branch() {
            self.mpc.wrapping_add(1)
        } else if self.fields.is_dispatch() {
            dispatch.entry(mbr.opcode())
        } else {
            self.fields.addr
        }
    }

    /// Computes and commits the next micro-address.
    pub const fn resolve_next_address(&mut self, mbr: &Mbr, dispatch: &DispatchTable) -> u8 {
        self.mpc = self.next_address(mbr, dispatch);
        self.mpc
    }

    /// Returns to the fetch entry with a cleared MIR.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
