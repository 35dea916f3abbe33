//! The MAC-1 instruction set as a microprogram.
//!
//! The same words ship as text in `microcode/mac1.mic`; a test keeps the two
//! identical.

use super::microinstruction::MicroFields;
use crate::AluOp::{And, NotA, PassA};
use crate::Register::{Ac, Amask, Ir, Pc, Rm1, Smask, Sp, Tir, A, R1};
use crate::ShiftOp::Left;
use entry::{EXT_01, EXT_1, EXT_11, EXT_111, FETCH, HALT, JNEG_TAKE, JZER_TAKE, POP, POPI, SWAP};

/// Micro-addresses of the routine entry points.
pub mod entry {
    /// Instruction fetch; every routine returns here.
    pub const FETCH: u8 = 0x00;
    /// `LODD` routine.
    pub const LODD: u8 = 0x03;
    /// `STOD` routine.
    pub const STOD: u8 = 0x05;
    /// `ADDD` routine.
    pub const ADDD: u8 = 0x06;
    /// `SUBD` routine.
    pub const SUBD: u8 = 0x08;
    /// `JPOS` routine.
    pub const JPOS: u8 = 0x0C;
    /// `JZER` routine.
    pub const JZER: u8 = 0x0E;
    /// Taken branch of `JZER`.
    pub const JZER_TAKE: u8 = 0x10;
    /// `JUMP` routine.
    pub const JUMP: u8 = 0x11;
    /// `LOCO` routine.
    pub const LOCO: u8 = 0x12;
    /// `LODL` routine.
    pub const LODL: u8 = 0x13;
    /// `STOL` routine.
    pub const STOL: u8 = 0x16;
    /// `ADDL` routine.
    pub const ADDL: u8 = 0x18;
    /// `SUBL` routine.
    pub const SUBL: u8 = 0x1B;
    /// `JNEG` routine.
    pub const JNEG: u8 = 0x20;
    /// Taken branch of `JNEG`.
    pub const JNEG_TAKE: u8 = 0x22;
    /// `JNZE` routine.
    pub const JNZE: u8 = 0x23;
    /// `CALL` routine.
    pub const CALL: u8 = 0x25;
    /// Opcode `F`: decodes bits 11..8 of `IR` through `TIR`.
    pub const EXTENDED: u8 = 0x28;
    /// `PSHI` routine.
    pub const PSHI: u8 = 0x2D;
    /// `POPI` routine.
    pub const POPI: u8 = 0x30;
    /// Extended group, bits 11..10 = `01`.
    pub const EXT_01: u8 = 0x32;
    /// `PUSH` routine.
    pub const PUSH: u8 = 0x33;
    /// `POP` routine.
    pub const POP: u8 = 0x35;
    /// Extended group, bit 11 = `1`.
    pub const EXT_1: u8 = 0x37;
    /// `RETN` routine.
    pub const RETN: u8 = 0x39;
    /// `SWAP` routine.
    pub const SWAP: u8 = 0x3B;
    /// Extended group, bits 11..10 = `11`.
    pub const EXT_11: u8 = 0x3E;
    /// `INSP` routine.
    pub const INSP: u8 = 0x3F;
    /// Extended group, bits 11..9 = `111`.
    pub const EXT_111: u8 = 0x41;
    /// `DESP` routine.
    pub const DESP: u8 = 0x42;
    /// `HALT` routine.
    pub const HALT: u8 = 0x46;
}

/// Number of microinstructions in the MAC-1 microprogram.
pub const MICROPROGRAM_LEN: usize = 71;
/// Text form of the microprogram, in the format [`ControlMemory::parse`] reads.
///
/// [`ControlMemory::parse`]: super::ControlMemory::parse
pub const MAC1_SOURCE: &str = include_str!("../../microcode/mac1.mic");
const NOP: MicroFields = MicroFields::NOP;
/// The MAC-1 microprogram, one entry per micro-address.
pub const MICROPROGRAM: [MicroFields; MICROPROGRAM_LEN] = [
    // 00 mar := pc; rd
    NOP.b(Pc).load_mar().rd(),
    // 01 ir := mbr
    NOP.from_mbr().alu(PassA).write(Ir),
    // 02 pc := pc + 1; goto dispatch
    NOP.a(Pc).b(R1).write(Pc).dispatch(),
    // 03 mar := ir; rd
    NOP.b(Ir).load_mar().rd(),
    // 04 ac := mbr; goto 0
    NOP.from_mbr().alu(PassA).write(Ac).goto(FETCH),
    // 05 mar := ir; mbr := ac; wr; goto 0
    NOP
        .a(Ac)
        .b(Ir)
        .alu(PassA)
        .load_mbr()
        .load_mar()
        .wr()
        .goto(FETCH),
    // 06 mar := ir; rd
    NOP.b(Ir).load_mar().rd(),
    // 07 ac := mbr + ac; goto 0
    NOP.b(Ac).from_mbr().write(Ac).goto(FETCH),
    // 08 mar := ir; rd
    NOP.b(Ir).load_mar().rd(),
    // 09 ac := ac + 1
    NOP.a(Ac).b(R1).write(Ac),
    // 0A a := inv(mbr)
    NOP.from_mbr().alu(NotA).write(A),
    // 0B ac := ac + a; goto 0
    NOP.a(Ac).b(A).write(Ac).goto(FETCH),
    // 0C alu := ac; if n goto 0
    NOP.a(Ac).alu(PassA).if_n(FETCH),
    // 0D pc := band(ir, amask); goto 0
    NOP.a(Ir).b(Amask).alu(And).write(Pc).goto(FETCH),
    // 0E alu := ac; if z goto take
    NOP.a(Ac).alu(PassA).if_z(JZER_TAKE),
    // 0F goto 0
    NOP.goto(FETCH),
    // 10 pc := band(ir, amask); goto 0
    NOP.a(Ir).b(Amask).alu(And).write(Pc).goto(FETCH),
    // 11 pc := band(ir, amask); goto 0
    NOP.a(Ir).b(Amask).alu(And).write(Pc).goto(FETCH),
    // 12 ac := band(ir, amask); goto 0
    NOP.a(Ir).b(Amask).alu(And).write(Ac).goto(FETCH),
    // 13 a := ir + sp
    NOP.a(Ir).b(Sp).write(A),
    // 14 mar := a; rd
    NOP.b(A).load_mar().rd(),
    // 15 ac := mbr; goto 0
    NOP.from_mbr().alu(PassA).write(Ac).goto(FETCH),
    // 16 a := ir + sp
    NOP.a(Ir).b(Sp).write(A),
    // 17 mar := a; mbr := ac; wr; goto 0
    NOP
        .a(Ac)
        .b(A)
        .alu(PassA)
        .load_mbr()
        .load_mar()
        .wr()
        .goto(FETCH),
    // 18 a := ir + sp
    NOP.a(Ir).b(Sp).write(A),
    // 19 mar := a; rd
    NOP.b(A).load_mar().rd(),
    // 1A ac := mbr + ac; goto 0
    NOP.b(Ac).from_mbr().write(Ac).goto(FETCH),
    // 1B a := ir + sp
    NOP.a(Ir).b(Sp).write(A),
    // 1C mar := a; rd
    NOP.b(A).load_mar().rd(),
    // 1D ac := ac + 1
    NOP.a(Ac).b(R1).write(Ac),
    // 1E a := inv(mbr)
    NOP.from_mbr().alu(NotA).write(A),
    // 1F ac := ac + a; goto 0
    NOP.a(Ac).b(A).write(Ac).goto(FETCH),
    // 20 alu := ac; if n goto take
    NOP.a(Ac).alu(PassA).if_n(JNEG_TAKE),
    // 21 goto 0
    NOP.goto(FETCH),
    // 22 pc := band(ir, amask); goto 0
    NOP.a(Ir).b(Amask).alu(And).write(Pc).goto(FETCH),
    // 23 alu := ac; if z goto 0
    NOP.a(Ac).alu(PassA).if_z(FETCH),
    // 24 pc := band(ir, amask); goto 0
    NOP.a(Ir).b(Amask).alu(And).write(Pc).goto(FETCH),
    // 25 sp := sp + (-1)
    NOP.a(Sp).b(Rm1).write(Sp),
    // 26 mar := sp; mbr := pc; wr
    NOP.a(Pc).b(Sp).alu(PassA).load_mbr().load_mar().wr(),
    // 27 pc := band(ir, amask); goto 0
    NOP.a(Ir).b(Amask).alu(And).write(Pc).goto(FETCH),
    // 28 tir := lshift(ir + ir)
    NOP.a(Ir).b(Ir).shift(Left).write(Tir),
    // 29 tir := lshift(tir + tir)
    NOP.a(Tir).b(Tir).shift(Left).write(Tir),
    // 2A tir := lshift(tir); if n goto 1xxx
    NOP.a(Tir).alu(PassA).shift(Left).write(Tir).if_n(EXT_1),
    // 2B tir := lshift(tir); if n goto 01xx
    NOP.a(Tir).alu(PassA).shift(Left).write(Tir).if_n(EXT_01),
    // 2C alu := tir; if n goto popi
    NOP.a(Tir).alu(PassA).if_n(POPI),
    // 2D sp := sp + (-1)
    NOP.a(Sp).b(Rm1).write(Sp),
    // 2E mar := ac; rd
    NOP.b(Ac).load_mar().rd(),
    // 2F mar := sp; wr; goto 0
    NOP.b(Sp).load_mar().wr().goto(FETCH),
    // 30 mar := sp; sp := sp + 1; rd
    NOP.a(R1).b(Sp).write(Sp).load_mar().rd(),
    // 31 mar := ac; wr; goto 0
    NOP.b(Ac).load_mar().wr().goto(FETCH),
    // 32 alu := tir; if n goto pop
    NOP.a(Tir).alu(PassA).if_n(POP),
    // 33 sp := sp + (-1)
    NOP.a(Sp).b(Rm1).write(Sp),
    // 34 mar := sp; mbr := ac; wr; goto 0
    NOP
        .a(Ac)
        .b(Sp)
        .alu(PassA)
        .load_mbr()
        .load_mar()
        .wr()
        .goto(FETCH),
    // 35 mar := sp; sp := sp + 1; rd
    NOP.a(R1).b(Sp).write(Sp).load_mar().rd(),
    // 36 ac := mbr; goto 0
    NOP.from_mbr().alu(PassA).write(Ac).goto(FETCH),
    // 37 tir := lshift(tir); if n goto 11xx
    NOP.a(Tir).alu(PassA).shift(Left).write(Tir).if_n(EXT_11),
    // 38 alu := tir; if n goto swap
    NOP.a(Tir).alu(PassA).if_n(SWAP),
    // 39 mar := sp; sp := sp + 1; rd
    NOP.a(R1).b(Sp).write(Sp).load_mar().rd(),
    // 3A pc := mbr; goto 0
    NOP.from_mbr().alu(PassA).write(Pc).goto(FETCH),
    // 3B a := ac
    NOP.a(Ac).alu(PassA).write(A),
    // 3C ac := sp
    NOP.a(Sp).alu(PassA).write(Ac),
    // 3D sp := a; goto 0
    NOP.a(A).alu(PassA).write(Sp).goto(FETCH),
    // 3E tir := lshift(tir); if n goto 111x
    NOP.a(Tir).alu(PassA).shift(Left).write(Tir).if_n(EXT_111),
    // 3F a := band(ir, smask)
    NOP.a(Ir).b(Smask).alu(And).write(A),
    // 40 sp := sp + a; goto 0
    NOP.a(Sp).b(A).write(Sp).goto(FETCH),
    // 41 alu := tir; if n goto halt
    NOP.a(Tir).alu(PassA).if_n(HALT),
    // 42 a := band(ir, smask)
    NOP.a(Ir).b(Smask).alu(And).write(A),
    // 43 a := inv(a)
    NOP.a(A).alu(NotA).write(A),
    // 44 a := a + 1
    NOP.a(A).b(R1).write(A),
    // 45 sp := sp + a; goto 0
    NOP.a(Sp).b(A).write(Sp).goto(FETCH),
    // 46 pc := pc + (-1); goto 0
    NOP.a(Pc).b(Rm1).write(Pc).goto(FETCH),
];
