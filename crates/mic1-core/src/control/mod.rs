//! Microprogrammed control: control memory, MIR/MPC, MMUX, AMUX and the
//! opcode dispatch table.

mod control_memory;
mod dispatch;
/// Built-in MAC-1 microprogram.
pub mod mac1;
mod microinstruction;
mod unit;

pub use control_memory::{ControlMemory, CONTROL_MEMORY_WORDS};
pub use dispatch::{DispatchTable, OPCODE_COUNT};
pub use microinstruction::{
    AmuxSelect, Condition, MicroFields, Microinstruction, ALU_SHIFT, ADDR_SHIFT, AMUX_SHIFT,
    A_SHIFT, B_SHIFT, COND_SHIFT, C_SHIFT, DISPATCH_SENTINEL, ENC_SHIFT, MAR_SHIFT, MBR_SHIFT,
    MICROINSTRUCTION_BITS, RD_SHIFT, SH_SHIFT, WR_SHIFT,
};
pub use unit::{ControlUnit, Mmux};
