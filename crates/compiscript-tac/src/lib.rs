//! Three-address-code model for the Compiscript compiler.
//!
//! This crate contains:
//! - The TAC data model (operands, instructions, basic blocks, functions)
//! - Temp and label allocators used by the lowering phase
//! - A deterministic pretty printer for the textual IR form
//! - A structural verifier for per-function label invariants
//! - Stack frame layout (param/local word offsets) for back-end consumers

pub mod frame;
pub mod ir;

pub use frame::{FrameBuilder, FrameError, FrameLayout, WORD};
pub use ir::{
    BasicBlock, BinOp, ConstValue, Function, Instr, Label, LabelAllocator, Operand, Program,
    TempAllocator, UnOp, VerifyError, program_to_string, verify_function, verify_program,
};
