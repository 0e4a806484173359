//! TAC instruction set and supporting machinery.
//!
//! Instructions reference labels by name within the enclosing function;
//! cross-function label references are never produced and are rejected by
//! [`verify_function`].

mod alloc;
mod model;
mod pretty;
mod verify;


pub use alloc::{LabelAllocator, TempAllocator};
pub use model::{BasicBlock, BinOp, ConstValue, Function, Instr, Label, Operand, Program, UnOp};
pub use pretty::program_to_string;
pub use verify::{VerifyError, verify_function, verify_program};
