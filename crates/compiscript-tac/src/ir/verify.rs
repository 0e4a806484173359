//! Structural verification of lowered functions.
//!
//! Run after lowering to catch generator bugs: every label is declared
//! exactly once, every jump resolves within the same function, and each
//! block opens with its own label instruction.

use std::collections::HashSet;

use super::model::{Function, Instr, Program};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("function `{function}`: label `{label}` declared more than once")]
    DuplicateLabel { function: String, label: String },

    #[error("function `{function}`: jump to unknown label `{label}`")]
    UnknownTarget { function: String, label: String },

    #[error("function `{function}`: block `{label}` does not begin with its own label")]
    BadBlockStart { function: String, label: String },

    #[error("function `{function}`: stray label `{label}` inside block `{block}`")]
    StrayLabel {
        function: String,
        label: String,
        block: String,
    },
}

pub fn verify_function(function: &Function) -> Result<(), VerifyError> {
    let mut declared: HashSet<&str> = HashSet::new();

    for block in &function.blocks {
        if !declared.insert(block.label.name()) {
            return Err(VerifyError::DuplicateLabel {
                function: function.name.clone(),
                label: block.label.name().to_string(),
            });
        }

        match block.instrs.first() {
            Some(Instr::Label(l)) if l == &block.label => {}
            _ => {
                return Err(VerifyError::BadBlockStart {
                    function: function.name.clone(),
                    label: block.label.name().to_string(),
                });
            }
        }

        for instr in &block.instrs[1..] {
            if let Instr::Label(l) = instr {
                return Err(VerifyError::StrayLabel {
                    function: function.name.clone(),
                    label: l.name().to_string(),
                    block: block.label.name().to_string(),
                });
            }
        }
    }

    for instr in function.instrs() {
        if let Some(target) = instr.jump_target()
            && !declared.contains(target.name())
        {
            return Err(VerifyError::UnknownTarget {
                function: function.name.clone(),
                label: target.name().to_string(),
            });
        }
    }

    Ok(())
}

pub fn verify_program(program: &Program) -> Result<(), VerifyError> {
    for function in &program.functions {
        verify_function(function)?;
    }
    Ok(())
}
