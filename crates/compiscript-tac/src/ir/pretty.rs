//! Deterministic textual rendering of the TAC.
//!
//! Format is stable and byte-for-byte reproducible: label lines at column
//! zero, instructions indented by two spaces, functions separated by one
//! blank line.

use std::fmt;

use super::model::{BasicBlock, BinOp, ConstValue, Function, Instr, Label, Operand, Program, UnOp};

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v}"),
            ConstValue::Str(v) => write!(f, "\"{v}\""),
            ConstValue::Bool(true) => f.write_str("true"),
            ConstValue::Bool(false) => f.write_str("false"),
            ConstValue::Null => f.write_str("null"),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp { name, .. } | Operand::Name { name, .. } => f.write_str(name),
            Operand::Const { value, .. } => write!(f, "{value}"),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Operand]) -> fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Label(label) => write!(f, "{label}:"),
            Instr::Assign { dst, src } => write!(f, "{dst} = {src}"),
            Instr::Unary { dst, op, value } => write!(f, "{dst} = {op} {value}"),
            Instr::Bin {
                dst,
                op,
                left,
                right,
            } => write!(f, "{dst} = {left} {op} {right}"),
            Instr::IfGoto { cond, target } => write!(f, "if {cond} goto {target}"),
            Instr::Goto { target } => write!(f, "goto {target}"),
            Instr::Call { dst, func, args } => {
                if let Some(dst) = dst {
                    write!(f, "{dst} = ")?;
                }
                write!(f, "call {func}")?;
                if !args.is_empty() {
                    f.write_str(", ")?;
                    write_args(f, args)?;
                }
                Ok(())
            }
            Instr::Return { value: None } => f.write_str("return"),
            Instr::Return { value: Some(v) } => write!(f, "return {v}"),
            Instr::Load { dst, array, index } => write!(f, "{dst} = load {array}[{index}]"),
            Instr::Store {
                array,
                index,
                value,
            } => write!(f, "store {array}[{index}], {value}"),
            Instr::GetProp { dst, obj, prop } => write!(f, "{dst} = get {obj}.{prop}"),
            Instr::SetProp { obj, prop, value } => write!(f, "set {obj}.{prop}, {value}"),
            Instr::NewObject {
                dst,
                class_name,
                args,
            } => {
                write!(f, "{dst} = new {class_name}(")?;
                write_args(f, args)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instrs.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            match instr {
                Instr::Label(_) => write!(f, "{instr}")?,
                _ => write!(f, "  {instr}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p)?;
        }
        f.write_str("):")?;
        for block in &self.blocks {
            write!(f, "\n{block}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, func) in self.functions.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{func}")?;
        }
        Ok(())
    }
}

/// Render a whole program in the stable textual form.
pub fn program_to_string(program: &Program) -> String {
    program.to_string()
}
