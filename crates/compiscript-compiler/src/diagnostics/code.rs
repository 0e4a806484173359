//! The closed set of diagnostic codes.
//!
//! Downstream tooling matches on these strings; do not add codes casually.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// E100: use of an undeclared identifier
    Undeclared,
    /// E101: duplicate identifier in the same scope
    DuplicateId,
    /// E102: duplicate name in one parameter list
    DuplicateParam,
    /// E120: type annotation names an unknown type
    UnknownType,
    /// E140: inheritance cycle in the class graph
    InheritCycle,
    /// E200: value not assignable to the target type
    AssignIncompat,
    /// E201: invalid operand types for an operator or construct
    OpTypes,
    /// E202: call with wrong number of arguments
    CallArity,
    /// E203: invalid indexing (non-array or non-integer index)
    IndexInvalid,
    /// E204: member not found on a class (including its bases)
    MemberNotFound,
    /// E205: `this` outside a method
    ThisContext,
    /// E300: `break`/`continue` outside a loop
    BadBreakContinue,
    /// E301: condition is not boolean
    CondNotBool,
    /// E302: `return` outside a function
    ReturnOutside,
    /// E303: a non-void function may finish without returning
    MissingReturn,
    /// E401: reassignment of a constant
    AssignToConst,
    /// E500: unreachable code after a terminating statement
    DeadCode,
    /// E_IRGEN: internal failure during IR generation
    IrGen,
}

impl Code {
    pub fn as_str(self) -> &'static str {
        match self {
            Code::Undeclared => "E100",
            Code::DuplicateId => "E101",
            Code::DuplicateParam => "E102",
            Code::UnknownType => "E120",
            Code::InheritCycle => "E140",
            Code::AssignIncompat => "E200",
            Code::OpTypes => "E201",
            Code::CallArity => "E202",
            Code::IndexInvalid => "E203",
            Code::MemberNotFound => "E204",
            Code::ThisContext => "E205",
            Code::BadBreakContinue => "E300",
            Code::CondNotBool => "E301",
            Code::ReturnOutside => "E302",
            Code::MissingReturn => "E303",
            Code::AssignToConst => "E401",
            Code::DeadCode => "E500",
            Code::IrGen => "E_IRGEN",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
