//! Lowering context: the program under construction, the open function and
//! block, per-function allocators, and the loop stack.

use compiscript_tac::{
    BasicBlock, Function, Instr, Label, LabelAllocator, Operand, Program, TempAllocator,
    VerifyError,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LowerError {
    #[error("no active function while emitting")]
    NoFunction,

    #[error("`break` or `continue` outside of a loop")]
    LoopStackEmpty,

    #[error("try/catch is not supported by the TAC lowering")]
    UnsupportedTryCatch,

    #[error("unsupported call target")]
    UnsupportedCallee,

    #[error("unsupported assignment target")]
    UnsupportedAssignTarget,

    #[error(transparent)]
    Verify(#[from] VerifyError),
}

/// Break/continue targets of the innermost loop.
#[derive(Debug, Clone)]
pub struct LoopLabels {
    pub break_target: Label,
    pub continue_target: Label,
}

#[derive(Debug, Default)]
pub struct LowerCtx {
    pub program: Program,
    temps: TempAllocator,
    labels: LabelAllocator,
    current: Option<Function>,
    loop_stack: Vec<LoopLabels>,
    synthetic_counter: u32,
}

impl LowerCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a function: fresh allocators (temps and labels do not leak
    /// across functions) and an entry block at `L0`.
    pub fn begin_function(&mut self, name: impl Into<String>, params: Vec<String>) {
        self.temps.reset();
        self.labels.reset();
        self.loop_stack.clear();
        self.synthetic_counter = 0;
        self.current = Some(Function::new(name, params));
        let entry = self.labels.new_label();
        self.start_block(entry);
    }

    /// Closes the open function and appends it to the program.
    pub fn end_function(&mut self) {
        if let Some(function) = self.current.take() {
            self.program.functions.push(function);
        }
        self.loop_stack.clear();
    }

    /// Opens a new basic block; its label instruction is the first
    /// instruction and subsequent emits land in it.
    pub fn start_block(&mut self, label: Label) {
        if let Some(function) = self.current.as_mut() {
            function.blocks.push(BasicBlock::new(label));
        }
    }

    pub fn emit(&mut self, instr: Instr) -> Result<(), LowerError> {
        let block = self
            .current
            .as_mut()
            .and_then(|f| f.blocks.last_mut())
            .ok_or(LowerError::NoFunction)?;
        block.push(instr);
        Ok(())
    }

    pub fn new_temp(&mut self) -> Operand {
        self.temps.new_temp()
    }

    pub fn new_label(&mut self) -> Label {
        self.labels.new_label()
    }

    pub fn new_label_hinted(&mut self, hint: &str) -> Label {
        self.labels.new_label_hinted(hint)
    }

    /// Fresh name for a front-end synthesized variable (foreach desugaring).
    pub fn fresh_name(&mut self, prefix: &str) -> String {
        self.synthetic_counter += 1;
        format!("__fe_{prefix}_{}", self.synthetic_counter)
    }

    pub fn push_loop(&mut self, break_target: Label, continue_target: Label) {
        self.loop_stack.push(LoopLabels {
            break_target,
            continue_target,
        });
    }

    pub fn pop_loop(&mut self) {
        self.loop_stack.pop();
    }

    pub fn break_target(&self) -> Result<Label, LowerError> {
        self.loop_stack
            .last()
            .map(|l| l.break_target.clone())
            .ok_or(LowerError::LoopStackEmpty)
    }

    pub fn continue_target(&self) -> Result<Label, LowerError> {
        self.loop_stack
            .last()
            .map(|l| l.continue_target.clone())
            .ok_or(LowerError::LoopStackEmpty)
    }
}
