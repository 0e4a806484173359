//! Temp and label allocators.
//!
//! Both are per-function: the lowering context resets them whenever it opens
//! a new function, so the first temp of every function is `t0` and the first
//! label `L0`.

use std::collections::HashSet;

use super::model::{Label, Operand};

/// Allocates `t<N>` temporaries with a LIFO free-list.
///
/// Freed ids are reused most-recently-freed first, keeping temp names dense
/// in straight-line code. Freeing an unknown or already-free id is ignored.
#[derive(Debug, Default)]
pub struct TempAllocator {
    next_id: u32,
    free: Vec<u32>,
    free_set: HashSet<u32>,
}

impl TempAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_temp(&mut self) -> Operand {
        self.new_temp_hinted(None)
    }

    pub fn new_temp_hinted(&mut self, hint: Option<String>) -> Operand {
        let id = match self.free.pop() {
            Some(id) => {
                self.free_set.remove(&id);
                id
            }
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        };
        Operand::Temp {
            name: format!("t{id}"),
            hint,
        }
    }

    /// Returns a temp's id to the free-list. Non-temp operands, foreign
    /// names, and double frees are ignored.
    pub fn free(&mut self, operand: &Operand) {
        let Operand::Temp { name, .. } = operand else {
            return;
        };
        let Some(id) = name.strip_prefix('t').and_then(|s| s.parse::<u32>().ok()) else {
            return;
        };
        if id >= self.next_id || self.free_set.contains(&id) {
            return;
        }
        self.free.push(id);
        self.free_set.insert(id);
    }

    pub fn reset(&mut self) {
        self.next_id = 0;
        self.free.clear();
        self.free_set.clear();
    }

    /// Number of distinct temp ids handed out since the last reset.
    pub fn emitted(&self) -> u32 {
        self.next_id
    }
}

/// Allocates `L<N>` labels, with an optional readability hint suffix
/// (`L3_then`, `L7_switch_end`).
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next_id: u32,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_label(&mut self) -> Label {
        let id = self.bump();
        Label::new(format!("L{id}"))
    }

    pub fn new_label_hinted(&mut self, hint: &str) -> Label {
        let id = self.bump();
        Label::new(format!("L{id}_{hint}"))
    }

    pub fn reset(&mut self) {
        self.next_id = 0;
    }

    fn bump(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
