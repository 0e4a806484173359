//! Stack frame layout relative to the frame pointer.
//!
//! Purely informational output for a back-end: the lowering records one
//! layout per function. Params get positive word offsets in declaration
//! order starting at `+WORD`; locals get negative offsets starting at
//! `-WORD` and growing downward.
//!
//! Sealing is modeled with a builder: [`FrameBuilder`] is mutable,
//! [`FrameLayout`] (the sealed form) is not.

use std::collections::HashMap;

/// Fixed slot size in bytes (64-bit words).
pub const WORD: i64 = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("duplicate parameter `{0}`")]
    DuplicateParam(String),

    #[error("duplicate local `{0}`")]
    DuplicateLocal(String),

    #[error("`{0}` used as both parameter and local")]
    NameClash(String),
}

/// Mutable frame under construction.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    name: String,
    params: Vec<String>,
    locals: Vec<String>,
}

impl FrameBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            locals: Vec::new(),
        }
    }

    pub fn add_param(&mut self, name: impl Into<String>) -> Result<(), FrameError> {
        let name = name.into();
        if self.params.contains(&name) {
            return Err(FrameError::DuplicateParam(name));
        }
        if self.locals.contains(&name) {
            return Err(FrameError::NameClash(name));
        }
        self.params.push(name);
        Ok(())
    }

    pub fn add_local(&mut self, name: impl Into<String>) -> Result<(), FrameError> {
        let name = name.into();
        if self.locals.contains(&name) {
            return Err(FrameError::DuplicateLocal(name));
        }
        if self.params.contains(&name) {
            return Err(FrameError::NameClash(name));
        }
        self.locals.push(name);
        Ok(())
    }

    /// Assigns offsets and produces the immutable layout.
    pub fn seal(self) -> FrameLayout {
        let mut param_offset = HashMap::new();
        let mut off = WORD;
        for p in &self.params {
            param_offset.insert(p.clone(), off);
            off += WORD;
        }

        let mut local_offset = HashMap::new();
        let mut off = -WORD;
        for l in &self.locals {
            local_offset.insert(l.clone(), off);
            off -= WORD;
        }

        FrameLayout {
            name: self.name,
            params: self.params,
            locals: self.locals,
            param_offset,
            local_offset,
        }
    }
}

/// Sealed frame layout. Offsets are fixed; the param and local name sets are
/// disjoint by construction.
#[derive(Debug, Clone)]
pub struct FrameLayout {
    name: String,
    params: Vec<String>,
    locals: Vec<String>,
    param_offset: HashMap<String, i64>,
    local_offset: HashMap<String, i64>,
}

impl FrameLayout {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn locals(&self) -> &[String] {
        &self.locals
    }

    pub fn offset_of(&self, name: &str) -> Option<i64> {
        self.param_offset
            .get(name)
            .or_else(|| self.local_offset.get(name))
            .copied()
    }

    /// Bytes needed for the negative (locals) zone.
    pub fn frame_size_bytes(&self) -> i64 {
        self.locals.len() as i64 * WORD
    }
}

#[cfg(test)]
mod frame_tests {
    use super::*;

    #[test]
    fn params_positive_locals_negative() {
        let mut b = FrameBuilder::new("ff");
        b.add_param("a").unwrap();
        b.add_param("b").unwrap();
        b.add_local("x").unwrap();
        b.add_local("y").unwrap();
        let frame = b.seal();

        assert_eq!(frame.offset_of("a"), Some(8));
        assert_eq!(frame.offset_of("b"), Some(16));
        assert_eq!(frame.offset_of("x"), Some(-8));
        assert_eq!(frame.offset_of("y"), Some(-16));
        assert_eq!(frame.offset_of("missing"), None);
        assert_eq!(frame.frame_size_bytes(), 16);
    }

    #[test]
    fn duplicate_and_clashing_names_rejected() {
        let mut b = FrameBuilder::new("f");
        b.add_param("a").unwrap();
        assert_eq!(
            b.add_param("a"),
            Err(FrameError::DuplicateParam("a".into()))
        );
        assert_eq!(b.add_local("a"), Err(FrameError::NameClash("a".into())));
        b.add_local("x").unwrap();
        assert_eq!(
            b.add_local("x"),
            Err(FrameError::DuplicateLocal("x".into()))
        );
    }

    #[test]
    fn empty_frame() {
        let frame = FrameBuilder::new("empty").seal();
        assert_eq!(frame.frame_size_bytes(), 0);
        assert!(frame.params().is_empty());
    }
}
