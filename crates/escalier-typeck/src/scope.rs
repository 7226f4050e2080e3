//! Lexical scope: value and type bindings.
//!
//! Scopes are pushed on entry to a lexical region (block, function, match
//! arm) and popped on every exit path, including after an error. Value
//! bindings hold polymorphic schemes; type bindings either point at a
//! registered alias/enum/class by its qualified name or carry a bound
//! type-parameter type directly.

use escalier_common::Span;
use escalier_types::{Scheme, Ty};
use rustc_hash::FxHashMap;

/// A value binding: its (possibly polymorphic) type and defining span.
#[derive(Clone, Debug)]
pub struct ValueBinding {
    pub scheme: Scheme,
    pub span: Span,
}

impl ValueBinding {
    pub fn mono(ty: Ty, span: Span) -> Self {
        Self { scheme: Scheme::mono(ty), span }
    }
}

/// A type binding.
#[derive(Clone, Debug)]
pub enum TypeBinding {
    /// A named alias, interface, enum, or class; the definition lives in
    /// the context registry under this qualified key.
    Named(String),
    /// A bound type parameter.
    Param(Ty),
}

#[derive(Default)]
struct Frame {
    values: FxHashMap<String, ValueBinding>,
    types: FxHashMap<String, TypeBinding>,
}

/// A stack of lexical frames, innermost last.
pub struct Scope {
    frames: Vec<Frame>,
}

impl Scope {
    pub fn new() -> Self {
        Self { frames: vec![Frame::default()] }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "cannot pop the root frame");
        self.frames.pop();
    }

    /// Declare a value in the innermost frame. Returns the previous
    /// binding's span when the name is already taken in this frame.
    pub fn declare_value(&mut self, name: &str, binding: ValueBinding) -> Result<(), Span> {
        let frame = self.frames.last_mut().expect("scope always has a frame");
        if let Some(existing) = frame.values.get(name) {
            return Err(existing.span);
        }
        frame.values.insert(name.to_string(), binding);
        Ok(())
    }

    /// Insert or overwrite a value binding without a duplicate check.
    /// Used for import stubs and checker-internal rebinding.
    pub fn insert_value(&mut self, name: &str, binding: ValueBinding) {
        let frame = self.frames.last_mut().expect("scope always has a frame");
        frame.values.insert(name.to_string(), binding);
    }

    pub fn lookup_value(&self, name: &str) -> Option<&ValueBinding> {
        self.frames.iter().rev().find_map(|frame| frame.values.get(name))
    }

    /// Replace the nearest existing binding for `name`, wherever it lives.
    /// Used by the checker to swap a declaration's placeholder for its
    /// generalized scheme at SCC completion.
    pub fn update_value(&mut self, name: &str, binding: ValueBinding) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.values.get_mut(name) {
                *slot = binding;
                return;
            }
        }
        self.insert_value(name, binding);
    }

    /// Declare a type in the innermost frame; same duplicate contract as
    /// [`Scope::declare_value`].
    pub fn declare_type(&mut self, name: &str, binding: TypeBinding) -> Result<(), Span> {
        let frame = self.frames.last_mut().expect("scope always has a frame");
        if frame.types.contains_key(name) {
            return Err(Span::synthetic());
        }
        frame.types.insert(name.to_string(), binding);
        Ok(())
    }

    pub fn insert_type(&mut self, name: &str, binding: TypeBinding) {
        let frame = self.frames.last_mut().expect("scope always has a frame");
        frame.types.insert(name.to_string(), binding);
    }

    pub fn lookup_type(&self, name: &str) -> Option<&TypeBinding> {
        self.frames.iter().rev().find_map(|frame| frame.types.get(name))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
