//! The inferred-type slot attached to typeable AST nodes.

use std::cell::RefCell;

use escalier_types::Ty;

/// Interior-mutable slot holding a node's inferred type.
///
/// Starts empty, is written by the inference engine, and is overwritten
/// once more by the checker's finalize pass, which deep-resolves any
/// unification variables. The compiler core is single-threaded, so a
/// `RefCell` is sufficient.
#[derive(Debug, Default, Clone)]
pub struct TypeSlot(RefCell<Option<Ty>>);

impl TypeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Ty> {
        self.0.borrow().clone()
    }

    pub fn set(&self, ty: Ty) {
        *self.0.borrow_mut() = Some(ty);
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_starts_empty_then_holds() {
        let slot = TypeSlot::new();
        assert!(!slot.is_set());
        slot.set(Ty::num());
        assert_eq!(slot.get(), Some(Ty::num()));
        slot.set(Ty::str());
        assert_eq!(slot.get(), Some(Ty::str()));
    }
}
