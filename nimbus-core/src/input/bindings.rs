//! Compositor key bindings.

use crate::keysym::Keysym;
use crate::toolkit::Modifiers;
use std::fmt;

/// What a compositor binding does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Stop the event loop and tear the session down.
    Terminate,
    /// Focus the window right behind the focused one.
    CycleFocus,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Terminate => f.write_str("terminate"),
            Action::CycleFocus => f.write_str("cycle-focus"),
        }
    }
}

/// Keysym to action table, active while the accelerator modifier is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    modifier: Modifiers,
    bindings: Vec<(Keysym, Action)>,
}

impl KeyBindings {
    pub fn new(modifier: Modifiers) -> Self {
        Self {
            modifier,
            bindings: Vec::new(),
        }
    }

    /// Binds `keysym` to `action`, replacing an earlier binding of the same
    /// keysym.
    pub fn bind(&mut self, keysym: Keysym, action: Action) {
        match self.bindings.iter_mut().find(|(sym, _)| *sym == keysym) {
            Some(slot) => slot.1 = action,
            None => self.bindings.push((keysym, action)),
        }
    }

    pub fn modifier(&self) -> Modifiers {
        self.modifier
    }

    /// Whether `modifiers` includes the accelerator. Other held modifiers do
    /// not matter.
    pub fn accelerator_held(&self, modifiers: Modifiers) -> bool {
        modifiers.contains(self.modifier)
    }

    /// The action bound to `keysym`, if the accelerator is held.
    pub fn lookup(&self, modifiers: Modifiers, keysym: Keysym) -> Option<Action> {
        if !self.accelerator_held(modifiers) {
            return None;
        }
        self.bindings
            .iter()
            .find(|(sym, _)| *sym == keysym)
            .map(|(_, action)| *action)
    }
}

impl Default for KeyBindings {
    /// Alt+Escape terminates, Alt+F1 cycles focus.
    fn default() -> Self {
        let mut bindings = KeyBindings::new(Modifiers::ALT);
        bindings.bind(Keysym::ESCAPE, Action::Terminate);
        bindings.bind(Keysym::F1, Action::CycleFocus);
        bindings
    }
}
