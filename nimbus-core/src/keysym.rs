//! Keysym values used by compositor bindings.
//!
//! Keymap compilation happens in the toolkit; the compositor only compares
//! the resulting keysyms. The values are the standard X11 keysym codes.

use std::fmt;
use std::str::FromStr;

/// An X11 keysym value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keysym(pub u32);

impl Keysym {
    pub const BACKSPACE: Keysym = Keysym(0xff08);
    pub const TAB: Keysym = Keysym(0xff09);
    pub const RETURN: Keysym = Keysym(0xff0d);
    pub const ESCAPE: Keysym = Keysym(0xff1b);
    pub const HOME: Keysym = Keysym(0xff50);
    pub const LEFT: Keysym = Keysym(0xff51);
    pub const UP: Keysym = Keysym(0xff52);
    pub const RIGHT: Keysym = Keysym(0xff53);
    pub const DOWN: Keysym = Keysym(0xff54);
    pub const END: Keysym = Keysym(0xff57);
    pub const DELETE: Keysym = Keysym(0xffff);
    pub const SPACE: Keysym = Keysym(0x0020);
    pub const F1: Keysym = Keysym(0xffbe);
    pub const F12: Keysym = Keysym(0xffc9);

    const NAMED: &'static [(&'static str, Keysym)] = &[
        ("BackSpace", Keysym::BACKSPACE),
        ("Tab", Keysym::TAB),
        ("Return", Keysym::RETURN),
        ("Escape", Keysym::ESCAPE),
        ("Home", Keysym::HOME),
        ("Left", Keysym::LEFT),
        ("Up", Keysym::UP),
        ("Right", Keysym::RIGHT),
        ("Down", Keysym::DOWN),
        ("End", Keysym::END),
        ("Delete", Keysym::DELETE),
        ("space", Keysym::SPACE),
    ];

    /// Function key `F<n>` for `n` in `1..=12`.
    pub fn function(n: u32) -> Option<Keysym> {
        (1..=12).contains(&n).then(|| Keysym(Keysym::F1.0 + n - 1))
    }

    /// Parses an X11 keysym name (`Escape`, `F1`, `q`, ...).
    pub fn from_name(name: &str) -> Option<Keysym> {
        if let Some((_, sym)) = Self::NAMED.iter().find(|(n, _)| *n == name) {
            return Some(*sym);
        }
        if let Some(n) = name.strip_prefix('F').and_then(|rest| rest.parse::<u32>().ok()) {
            return Keysym::function(n);
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => Some(Keysym(c as u32)),
            _ => None,
        }
    }

    pub fn name(self) -> Option<String> {
        if let Some((n, _)) = Self::NAMED.iter().find(|(_, s)| *s == self) {
            return Some((*n).to_string());
        }
        if (Keysym::F1.0..=Keysym::F12.0).contains(&self.0) {
            return Some(format!("F{}", self.0 - Keysym::F1.0 + 1));
        }
        char::from_u32(self.0)
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_string())
    }
}

impl FromStr for Keysym {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Keysym::from_name(s).ok_or_else(|| format!("unknown keysym name '{}'", s))
    }
}

impl fmt::Debug for Keysym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Keysym({})", name),
            None => write!(f, "Keysym({:#06x})", self.0),
        }
    }
}
