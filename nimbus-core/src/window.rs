//! Window records and the focus stack.
//!
//! [`WindowRegistry`] owns every [`Window`] the compositor knows about, mapped
//! or not, and keeps the mapped ones in focus order: the front of the stack is
//! the focused, topmost window.

use crate::toolkit::GeoBox;
use crate::NativeHandle;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{trace, warn};

/// Unique identifier for a window record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    /// Creates a new, unique `WindowId`.
    pub fn new_unique() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        WindowId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// A top-level application window.
///
/// The native handles are borrowed from the toolkit and become invalid the
/// moment the toplevel's destroy signal fires, at which point the record is
/// dropped from the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub id: WindowId,
    /// The xdg toplevel.
    pub toplevel: NativeHandle,
    /// The toplevel's root `wl_surface`.
    pub surface: NativeHandle,
    /// Scene tree node that places the window in the layout.
    pub scene: NativeHandle,
    pub mapped: bool,
    /// Position of the scene node in layout coordinates.
    pub position: (i32, i32),
    /// Last geometry box the client committed (surface-local).
    pub geometry: GeoBox,
}

impl Window {
    pub fn new(toplevel: NativeHandle, surface: NativeHandle, scene: NativeHandle) -> Self {
        Self {
            id: WindowId::new_unique(),
            toplevel,
            surface,
            scene,
            mapped: false,
            position: (0, 0),
            geometry: GeoBox::default(),
        }
    }
}

/// Owner of all window records plus the focus stack of mapped windows.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<WindowId, Window>,
    stack: VecDeque<WindowId>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a new window record.
    pub fn insert(&mut self, window: Window) -> WindowId {
        let id = window.id;
        self.windows.insert(id, window);
        id
    }

    /// Drops a window record together with its focus-stack entry.
    pub fn destroy(&mut self, id: WindowId) -> Option<Window> {
        self.remove(id);
        self.windows.remove(&id)
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    pub fn find_by_toplevel(&self, toplevel: NativeHandle) -> Option<WindowId> {
        self.windows.values().find(|w| w.toplevel == toplevel).map(|w| w.id)
    }

    pub fn find_by_surface(&self, surface: NativeHandle) -> Option<WindowId> {
        self.windows.values().find(|w| w.surface == surface).map(|w| w.id)
    }

    /// Number of window records, mapped or not.
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    // --- Focus stack -----------------------------------------------------

    /// Appends `id` at the back (least recently focused) of the stack.
    ///
    /// The caller guarantees `id` is not already stacked; a duplicate is
    /// ignored with a warning.
    pub fn add(&mut self, id: WindowId) {
        if self.contains(id) {
            warn!(window = %id, "window already in focus stack");
            return;
        }
        self.stack.push_back(id);
        trace!(window = %id, len = self.stack.len(), "window stacked");
    }

    /// Removes `id` from the stack. No-op if it is not there.
    pub fn remove(&mut self, id: WindowId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.stack.remove(index);
                trace!(window = %id, len = self.stack.len(), "window unstacked");
                true
            }
            None => false,
        }
    }

    /// Moves `id` to the front of the stack. No-op if absent or already there.
    pub fn move_to_front(&mut self, id: WindowId) -> bool {
        match self.position(id) {
            Some(0) => true,
            Some(index) => {
                self.stack.remove(index);
                self.stack.push_front(id);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.stack.contains(&id)
    }

    /// The focused, topmost window.
    pub fn front(&self) -> Option<WindowId> {
        self.stack.front().copied()
    }

    /// The window right behind the front one.
    pub fn next_after_front(&self) -> Option<WindowId> {
        self.stack.get(1).copied()
    }

    /// Number of stacked (mapped) windows.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Stacked window ids, front to back.
    pub fn order(&self) -> Vec<WindowId> {
        self.stack.iter().copied().collect()
    }

    /// Stacked windows, front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Window> + '_ {
        self.stack.iter().filter_map(move |id| self.windows.get(id))
    }

    fn position(&self, id: WindowId) -> Option<usize> {
        self.stack.iter().position(|w| *w == id)
    }
}
