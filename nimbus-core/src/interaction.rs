//! Pointer grab state for interactive move and resize.
//!
//! The state itself is a plain enum: a grabbed window exists exactly when the
//! machine is not in [`InteractionState::PassThrough`]. The geometry helpers
//! are pure so they can be tested without a toolkit.
//!
//! Coordinates follow one convention throughout: a box's far edges are
//! `x + width` and `y + height` (see [`GeoBox::right`]).

use crate::toolkit::{Edges, GeoBox};
use crate::window::WindowId;
use std::fmt;

/// Kind of grab requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    Move,
    Resize,
}

impl fmt::Display for GrabMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrabMode::Move => f.write_str("move"),
            GrabMode::Resize => f.write_str("resize"),
        }
    }
}

/// An active interactive move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveGrab {
    pub window: WindowId,
    /// Pointer position relative to the window origin at grab time.
    pub grab_x: f64,
    pub grab_y: f64,
}

/// An active interactive resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGrab {
    pub window: WindowId,
    /// Pointer position relative to the dragged border at grab time.
    pub grab_x: f64,
    pub grab_y: f64,
    /// Window geometry in layout coordinates when the grab started.
    pub anchor: GeoBox,
    pub edges: Edges,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    PassThrough,
    Move(MoveGrab),
    Resize(ResizeGrab),
}

impl InteractionState {
    pub fn grabbed_window(&self) -> Option<WindowId> {
        match self {
            InteractionState::PassThrough => None,
            InteractionState::Move(grab) => Some(grab.window),
            InteractionState::Resize(grab) => Some(grab.window),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, InteractionState::PassThrough)
    }

    pub fn mode(&self) -> Option<GrabMode> {
        match self {
            InteractionState::PassThrough => None,
            InteractionState::Move(_) => Some(GrabMode::Move),
            InteractionState::Resize(_) => Some(GrabMode::Resize),
        }
    }

    /// Returns to pass-through, handing back the window that was grabbed.
    pub fn reset(&mut self) -> Option<WindowId> {
        let grabbed = self.grabbed_window();
        *self = InteractionState::PassThrough;
        grabbed
    }

    /// Resets only if `window` is the one being grabbed.
    pub fn release_window(&mut self, window: WindowId) -> bool {
        if self.grabbed_window() == Some(window) {
            *self = InteractionState::PassThrough;
            true
        } else {
            false
        }
    }

    /// Starts a move grab on a window placed at `position`.
    pub fn begin_move(&mut self, window: WindowId, cursor: (f64, f64), position: (i32, i32)) {
        *self = InteractionState::Move(MoveGrab {
            window,
            grab_x: cursor.0 - position.0 as f64,
            grab_y: cursor.1 - position.1 as f64,
        });
    }

    /// Starts a resize grab on a window placed at `position` whose surface
    /// geometry is `geometry`.
    ///
    /// The grab offset is measured from the dragged border, so the border does
    /// not jump to the pointer on the first motion event.
    pub fn begin_resize(
        &mut self,
        window: WindowId,
        cursor: (f64, f64),
        position: (i32, i32),
        geometry: GeoBox,
        edges: Edges,
    ) {
        let anchor = geometry.translated(position.0, position.1);
        let border_x = if edges.contains(Edges::RIGHT) { anchor.right() } else { anchor.x };
        let border_y = if edges.contains(Edges::BOTTOM) { anchor.bottom() } else { anchor.y };
        *self = InteractionState::Resize(ResizeGrab {
            window,
            grab_x: cursor.0 - border_x as f64,
            grab_y: cursor.1 - border_y as f64,
            anchor,
            edges,
        });
    }
}

impl MoveGrab {
    /// New window position for the current pointer position.
    pub fn target(&self, cursor: (f64, f64)) -> (i32, i32) {
        (
            (cursor.0 - self.grab_x) as i32,
            (cursor.1 - self.grab_y) as i32,
        )
    }
}

impl ResizeGrab {
    /// New window box in layout coordinates for the current pointer position.
    pub fn target(&self, cursor: (f64, f64)) -> GeoBox {
        let border_x = (cursor.0 - self.grab_x) as i32;
        let border_y = (cursor.1 - self.grab_y) as i32;
        resize_box(self.anchor, self.edges, border_x, border_y)
    }
}

/// Moves the dragged edges of `anchor` to the given border coordinates.
///
/// Edges that are not dragged keep the anchor's value. A dragged edge stops
/// one unit short of the opposite edge, so the result is never narrower or
/// shorter than 1. Top takes precedence over bottom and left over right.
pub fn resize_box(anchor: GeoBox, edges: Edges, border_x: i32, border_y: i32) -> GeoBox {
    let mut left = anchor.x;
    let mut right = anchor.x.saturating_add(anchor.width);
    let mut top = anchor.y;
    let mut bottom = anchor.y.saturating_add(anchor.height);

    if edges.contains(Edges::TOP) {
        top = border_y.min(bottom.saturating_sub(1));
    } else if edges.contains(Edges::BOTTOM) {
        bottom = border_y.max(top.saturating_add(1));
    }

    if edges.contains(Edges::LEFT) {
        left = border_x.min(right.saturating_sub(1));
    } else if edges.contains(Edges::RIGHT) {
        right = border_x.max(left.saturating_add(1));
    }

    let width = right.saturating_sub(left).max(1);
    let height = bottom.saturating_sub(top).max(1);
    GeoBox::new(left, top, width, height)
}
