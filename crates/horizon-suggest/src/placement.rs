//! Drop-down placement.
//!
//! Given the anchor rectangle of the text entry, the viewport that must
//! contain the drop-down, and the measured content size, [`place`] computes
//! where the drop-down goes. The function is pure; the engine wraps it with
//! the configured maximum height.

use crate::geometry::{Point, Rect, Size};

/// Which side of the anchor the drop-down opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropSide {
    /// Below the anchor (preferred).
    Below,
    /// Above the anchor.
    Above,
}

/// A resolved drop-down placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Top-left corner of the drop-down, in viewport coordinates.
    pub origin: Point,
    /// Final size after width and height clamping.
    pub size: Size,
    /// The side of the anchor the drop-down opens on.
    pub side: DropSide,
}

/// Fraction of the non-anchor viewport height used when no maximum height is
/// configured.
const DEFAULT_HEIGHT_RATIO: f32 = 3.0 / 5.0;

/// Compute the drop-down placement.
///
/// The width is the content width clamped to the viewport but never narrower
/// than the anchor. The height is the content height clamped to
/// `max_height`; an unset or non-finite cap falls back to three fifths of
/// the viewport height left over by the anchor.
///
/// Horizontally the drop-down left-aligns to the anchor, shifting left as
/// needed to stay inside the viewport and clamping at its left edge.
/// Vertically it opens below when it fits, above when only that fits, and
/// otherwise on whichever side has strictly more room, below winning ties;
/// the height is then clamped to that side's room.
///
/// Returns `None` when the viewport or content is degenerate or no side has
/// positive room.
pub fn place(
    anchor: Rect,
    viewport: Rect,
    content: Size,
    max_height: Option<f32>,
) -> Option<Placement> {
    if viewport.is_empty() || content.is_empty() {
        tracing::trace!(target: "horizon_suggest::placement", "degenerate viewport or content");
        return None;
    }

    // An unset or non-finite cap means "unbounded"; use the default instead.
    let max_height = match max_height {
        Some(h) if h.is_finite() => h.max(0.0),
        _ => (viewport.height() - anchor.height()) * DEFAULT_HEIGHT_RATIO,
    };

    let width = content.width.min(viewport.width()).max(anchor.width());
    let height = content.height.min(max_height);

    let mut x = anchor.left();
    if x + width > viewport.right() {
        x = viewport.right() - width;
    }
    x = x.max(viewport.left());

    let below_room = viewport.bottom() - anchor.bottom();
    let above_room = anchor.top() - viewport.top();

    let (side, room) = if height <= below_room {
        (DropSide::Below, below_room)
    } else if height <= above_room {
        (DropSide::Above, above_room)
    } else if above_room > below_room {
        (DropSide::Above, above_room)
    } else {
        (DropSide::Below, below_room)
    };

    let height = height.min(room);
    if height <= 0.0 {
        tracing::trace!(target: "horizon_suggest::placement", "no room on either side");
        return None;
    }

    let y = match side {
        DropSide::Below => anchor.bottom(),
        DropSide::Above => anchor.top() - height,
    };

    let placement = Placement {
        origin: Point::new(x, y),
        size: Size::new(width, height),
        side,
    };
    tracing::trace!(
        target: "horizon_suggest::placement",
        ?placement,
        "drop-down placed"
    );
    Some(placement)
}
