//! Transient drag and resize gestures.
//!
//! A gesture is tracked between `begin_*` and commit/cancel. It owns the
//! block's record as it was at the start and a candidate derived from the
//! cumulative pointer offset. The committed layout map is never touched while
//! a gesture is in flight; the editor writes the candidate on commit.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::block::BlockId;
use crate::consts::MIN_BLOCK_SIZE;
use crate::layout::{LayoutMap, LayoutRecord};
use crate::snap::{SnapGuide, SnapSettings, snap_candidate, snap_to_grid};

/// Which handle of the selection box is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resize anchor `{0}`")]
pub struct ParseResizeAnchorError(pub String);

impl FromStr for ResizeAnchor {
    type Err = ParseResizeAnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" => Ok(Self::N),
            "ne" => Ok(Self::Ne),
            "e" => Ok(Self::E),
            "se" => Ok(Self::Se),
            "s" => Ok(Self::S),
            "sw" => Ok(Self::Sw),
            "w" => Ok(Self::W),
            "nw" => Ok(Self::Nw),
            _ => Err(ParseResizeAnchorError(s.to_string())),
        }
    }
}

/// The active gesture, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// A block is being dragged.
    Moving {
        id: BlockId,
        /// Descendants that travel with the block and are never snap targets.
        carried: Vec<BlockId>,
        /// Record at gesture start; restored on cancel.
        original: LayoutRecord,
        candidate: LayoutRecord,
        /// Guides produced by the last object snap.
        guides: Vec<SnapGuide>,
    },
    /// A block is being resized from one of its eight handles.
    Resizing {
        id: BlockId,
        anchor: ResizeAnchor,
        original: LayoutRecord,
        candidate: LayoutRecord,
    },
}

impl GestureState {
    /// Start dragging `id` from its current record.
    #[must_use]
    pub fn moving(id: BlockId, original: LayoutRecord) -> Self {
        Self::Moving { id, carried: Vec::new(), original, candidate: original, guides: Vec::new() }
    }

    /// Carry `ids` along with a move. No effect on other gestures.
    #[must_use]
    pub fn carrying(mut self, ids: Vec<BlockId>) -> Self {
        if let Self::Moving { carried, .. } = &mut self {
            *carried = ids;
        }
        self
    }

    /// Blocks that move with the gesture's block.
    #[must_use]
    pub fn carried(&self) -> &[BlockId] {
        match self {
            Self::Moving { carried, .. } => carried,
            _ => &[],
        }
    }

    /// Start resizing `id` from `anchor`.
    #[must_use]
    pub fn resizing(id: BlockId, anchor: ResizeAnchor, original: LayoutRecord) -> Self {
        Self::Resizing { id, anchor, original, candidate: original }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Id of the block under the gesture.
    #[must_use]
    pub fn id(&self) -> Option<BlockId> {
        match self {
            Self::Idle => None,
            Self::Moving { id, .. } | Self::Resizing { id, .. } => Some(*id),
        }
    }

    /// The record the block would have if committed now.
    #[must_use]
    pub fn candidate(&self) -> Option<&LayoutRecord> {
        match self {
            Self::Idle => None,
            Self::Moving { candidate, .. } | Self::Resizing { candidate, .. } => Some(candidate),
        }
    }

    /// Guides to draw for the current candidate. Empty unless dragging.
    #[must_use]
    pub fn guides(&self) -> &[SnapGuide] {
        match self {
            Self::Moving { guides, .. } => guides,
            _ => &[],
        }
    }

    /// Recompute the candidate from the cumulative offset `(dx, dy)` since
    /// the gesture began. Returns false when idle or when the offset is not
    /// finite, leaving the candidate as it was.
    pub fn update(&mut self, dx: f64, dy: f64, layout: &LayoutMap, settings: &SnapSettings) -> bool {
        if !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        match self {
            Self::Idle => false,
            Self::Moving { id, carried, original, candidate, guides } => {
                let proposal = LayoutRecord { x: original.x + dx, y: original.y + dy, ..*original };
                let mut excluded = Vec::with_capacity(carried.len() + 1);
                excluded.push(*id);
                excluded.extend_from_slice(carried);
                let snapped = snap_candidate(&excluded, &proposal, layout, settings);
                *candidate = LayoutRecord { x: snapped.x, y: snapped.y, ..proposal };
                *guides = snapped.guides;
                true
            }
            Self::Resizing { anchor, original, candidate, .. } => {
                *candidate = resize_record(original, *anchor, dx, dy, settings);
                true
            }
        }
    }
}

/// Resize `original` by dragging `anchor` by `(dx, dy)`.
///
/// Edges not touched by the anchor stay fixed. Moving edges snap to the grid
/// when grid snapping is on, and neither dimension drops below
/// [`MIN_BLOCK_SIZE`].
#[must_use]
pub fn resize_record(original: &LayoutRecord, anchor: ResizeAnchor, dx: f64, dy: f64, settings: &SnapSettings) -> LayoutRecord {
    let snap = |v: f64| if settings.grid_enabled { snap_to_grid(v, 0.0, settings.grid_size).0 } else { v };

    let mut left = original.x;
    let mut right = original.x + original.width;
    let mut top = original.y;
    let mut bottom = original.y + original.height;

    if anchor.moves_left() {
        left = snap(left + dx).min(right - MIN_BLOCK_SIZE);
    }
    if anchor.moves_right() {
        right = snap(right + dx).max(left + MIN_BLOCK_SIZE);
    }
    if anchor.moves_top() {
        top = snap(top + dy).min(bottom - MIN_BLOCK_SIZE);
    }
    if anchor.moves_bottom() {
        bottom = snap(bottom + dy).max(top + MIN_BLOCK_SIZE);
    }

    LayoutRecord { x: left, y: top, width: right - left, height: bottom - top, z_index: original.z_index }
}
