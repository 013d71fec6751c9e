//! Snapping engine: grid snap and snap-to-object with guide lines.
//!
//! Both modes are advisory. They take a proposed position and return a
//! corrected candidate; the caller decides whether to apply it.
//!
//! Object snap checks the moving block's own left, center and right lines (in
//! that order) against the left, center and right lines of every other block,
//! and independently its top, middle and bottom against theirs. The first
//! match within the threshold wins on each axis and produces one guide.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use serde::{Deserialize, Serialize};

use crate::block::BlockId;
use crate::consts::{GRID_SIZE, SNAP_THRESHOLD};
use crate::geometry::BlockBounds;
use crate::layout::{LayoutMap, LayoutRecord};

/// A full-canvas line drawn to show what a drag aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "orientation", rename_all = "lowercase")]
pub enum SnapGuide {
    /// Vertical line at `x`, produced by a horizontal-axis snap.
    Vertical { x: f64 },
    /// Horizontal line at `y`, produced by a vertical-axis snap.
    Horizontal { y: f64 },
}

/// Outcome of a snap evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapResult {
    /// Corrected (or unchanged) x.
    pub x: f64,
    /// Corrected (or unchanged) y.
    pub y: f64,
    /// Whether the horizontal axis snapped to another block.
    pub snapped_x: bool,
    /// Whether the vertical axis snapped to another block.
    pub snapped_y: bool,
    /// At most one guide per snapped axis.
    pub guides: Vec<SnapGuide>,
}

/// Which snapping modes are active and how they are tuned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapSettings {
    pub grid_size: f64,
    pub grid_enabled: bool,
    pub objects_enabled: bool,
    pub threshold: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self { grid_size: GRID_SIZE, grid_enabled: true, objects_enabled: true, threshold: SNAP_THRESHOLD }
    }
}

/// Round `(x, y)` to the nearest multiple of `grid`.
///
/// A grid that is not a positive finite number leaves the point unchanged.
#[must_use]
pub fn snap_to_grid(x: f64, y: f64, grid: f64) -> (f64, f64) {
    if !grid.is_finite() || grid <= 0.0 {
        return (x, y);
    }
    ((x / grid).round() * grid, (y / grid).round() * grid)
}

/// Snap a proposed rectangle to the lines of every block not in `moving`.
///
/// `moving` holds the dragged block and anything carried along with it.
#[must_use]
pub fn snap_to_objects(moving: &[BlockId], proposal: &LayoutRecord, layout: &LayoutMap, threshold: f64) -> SnapResult {
    let me = BlockBounds::from_record(proposal);
    let others: Vec<BlockBounds> = layout
        .iter()
        .filter(|(id, _)| !moving.contains(id))
        .map(|(_, r)| BlockBounds::from_record(r))
        .collect();

    let mut result =
        SnapResult { x: proposal.x, y: proposal.y, snapped_x: false, snapped_y: false, guides: Vec::new() };

    // (own line, offset from own line back to x)
    let own_x = [(me.left, 0.0), (me.center_x, me.width / 2.0), (me.right, me.width)];
    if let Some((line, offset)) = first_match(&own_x, &others, threshold, |b| [b.left, b.center_x, b.right]) {
        result.x = line - offset;
        result.snapped_x = true;
        result.guides.push(SnapGuide::Vertical { x: line });
    }

    let own_y = [(me.top, 0.0), (me.center_y, me.height / 2.0), (me.bottom, me.height)];
    if let Some((line, offset)) = first_match(&own_y, &others, threshold, |b| [b.top, b.center_y, b.bottom]) {
        result.y = line - offset;
        result.snapped_y = true;
        result.guides.push(SnapGuide::Horizontal { y: line });
    }

    result
}

fn first_match(
    own: &[(f64, f64); 3],
    others: &[BlockBounds],
    threshold: f64,
    lines: impl Fn(&BlockBounds) -> [f64; 3],
) -> Option<(f64, f64)> {
    for &(value, offset) in own {
        for other in others {
            for target in lines(other) {
                if (value - target).abs() <= threshold {
                    return Some((target, offset));
                }
            }
        }
    }
    None
}

/// Apply the enabled snapping modes to a proposal.
///
/// Object snap takes precedence; any axis it leaves unsnapped falls back to
/// the grid when grid snapping is on.
#[must_use]
pub fn snap_candidate(moving: &[BlockId], proposal: &LayoutRecord, layout: &LayoutMap, settings: &SnapSettings) -> SnapResult {
    let mut result = if settings.objects_enabled {
        snap_to_objects(moving, proposal, layout, settings.threshold)
    } else {
        SnapResult { x: proposal.x, y: proposal.y, snapped_x: false, snapped_y: false, guides: Vec::new() }
    };

    if settings.grid_enabled {
        let (gx, gy) = snap_to_grid(proposal.x, proposal.y, settings.grid_size);
        if !result.snapped_x {
            result.x = gx;
        }
        if !result.snapped_y {
            result.y = gy;
        }
    }
    result
}
