//! Alignment engine: line a selection up on a shared edge or center.
//!
//! Left/top take the minimum edge across the selection, right/bottom the
//! maximum edge, and center/middle the arithmetic mean of the block centers.
//! Only positions are written; sizes and z-order are untouched.

#[cfg(test)]
#[path = "align_test.rs"]
mod align_test;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::block::BlockId;
use crate::consts::FALLBACK_SIZE;
use crate::geometry::{BlockBounds, bounds_of};
use crate::layout::{LayoutMap, LayoutRecord};

/// Which edge or center line to align to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignKind {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown alignment `{0}` (expected left, center, right, top, middle or bottom)")]
pub struct ParseAlignKindError(String);

impl FromStr for AlignKind {
    type Err = ParseAlignKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "top" => Ok(Self::Top),
            "middle" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            other => Err(ParseAlignKindError(other.to_string())),
        }
    }
}

/// Minimum number of blocks an alignment acts on.
pub const MIN_ALIGN_COUNT: usize = 2;

/// Align `ids` within `layout`, returning the updated map.
///
/// Fewer than two ids is a no-op. Duplicate ids are counted once.
#[must_use]
pub fn align(ids: &[BlockId], layout: &LayoutMap, kind: AlignKind) -> LayoutMap {
    let mut out = layout.clone();
    let items = unique_bounds(ids, layout);
    if items.len() < MIN_ALIGN_COUNT {
        return out;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = items.len() as f64;
    let target = match kind {
        AlignKind::Left => items.iter().map(|(_, b)| b.left).fold(f64::INFINITY, f64::min),
        AlignKind::Top => items.iter().map(|(_, b)| b.top).fold(f64::INFINITY, f64::min),
        AlignKind::Right => items.iter().map(|(_, b)| b.right).fold(f64::NEG_INFINITY, f64::max),
        AlignKind::Bottom => items.iter().map(|(_, b)| b.bottom).fold(f64::NEG_INFINITY, f64::max),
        AlignKind::Center => items.iter().map(|(_, b)| b.center_x).sum::<f64>() / n,
        AlignKind::Middle => items.iter().map(|(_, b)| b.center_y).sum::<f64>() / n,
    };

    for (id, b) in &items {
        let record = out.get(id).copied().unwrap_or_else(|| fallback_record(b));
        let mut next = record;
        match kind {
            AlignKind::Left => next.x = target,
            AlignKind::Top => next.y = target,
            AlignKind::Right => next.x = target - b.width,
            AlignKind::Bottom => next.y = target - b.height,
            AlignKind::Center => next.x = target - b.width / 2.0,
            AlignKind::Middle => next.y = target - b.height / 2.0,
        }
        out.insert(*id, next);
    }
    out
}

/// Bounds for each distinct id, in first-seen order.
pub(crate) fn unique_bounds(ids: &[BlockId], layout: &LayoutMap) -> Vec<(BlockId, BlockBounds)> {
    let mut seen: Vec<(BlockId, BlockBounds)> = Vec::with_capacity(ids.len());
    for id in ids {
        if seen.iter().any(|(s, _)| s == id) {
            continue;
        }
        seen.push((*id, bounds_of(id, layout)));
    }
    seen
}

/// Record matching the geometry fallback for a block that was never laid out.
pub(crate) fn fallback_record(b: &BlockBounds) -> LayoutRecord {
    LayoutRecord { x: b.left, y: b.top, width: FALLBACK_SIZE, height: FALLBACK_SIZE, z_index: 0 }
}
