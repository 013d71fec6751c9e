//! Distribution engine: space a selection evenly along one axis.
//!
//! Blocks are sorted by their leading edge. The first and last block anchor
//! the span and never move; interior blocks are laid out left-to-right (or
//! top-to-bottom) so that every gap between consecutive blocks is equal. When
//! the anchors overlap the interior blocks, the shared gap goes negative and
//! blocks overlap; that is kept as-is rather than clamped.

#[cfg(test)]
#[path = "distribute_test.rs"]
mod distribute_test;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::align::{fallback_record, unique_bounds};
use crate::block::BlockId;
use crate::geometry::BlockBounds;
use crate::layout::LayoutMap;

/// Axis to distribute along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn start(self, b: &BlockBounds) -> f64 {
        match self {
            Self::Horizontal => b.left,
            Self::Vertical => b.top,
        }
    }

    fn size(self, b: &BlockBounds) -> f64 {
        match self {
            Self::Horizontal => b.width,
            Self::Vertical => b.height,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown axis `{0}` (expected horizontal or vertical)")]
pub struct ParseAxisError(String);

impl FromStr for Axis {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizontal" | "h" => Ok(Self::Horizontal),
            "vertical" | "v" => Ok(Self::Vertical),
            other => Err(ParseAxisError(other.to_string())),
        }
    }
}

/// Minimum number of blocks a distribution acts on.
pub const MIN_DISTRIBUTE_COUNT: usize = 3;

/// Shared gap that distribution would produce for `ids`, or `None` below the
/// minimum count.
#[must_use]
pub fn spacing(ids: &[BlockId], layout: &LayoutMap, axis: Axis) -> Option<f64> {
    let items = sorted_items(ids, layout, axis);
    if items.len() < MIN_DISTRIBUTE_COUNT {
        return None;
    }
    Some(compute_spacing(&items, axis))
}

/// Distribute `ids` within `layout` along `axis`, returning the updated map.
///
/// Fewer than three ids is a no-op.
#[must_use]
pub fn distribute(ids: &[BlockId], layout: &LayoutMap, axis: Axis) -> LayoutMap {
    let mut out = layout.clone();
    let items = sorted_items(ids, layout, axis);
    if items.len() < MIN_DISTRIBUTE_COUNT {
        return out;
    }

    let gap = compute_spacing(&items, axis);
    let (_, first) = items[0];
    let mut cursor = axis.start(&first) + axis.size(&first);

    for (id, b) in &items[1..items.len() - 1] {
        let position = cursor + gap;
        let mut record = out.get(id).copied().unwrap_or_else(|| fallback_record(b));
        match axis {
            Axis::Horizontal => record.x = position,
            Axis::Vertical => record.y = position,
        }
        out.insert(*id, record);
        cursor = position + axis.size(b);
    }
    out
}

fn sorted_items(ids: &[BlockId], layout: &LayoutMap, axis: Axis) -> Vec<(BlockId, BlockBounds)> {
    let mut items = unique_bounds(ids, layout);
    items.sort_by(|a, b| axis.start(&a.1).total_cmp(&axis.start(&b.1)));
    items
}

fn compute_spacing(items: &[(BlockId, BlockBounds)], axis: Axis) -> f64 {
    let (_, first) = items[0];
    let (_, last) = items[items.len() - 1];
    let interior: f64 = items[1..items.len() - 1].iter().map(|(_, b)| axis.size(b)).sum();
    let total_space = axis.start(&last) - (axis.start(&first) + axis.size(&first)) - interior;
    #[allow(clippy::cast_precision_loss)]
    let gaps = (items.len() - 1) as f64;
    total_space / gaps
}
