//! Bounding boxes derived from layout records.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::Serialize;

use crate::block::BlockId;
use crate::consts::FALLBACK_SIZE;
use crate::layout::{LayoutMap, LayoutRecord};

/// Edges, size and center of a block's rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl BlockBounds {
    /// Derive bounds from a position and size.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
            width,
            height,
            center_x: x + width / 2.0,
            center_y: y + height / 2.0,
        }
    }

    /// Derive bounds from a layout record.
    #[must_use]
    pub fn from_record(record: &LayoutRecord) -> Self {
        Self::new(record.x, record.y, record.width, record.height)
    }

    /// Whether `other` lies entirely inside (or exactly on) these bounds.
    #[must_use]
    pub fn contains(&self, other: &BlockBounds) -> bool {
        other.left >= self.left && other.top >= self.top && other.right <= self.right && other.bottom <= self.bottom
    }

    /// Whether the two rectangles share a region of positive area.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &BlockBounds) -> bool {
        self.left < other.right && other.left < self.right && self.top < other.bottom && other.top < self.bottom
    }

    /// Smallest rectangle enclosing both.
    #[must_use]
    pub fn union(&self, other: &BlockBounds) -> BlockBounds {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right.max(other.right);
        let bottom = self.bottom.max(other.bottom);
        Self::new(left, top, right - left, bottom - top)
    }
}

/// Bounds of `id` in `layout`, falling back to a 100×100 box at the origin
/// when the block has no record.
#[must_use]
pub fn bounds_of(id: &BlockId, layout: &LayoutMap) -> BlockBounds {
    match layout.get(id) {
        Some(record) => BlockBounds::from_record(record),
        None => BlockBounds::new(0.0, 0.0, FALLBACK_SIZE, FALLBACK_SIZE),
    }
}

/// Union of the bounds of every id in `ids`, or `None` when `ids` is empty.
#[must_use]
pub fn union_bounds(ids: &[BlockId], layout: &LayoutMap) -> Option<BlockBounds> {
    ids.iter()
        .map(|id| bounds_of(id, layout))
        .reduce(|a, b| a.union(&b))
}
