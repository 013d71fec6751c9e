//! Layout records and the layout map.
//!
//! Every block in the tree owns exactly one `LayoutRecord` describing its
//! absolute position, size, and stacking order in a single flat coordinate
//! space, regardless of how deeply the block is nested. Records are created
//! lazily the first time a block is laid out and are removed together with the
//! block.
//!
//! The map remembers insertion order so that equal `z_index` values resolve
//! deterministically: the later-inserted record draws on top.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::block::{BlockId, BlockType};
use crate::consts::DEFAULT_POSITION;

/// Absolute position, size and stacking order of one block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    /// Left edge in layout units.
    pub x: f64,
    /// Top edge in layout units.
    pub y: f64,
    /// Width in layout units.
    pub width: f64,
    /// Height in layout units.
    pub height: f64,
    /// Stacking order; lower values are drawn beneath higher values.
    #[serde(default)]
    pub z_index: i64,
}

impl LayoutRecord {
    /// Record for a block of `kind` that has never been laid out.
    #[must_use]
    pub fn default_for(kind: BlockType) -> Self {
        let template = kind.template();
        Self {
            x: DEFAULT_POSITION,
            y: DEFAULT_POSITION,
            width: template.width,
            height: template.height,
            z_index: 0,
        }
    }

    /// Apply every present field of `partial`. Returns true if anything changed.
    ///
    /// A partial carrying NaN or an infinity is rejected as a whole.
    pub fn apply(&mut self, partial: &PartialLayoutRecord) -> bool {
        if !partial.is_finite() {
            return false;
        }
        let before = *self;
        if let Some(x) = partial.x {
            self.x = x;
        }
        if let Some(y) = partial.y {
            self.y = y;
        }
        if let Some(w) = partial.width {
            self.width = w;
        }
        if let Some(h) = partial.height {
            self.height = h;
        }
        if let Some(z) = partial.z_index {
            self.z_index = z;
        }
        *self != before
    }
}

/// Sparse update for a layout record. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialLayoutRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
}

impl PartialLayoutRecord {
    /// A position-only update.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// A size-only update.
    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }

    /// Whether every present coordinate is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height].iter().flatten().all(|v| v.is_finite())
    }
}

/// Insertion-ordered map from block id to layout record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutMap {
    records: IndexMap<BlockId, LayoutRecord>,
}

impl LayoutMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self { records: IndexMap::new() }
    }

    /// Return the record for `id`, if laid out.
    #[must_use]
    pub fn get(&self, id: &BlockId) -> Option<&LayoutRecord> {
        self.records.get(id)
    }

    /// Return the record for `id` mutably, if laid out.
    pub fn get_mut(&mut self, id: &BlockId) -> Option<&mut LayoutRecord> {
        self.records.get_mut(id)
    }

    /// Insert or replace a record. Replacing keeps the original insertion slot.
    pub fn insert(&mut self, id: BlockId, record: LayoutRecord) {
        self.records.insert(id, record);
    }

    /// Remove a record, preserving the relative order of the rest.
    pub fn remove(&mut self, id: &BlockId) -> Option<LayoutRecord> {
        self.records.shift_remove(id)
    }

    /// Whether `id` has a record.
    #[must_use]
    pub fn contains(&self, id: &BlockId) -> bool {
        self.records.contains_key(id)
    }

    /// Return the record for `id`, creating the default for `kind` if absent.
    pub fn ensure(&mut self, id: BlockId, kind: BlockType) -> &mut LayoutRecord {
        self.records
            .entry(id)
            .or_insert_with(|| LayoutRecord::default_for(kind))
    }

    /// Merge `partial` into the record for `id`, creating it lazily.
    ///
    /// Returns true if the stored record changed (creation counts as a change).
    /// A non-finite partial changes nothing and creates nothing.
    pub fn apply_partial(&mut self, id: BlockId, kind: BlockType, partial: &PartialLayoutRecord) -> bool {
        if !partial.is_finite() {
            return false;
        }
        let created = !self.records.contains_key(&id);
        let changed = self.ensure(id, kind).apply(partial);
        created || changed
    }

    /// Keep only records whose id satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&BlockId) -> bool) {
        self.records.retain(|id, _| keep(id));
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&BlockId, &LayoutRecord)> {
        self.records.iter()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &BlockId> {
        self.records.keys()
    }

    /// Highest `z_index` across all records, if any.
    #[must_use]
    pub fn max_z(&self) -> Option<i64> {
        self.records.values().map(|r| r.z_index).max()
    }

    /// Lowest `z_index` across all records, if any.
    #[must_use]
    pub fn min_z(&self) -> Option<i64> {
        self.records.values().map(|r| r.z_index).min()
    }

    /// Ids ordered back-to-front: ascending `z_index`, ties by insertion order.
    #[must_use]
    pub fn draw_order(&self) -> Vec<BlockId> {
        let mut ids: Vec<(usize, &BlockId, i64)> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, (id, r))| (i, id, r.z_index))
            .collect();
        ids.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(&b.0)));
        ids.into_iter().map(|(_, id, _)| *id).collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no block has been laid out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(BlockId, LayoutRecord)> for LayoutMap {
    fn from_iter<I: IntoIterator<Item = (BlockId, LayoutRecord)>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}
