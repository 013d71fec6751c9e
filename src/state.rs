//! Persisted editor document: `{blocks, layout}` and its JSON codec.
//!
//! DESIGN
//! ======
//! This is the structure exchanged with import/export collaborators and the
//! payload of every history snapshot. Export is plain serialization; import
//! validates structural rules that serde cannot express (unique ids, unique
//! names, children only under containers) and then normalizes the layout map
//! so that every block has exactly one record and no record is orphaned.
//! For any consistent state, `import(export(state)) == state`.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockId};
use crate::layout::{LayoutMap, LayoutRecord};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate block id: {0}")]
    DuplicateId(BlockId),
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    #[error("block {0} has children but cannot contain children")]
    ChildrenNotAllowed(BlockId),
}

/// The block tree and its layout map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub layout: LayoutMap,
}

/// What [`EditorState::normalize`] had to fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Layout records created for blocks that had none.
    pub created: usize,
    /// Layout records removed because no block owns them.
    pub dropped: usize,
}

// =============================================================================
// IMPL
// =============================================================================

impl EditorState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Json` if serialization fails (non-string map keys cannot occur
    /// here, so in practice this only surfaces serializer bugs).
    pub fn export_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse, validate and normalize a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed input, or a structural error from
    /// [`EditorState::validate`].
    pub fn import_json(raw: &str) -> Result<Self, StateError> {
        let mut state: EditorState = serde_json::from_str(raw)?;
        state.validate()?;
        let report = state.normalize();
        if report != NormalizeReport::default() {
            tracing::warn!(created = report.created, dropped = report.dropped, "normalized imported layout");
        }
        tracing::info!(blocks = state.block_count(), "state imported");
        Ok(state)
    }

    /// Check the structural rules of the block tree.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in depth-first tree order.
    pub fn validate(&self) -> Result<(), StateError> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        validate_blocks(&self.blocks, &mut ids, &mut names)
    }

    /// Make the layout map agree with the tree.
    ///
    /// Missing records get the block type's defaults; records for unknown ids
    /// are removed.
    pub fn normalize(&mut self) -> NormalizeReport {
        let mut report = NormalizeReport::default();
        let mut present = HashSet::new();
        ensure_records(&self.blocks, &mut self.layout, &mut present, &mut report);

        let before = self.layout.len();
        self.layout.retain(|id| present.contains(id));
        report.dropped = before - self.layout.len();
        report
    }

    /// Whether every block has a record and every record has a block.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let ids = crate::block::all_ids(&self.blocks);
        ids.len() == self.layout.len() && ids.iter().all(|id| self.layout.contains(id))
    }

    /// Total number of blocks at every depth.
    #[must_use]
    pub fn block_count(&self) -> usize {
        crate::block::all_ids(&self.blocks).len()
    }
}

fn validate_blocks(blocks: &[Block], ids: &mut HashSet<BlockId>, names: &mut HashSet<String>) -> Result<(), StateError> {
    for block in blocks {
        if !ids.insert(block.id) {
            return Err(StateError::DuplicateId(block.id));
        }
        if !names.insert(block.name.clone()) {
            return Err(StateError::DuplicateName(block.name.clone()));
        }
        if !block.children.is_empty() && !block.can_contain_children {
            return Err(StateError::ChildrenNotAllowed(block.id));
        }
        validate_blocks(&block.children, ids, names)?;
    }
    Ok(())
}

fn ensure_records(blocks: &[Block], layout: &mut LayoutMap, present: &mut HashSet<BlockId>, report: &mut NormalizeReport) {
    for block in blocks {
        present.insert(block.id);
        if !layout.contains(&block.id) {
            layout.insert(block.id, LayoutRecord::default_for(block.kind));
            report.created += 1;
        }
        ensure_records(&block.children, layout, present, report);
    }
}
