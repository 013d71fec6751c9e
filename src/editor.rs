//! The editor context: one owned session over blocks, layout, selection and history.
//!
//! DESIGN
//! ======
//! All mutation funnels through `Editor`, so the tree/layout invariants are
//! enforced in one place:
//!
//! - every block in the tree has exactly one layout record and vice versa
//! - the selection only holds ids present in the tree
//! - every committed change records exactly one history entry, and the entry
//!   under the history cursor equals the live state
//!
//! Operations that do not apply (unknown id, too few selected blocks, a patch
//! that changes nothing) return `false`/`None` and record nothing. Drag and
//! resize go through a transient [`GestureState`] and only reach the layout
//! map and history on commit.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use indexmap::IndexSet;

use crate::align::{AlignKind, MIN_ALIGN_COUNT, align};
use crate::block::{self, Block, BlockId, BlockType};
use crate::config::EditorConfig;
use crate::consts::DUPLICATE_OFFSET;
use crate::distribute::{Axis, MIN_DISTRIBUTE_COUNT, distribute};
use crate::geometry::union_bounds;
use crate::gesture::{GestureState, ResizeAnchor};
use crate::hierarchy::{HierarchyConflict, HierarchyNode, HierarchyReport, detect};
use crate::history::{History, HistorySummary};
use crate::layout::{LayoutMap, LayoutRecord, PartialLayoutRecord};
use crate::snap::SnapGuide;
use crate::state::{EditorState, StateError};

/// Owned editor session.
#[derive(Debug, Clone)]
pub struct Editor {
    state: EditorState,
    selection: IndexSet<BlockId>,
    history: History,
    gesture: GestureState,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl Editor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session with explicit settings. History starts with one entry.
    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        let state = EditorState::new();
        let mut history = History::new(config.history_limit);
        history.record("init", &state, None);
        Self { state, selection: IndexSet::new(), history, gesture: GestureState::Idle, config }
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.state.blocks
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutMap {
        &self.state.layout
    }

    /// Look up a block anywhere in the tree.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        block::find(&self.state.blocks, id)
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    // --- Selection ---

    /// Replace the selection with `id`.
    pub fn select_block(&mut self, id: BlockId) -> bool {
        if !block::contains(&self.state.blocks, id) {
            return false;
        }
        self.selection.clear();
        self.selection.insert(id);
        true
    }

    /// Add `id` to the selection, or remove it if already selected.
    pub fn toggle_selection(&mut self, id: BlockId) -> bool {
        if !block::contains(&self.state.blocks, id) {
            return false;
        }
        if !self.selection.shift_remove(&id) {
            self.selection.insert(id);
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected ids in the order they were selected.
    #[must_use]
    pub fn selected_block_ids(&self) -> Vec<BlockId> {
        self.selection.iter().copied().collect()
    }

    // --- Block tree ---

    /// Append a new top-level block of `kind` with its default layout.
    pub fn add_block(&mut self, kind: BlockType) -> BlockId {
        let record = LayoutRecord::default_for(kind);
        self.insert_block(kind, record)
    }

    /// Append a new top-level block of `kind` at `(x, y)`.
    pub fn add_block_at(&mut self, kind: BlockType, x: f64, y: f64) -> BlockId {
        let record = LayoutRecord { x, y, ..LayoutRecord::default_for(kind) };
        self.insert_block(kind, record)
    }

    fn insert_block(&mut self, kind: BlockType, record: LayoutRecord) -> BlockId {
        let name = block::unique_name(&self.state.blocks, kind.label());
        let new_block = Block::new(kind, name);
        let id = new_block.id;
        tracing::debug!(%id, ?kind, name = %new_block.name, "block added");
        self.state.blocks.push(new_block);
        self.state.layout.insert(id, record);
        self.commit(format!("add {}", kind.label().to_lowercase()));
        id
    }

    /// Remove a block and its subtree, with their layout and selection.
    pub fn delete_block(&mut self, id: BlockId) -> bool {
        let Some(removed) = block::remove(&mut self.state.blocks, id) else {
            return false;
        };
        let ids = removed.subtree_ids();
        for gone in &ids {
            self.state.layout.remove(gone);
            self.selection.shift_remove(gone);
        }
        if self.gesture.id().is_some_and(|g| ids.contains(&g)) {
            self.gesture = GestureState::Idle;
        }
        tracing::debug!(%id, count = ids.len(), "block deleted");
        self.commit("delete");
        true
    }

    /// Rename a block. Names must be non-empty and unique across the tree.
    pub fn rename_block(&mut self, id: BlockId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || block::name_taken(&self.state.blocks, name, Some(id)) {
            return false;
        }
        let Some(target) = block::find_mut(&mut self.state.blocks, id) else {
            return false;
        };
        if target.name == name {
            return false;
        }
        target.name = name.to_string();
        tracing::debug!(%id, name, "block renamed");
        self.commit("rename");
        true
    }

    /// Merge a JSON object into a block's settings. `null` values delete keys.
    pub fn update_settings(&mut self, id: BlockId, patch: &serde_json::Value) -> bool {
        let Some(target) = block::find_mut(&mut self.state.blocks, id) else {
            return false;
        };
        let before = target.settings.clone();
        if !target.merge_settings(patch) || target.settings == before {
            return false;
        }
        tracing::debug!(%id, "settings updated");
        self.commit("update settings");
        true
    }

    /// Copy a block (and its subtree) next to the original, offset on both
    /// axes. The copy becomes the selection.
    pub fn duplicate_block(&mut self, id: BlockId) -> Option<BlockId> {
        let source = self.block(id)?.clone();
        let (copy, mapping) = block::clone_with_fresh_ids(&self.state.blocks, &source);
        let copy_id = copy.id;

        let (siblings, pos) = locate_mut(&mut self.state.blocks, id)?;
        siblings.insert(pos + 1, copy);

        for (old, new) in &mapping {
            if let Some(rec) = self.state.layout.get(old).copied() {
                let moved = LayoutRecord { x: rec.x + DUPLICATE_OFFSET, y: rec.y + DUPLICATE_OFFSET, ..rec };
                self.state.layout.insert(*new, moved);
            }
        }
        self.state.normalize();

        self.selection.clear();
        self.selection.insert(copy_id);
        tracing::debug!(%id, copy = %copy_id, count = mapping.len(), "block duplicated");
        self.commit("duplicate");
        Some(copy_id)
    }

    // --- Layout ---

    /// Merge `partial` into a block's layout record, creating it if needed.
    pub fn update_visual_layout(&mut self, id: BlockId, partial: &PartialLayoutRecord) -> bool {
        let Some(kind) = self.block(id).map(|b| b.kind) else {
            return false;
        };
        if !self.state.layout.apply_partial(id, kind, partial) {
            return false;
        }
        tracing::debug!(%id, ?partial, "layout updated");
        self.commit("update layout");
        true
    }

    /// Align the selection. Needs at least two selected blocks.
    pub fn align_selected_blocks(&mut self, kind: AlignKind) -> bool {
        let ids = self.selected_block_ids();
        if ids.len() < MIN_ALIGN_COUNT {
            return false;
        }
        let aligned = align(&ids, &self.state.layout, kind);
        self.replace_layout(aligned, &format!("align {kind:?}").to_lowercase(), ids.len())
    }

    /// Space the selection evenly. Needs at least three selected blocks.
    pub fn distribute_selected_blocks(&mut self, axis: Axis) -> bool {
        let ids = self.selected_block_ids();
        if ids.len() < MIN_DISTRIBUTE_COUNT {
            return false;
        }
        let spread = distribute(&ids, &self.state.layout, axis);
        self.replace_layout(spread, &format!("distribute {axis:?}").to_lowercase(), ids.len())
    }

    fn replace_layout(&mut self, layout: LayoutMap, action: &str, count: usize) -> bool {
        if layout == self.state.layout {
            return false;
        }
        self.state.layout = layout;
        tracing::debug!(action, count, "selection laid out");
        self.commit(action);
        true
    }

    // --- Grouping ---

    /// Wrap the selected top-level blocks in a new group.
    ///
    /// Needs at least two selected top-level blocks. The group takes the slot
    /// of the first member and a layout record equal to the members' union
    /// bounds. The selection becomes the group.
    pub fn group_selected_blocks(&mut self) -> Option<BlockId> {
        let members: Vec<BlockId> = self
            .state
            .blocks
            .iter()
            .filter(|b| self.selection.contains(&b.id))
            .map(|b| b.id)
            .collect();
        if members.len() < 2 {
            return None;
        }
        let bounds = union_bounds(&members, &self.state.layout)?;
        let z_index = members
            .iter()
            .filter_map(|id| self.state.layout.get(id))
            .map(|r| r.z_index)
            .max()
            .unwrap_or(0);
        let slot = self.state.blocks.iter().position(|b| b.id == members[0])?;

        let mut group = Block::new(BlockType::Group, block::unique_name(&self.state.blocks, BlockType::Group.label()));
        let (children, rest): (Vec<Block>, Vec<Block>) =
            std::mem::take(&mut self.state.blocks).into_iter().partition(|b| members.contains(&b.id));
        group.children = children;
        self.state.blocks = rest;

        let group_id = group.id;
        self.state.blocks.insert(slot.min(self.state.blocks.len()), group);
        self.state.layout.insert(
            group_id,
            LayoutRecord { x: bounds.left, y: bounds.top, width: bounds.width, height: bounds.height, z_index },
        );

        self.selection.clear();
        self.selection.insert(group_id);
        tracing::debug!(id = %group_id, count = members.len(), "blocks grouped");
        self.commit("group");
        Some(group_id)
    }

    /// Dissolve a group, putting its children where the group was.
    ///
    /// Only GROUP blocks can be ungrouped. The children become the selection.
    pub fn ungroup(&mut self, id: BlockId) -> bool {
        let Some((siblings, pos)) = locate_mut(&mut self.state.blocks, id) else {
            return false;
        };
        if !siblings[pos].is_group() {
            return false;
        }
        let group = siblings.remove(pos);
        let child_ids: Vec<BlockId> = group.children.iter().map(|c| c.id).collect();
        let tail = siblings.split_off(pos);
        siblings.extend(group.children);
        siblings.extend(tail);

        self.state.layout.remove(&id);
        self.selection.clear();
        self.selection.extend(child_ids.iter().copied());
        tracing::debug!(%id, count = child_ids.len(), "group dissolved");
        self.commit("ungroup");
        true
    }

    // --- Z-order ---

    /// Put a block above every other block. Returns false once the top of
    /// the `z_index` range is taken.
    pub fn bring_to_front(&mut self, id: BlockId) -> bool {
        let Some(top) = self.state.layout.max_z().and_then(|z| z.checked_add(1)) else {
            return false;
        };
        self.set_z(id, top, "bring to front")
    }

    /// Put a block beneath every other block. Returns false once the bottom
    /// of the `z_index` range is taken.
    pub fn send_to_back(&mut self, id: BlockId) -> bool {
        let Some(bottom) = self.state.layout.min_z().and_then(|z| z.checked_sub(1)) else {
            return false;
        };
        self.set_z(id, bottom, "send to back")
    }

    fn set_z(&mut self, id: BlockId, z_index: i64, action: &str) -> bool {
        let Some(kind) = self.block(id).map(|b| b.kind) else {
            return false;
        };
        let partial = PartialLayoutRecord { z_index: Some(z_index), ..PartialLayoutRecord::default() };
        if !self.state.layout.apply_partial(id, kind, &partial) {
            return false;
        }
        tracing::debug!(%id, z_index, "z-order changed");
        self.commit(action);
        true
    }

    // --- Gestures ---

    /// Start dragging a block. Replaces any gesture in progress.
    pub fn begin_move(&mut self, id: BlockId) -> bool {
        let Some(original) = self.committed_record(id) else {
            return false;
        };
        let carried: Vec<BlockId> = self
            .block(id)
            .map(|b| b.subtree_ids().into_iter().filter(|c| *c != id).collect())
            .unwrap_or_default();
        self.gesture = GestureState::moving(id, original).carrying(carried);
        true
    }

    /// Start resizing a block from `anchor`. Replaces any gesture in progress.
    pub fn begin_resize(&mut self, id: BlockId, anchor: ResizeAnchor) -> bool {
        let Some(original) = self.committed_record(id) else {
            return false;
        };
        self.gesture = GestureState::resizing(id, anchor, original);
        true
    }

    fn committed_record(&self, id: BlockId) -> Option<LayoutRecord> {
        let kind = self.block(id)?.kind;
        Some(self.state.layout.get(&id).copied().unwrap_or_else(|| LayoutRecord::default_for(kind)))
    }

    /// Move the active gesture to the cumulative offset `(dx, dy)`.
    ///
    /// Only the transient candidate changes.
    pub fn update_gesture(&mut self, dx: f64, dy: f64) -> bool {
        self.gesture.update(dx, dy, &self.state.layout, &self.config.snap)
    }

    /// Candidate record of the active gesture.
    #[must_use]
    pub fn gesture_candidate(&self) -> Option<&LayoutRecord> {
        self.gesture.candidate()
    }

    /// Snap guides for the active gesture.
    #[must_use]
    pub fn snap_guides(&self) -> &[SnapGuide] {
        self.gesture.guides()
    }

    /// Write the gesture's candidate to the layout and record one history
    /// entry. Returns false when idle or when the candidate equals the
    /// committed record.
    ///
    /// A move shifts the block's descendants by the same offset, so a group
    /// keeps enclosing its members.
    pub fn commit_gesture(&mut self) -> bool {
        let (id, candidate, carried, action) = match std::mem::take(&mut self.gesture) {
            GestureState::Idle => return false,
            GestureState::Moving { id, original, candidate, carried, .. } => {
                let offset = (candidate.x - original.x, candidate.y - original.y);
                (id, candidate, Some((carried, offset)), "move")
            }
            GestureState::Resizing { id, candidate, .. } => (id, candidate, None, "resize"),
        };
        if !block::contains(&self.state.blocks, id) || self.state.layout.get(&id) == Some(&candidate) {
            return false;
        }
        self.state.layout.insert(id, candidate);
        if let Some((carried, (dx, dy))) = carried {
            for member in carried {
                if let Some(record) = self.state.layout.get_mut(&member) {
                    record.x += dx;
                    record.y += dy;
                }
            }
        }
        tracing::debug!(%id, x = candidate.x, y = candidate.y, action, "gesture committed");
        self.commit(action);
        true
    }

    /// Drop the active gesture, leaving the layout as last committed.
    pub fn cancel_gesture(&mut self) -> bool {
        let was_active = self.gesture.is_active();
        self.gesture = GestureState::Idle;
        was_active
    }

    // --- History ---

    /// Restore the previous history entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.state = snapshot.clone();
        self.after_restore("undo");
        true
    }

    /// Restore the next history entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.state = snapshot.clone();
        self.after_restore("redo");
        true
    }

    /// Jump to history entry `i`. Out-of-range indexes change nothing.
    pub fn go_to_history_state(&mut self, i: usize) -> bool {
        let Some(snapshot) = self.history.go_to(i) else {
            return false;
        };
        self.state = snapshot.clone();
        self.after_restore("jump");
        true
    }

    #[must_use]
    pub fn history_list(&self) -> Vec<HistorySummary> {
        self.history.list()
    }

    fn after_restore(&mut self, how: &str) {
        self.gesture = GestureState::Idle;
        let blocks = &self.state.blocks;
        self.selection.retain(|id| block::contains(blocks, *id));
        tracing::info!(how, index = ?self.history.index(), "history restored");
    }

    fn commit(&mut self, action: impl Into<String>) {
        self.history.record(action, &self.state, None);
    }

    // --- Derived views ---

    /// Geometric hierarchy and conflicts under the configured nesting policy.
    #[must_use]
    pub fn hierarchy_report(&self) -> HierarchyReport {
        detect(&self.state.blocks, &self.state.layout, self.config.nesting_policy)
    }

    #[must_use]
    pub fn build_block_tree(&self) -> Vec<HierarchyNode> {
        self.hierarchy_report().roots
    }

    #[must_use]
    pub fn detect_hierarchy_conflicts(&self) -> Vec<HierarchyConflict> {
        self.hierarchy_report().conflicts
    }

    // --- Persistence ---

    /// Serialize `{blocks, layout}`.
    ///
    /// # Errors
    ///
    /// Propagates [`StateError`] from the codec.
    pub fn export_json(&self) -> Result<String, StateError> {
        let json = self.state.export_json()?;
        tracing::info!(blocks = self.state.block_count(), bytes = json.len(), "state exported");
        Ok(json)
    }

    /// Replace the session with an imported document. History restarts with
    /// a single "import" entry; selection and gesture are cleared.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] for malformed or structurally invalid input, in
    /// which case the session is left untouched.
    pub fn import_json(&mut self, raw: &str) -> Result<(), StateError> {
        let state = EditorState::import_json(raw)?;
        self.state = state;
        self.selection.clear();
        self.gesture = GestureState::Idle;
        self.history.reset("import", &self.state);
        Ok(())
    }
}

/// The sibling list holding `id` and its position in it.
fn locate_mut(blocks: &mut Vec<Block>, id: BlockId) -> Option<(&mut Vec<Block>, usize)> {
    if let Some(pos) = blocks.iter().position(|b| b.id == id) {
        return Some((blocks, pos));
    }
    blocks.iter_mut().find_map(|b| locate_mut(&mut b.children, id))
}
