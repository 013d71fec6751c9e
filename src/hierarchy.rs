//! Hierarchy detector: infer a containment tree from block geometry.
//!
//! DESIGN
//! ======
//! Most blocks live at the top level of the block tree; visual nesting is
//! implied only by position. Before export (or for a preview) the detector
//! derives which blocks sit inside which, purely from bounding boxes.
//!
//! The detector works on the flat list of top-level blocks and the layout map.
//! It never follows derived child pointers, so a block can never end up as its
//! own ancestor. Explicit children (manual grouping) are carried over verbatim
//! beneath their owner; inference never adds to or removes from a manual group.
//!
//! Rules:
//! - Only container-capable, non-group blocks can become derived parents.
//! - Among the containers that fully enclose a block, the innermost one wins.
//!   Two or more innermost containers that do not enclose one another are an
//!   ambiguity: the block stays at the top level and a conflict is reported.
//! - Two blocks whose rectangles overlap without either enclosing the other
//!   are reported as a conflict and both stay at the top level.
//! - Identical rectangles resolve by list order: the earlier block encloses
//!   the later one.
//! - `max_nesting_level` on every ancestor bounds how deep a block may sit
//!   under it. Overflow is resolved by [`NestingPolicy`].
//!
//! The detector is pure: it reads a snapshot and returns a new structure.

#[cfg(test)]
#[path = "hierarchy_test.rs"]
mod hierarchy_test;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockId, BlockType};
use crate::geometry::{BlockBounds, bounds_of};
use crate::layout::LayoutMap;

// =============================================================================
// TYPES
// =============================================================================

/// What to do with a block whose inferred parent would nest it too deeply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingPolicy {
    /// Attach the block to its nearest ancestor that still has room.
    #[default]
    Reparent,
    /// Leave the block (and anything inside it) out of the derived tree.
    Discard,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown nesting policy `{0}` (expected reparent or discard)")]
pub struct ParseNestingPolicyError(String);

impl FromStr for NestingPolicy {
    type Err = ParseNestingPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reparent" => Ok(Self::Reparent),
            "discard" => Ok(Self::Discard),
            other => Err(ParseNestingPolicyError(other.to_string())),
        }
    }
}

/// Position of a node relative to its parent's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelativeCoords {
    pub x: f64,
    pub y: f64,
}

/// One node of the derived tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    /// The block, without its explicit children (those appear in `children`).
    pub block: Block,
    /// Absolute bounds of the block.
    pub bounds: BlockBounds,
    /// Offset from the parent's top-left; absolute for roots.
    pub relative_coords: RelativeCoords,
    /// True when the parent was inferred from geometry rather than manual grouping.
    pub inferred: bool,
    /// Explicit children first (tree order), then inferred children by position.
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Id of the block at this node.
    #[must_use]
    pub fn id(&self) -> BlockId {
        self.block.id
    }

    /// Find a node by block id in this subtree.
    #[must_use]
    pub fn find(&self, id: BlockId) -> Option<&HierarchyNode> {
        if self.block.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// Why two blocks could not be placed unambiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The rectangles overlap but neither encloses the other.
    PartialOverlap,
    /// `block_a` sits inside `block_b` and inside at least one other
    /// container that is not nested with `block_b`.
    MultipleParents,
}

/// A pair of blocks whose overlap cannot be resolved into parent/child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HierarchyConflict {
    pub block_a: BlockId,
    pub block_b: BlockId,
    pub kind: ConflictKind,
}

impl HierarchyConflict {
    /// Whether this conflict names `id` on either side.
    #[must_use]
    pub fn involves(&self, id: BlockId) -> bool {
        self.block_a == id || self.block_b == id
    }
}

/// Derived tree plus the conflicts found while building it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyReport {
    pub roots: Vec<HierarchyNode>,
    pub conflicts: Vec<HierarchyConflict>,
}

impl HierarchyReport {
    /// Find a node anywhere in the derived tree.
    #[must_use]
    pub fn find(&self, id: BlockId) -> Option<&HierarchyNode> {
        self.roots.iter().find_map(|r| r.find(id))
    }
}

// =============================================================================
// DETECTION
// =============================================================================

/// Derived tree using the default nesting policy.
#[must_use]
pub fn build_block_tree(blocks: &[Block], layout: &LayoutMap) -> Vec<HierarchyNode> {
    detect(blocks, layout, NestingPolicy::default()).roots
}

/// Conflicts only.
#[must_use]
pub fn detect_hierarchy_conflicts(blocks: &[Block], layout: &LayoutMap) -> Vec<HierarchyConflict> {
    detect(blocks, layout, NestingPolicy::default()).conflicts
}

/// Run the detector over the top-level `blocks`.
#[must_use]
pub fn detect(blocks: &[Block], layout: &LayoutMap, policy: NestingPolicy) -> HierarchyReport {
    let bounds: Vec<BlockBounds> = blocks.iter().map(|b| bounds_of(&b.id, layout)).collect();
    let n = blocks.len();

    let encloses = |outer: usize, inner: usize| -> bool {
        outer != inner && bounds[outer].contains(&bounds[inner]) && (bounds[outer] != bounds[inner] || outer < inner)
    };
    let can_parent = |j: usize| blocks[j].can_contain_children && blocks[j].kind != BlockType::Group;

    let mut conflicts = Vec::new();
    let mut conflicted = vec![false; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&bounds[i], &bounds[j]);
            if a.intersects(b) && !a.contains(b) && !b.contains(a) {
                conflicts.push(HierarchyConflict {
                    block_a: blocks[i].id,
                    block_b: blocks[j].id,
                    kind: ConflictKind::PartialOverlap,
                });
                conflicted[i] = true;
                conflicted[j] = true;
            }
        }
    }

    let mut parent: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        let candidates: Vec<usize> = (0..n).filter(|&j| can_parent(j) && encloses(j, i)).collect();
        let innermost: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&j| !candidates.iter().any(|&k| encloses(j, k)))
            .collect();
        match innermost.as_slice() {
            [] => {}
            [only] => {
                if !conflicted[i] {
                    parent[i] = Some(*only);
                }
            }
            many => {
                for &m in many {
                    conflicts.push(HierarchyConflict {
                        block_a: blocks[i].id,
                        block_b: blocks[m].id,
                        kind: ConflictKind::MultipleParents,
                    });
                }
                conflicted[i] = true;
            }
        }
    }

    let (effective, dropped) = apply_nesting_limits(blocks, &bounds, &parent, policy);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots: Vec<usize> = Vec::new();
    for i in 0..n {
        if dropped[i] {
            continue;
        }
        match effective[i] {
            Some(p) => children[p].push(i),
            None => roots.push(i),
        }
    }

    let by_position = |a: &usize, b: &usize| {
        bounds[*a]
            .top
            .total_cmp(&bounds[*b].top)
            .then_with(|| bounds[*a].left.total_cmp(&bounds[*b].left))
            .then_with(|| a.cmp(b))
    };
    roots.sort_by(by_position);
    for list in &mut children {
        list.sort_by(by_position);
    }

    let ctx = BuildCtx { blocks, layout, bounds: &bounds, children: &children };
    let roots = roots.into_iter().map(|i| ctx.derived_node(i, None)).collect();

    tracing::debug!(blocks = n, conflicts = conflicts.len(), ?policy, "hierarchy detected");
    HierarchyReport { roots, conflicts }
}

/// Resolve each inferred parent against ancestors' `max_nesting_level`.
///
/// Returns the effective parent per block and which blocks were dropped.
fn apply_nesting_limits(
    blocks: &[Block],
    bounds: &[BlockBounds],
    parent: &[Option<usize>],
    policy: NestingPolicy,
) -> (Vec<Option<usize>>, Vec<bool>) {
    let n = blocks.len();

    // Enclosing blocks are never smaller, and equal rectangles resolve by
    // index, so this order visits every parent before its children.
    let area = |i: usize| bounds[i].width * bounds[i].height;
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| area(b).total_cmp(&area(a)).then_with(|| a.cmp(&b)));

    let mut effective: Vec<Option<usize>> = vec![None; n];
    let mut dropped = vec![false; n];

    for i in order {
        let Some(p) = parent[i] else {
            continue;
        };
        if dropped[p] {
            dropped[i] = true;
            continue;
        }

        let mut candidate = Some(p);
        let mut placed = None;
        while let Some(q) = candidate {
            if fits_under(q, blocks, &effective) {
                placed = Some(q);
                break;
            }
            if policy == NestingPolicy::Discard {
                break;
            }
            candidate = effective[q];
        }

        match placed {
            Some(q) => effective[i] = Some(q),
            None if policy == NestingPolicy::Discard => dropped[i] = true,
            None => {}
        }
    }

    (effective, dropped)
}

/// Whether a new child directly under `q` respects every ancestor's limit.
fn fits_under(q: usize, blocks: &[Block], effective: &[Option<usize>]) -> bool {
    let mut ancestor = q;
    let mut depth: u32 = 1;
    loop {
        if depth > blocks[ancestor].max_nesting_level {
            return false;
        }
        match effective[ancestor] {
            Some(up) => {
                ancestor = up;
                depth += 1;
            }
            None => return true,
        }
    }
}

struct BuildCtx<'a> {
    blocks: &'a [Block],
    layout: &'a LayoutMap,
    bounds: &'a [BlockBounds],
    children: &'a [Vec<usize>],
}

impl BuildCtx<'_> {
    fn derived_node(&self, i: usize, parent: Option<&BlockBounds>) -> HierarchyNode {
        let block = &self.blocks[i];
        let bounds = self.bounds[i];

        let mut kids: Vec<HierarchyNode> = block
            .children
            .iter()
            .map(|c| self.explicit_node(c, &bounds))
            .collect();
        kids.extend(self.children[i].iter().map(|&c| self.derived_node(c, Some(&bounds))));

        HierarchyNode {
            block: Block { children: Vec::new(), ..block.clone() },
            bounds,
            relative_coords: relative(&bounds, parent),
            inferred: parent.is_some(),
            children: kids,
        }
    }

    fn explicit_node(&self, block: &Block, parent: &BlockBounds) -> HierarchyNode {
        let bounds = bounds_of(&block.id, self.layout);
        HierarchyNode {
            block: Block { children: Vec::new(), ..block.clone() },
            bounds,
            relative_coords: relative(&bounds, Some(parent)),
            inferred: false,
            children: block.children.iter().map(|c| self.explicit_node(c, &bounds)).collect(),
        }
    }
}

fn relative(bounds: &BlockBounds, parent: Option<&BlockBounds>) -> RelativeCoords {
    match parent {
        Some(p) => RelativeCoords { x: bounds.left - p.left, y: bounds.top - p.top },
        None => RelativeCoords { x: bounds.left, y: bounds.top },
    }
}
