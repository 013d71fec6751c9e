#![allow(clippy::float_cmp)]

use super::*;
use crate::layout::LayoutRecord;

fn place(layout: &mut LayoutMap, block: &Block, x: f64, y: f64, w: f64, h: f64) {
    layout.insert(block.id, LayoutRecord { x, y, width: w, height: h, z_index: 0 });
}

fn container(name: &str) -> Block {
    Block::new(BlockType::Container, name)
}

fn text(name: &str) -> Block {
    Block::new(BlockType::Text, name)
}

fn root_ids(report: &HierarchyReport) -> Vec<BlockId> {
    report.roots.iter().map(HierarchyNode::id).collect()
}

fn child_ids(node: &HierarchyNode) -> Vec<BlockId> {
    node.children.iter().map(HierarchyNode::id).collect()
}

// =============================================================
// Containment
// =============================================================

#[test]
fn contained_block_becomes_child() {
    let b = container("B");
    let a = text("A");
    let mut layout = LayoutMap::new();
    place(&mut layout, &b, 0.0, 0.0, 200.0, 200.0);
    place(&mut layout, &a, 20.0, 30.0, 50.0, 50.0);
    let blocks = vec![a.clone(), b.clone()];

    let report = detect(&blocks, &layout, NestingPolicy::Reparent);
    assert!(report.conflicts.is_empty());
    assert_eq!(root_ids(&report), vec![b.id]);
    let node_b = &report.roots[0];
    assert_eq!(child_ids(node_b), vec![a.id]);
    let node_a = &node_b.children[0];
    assert!(node_a.inferred);
    assert_eq!(node_a.relative_coords, RelativeCoords { x: 20.0, y: 30.0 });
}

#[test]
fn partial_overlap_yields_one_conflict_and_no_nesting() {
    let a = container("A");
    let b = container("B");
    let mut layout = LayoutMap::new();
    place(&mut layout, &a, 0.0, 0.0, 100.0, 100.0);
    place(&mut layout, &b, 50.0, 50.0, 100.0, 100.0);
    let blocks = vec![a.clone(), b.clone()];

    let report = detect(&blocks, &layout, NestingPolicy::Reparent);
    assert_eq!(report.conflicts.len(), 1);
    let c = report.conflicts[0];
    assert!(c.involves(a.id) && c.involves(b.id));
    assert_eq!(c.kind, ConflictKind::PartialOverlap);
    assert_eq!(root_ids(&report), vec![a.id, b.id]);
    assert!(report.roots.iter().all(|r| r.children.is_empty()));
}

#[test]
fn touching_edges_are_not_a_conflict() {
    let a = text("A");
    let b = text("B");
    let mut layout = LayoutMap::new();
    place(&mut layout, &a, 0.0, 0.0, 100.0, 100.0);
    place(&mut layout, &b, 100.0, 0.0, 100.0, 100.0);
    assert!(detect_hierarchy_conflicts(&[a, b], &layout).is_empty());
}

#[test]
fn innermost_container_wins() {
    let outer = container("Outer");
    let inner = container("Inner");
    let leaf = text("Leaf");
    let mut layout = LayoutMap::new();
    place(&mut layout, &outer, 0.0, 0.0, 500.0, 500.0);
    place(&mut layout, &inner, 50.0, 50.0, 200.0, 200.0);
    place(&mut layout, &leaf, 60.0, 70.0, 20.0, 20.0);
    let blocks = vec![leaf.clone(), inner.clone(), outer.clone()];

    let report = detect(&blocks, &layout, NestingPolicy::Reparent);
    assert!(report.conflicts.is_empty());
    assert_eq!(root_ids(&report), vec![outer.id]);
    let inner_node = &report.roots[0].children[0];
    assert_eq!(inner_node.id(), inner.id);
    assert_eq!(child_ids(inner_node), vec![leaf.id]);
    assert_eq!(inner_node.children[0].relative_coords, RelativeCoords { x: 10.0, y: 20.0 });
}

#[test]
fn non_container_cannot_be_parent() {
    let big_text = text("Big");
    let small = text("Small");
    let mut layout = LayoutMap::new();
    place(&mut layout, &big_text, 0.0, 0.0, 300.0, 300.0);
    place(&mut layout, &small, 10.0, 10.0, 10.0, 10.0);
    let report = detect(&[big_text.clone(), small.clone()], &layout, NestingPolicy::Reparent);
    assert!(report.conflicts.is_empty());
    assert_eq!(root_ids(&report), vec![big_text.id, small.id]);
}

#[test]
fn two_unnested_enclosing_containers_is_a_conflict() {
    let left = container("Left");
    let right = container("Right");
    let leaf = text("Leaf");
    let mut layout = LayoutMap::new();
    place(&mut layout, &left, 0.0, 0.0, 200.0, 100.0);
    place(&mut layout, &right, 100.0, 0.0, 200.0, 100.0);
    place(&mut layout, &leaf, 120.0, 10.0, 50.0, 50.0);
    let blocks = vec![left.clone(), right.clone(), leaf.clone()];

    let report = detect(&blocks, &layout, NestingPolicy::Reparent);
    let multi: Vec<&HierarchyConflict> = report
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::MultipleParents)
        .collect();
    assert_eq!(multi.len(), 2);
    assert!(multi.iter().all(|c| c.block_a == leaf.id));
    assert!(report.roots.iter().any(|r| r.id() == leaf.id));
    assert!(report.roots.iter().all(|r| r.children.is_empty()));
}

#[test]
fn identical_bounds_nest_later_under_earlier() {
    let first = container("First");
    let second = container("Second");
    let mut layout = LayoutMap::new();
    place(&mut layout, &first, 0.0, 0.0, 100.0, 100.0);
    place(&mut layout, &second, 0.0, 0.0, 100.0, 100.0);
    let report = detect(&[first.clone(), second.clone()], &layout, NestingPolicy::Reparent);
    assert!(report.conflicts.is_empty());
    assert_eq!(root_ids(&report), vec![first.id]);
    assert_eq!(child_ids(&report.roots[0]), vec![second.id]);
}

#[test]
fn siblings_sorted_by_top_then_left() {
    let parent = container("Parent");
    let a = text("A");
    let b = text("B");
    let c = text("C");
    let mut layout = LayoutMap::new();
    place(&mut layout, &parent, 0.0, 0.0, 1000.0, 1000.0);
    place(&mut layout, &a, 500.0, 100.0, 10.0, 10.0);
    place(&mut layout, &b, 10.0, 100.0, 10.0, 10.0);
    place(&mut layout, &c, 10.0, 10.0, 10.0, 10.0);
    let report = detect(&[a.clone(), b.clone(), c.clone(), parent], &layout, NestingPolicy::Reparent);
    assert_eq!(child_ids(&report.roots[0]), vec![c.id, b.id, a.id]);
}

#[test]
fn missing_layout_uses_fallback_box() {
    let parent = container("Parent");
    let orphan = text("Orphan");
    let mut layout = LayoutMap::new();
    place(&mut layout, &parent, -10.0, -10.0, 500.0, 500.0);
    let report = detect(&[parent.clone(), orphan.clone()], &layout, NestingPolicy::Reparent);
    assert_eq!(child_ids(&report.roots[0]), vec![orphan.id]);
}

// =============================================================
// Nesting limits
// =============================================================

/// Outer (max 1) ⊃ Middle (max 3) ⊃ Leaf.
fn limited_stack() -> (Vec<Block>, LayoutMap, BlockId, BlockId, BlockId) {
    let mut outer = container("Outer");
    outer.max_nesting_level = 1;
    let middle = container("Middle");
    let leaf = text("Leaf");
    let mut layout = LayoutMap::new();
    place(&mut layout, &outer, 0.0, 0.0, 500.0, 500.0);
    place(&mut layout, &middle, 50.0, 50.0, 300.0, 300.0);
    place(&mut layout, &leaf, 100.0, 100.0, 10.0, 10.0);
    let ids = (outer.id, middle.id, leaf.id);
    (vec![outer, middle, leaf], layout, ids.0, ids.1, ids.2)
}

#[test]
fn reparent_policy_lifts_overflowing_block() {
    let (blocks, layout, outer, middle, leaf) = limited_stack();
    let report = detect(&blocks, &layout, NestingPolicy::Reparent);
    assert_eq!(root_ids(&report), vec![outer]);
    let outer_node = &report.roots[0];
    assert_eq!(child_ids(outer_node), vec![middle, leaf]);
    assert!(outer_node.find(middle).unwrap().children.is_empty());
}

#[test]
fn discard_policy_drops_overflowing_block() {
    let (blocks, layout, outer, middle, leaf) = limited_stack();
    let report = detect(&blocks, &layout, NestingPolicy::Discard);
    assert_eq!(root_ids(&report), vec![outer]);
    assert_eq!(child_ids(&report.roots[0]), vec![middle]);
    assert!(report.find(leaf).is_none());
}

#[test]
fn zero_limit_container_holds_nothing_under_reparent() {
    let mut shell = container("Shell");
    shell.max_nesting_level = 0;
    let leaf = text("Leaf");
    let mut layout = LayoutMap::new();
    place(&mut layout, &shell, 0.0, 0.0, 100.0, 100.0);
    place(&mut layout, &leaf, 10.0, 10.0, 10.0, 10.0);
    let report = detect(&[shell.clone(), leaf.clone()], &layout, NestingPolicy::Reparent);
    assert_eq!(root_ids(&report), vec![shell.id, leaf.id]);
}

// =============================================================
// Manual groups
// =============================================================

#[test]
fn group_children_are_kept_verbatim_and_group_never_adopts() {
    let member_a = text("A");
    let member_b = text("B");
    let mut group = Block::new(BlockType::Group, "Group 1");
    group.children = vec![member_b.clone(), member_a.clone()];
    let stray = text("Stray");

    let mut layout = LayoutMap::new();
    place(&mut layout, &group, 0.0, 0.0, 300.0, 300.0);
    place(&mut layout, &member_a, 10.0, 10.0, 20.0, 20.0);
    place(&mut layout, &member_b, 100.0, 100.0, 20.0, 20.0);
    place(&mut layout, &stray, 50.0, 50.0, 10.0, 10.0);

    let report = detect(&[group.clone(), stray.clone()], &layout, NestingPolicy::Reparent);
    assert_eq!(root_ids(&report), vec![group.id, stray.id]);
    let group_node = &report.roots[0];
    assert_eq!(child_ids(group_node), vec![member_b.id, member_a.id]);
    assert!(group_node.children.iter().all(|c| !c.inferred));
    assert!(group_node.block.children.is_empty());
}

#[test]
fn group_as_a_unit_can_nest_in_container() {
    let section = container("Section");
    let mut group = Block::new(BlockType::Group, "Group 1");
    let member = text("Member");
    group.children = vec![member.clone()];
    let mut layout = LayoutMap::new();
    place(&mut layout, &section, 0.0, 0.0, 600.0, 600.0);
    place(&mut layout, &group, 100.0, 100.0, 100.0, 100.0);
    place(&mut layout, &member, 110.0, 120.0, 10.0, 10.0);

    let report = detect(&[section.clone(), group.clone()], &layout, NestingPolicy::Reparent);
    let group_node = report.find(group.id).unwrap();
    assert!(group_node.inferred);
    assert_eq!(group_node.children[0].relative_coords, RelativeCoords { x: 10.0, y: 20.0 });
}

// =============================================================
// Purity / determinism
// =============================================================

#[test]
fn detection_is_deterministic_and_pure() {
    let (blocks, layout, ..) = limited_stack();
    let blocks_before = blocks.clone();
    let layout_before = layout.clone();
    let first = detect(&blocks, &layout, NestingPolicy::Reparent);
    let second = detect(&blocks, &layout, NestingPolicy::Reparent);
    assert_eq!(first, second);
    assert_eq!(blocks, blocks_before);
    assert_eq!(layout, layout_before);
}

#[test]
fn nesting_policy_parses() {
    assert_eq!("discard".parse::<NestingPolicy>().unwrap(), NestingPolicy::Discard);
    assert!("flatten".parse::<NestingPolicy>().is_err());
}
