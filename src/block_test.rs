use serde_json::json;

use super::*;

fn container_with(children: Vec<Block>) -> Block {
    let mut c = Block::new(BlockType::Container, "Container 1");
    c.children = children;
    c
}

// =============================================================
// BlockType
// =============================================================

#[test]
fn type_serde_is_lowercase() {
    assert_eq!(serde_json::to_string(&BlockType::Button).unwrap(), "\"button\"");
    let back: BlockType = serde_json::from_str("\"spacer\"").unwrap();
    assert_eq!(back, BlockType::Spacer);
}

#[test]
fn type_deserialize_unknown_rejects() {
    assert!(serde_json::from_str::<BlockType>("\"video\"").is_err());
}

#[test]
fn only_container_types_hold_children() {
    for kind in BlockType::ALL {
        let template = kind.template();
        let expected = matches!(kind, BlockType::Container | BlockType::Table | BlockType::Group);
        assert_eq!(template.can_contain_children, expected, "{kind:?}");
        if !expected {
            assert_eq!(template.max_nesting_level, 0, "{kind:?}");
        }
    }
}

#[test]
fn templates_have_positive_size() {
    for kind in BlockType::ALL {
        let t = kind.template();
        assert!(t.width > 0.0 && t.height > 0.0, "{kind:?}");
    }
}

// =============================================================
// Block
// =============================================================

#[test]
fn new_block_uses_template() {
    let b = Block::new(BlockType::Table, "Table 1");
    assert_eq!(b.kind, BlockType::Table);
    assert!(b.can_contain_children);
    assert_eq!(b.max_nesting_level, 2);
    assert!(b.children.is_empty());
    assert_eq!(b.settings, BlockType::Table.default_settings());
}

#[test]
fn block_serializes_type_field() {
    let b = Block::new(BlockType::Text, "Text 1");
    let value = serde_json::to_value(&b).unwrap();
    assert_eq!(value["type"], "text");
    assert_eq!(value["name"], "Text 1");
}

#[test]
fn block_deserialize_defaults_children_and_settings() {
    let raw = json!({
        "id": Uuid::nil(),
        "type": "image",
        "name": "Hero",
        "can_contain_children": false,
        "max_nesting_level": 0,
    });
    let b: Block = serde_json::from_value(raw).unwrap();
    assert!(b.children.is_empty());
    assert_eq!(b.settings, json!({}));
}

#[test]
fn merge_settings_inserts_and_deletes() {
    let mut b = Block::new(BlockType::Button, "Button 1");
    assert!(b.merge_settings(&json!({ "label": "Buy", "href": null, "extra": 1 })));
    assert_eq!(b.settings["label"], "Buy");
    assert_eq!(b.settings["extra"], 1);
    assert!(b.settings.get("href").is_none());
    assert_eq!(b.settings["background"], "#1565C0");
}

#[test]
fn merge_settings_rejects_non_object() {
    let mut b = Block::new(BlockType::Text, "Text 1");
    let before = b.settings.clone();
    assert!(!b.merge_settings(&json!([1, 2])));
    assert_eq!(b.settings, before);
}

#[test]
fn merge_settings_replaces_non_object_settings() {
    let mut b = Block::new(BlockType::Text, "Text 1");
    b.settings = json!("bogus");
    assert!(b.merge_settings(&json!({ "a": 1 })));
    assert_eq!(b.settings, json!({ "a": 1 }));
}

// =============================================================
// Tree helpers
// =============================================================

#[test]
fn find_locates_nested_block() {
    let inner = Block::new(BlockType::Text, "Text 1");
    let inner_id = inner.id;
    let blocks = vec![container_with(vec![inner])];
    assert_eq!(find(&blocks, inner_id).map(|b| b.name.as_str()), Some("Text 1"));
    assert!(find(&blocks, Uuid::new_v4()).is_none());
}

#[test]
fn find_mut_edits_nested_block() {
    let inner = Block::new(BlockType::Text, "Text 1");
    let inner_id = inner.id;
    let mut blocks = vec![container_with(vec![inner])];
    find_mut(&mut blocks, inner_id).unwrap().name = "Renamed".into();
    assert_eq!(blocks[0].children[0].name, "Renamed");
}

#[test]
fn remove_detaches_subtree() {
    let leaf = Block::new(BlockType::Text, "Text 1");
    let leaf_id = leaf.id;
    let mid = container_with(vec![leaf]);
    let mid_id = mid.id;
    let mut outer = Block::new(BlockType::Container, "Container 2");
    outer.children.push(mid);
    let mut blocks = vec![outer];

    let removed = remove(&mut blocks, mid_id).unwrap();
    assert_eq!(removed.subtree_ids(), vec![mid_id, leaf_id]);
    assert!(!contains(&blocks, leaf_id));
    assert!(blocks[0].children.is_empty());
}

#[test]
fn remove_missing_returns_none() {
    let mut blocks = vec![Block::new(BlockType::Text, "Text 1")];
    assert!(remove(&mut blocks, Uuid::new_v4()).is_none());
    assert_eq!(blocks.len(), 1);
}

#[test]
fn all_ids_is_depth_first() {
    let a = Block::new(BlockType::Text, "A");
    let b = Block::new(BlockType::Text, "B");
    let (a_id, b_id) = (a.id, b.id);
    let c = container_with(vec![a, b]);
    let c_id = c.id;
    let d = Block::new(BlockType::Spacer, "D");
    let d_id = d.id;
    assert_eq!(all_ids(&[c, d]), vec![c_id, a_id, b_id, d_id]);
}

#[test]
fn unique_name_skips_taken_names_at_any_depth() {
    let blocks = vec![
        Block::new(BlockType::Text, "Text 1"),
        container_with(vec![Block::new(BlockType::Text, "Text 2")]),
    ];
    assert_eq!(unique_name(&blocks, "Text"), "Text 3");
    assert_eq!(unique_name(&blocks, "Image"), "Image 1");
}

#[test]
fn name_taken_ignores_excepted_block() {
    let b = Block::new(BlockType::Text, "Hero");
    let id = b.id;
    let blocks = vec![b];
    assert!(name_taken(&blocks, "Hero", None));
    assert!(!name_taken(&blocks, "Hero", Some(id)));
}

#[test]
fn clone_with_fresh_ids_renames_and_maps_every_node() {
    let leaf = Block::new(BlockType::Text, "Text 1");
    let c = container_with(vec![leaf]);
    let blocks = vec![c.clone()];

    let (copy, mapping) = clone_with_fresh_ids(&blocks, &c);
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping[0].0, c.id);
    assert_ne!(copy.id, c.id);
    assert_eq!(copy.name, "Container 1 copy");
    assert_eq!(copy.children[0].name, "Text 1 copy");
    assert_eq!(copy.children[0].settings, c.children[0].settings);
}

#[test]
fn clone_with_fresh_ids_avoids_existing_copy_names() {
    let original = Block::new(BlockType::Text, "Text 1");
    let blocks = vec![original.clone(), Block::new(BlockType::Text, "Text 1 copy")];
    let (copy, _) = clone_with_fresh_ids(&blocks, &original);
    assert_eq!(copy.name, "Text 1 copy 2");
}
