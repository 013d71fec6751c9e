//! Block tree: block types, their templates, and tree traversal helpers.
//!
//! A `Block` is one visual element of the email (text, button, image, etc.).
//! Blocks form an ordered tree in which only container-capable blocks may own
//! children. The tree itself carries no geometry; positions live in the
//! [`LayoutMap`](crate::layout::LayoutMap) keyed by [`BlockId`].
//!
//! Helpers in this module operate on the top-level `[Block]` slice and recurse
//! into children, so callers never need to know at what depth a block lives.

#[cfg(test)]
#[path = "block_test.rs"]
mod block_test;

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Unique, stable identifier for a block.
pub type BlockId = Uuid;

/// The kind of a block. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Paragraph or heading text.
    Text,
    /// Call-to-action link styled as a button.
    Button,
    /// Inline image.
    Image,
    /// Generic section that may hold other blocks.
    Container,
    /// Table layout; may hold other blocks.
    Table,
    /// Vertical whitespace.
    Spacer,
    /// Decorative rectangle.
    Rectangle,
    /// Decorative circle.
    Circle,
    /// Horizontal or vertical rule.
    Line,
    /// Manual grouping created from a multi-block selection.
    Group,
}

/// Creation-time defaults for a block type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockTemplate {
    /// Default width in layout units.
    pub width: f64,
    /// Default height in layout units.
    pub height: f64,
    /// Whether blocks of this type may own children.
    pub can_contain_children: bool,
    /// How many levels of descendants may nest beneath a block of this type.
    pub max_nesting_level: u32,
}

impl BlockType {
    /// Every block type, in palette order.
    pub const ALL: [BlockType; 10] = [
        Self::Text,
        Self::Button,
        Self::Image,
        Self::Container,
        Self::Table,
        Self::Spacer,
        Self::Rectangle,
        Self::Circle,
        Self::Line,
        Self::Group,
    ];

    /// Defaults applied when a block of this type is created.
    #[must_use]
    pub fn template(self) -> BlockTemplate {
        let (width, height, can_contain_children, max_nesting_level) = match self {
            Self::Text => (300.0, 60.0, false, 0),
            Self::Button => (160.0, 44.0, false, 0),
            Self::Image => (300.0, 200.0, false, 0),
            Self::Container => (600.0, 300.0, true, 3),
            Self::Table => (600.0, 200.0, true, 2),
            Self::Spacer => (600.0, 20.0, false, 0),
            Self::Rectangle => (200.0, 120.0, false, 0),
            Self::Circle => (120.0, 120.0, false, 0),
            Self::Line => (200.0, 2.0, false, 0),
            Self::Group => (100.0, 100.0, true, 5),
        };
        BlockTemplate { width, height, can_contain_children, max_nesting_level }
    }

    /// Human label used as the base of generated block names.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Button => "Button",
            Self::Image => "Image",
            Self::Container => "Container",
            Self::Table => "Table",
            Self::Spacer => "Spacer",
            Self::Rectangle => "Rectangle",
            Self::Circle => "Circle",
            Self::Line => "Line",
            Self::Group => "Group",
        }
    }

    /// Starting `settings` for a freshly created block of this type.
    #[must_use]
    pub fn default_settings(self) -> serde_json::Value {
        match self {
            Self::Text => json!({ "content": "New text", "font_size": 16, "color": "#333333" }),
            Self::Button => json!({ "label": "Click me", "href": "#", "background": "#1565C0", "color": "#FFFFFF" }),
            Self::Image => json!({ "src": "", "alt": "" }),
            Self::Container | Self::Table => json!({ "background": "#FFFFFF", "padding": 16 }),
            Self::Spacer => json!({}),
            Self::Rectangle | Self::Circle => json!({ "fill": "#E0E0E0", "stroke": "#9E9E9E" }),
            Self::Line => json!({ "stroke": "#9E9E9E", "stroke_width": 1 }),
            Self::Group => json!({}),
        }
    }
}

/// A node in the block tree, as stored in the editor and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique identifier for this block.
    pub id: BlockId,
    /// Block type.
    #[serde(rename = "type")]
    pub kind: BlockType,
    /// Human label; unique across the whole tree.
    pub name: String,
    /// Rendering settings. Opaque to the layout engine.
    #[serde(default = "empty_settings")]
    pub settings: serde_json::Value,
    /// Ordered children. Empty unless `can_contain_children`.
    #[serde(default)]
    pub children: Vec<Block>,
    /// Whether this block may own children.
    pub can_contain_children: bool,
    /// How many levels of descendants may nest beneath this block.
    pub max_nesting_level: u32,
}

fn empty_settings() -> serde_json::Value {
    json!({})
}

impl Block {
    /// Create a block of `kind` with a fresh id and the type's template defaults.
    #[must_use]
    pub fn new(kind: BlockType, name: impl Into<String>) -> Self {
        let template = kind.template();
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            settings: kind.default_settings(),
            children: Vec::new(),
            can_contain_children: template.can_contain_children,
            max_nesting_level: template.max_nesting_level,
        }
    }

    /// Whether this is a manual grouping block.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind == BlockType::Group
    }

    /// Ids of this block and all of its descendants, depth-first.
    #[must_use]
    pub fn subtree_ids(&self) -> Vec<BlockId> {
        let mut out = Vec::new();
        push_ids(std::slice::from_ref(self), &mut out);
        out
    }

    /// Merge a settings patch into this block's settings.
    ///
    /// Keys with `null` values are removed. Returns false if `patch` is not a
    /// JSON object.
    pub fn merge_settings(&mut self, patch: &serde_json::Value) -> bool {
        let Some(incoming) = patch.as_object() else {
            return false;
        };
        if !self.settings.is_object() {
            self.settings = json!({});
        }
        if let Some(existing) = self.settings.as_object_mut() {
            for (k, v) in incoming {
                if v.is_null() {
                    existing.remove(k);
                } else {
                    existing.insert(k.clone(), v.clone());
                }
            }
        }
        true
    }
}

// =============================================================================
// TREE HELPERS
// =============================================================================

/// Find a block anywhere in the tree.
#[must_use]
pub fn find(blocks: &[Block], id: BlockId) -> Option<&Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find(&block.children, id) {
            return Some(found);
        }
    }
    None
}

/// Find a block anywhere in the tree, mutably.
pub fn find_mut(blocks: &mut [Block], id: BlockId) -> Option<&mut Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find_mut(&mut block.children, id) {
            return Some(found);
        }
    }
    None
}

/// Detach a block (with its subtree) from wherever it lives in the tree.
pub fn remove(blocks: &mut Vec<Block>, id: BlockId) -> Option<Block> {
    if let Some(pos) = blocks.iter().position(|b| b.id == id) {
        return Some(blocks.remove(pos));
    }
    blocks.iter_mut().find_map(|b| remove(&mut b.children, id))
}

/// Whether `id` is present anywhere in the tree.
#[must_use]
pub fn contains(blocks: &[Block], id: BlockId) -> bool {
    find(blocks, id).is_some()
}

/// Every id in the tree, depth-first in tree order.
#[must_use]
pub fn all_ids(blocks: &[Block]) -> Vec<BlockId> {
    let mut out = Vec::new();
    push_ids(blocks, &mut out);
    out
}

fn push_ids(blocks: &[Block], out: &mut Vec<BlockId>) {
    for block in blocks {
        out.push(block.id);
        push_ids(&block.children, out);
    }
}

/// Whether any block in the tree other than `except` is named `name`.
#[must_use]
pub fn name_taken(blocks: &[Block], name: &str, except: Option<BlockId>) -> bool {
    blocks
        .iter()
        .any(|b| (b.name == name && Some(b.id) != except) || name_taken(&b.children, name, except))
}

/// First `"{base} {n}"` (n starting at 1) not used anywhere in the tree.
#[must_use]
pub fn unique_name(blocks: &[Block], base: &str) -> String {
    let mut n = 1usize;
    loop {
        let candidate = format!("{base} {n}");
        if !name_taken(blocks, &candidate, None) {
            return candidate;
        }
        n += 1;
    }
}

/// Return a deep copy of `block` with fresh ids throughout and unique names.
///
/// The returned pairs map each original id to its replacement so the caller
/// can copy layout records.
#[must_use]
pub fn clone_with_fresh_ids(blocks: &[Block], block: &Block) -> (Block, Vec<(BlockId, BlockId)>) {
    let mut mapping = Vec::new();
    let mut taken: Vec<String> = Vec::new();
    let copy = clone_fresh(blocks, block, &mut mapping, &mut taken);
    (copy, mapping)
}

fn clone_fresh(
    tree: &[Block],
    block: &Block,
    mapping: &mut Vec<(BlockId, BlockId)>,
    taken: &mut Vec<String>,
) -> Block {
    let new_id = Uuid::new_v4();
    mapping.push((block.id, new_id));

    let base = format!("{} copy", block.name);
    let mut name = base.clone();
    let mut n = 2usize;
    while name_taken(tree, &name, None) || taken.contains(&name) {
        name = format!("{base} {n}");
        n += 1;
    }
    taken.push(name.clone());

    let children = block
        .children
        .iter()
        .map(|c| clone_fresh(tree, c, mapping, taken))
        .collect();

    Block { id: new_id, name, children, ..block.clone() }
}
