//! Layout and hierarchy engine for the email block editor canvas.
//!
//! This crate owns everything about where blocks sit on the canvas and how
//! they relate to one another: absolute-position geometry, alignment and
//! distribution of a selection, snap guidance during drags, geometric
//! parent/child inference, and an undo/redo timeline over the whole block
//! tree. The host UI is responsible only for translating pointer input into
//! calls on [`editor::Editor`] and for painting the results.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | The owned editor context exposing every operation |
//! | [`block`] | Block tree types and per-type templates |
//! | [`layout`] | Layout records and the insertion-ordered layout map |
//! | [`geometry`] | Bounding boxes derived from layout records |
//! | [`align`] | Edge/center alignment of a selection |
//! | [`distribute`] | Even spacing of a selection along an axis |
//! | [`snap`] | Grid and object snapping with guide lines |
//! | [`hierarchy`] | Geometric containment tree and conflict detection |
//! | [`history`] | Snapshot timeline for undo/redo/scrubbing |
//! | [`gesture`] | Transient drag/resize state between commit points |
//! | [`state`] | The persisted `{blocks, layout}` document and JSON codec |
//! | [`config`] | Editor settings read from the environment |
//! | [`consts`] | Shared numeric defaults |

pub mod align;
pub mod block;
pub mod config;
pub mod consts;
pub mod distribute;
pub mod editor;
pub mod geometry;
pub mod gesture;
pub mod hierarchy;
pub mod history;
pub mod layout;
pub mod snap;
pub mod state;

pub use block::{Block, BlockId, BlockType};
pub use editor::Editor;
pub use layout::{LayoutMap, LayoutRecord, PartialLayoutRecord};
pub use state::EditorState;
