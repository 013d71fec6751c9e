//! Shared numeric constants for the layout engine.

// ── Layout defaults ─────────────────────────────────────────────

/// Position assigned to a block the first time it is laid out.
pub const DEFAULT_POSITION: f64 = 10.0;

/// Side length used by the geometry model when a block has no layout record.
pub const FALLBACK_SIZE: f64 = 100.0;

/// Minimum width/height a resize gesture may produce.
pub const MIN_BLOCK_SIZE: f64 = 1.0;

/// Offset applied to both axes when a block is duplicated.
pub const DUPLICATE_OFFSET: f64 = 20.0;

// ── Snapping ────────────────────────────────────────────────────

/// Distance in layout units within which an edge snaps to another block.
pub const SNAP_THRESHOLD: f64 = 5.0;

/// Default grid cell size.
pub const GRID_SIZE: f64 = 10.0;

// ── History ─────────────────────────────────────────────────────

/// Default cap on retained history entries.
pub const HISTORY_LIMIT: usize = 100;
