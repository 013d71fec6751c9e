//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env::VarError;

use crate::consts::{GRID_SIZE, HISTORY_LIMIT, SNAP_THRESHOLD};
use crate::hierarchy::NestingPolicy;
use crate::snap::SnapSettings;

pub const ENV_GRID_SIZE: &str = "BLOCKCANVAS_GRID_SIZE";
pub const ENV_SNAP_THRESHOLD: &str = "BLOCKCANVAS_SNAP_THRESHOLD";
pub const ENV_SNAP_GRID: &str = "BLOCKCANVAS_SNAP_GRID";
pub const ENV_SNAP_OBJECTS: &str = "BLOCKCANVAS_SNAP_OBJECTS";
pub const ENV_HISTORY_LIMIT: &str = "BLOCKCANVAS_HISTORY_LIMIT";
pub const ENV_NESTING_POLICY: &str = "BLOCKCANVAS_NESTING_POLICY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: `{value}` ({reason})")]
    Invalid { var: &'static str, value: String, reason: &'static str },
    #[error("{0} is not valid unicode")]
    NotUnicode(&'static str),
}

/// Tunables for one editor session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    pub snap: SnapSettings,
    pub history_limit: usize,
    pub nesting_policy: NestingPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { snap: SnapSettings::default(), history_limit: HISTORY_LIMIT, nesting_policy: NestingPolicy::default() }
    }
}

impl EditorConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `BLOCKCANVAS_GRID_SIZE`: positive number, default 10
    /// - `BLOCKCANVAS_SNAP_THRESHOLD`: non-negative number, default 5
    /// - `BLOCKCANVAS_SNAP_GRID` / `BLOCKCANVAS_SNAP_OBJECTS`: `true`/`false`, default true
    /// - `BLOCKCANVAS_HISTORY_LIMIT`: positive integer, default 100
    /// - `BLOCKCANVAS_NESTING_POLICY`: `reparent` (default) or `discard`
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for any value that fails to parse or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(v) => Ok(Some(v)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(key),
        })
    }

    /// Build config from an arbitrary key lookup. `Err(key)` marks a value
    /// that exists but is not valid unicode.
    ///
    /// # Errors
    ///
    /// See [`EditorConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<Option<String>, &'static str>,
    {
        let get = |key: &'static str| lookup(key).map_err(ConfigError::NotUnicode);

        let grid_size = match get(ENV_GRID_SIZE)? {
            Some(raw) => parse_f64(ENV_GRID_SIZE, &raw, |v| v > 0.0, "must be positive")?,
            None => GRID_SIZE,
        };
        let threshold = match get(ENV_SNAP_THRESHOLD)? {
            Some(raw) => parse_f64(ENV_SNAP_THRESHOLD, &raw, |v| v >= 0.0, "must not be negative")?,
            None => SNAP_THRESHOLD,
        };
        let grid_enabled = match get(ENV_SNAP_GRID)? {
            Some(raw) => parse_bool(ENV_SNAP_GRID, &raw)?,
            None => true,
        };
        let objects_enabled = match get(ENV_SNAP_OBJECTS)? {
            Some(raw) => parse_bool(ENV_SNAP_OBJECTS, &raw)?,
            None => true,
        };
        let history_limit = match get(ENV_HISTORY_LIMIT)? {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(v) if v > 0 => v,
                _ => return Err(invalid(ENV_HISTORY_LIMIT, &raw, "must be a positive integer")),
            },
            None => HISTORY_LIMIT,
        };
        let nesting_policy = match get(ENV_NESTING_POLICY)? {
            Some(raw) => raw
                .trim()
                .parse::<NestingPolicy>()
                .map_err(|_| invalid(ENV_NESTING_POLICY, &raw, "expected reparent or discard"))?,
            None => NestingPolicy::default(),
        };

        Ok(Self {
            snap: SnapSettings { grid_size, grid_enabled, objects_enabled, threshold },
            history_limit,
            nesting_policy,
        })
    }
}

fn invalid(var: &'static str, raw: &str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { var, value: raw.to_string(), reason }
}

fn parse_f64(var: &'static str, raw: &str, valid: impl Fn(f64) -> bool, reason: &'static str) -> Result<f64, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && valid(v) => Ok(v),
        Ok(_) => Err(invalid(var, raw, reason)),
        Err(_) => Err(invalid(var, raw, "not a number")),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, raw, "expected true or false")),
    }
}
