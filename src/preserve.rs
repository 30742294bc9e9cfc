//! Minifier Preservation Contract
//!
//! The injected block only survives compression if the minifier keeps
//! these comment shapes. This module is the single statement of what must
//! be preserved, so a Terser-style `comments` configuration can be checked
//! against it instead of assumed compatible.

use serde::Serialize;

use crate::render::{BLOCK_CLOSE, BLOCK_OPEN, DIRECTIVE_PREFIX};

/// Markers minifiers already keep by convention.
pub const PRESERVATION_MARKERS: &[&str] = &["@license", "@preserve"];

/// The comment shapes a downstream minifier must be configured to keep.
#[derive(Debug, Clone, Serialize)]
pub struct MinifyContract {
    pub block_open: &'static str,
    pub block_close: &'static str,
    pub directive_prefix: &'static str,
    pub markers: &'static [&'static str],
}

impl MinifyContract {
    pub fn current() -> Self {
        Self {
            block_open: BLOCK_OPEN,
            block_close: BLOCK_CLOSE,
            directive_prefix: DIRECTIVE_PREFIX,
            markers: PRESERVATION_MARKERS,
        }
    }
}

impl Default for MinifyContract {
    fn default() -> Self {
        Self::current()
    }
}

/// Whether a single comment line must survive minification. This is the
/// predicate a minifier's comment filter has to satisfy for the header
/// block to reach the installed script intact.
pub fn is_preserved_comment(line: &str) -> bool {
    let line = line.trim_start();
    line == BLOCK_OPEN
        || line == BLOCK_CLOSE
        || line.starts_with(DIRECTIVE_PREFIX)
        || PRESERVATION_MARKERS.iter().any(|m| line.contains(m))
}
