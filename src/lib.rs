//! ScriptMeta Core - Userscript Header Synthesizer
//!
//! # Ground Rules (Non-Negotiable)
//! 1. Declared Order Is Output Order
//! 2. Three Value Shapes, Checked At Load
//! 3. No Control Character Leaves The Renderer
//! 4. Deterministic Output
//! 5. The Minifier Contract Is Explicit

pub mod digest;
pub mod metadata;
pub mod pipeline;
pub mod preserve;
pub mod render;
pub mod validation;

pub use digest::sha256_hex;
pub use metadata::{DirectiveValue, MetadataConfig, MetadataError, COMPAT_KEY};
pub use pipeline::{Artifact, InjectedArtifact, InjectionPipeline, InjectionReport};
pub use preserve::{is_preserved_comment, MinifyContract};
pub use render::{render, HeaderBlock, BLOCK_CLOSE, BLOCK_OPEN};
pub use validation::{Linter, ValidationResult, ValidationViolation, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
