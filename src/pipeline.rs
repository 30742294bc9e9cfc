//! Injection Pipeline - Single Entry Point
//!
//! The header derives only from configuration, so every artifact in a
//! build unit receives identical text. It is still re-rendered per
//! artifact visit rather than cached across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::digest::sha256_hex;
use crate::metadata::MetadataConfig;
use crate::render::{self, HeaderBlock};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static RENDER_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_render_call_count() -> u32 {
    RENDER_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_render_call_count() {
    RENDER_CALL_COUNT.store(0, Ordering::SeqCst)
}

/// Filename suffix of qualifying build outputs.
pub const ARTIFACT_SUFFIX: &str = ".user.js";

/// One named output file of a build unit. Content is opaque: it is
/// prefixed, never parsed or mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectedArtifact {
    pub name: String,
    pub content: String,
    pub content_hash: String,
    pub header_bytes: usize,
}

/// Audit manifest for one injection pass over a build unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectionReport {
    pub job_id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub header: String,
    pub header_fingerprint: String,
    pub artifacts: Vec<InjectedArtifact>,
}

/// The injection pipeline - renders the header and prepends it to every
/// artifact of a build unit. Holds the configuration as an explicit
/// immutable value; there is no ambient global lookup.
pub struct InjectionPipeline {
    config: MetadataConfig,
}

impl InjectionPipeline {
    pub fn new(config: MetadataConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetadataConfig {
        &self.config
    }

    /// Render the header block for the current configuration.
    pub fn render_header(&self) -> HeaderBlock {
        #[cfg(feature = "test-hooks")]
        RENDER_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        render::render(&self.config)
    }

    /// Prepend the header to every artifact of one build unit.
    ///
    /// Prepending is unconditional: invoking this twice over the same
    /// content duplicates the block. An empty artifact set is a no-op
    /// that still produces a well-formed report.
    pub fn inject_all(&self, artifacts: &[Artifact]) -> InjectionReport {
        let block = self.render_header();
        let header = block.to_text();
        let header_fingerprint = block.fingerprint();

        let mut injected = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let header_text = self.render_header().to_text();
            let mut content = String::with_capacity(header_text.len() + artifact.content.len());
            content.push_str(&header_text);
            content.push_str(&artifact.content);

            injected.push(InjectedArtifact {
                name: artifact.name.clone(),
                content_hash: sha256_hex(content.as_bytes()),
                header_bytes: header_text.len(),
                content,
            });
        }

        debug!(artifacts = injected.len(), "headers injected");

        InjectionReport {
            job_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            header,
            header_fingerprint,
            artifacts: injected,
        }
    }
}
