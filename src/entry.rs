//! Per-item naming: identifier, URL and artifact path derivation

use crate::generator::GeneratorConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// URL path prefix of a trivia page
pub const URL_PREFIX: &str = "trivia-";
/// File extension of a trivia page
pub const URL_EXTENSION: &str = ".html";
/// Filename prefix of a generated artifact
pub const ARTIFACT_PREFIX: &str = "qr-trivia-";
/// File extension of a generated artifact
pub const ARTIFACT_EXTENSION: &str = ".png";

/// Render `index` as a zero-padded decimal of at least `width` digits.
pub fn identifier(index: u32, width: usize) -> String {
    format!("{index:0width$}")
}

/// Page URL for an identifier. `base_url` is used verbatim.
pub fn trivia_url(base_url: &str, identifier: &str) -> String {
    format!("{base_url}/{URL_PREFIX}{identifier}{URL_EXTENSION}")
}

/// Artifact path for an identifier inside `output_dir`.
pub fn artifact_path(output_dir: &Path, identifier: &str) -> PathBuf {
    output_dir.join(format!("{ARTIFACT_PREFIX}{identifier}{ARTIFACT_EXTENSION}"))
}

/// One item of a batch, derived once from its index and never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriviaEntry {
    index: u32,
    identifier: String,
    url: String,
    artifact_path: PathBuf,
}

impl TriviaEntry {
    /// Derive the entry for `index` under `config`.
    pub fn derive(index: u32, config: &GeneratorConfig) -> Self {
        let identifier = identifier(index, config.pad_width);
        let url = trivia_url(&config.base_url, &identifier);
        let artifact_path = artifact_path(&config.output_dir, &identifier);
        Self {
            index,
            identifier,
            url,
            artifact_path,
        }
    }

    /// Sequence number
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Zero-padded sequence number
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Encoded payload
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Output PNG location
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }
}
