//! Read generated artifacts back and check they decode to their URL

use crate::entry::TriviaEntry;
use crate::error::{Error, Result};
use crate::generator::GeneratorConfig;
use crate::qr::QrDecoder;
use serde::Serialize;
use std::path::PathBuf;

/// Result of checking a single artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// Decoded text equals the expected URL
    Ok,
    /// No file at the artifact path
    Missing,
    /// File decoded to something else
    Mismatch {
        /// Text actually found in the symbol
        decoded: String,
    },
    /// File exists but no symbol could be read from it
    Unreadable {
        /// Decoder or image error
        reason: String,
    },
}

/// Verification result for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedItem {
    /// Entry that was checked
    pub entry: TriviaEntry,
    /// What was found
    pub outcome: VerifyOutcome,
}

/// Verification results for a whole batch, in index order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Directory that was checked
    pub output_dir: PathBuf,
    /// One item per index in the range
    pub items: Vec<VerifiedItem>,
}

impl VerifyReport {
    /// Number of artifacts that round-tripped
    pub fn passed(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.outcome == VerifyOutcome::Ok)
            .count()
    }

    /// Items that did not round-trip
    pub fn problems(&self) -> impl Iterator<Item = &VerifiedItem> {
        self.items
            .iter()
            .filter(|item| item.outcome != VerifyOutcome::Ok)
    }

    /// True when every artifact round-tripped
    pub fn is_success(&self) -> bool {
        self.passed() == self.items.len()
    }
}

/// Check one artifact against its entry.
pub fn verify_entry(entry: &TriviaEntry, decoder: &QrDecoder) -> VerifyOutcome {
    let path = entry.artifact_path();
    if !path.is_file() {
        return VerifyOutcome::Missing;
    }

    match decoder.decode_file(path) {
        Ok(decoded) if decoded == entry.url() => VerifyOutcome::Ok,
        Ok(decoded) => VerifyOutcome::Mismatch { decoded },
        Err(err) => VerifyOutcome::Unreadable {
            reason: err.to_string(),
        },
    }
}

/// Check every artifact of the batch described by `config`. Files are only read.
pub fn verify_batch(config: &GeneratorConfig, decoder: &QrDecoder) -> Result<VerifyReport> {
    config.validate()?;
    if !config.output_dir.is_dir() {
        return Err(Error::filesystem(
            &config.output_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "output directory does not exist"),
        ));
    }

    let items = config
        .entries()
        .map(|entry| {
            let outcome = verify_entry(&entry, decoder);
            if outcome != VerifyOutcome::Ok {
                tracing::warn!(path = %entry.artifact_path().display(), ?outcome, "Verification failed");
            }
            VerifiedItem { entry, outcome }
        })
        .collect();

    Ok(VerifyReport {
        output_dir: config.output_dir.clone(),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ensure_output_dir;

    #[test]
    fn test_missing_dir_is_filesystem_error() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            output_dir: tmp.path().join("absent"),
            ..GeneratorConfig::new("https://example.com")
        };
        assert!(matches!(
            verify_batch(&config, &QrDecoder::new()),
            Err(Error::Filesystem { .. })
        ));
    }

    #[test]
    fn test_missing_and_unreadable() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            output_dir: tmp.path().to_path_buf(),
            range_end: 2,
            ..GeneratorConfig::new("https://example.com")
        };
        ensure_output_dir(&config.output_dir).unwrap();
        std::fs::write(tmp.path().join("qr-trivia-001.png"), b"garbage").unwrap();

        let report = verify_batch(&config, &QrDecoder::new()).unwrap();

        assert_eq!(report.items.len(), 2);
        assert!(matches!(
            report.items[0].outcome,
            VerifyOutcome::Unreadable { .. }
        ));
        assert_eq!(report.items[1].outcome, VerifyOutcome::Missing);
        assert_eq!(report.passed(), 0);
        assert!(!report.is_success());
        assert_eq!(report.problems().count(), 2);
    }
}
