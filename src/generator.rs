//! Batch artifact generation
//!
//! A batch walks the configured index range, derives a [`TriviaEntry`] per index,
//! encodes its URL and writes the PNG. Items share nothing except the output
//! directory, whose creation is the only mutation against it.

use crate::entry::TriviaEntry;
use crate::error::{Error, Result};
use crate::qr::{EncodeOptions, MAX_IMAGE_PIXELS, SymbolEncoder, rendered_side};
use image::ImageFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Modules per side of a version 1 symbol, the smallest an encoder can emit
const MIN_SYMBOL_WIDTH: u32 = 21;

/// Fully resolved batch configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// URL prefix every page URL is built on
    pub base_url: String,
    /// Directory receiving the PNG artifacts
    pub output_dir: PathBuf,
    /// First index, inclusive
    pub range_start: u32,
    /// Last index, inclusive
    pub range_end: u32,
    /// Zero-pad width of identifiers
    pub pad_width: usize,
    /// Record per-item failures and continue instead of aborting
    pub keep_going: bool,
    /// Maximum items encoded at once by [`Generator::run_concurrent`]
    pub jobs: usize,
    /// Symbol and rendering parameters
    pub encode: EncodeOptions,
}

impl GeneratorConfig {
    /// Reference configuration for `base_url`: items 1..=50 into `qrcodes/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            output_dir: PathBuf::from("qrcodes"),
            range_start: 1,
            range_end: 50,
            pad_width: 3,
            keep_going: false,
            jobs: 1,
            encode: EncodeOptions::default(),
        }
    }

    /// Check the configuration before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must be set".to_string()));
        }
        if self.range_start > self.range_end {
            return Err(Error::Config(format!(
                "range_start ({}) is greater than range_end ({})",
                self.range_start, self.range_end
            )));
        }
        let digits = self.range_end.to_string().len();
        if digits > self.pad_width {
            return Err(Error::Config(format!(
                "range_end {} needs {digits} digits but pad_width is {}",
                self.range_end, self.pad_width
            )));
        }
        if self.encode.module_size == 0 {
            return Err(Error::Config("module_size must be at least 1".to_string()));
        }
        if rendered_side(MIN_SYMBOL_WIDTH, self.encode.border, self.encode.module_size).is_none() {
            return Err(Error::Config(format!(
                "border {} at module size {} renders images over {MAX_IMAGE_PIXELS} pixels",
                self.encode.border, self.encode.module_size
            )));
        }
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Number of items in the range
    pub fn len(&self) -> usize {
        if self.range_start > self.range_end {
            0
        } else {
            (self.range_end - self.range_start) as usize + 1
        }
    }

    /// True when the range is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries of the batch, in index order
    pub fn entries(&self) -> impl Iterator<Item = TriviaEntry> + '_ {
        (self.range_start..=self.range_end).map(move |index| TriviaEntry::derive(index, self))
    }
}

/// An item that could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Sequence number
    pub index: u32,
    /// Zero-padded sequence number
    pub identifier: String,
    /// Rendered error
    pub error: String,
}

/// Outcome of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Directory the batch wrote into
    pub output_dir: PathBuf,
    /// Entries whose artifact was written, in index order
    pub generated: Vec<TriviaEntry>,
    /// Items that failed (only populated with `keep_going`)
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            generated: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// True when every item was written
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Create `path` and any missing parents; a no-op when it already exists.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::filesystem(path, e))
}

/// Encode one entry and write its artifact, replacing any previous file.
pub fn produce<E: SymbolEncoder + ?Sized>(
    encoder: &E,
    entry: &TriviaEntry,
    options: &EncodeOptions,
) -> Result<()> {
    let image = encoder.encode(entry.url(), options)?;
    image
        .save_with_format(entry.artifact_path(), ImageFormat::Png)
        .map_err(|e| Error::from_image_write(entry.artifact_path(), e))
}

/// Batch generator over an encoding capability
pub struct Generator<E> {
    config: Arc<GeneratorConfig>,
    encoder: Arc<E>,
}

impl<E: SymbolEncoder + 'static> Generator<E> {
    /// Validate `config` and build a generator around `encoder`.
    pub fn new(config: GeneratorConfig, encoder: E) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            encoder: Arc::new(encoder),
        })
    }

    /// Configuration this generator runs with
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate every item sequentially, in index order.
    pub fn run(&self) -> Result<BatchReport> {
        let config = &self.config;
        self.begin()?;

        let mut report = BatchReport::new(&config.output_dir);
        for entry in config.entries() {
            match produce(self.encoder.as_ref(), &entry, &config.encode) {
                Ok(()) => {
                    info!(path = %entry.artifact_path().display(), "Generated");
                    report.generated.push(entry);
                }
                Err(err) => self.on_failure(&mut report, &entry, err)?,
            }
        }

        self.finish(&report);
        Ok(report)
    }

    /// Generate items on blocking workers, at most `jobs` at a time.
    ///
    /// The returned report lists entries in index order, as [`Generator::run`] does.
    pub async fn run_concurrent(&self) -> Result<BatchReport> {
        let config = Arc::clone(&self.config);
        if config.jobs <= 1 {
            let generator = Self {
                config: Arc::clone(&self.config),
                encoder: Arc::clone(&self.encoder),
            };
            return tokio::task::spawn_blocking(move || generator.run())
                .await
                .map_err(|e| Error::Other(format!("Generator task failed: {e}")))?;
        }

        self.begin()?;

        let mut report = BatchReport::new(&config.output_dir);
        let mut tasks: JoinSet<(TriviaEntry, Result<()>)> = JoinSet::new();
        let mut entries = config.entries();

        loop {
            while tasks.len() < config.jobs {
                let Some(entry) = entries.next() else { break };
                let encoder = Arc::clone(&self.encoder);
                let options = config.encode;
                tasks.spawn_blocking(move || {
                    let result = produce(encoder.as_ref(), &entry, &options);
                    (entry, result)
                });
            }

            let Some(joined) = tasks.join_next().await else { break };
            let (entry, result) =
                joined.map_err(|e| Error::Other(format!("Generator task failed: {e}")))?;
            match result {
                Ok(()) => {
                    info!(path = %entry.artifact_path().display(), "Generated");
                    report.generated.push(entry);
                }
                Err(err) => {
                    if let Err(err) = self.on_failure(&mut report, &entry, err) {
                        tasks.abort_all();
                        return Err(err);
                    }
                }
            }
        }

        report.generated.sort_by_key(TriviaEntry::index);
        report.failures.sort_by_key(|failure| failure.index);
        self.finish(&report);
        Ok(report)
    }

    fn begin(&self) -> Result<()> {
        let config = &self.config;
        ensure_output_dir(&config.output_dir)?;
        info!(
            output_dir = %config.output_dir.display(),
            start = config.range_start,
            end = config.range_end,
            jobs = config.jobs,
            "Generating {} QR codes",
            config.len()
        );
        Ok(())
    }

    fn on_failure(&self, report: &mut BatchReport, entry: &TriviaEntry, err: Error) -> Result<()> {
        if !self.config.keep_going {
            return Err(err);
        }
        warn!(index = entry.index(), error = %err, "Skipping item");
        report.failures.push(ItemFailure {
            index: entry.index(),
            identifier: entry.identifier().to_string(),
            error: err.to_string(),
        });
        Ok(())
    }

    fn finish(&self, report: &BatchReport) {
        info!(
            generated = report.generated.len(),
            failed = report.failures.len(),
            output_dir = %report.output_dir.display(),
            "Batch finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::RgbColor;
    use image::RgbImage;
    use std::sync::Mutex;

    /// Records every payload and renders a fixed 2x2 image.
    #[derive(Default)]
    struct RecordingEncoder {
        seen: Mutex<Vec<String>>,
        reject: Option<String>,
    }

    impl SymbolEncoder for RecordingEncoder {
        fn encode(&self, text: &str, options: &EncodeOptions) -> Result<RgbImage> {
            self.seen.lock().unwrap().push(text.to_string());
            if self.reject.as_deref().is_some_and(|r| text.contains(r)) {
                return Err(Error::Encoding("rejected".to_string()));
            }
            Ok(RgbImage::from_pixel(2, 2, options.fill.to_pixel()))
        }
    }

    fn config_in(dir: &Path) -> GeneratorConfig {
        GeneratorConfig {
            output_dir: dir.join("qrcodes"),
            range_end: 5,
            ..GeneratorConfig::new("https://example.com/trivia")
        }
    }

    #[test]
    fn test_validate() {
        let ok = GeneratorConfig::new("https://example.com");
        assert!(ok.validate().is_ok());

        let empty = GeneratorConfig::new("  ");
        assert!(matches!(empty.validate(), Err(Error::Config(_))));

        let reversed = GeneratorConfig {
            range_start: 9,
            range_end: 3,
            ..ok.clone()
        };
        assert!(matches!(reversed.validate(), Err(Error::Config(_))));

        let too_wide = GeneratorConfig {
            range_end: 1000,
            ..ok.clone()
        };
        assert!(matches!(too_wide.validate(), Err(Error::Config(_))));

        let no_jobs = GeneratorConfig { jobs: 0, ..ok };
        assert!(matches!(no_jobs.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_oversized_render() {
        let mut huge_border = GeneratorConfig::new("https://example.com");
        huge_border.encode.border = u32::MAX / 2 + 1;
        assert!(matches!(huge_border.validate(), Err(Error::Config(_))));

        let mut huge_modules = GeneratorConfig::new("https://example.com");
        huge_modules.encode.module_size = 200_000;
        assert!(matches!(huge_modules.validate(), Err(Error::Config(_))));

        let mut large_but_fine = GeneratorConfig::new("https://example.com");
        large_but_fine.encode.module_size = 40;
        assert!(large_but_fine.validate().is_ok());
    }

    #[test]
    fn test_len() {
        let config = GeneratorConfig::new("https://example.com");
        assert_eq!(config.len(), 50);
        assert_eq!(config.entries().count(), 50);
        let single = GeneratorConfig {
            range_start: 7,
            range_end: 7,
            ..config
        };
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_run_encodes_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = Generator::new(config_in(tmp.path()), RecordingEncoder::default()).unwrap();

        let report = generator.run().unwrap();

        assert!(report.is_success());
        assert_eq!(report.generated.len(), 5);
        let seen = generator.encoder.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            (1..=5)
                .map(|i| format!("https://example.com/trivia/trivia-{i:03}.html"))
                .collect::<Vec<_>>()
        );
        for i in 1..=5 {
            assert!(tmp.path().join(format!("qrcodes/qr-trivia-{i:03}.png")).is_file());
        }
    }

    #[test]
    fn test_run_aborts_on_first_error() {
        let tmp = tempfile::tempdir().unwrap();
        let encoder = RecordingEncoder {
            reject: Some("trivia-003".to_string()),
            ..Default::default()
        };
        let generator = Generator::new(config_in(tmp.path()), encoder).unwrap();

        let err = generator.run().unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));

        let out = tmp.path().join("qrcodes");
        assert!(out.join("qr-trivia-001.png").is_file());
        assert!(out.join("qr-trivia-002.png").is_file());
        assert!(!out.join("qr-trivia-003.png").exists());
        assert!(!out.join("qr-trivia-004.png").exists());
    }

    #[test]
    fn test_keep_going_collects_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let encoder = RecordingEncoder {
            reject: Some("trivia-002".to_string()),
            ..Default::default()
        };
        let config = GeneratorConfig {
            keep_going: true,
            ..config_in(tmp.path())
        };
        let generator = Generator::new(config, encoder).unwrap();

        let report = generator.run().unwrap();

        assert!(!report.is_success());
        assert_eq!(report.generated.len(), 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert_eq!(report.failures[0].identifier, "002");
    }

    #[test]
    fn test_output_dir_blocked_by_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("qrcodes");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let generator = Generator::new(config_in(tmp.path()), RecordingEncoder::default()).unwrap();
        match generator.run() {
            Err(Error::Filesystem { path, .. }) => assert_eq!(path, blocker),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_ensure_output_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b/c");
        ensure_output_dir(&dir).unwrap();
        std::fs::write(dir.join("keep.txt"), b"x").unwrap();
        ensure_output_dir(&dir).unwrap();
        assert!(dir.join("keep.txt").is_file());
    }

    #[test]
    fn test_colors_reach_encoder() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = config_in(tmp.path());
        config.range_end = 1;
        config.encode.fill = RgbColor([1, 2, 3]);
        let generator = Generator::new(config, RecordingEncoder::default()).unwrap();
        generator.run().unwrap();

        let img = image::open(tmp.path().join("qrcodes/qr-trivia-001.png"))
            .unwrap()
            .to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_concurrent_matches_sequential() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            jobs: 3,
            range_end: 12,
            ..config_in(tmp.path())
        };
        let generator = Generator::new(config.clone(), RecordingEncoder::default()).unwrap();

        let report = generator.run_concurrent().await.unwrap();

        let expected: Vec<TriviaEntry> = config.entries().collect();
        assert_eq!(report.generated, expected);
        assert_eq!(generator.encoder.seen.lock().unwrap().len(), 12);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_concurrent_keep_going() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            jobs: 4,
            range_end: 10,
            keep_going: true,
            ..config_in(tmp.path())
        };
        let encoder = RecordingEncoder {
            reject: Some("trivia-00".to_string()),
            ..Default::default()
        };
        let generator = Generator::new(config, encoder).unwrap();

        let report = generator.run_concurrent().await.unwrap();

        assert_eq!(report.generated.len(), 1);
        assert_eq!(report.generated[0].index(), 10);
        let failed: Vec<u32> = report.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed, (1..=9).collect::<Vec<_>>());
    }
}
