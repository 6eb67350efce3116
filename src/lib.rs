//! triviaqr - batch QR code generator for numbered trivia pages
//!
//! Every index in a configured range becomes one PNG symbol encoding the URL of
//! its page: index `7` under `https://example.com/trivia` is written to
//! `qrcodes/qr-trivia-007.png` and encodes
//! `https://example.com/trivia/trivia-007.html`.
//!
//! # Example
//!
//! ```no_run
//! use triviaqr::{Generator, GeneratorConfig, QrEncoder};
//!
//! fn main() -> triviaqr::Result<()> {
//!     let config = GeneratorConfig::new("https://example.com/trivia");
//!     let report = Generator::new(config, QrEncoder::new())?.run()?;
//!
//!     println!("{} codes written", report.generated.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod config;
pub mod entry;
pub mod error;
pub mod generator;
pub mod logging;
pub mod output;
pub mod qr;
pub mod verify;

// Re-exports for convenience
pub use error::{Error, Result};

pub use config::{AppConfig, BatchOptions, LogRotation, LoggingOptions, RenderOptions};
pub use entry::TriviaEntry;
pub use generator::{BatchReport, Generator, GeneratorConfig, ItemFailure};
pub use qr::{EcLevel, EncodeOptions, QrDecoder, QrEncoder, RgbColor, SymbolEncoder};
pub use verify::{VerifyOutcome, VerifyReport, verify_batch};
