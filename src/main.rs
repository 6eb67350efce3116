//! triviaqr command-line entrypoint

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use triviaqr::output::{Rendered, render_batch_report, render_verify_report};
use triviaqr::{AppConfig, EcLevel, Generator, QrDecoder, QrEncoder, RgbColor, logging, verify_batch};

#[derive(Parser, Debug)]
#[command(
    name = "triviaqr",
    version,
    about = "Generate QR codes for a numbered series of trivia pages"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to triviaqr.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL of the trivia pages (e.g. https://example.com/trivia)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Directory receiving the PNG files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// First trivia number, inclusive
    #[arg(long, value_name = "N")]
    start: Option<u32>,

    /// Last trivia number, inclusive
    #[arg(long, value_name = "N")]
    end: Option<u32>,

    /// Zero-pad width of trivia numbers
    #[arg(long, value_name = "DIGITS")]
    pad_width: Option<usize>,

    /// Dark module color (name or #RRGGBB)
    #[arg(long, value_name = "COLOR")]
    fill: Option<RgbColor>,

    /// Background color (name or #RRGGBB)
    #[arg(long, value_name = "COLOR")]
    background: Option<RgbColor>,

    /// Pixels per module
    #[arg(long, value_name = "PX")]
    module_size: Option<u32>,

    /// Border width in modules
    #[arg(long, value_name = "MODULES")]
    border: Option<u32>,

    /// Error correction level (low, medium, quartile, high)
    #[arg(long, value_name = "LEVEL")]
    ec_level: Option<EcLevel>,

    /// Number of codes encoded concurrently
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,

    /// Continue past failed items and report them at the end
    #[arg(long)]
    keep_going: bool,

    /// Decode every written file afterwards and compare it with its URL
    #[arg(long)]
    verify: bool,

    /// Only verify existing files, do not generate
    #[arg(long, conflicts_with = "verify")]
    verify_only: bool,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(ref url) = self.base_url {
            config.batch.base_url = Some(url.clone());
        }
        if let Some(ref dir) = self.output_dir {
            config.batch.output_dir = dir.clone();
        }
        if let Some(start) = self.start {
            config.batch.range_start = start;
        }
        if let Some(end) = self.end {
            config.batch.range_end = end;
        }
        if let Some(width) = self.pad_width {
            config.batch.pad_width = width;
        }
        if let Some(jobs) = self.jobs {
            config.batch.jobs = jobs;
        }
        if self.keep_going {
            config.batch.keep_going = true;
        }
        if let Some(fill) = self.fill {
            config.render.fill = fill;
        }
        if let Some(background) = self.background {
            config.render.background = background;
        }
        if let Some(size) = self.module_size {
            config.render.module_size = size;
        }
        if let Some(border) = self.border {
            config.render.border = border;
        }
        if let Some(level) = self.ec_level {
            config.render.ec_level = level;
        }
    }
}

fn emit(rendered: &Rendered, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);

    logging::init(&config.logging)?;

    let generator_config = config.generator_config()?;
    let decoder = QrDecoder::new();

    if cli.verify_only {
        let report = verify_batch(&generator_config, &decoder)?;
        emit(&render_verify_report(&report), cli.json)?;
        return Ok(exit_code(report.is_success()));
    }

    let base_url = generator_config.base_url.clone();
    let generator = Generator::new(generator_config, QrEncoder::new())?;
    let report = generator
        .run_concurrent()
        .await
        .with_context(|| format!("generating into {}", generator.config().output_dir.display()))?;
    emit(&render_batch_report(&report, &base_url), cli.json)?;

    let mut success = report.is_success();
    if cli.verify {
        info!("Verifying generated files");
        let verified = verify_batch(generator.config(), &decoder)?;
        emit(&render_verify_report(&verified), cli.json)?;
        success &= verified.is_success();
    }

    Ok(exit_code(success))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
