//! Helpers for rendering batch and verification results

use crate::generator::BatchReport;
use crate::verify::{VerifyOutcome, VerifyReport};
use serde_json::{Value, json};

/// Combined structured and human-readable representation of a report
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render a batch report into both JSON and human-readable forms.
pub fn render_batch_report(report: &BatchReport, base_url: &str) -> Rendered {
    let json = json!({
        "output_dir": report.output_dir.display().to_string(),
        "base_url": base_url,
        "generated": report.generated.iter().map(|entry| json!({
            "index": entry.index(),
            "identifier": entry.identifier(),
            "url": entry.url(),
            "path": entry.artifact_path().display().to_string(),
        })).collect::<Vec<_>>(),
        "failures": report.failures,
        "success": report.is_success(),
    });

    let mut human = Vec::new();
    for entry in &report.generated {
        human.push(format!("Generated: {}", entry.artifact_path().display()));
    }
    for failure in &report.failures {
        human.push(format!("Failed: #{} ({})", failure.identifier, failure.error));
    }

    human.push(String::new());
    human.push(format!(
        "{} QR codes saved to '{}'",
        report.generated.len(),
        report.output_dir.display()
    ));
    if !report.failures.is_empty() {
        human.push(format!("{} items failed", report.failures.len()));
    }
    human.push(format!(
        "Codes point at {base_url}; regenerate them if the pages move"
    ));

    Rendered { json, human }
}

/// Render a verification report into both JSON and human-readable forms.
pub fn render_verify_report(report: &VerifyReport) -> Rendered {
    let json = json!({
        "output_dir": report.output_dir.display().to_string(),
        "checked": report.items.len(),
        "passed": report.passed(),
        "problems": report.problems().map(|item| json!({
            "index": item.entry.index(),
            "path": item.entry.artifact_path().display().to_string(),
            "expected": item.entry.url(),
            "outcome": item.outcome,
        })).collect::<Vec<_>>(),
        "success": report.is_success(),
    });

    let mut human = Vec::new();
    for item in report.problems() {
        let path = item.entry.artifact_path().display();
        let line = match &item.outcome {
            VerifyOutcome::Ok => continue,
            VerifyOutcome::Missing => format!("Missing: {path}"),
            VerifyOutcome::Mismatch { decoded } => {
                format!("Mismatch: {path} decodes to {decoded}")
            }
            VerifyOutcome::Unreadable { reason } => format!("Unreadable: {path} ({reason})"),
        };
        human.push(line);
    }
    human.push(format!(
        "Verified {}/{} QR codes in '{}'",
        report.passed(),
        report.items.len(),
        report.output_dir.display()
    ));

    Rendered { json, human }
}
