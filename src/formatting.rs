use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dlv_lib::{DlvError, DlvOutput, ErrorOutput, DLV_OUTPUT_VERSION};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &DlvOutput,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), DlvError> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string(body)?,
        OutputFormat::Pretty => format_pretty(body),
    };
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Render an error and return the fatal exit code.
pub fn render_error(err: DlvError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let payload = err.to_payload();
    let body = DlvOutput::Error(ErrorOutput {
        version: DLV_OUTPUT_VERSION.to_string(),
        message: Some(payload.message.clone()),
        error: payload,
    });

    let content = match format {
        OutputFormat::Json => {
            serde_json::to_string(&body).unwrap_or_else(|_| "{\"mode\":\"error\"}".into())
        }
        OutputFormat::Pretty => format_pretty(&body),
    };
    if let Some(path) = output {
        if let Err(write_err) = std::fs::write(&path, &content) {
            eprintln!("Failed to write error output: {}", write_err);
            println!("{content}");
        }
    } else {
        println!("{content}");
    }

    // Reserve exit code 2 for fatal errors; invalid runs use 1.
    ExitCode::from(2)
}

/// Exit code for a completed validation run.
pub fn exit_code_for_report(valid: bool) -> ExitCode {
    if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn format_pretty(body: &DlvOutput) -> String {
    match body {
        DlvOutput::Validate(out) => {
            let mut lines = Vec::new();
            lines.push("=== Validation Summary ===".to_string());
            lines.push(format!(
                "Result: {}",
                if out.report.valid { "VALID" } else { "INVALID" }
            ));
            lines.push(format!(
                "Captured: {} raw / {} unique / {} relevant",
                out.report.counts.raw, out.report.counts.unique, out.report.counts.relevant
            ));
            if let Some(summary) = &out.report.summary {
                lines.push(format!(
                    "Unique events: {} total ({} valid, {} invalid, {} unmatched, {} with warnings)",
                    summary.total_unique,
                    summary.unique_valid,
                    summary.unique_invalid,
                    summary.unique_unmatched,
                    summary.unique_with_warnings
                ));
            }
            if let Some(comparison) = &out.report.comparison {
                lines.push(format!(
                    "References: {} total, {} matched, {} missing ({:.1}% coverage)",
                    comparison.reference_count,
                    comparison.matched_count,
                    comparison.missing_count,
                    comparison.coverage_percent
                ));
            }
            if let Some(summary) = &out.summary {
                if !summary.top_issues.is_empty() {
                    lines.push(String::new());
                    lines.push("Top issues:".to_string());
                    for issue in &summary.top_issues {
                        lines.push(format!("- {issue}"));
                    }
                }
            }
            lines.join("\n")
        }
        DlvOutput::Schema(out) => {
            let mut lines = Vec::new();
            lines.push("=== Validation Schema ===".to_string());
            lines.push(format!("Sections: {}", out.schema.sections.len()));
            if let Some(gtm_id) = &out.schema.expected_gtm_id {
                lines.push(format!("Expected GTM id: {gtm_id}"));
            }
            for section in &out.schema.sections {
                lines.push(format!(
                    "- {} [{}] ({} fields, activation: {})",
                    section.title,
                    section.id,
                    section.expected_properties.len(),
                    section.activation.kind
                ));
            }
            lines.join("\n")
        }
        DlvOutput::Error(out) => {
            let mut lines = vec![format!("Error: {}", out.error.message)];
            if let Some(remediation) = &out.error.remediation {
                lines.push(format!("Hint: {remediation}"));
            }
            lines.join("\n")
        }
    }
}
