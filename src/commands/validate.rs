use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dlv_lib::{
    generate_top_issues, ingest_events, parse_records, validate_capture, DlvError, DlvOutput,
    RawRecord, SchemaBuilder, Summary, ValidateOutput, DLV_OUTPUT_VERSION,
};

use crate::cli::OutputFormat;
use crate::formatting::{exit_code_for_report, render_error, write_output};
use crate::settings::{load_config, log_effective_config, resolve_settings};

/// Run the validate command.
#[allow(clippy::too_many_arguments)]
pub fn run_validate(
    config_path: Option<PathBuf>,
    verbose: bool,
    references: PathBuf,
    events: PathBuf,
    threshold: Option<f64>,
    time_threshold_ms: Option<u64>,
    event_marker: Option<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let file_config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    let config = match resolve_settings(threshold, time_threshold_ms, event_marker, &file_config) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    if verbose {
        log_effective_config(config_path.as_deref(), &config);
    }

    let reference_records = match read_records(&references, DlvError::reference) {
        Ok(records) => records,
        Err(err) => return render_error(err, format, output),
    };
    let captured_records = match read_records(&events, DlvError::capture) {
        Ok(records) => records,
        Err(err) => return render_error(err, format, output),
    };

    tracing::info!(
        references = %references.display(),
        events = %events.display(),
        "starting validation run"
    );

    let schema = SchemaBuilder::new(reference_records).build();
    let report = validate_capture(&schema, ingest_events(captured_records), &config);
    let valid = report.valid;

    let body = DlvOutput::Validate(ValidateOutput {
        version: DLV_OUTPUT_VERSION.to_string(),
        references: references.display().to_string(),
        events: events.display().to_string(),
        match_threshold: config.match_threshold,
        summary: Some(Summary {
            top_issues: generate_top_issues(&report),
        }),
        report,
    });

    if let Err(err) = write_output(&body, format, output.as_deref()) {
        return render_error(err, format, output);
    }

    exit_code_for_report(valid)
}

/// Read and parse one input file as an ordered array of records, shaping
/// failures with the caller's error constructor.
pub fn read_records(
    path: &Path,
    input_error: fn(String) -> DlvError,
) -> Result<Vec<RawRecord>, DlvError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| input_error(format!("Failed to read {}: {}", path.display(), e)))?;
    parse_records(&data)
        .map_err(|e| input_error(format!("Failed to parse {}: {}", path.display(), e)))
}
