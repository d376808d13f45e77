use std::path::PathBuf;
use std::process::ExitCode;

use dlv_lib::{DlvError, DlvOutput, SchemaBuilder, SchemaOutput, DLV_OUTPUT_VERSION};

use crate::cli::OutputFormat;
use crate::formatting::{render_error, write_output};
use crate::settings::load_config;

use super::validate::read_records;

/// Run the schema command: build the validation schema and emit it.
pub fn run_schema(
    config_path: Option<PathBuf>,
    references: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    // Schema generation takes nothing from the config, but a broken config
    // file should still fail fast rather than surface later in validate.
    if let Err(err) = load_config(config_path.as_deref()) {
        return render_error(err, format, output);
    }

    let records = match read_records(&references, DlvError::reference) {
        Ok(records) => records,
        Err(err) => return render_error(err, format, output),
    };

    let schema = SchemaBuilder::new(records).build();
    tracing::info!(sections = schema.sections.len(), "schema command complete");

    let body = DlvOutput::Schema(SchemaOutput {
        version: DLV_OUTPUT_VERSION.to_string(),
        references: references.display().to_string(),
        schema,
    });

    if let Err(err) = write_output(&body, format, output.as_deref()) {
        return render_error(err, format, output);
    }

    ExitCode::SUCCESS
}
