use std::io::Write;

use tracing::debug;

use crate::map_pipeline::common::error::{EstimationError, Result};
use crate::map_pipeline::report::types::ResultTable;
use crate::map_pipeline::report::writer::ReportWriter;

/// Writes the table as pretty-printed JSON.
pub struct JsonReportWriter;

impl ReportWriter for JsonReportWriter {
    fn write_report(&self, table: &ResultTable, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding JSON report with {} color rows", table.records.len());

        serde_json::to_writer_pretty(&mut *output, table)
            .map_err(|e| EstimationError::EncodeError(e.to_string()))?;
        output.write_all(b"\n")?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
