use std::io::Write;

use crate::map_pipeline::common::error::Result;
use crate::map_pipeline::report::types::ResultTable;

pub trait ReportWriter {
    fn write_report(&self, table: &ResultTable, output: &mut dyn Write) -> Result<()>;

    /// File extension used when deriving an output path.
    fn extension(&self) -> &'static str;
}
