//! Report module
//!
//! The result table produced by an estimation run, and writers that export it.

mod writer;
mod xlsx_writer;
mod json_writer;
pub mod types;

pub use writer::ReportWriter;
pub use xlsx_writer::XlsxReportWriter;
pub use json_writer::JsonReportWriter;
pub use types::{ColorRecord, ResultTable, RecordOrder, TOTAL_LABEL};
