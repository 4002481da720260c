use std::io::Write;

use rust_xlsxwriter::{ColNum, RowNum, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::map_pipeline::common::error::{EstimationError, Result};
use crate::map_pipeline::report::types::{ColorRecord, ResultTable};
use crate::map_pipeline::report::writer::ReportWriter;

const SHEET_NAME: &str = "Map Sizes";

const COLUMNS: [&str; 4] = ["Hex Color", "Pixel Count", "Area (km²)", "Population"];

/// Writes the table as a single-sheet Excel workbook.
pub struct XlsxReportWriter;

fn encode_err(e: XlsxError) -> EstimationError {
    EstimationError::EncodeError(e.to_string())
}

fn write_record(sheet: &mut Worksheet, row: RowNum, record: &ColorRecord) -> Result<()> {
    sheet.write_string(row, 0, record.hex_color.as_str()).map_err(encode_err)?;
    sheet.write_number(row, 1, record.pixel_count as f64).map_err(encode_err)?;
    sheet.write_number(row, 2, record.area_km2).map_err(encode_err)?;
    if let Some(population) = record.population {
        sheet.write_number(row, 3, population as f64).map_err(encode_err)?;
    }
    Ok(())
}

impl ReportWriter for XlsxReportWriter {
    fn write_report(&self, table: &ResultTable, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding workbook with {} color rows", table.records.len());

        let column_count = if table.has_population() { 4 } else { 3 };

        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(SHEET_NAME).map_err(encode_err)?;

            for (col, header) in COLUMNS.iter().take(column_count).enumerate() {
                sheet.write_string(0, col as ColNum, *header).map_err(encode_err)?;
            }

            for (index, record) in table.rows().enumerate() {
                let row = RowNum::try_from(index + 1).map_err(|_| {
                    EstimationError::EncodeError(format!("too many rows for a worksheet: {}", index + 1))
                })?;
                write_record(sheet, row, record)?;
            }
        }

        let buffer = workbook.save_to_buffer().map_err(encode_err)?;
        output.write_all(&buffer)?;

        debug!("Workbook encoding complete, {} bytes", buffer.len());
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }
}
