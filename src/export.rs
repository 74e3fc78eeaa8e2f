use crate::batch::FundRecord;
use crate::error::{ExportError, Result};
use crate::log_info;
use crate::utils;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

pub const COLUMNS: [&str; 5] = ["fund_name", "FUNDID", "raw_yield", "yield_%", "error"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Json,
}

impl OutputFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Writes every record to `path` in one go, replacing any existing file.
pub fn write_records(path: impl AsRef<Path>, records: &[FundRecord]) -> Result<()> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)
        .ok_or_else(|| ExportError::UnsupportedFormat(path.display().to_string()))?;

    match format {
        OutputFormat::Xlsx => utils::replace_file(path, &workbook_bytes(records)?)?,
        OutputFormat::Json => utils::save_json(&records, path)?,
    }

    log_info!("[export] Saved {} records to {}", records.len(), path.display());
    Ok(())
}

fn workbook_bytes(records: &[FundRecord]) -> std::result::Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, title) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, &record.fund_name)?;
        sheet.write_string(row, 1, &record.fund_id)?;
        if let Some(raw) = &record.raw_yield {
            sheet.write_string(row, 2, raw)?;
        }
        // Excel has no NaN or infinity; those stay blank like missing values
        if let Some(value) = record.yield_percent.filter(|v| v.is_finite()) {
            sheet.write_number(row, 3, value)?;
        }
        if !record.error.is_empty() {
            sheet.write_string(row, 4, &record.error)?;
        }
    }

    sheet.set_column_width(0, 40)?;
    sheet.set_column_width(1, 12)?;
    sheet.set_column_width(4, 28)?;

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn records() -> Vec<FundRecord> {
        vec![
            FundRecord {
                fund_name: "ABC Growth Fund".to_string(),
                fund_id: "41388".to_string(),
                raw_yield: Some("3.10%".to_string()),
                yield_percent: Some(3.10),
                error: String::new(),
            },
            FundRecord {
                fund_name: "99999".to_string(),
                fund_id: "99999".to_string(),
                raw_yield: None,
                yield_percent: None,
                error: "Timeout loading page".to_string(),
            },
            FundRecord {
                fund_name: "Odd Fund".to_string(),
                fund_id: "ADV0094AU".to_string(),
                raw_yield: Some("nan".to_string()),
                yield_percent: Some(f64::NAN),
                error: String::new(),
            },
        ]
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(OutputFormat::from_path("a/b.xlsx"), Some(OutputFormat::Xlsx));
        assert_eq!(OutputFormat::from_path("B.XLSX"), Some(OutputFormat::Xlsx));
        assert_eq!(OutputFormat::from_path("out.json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_path("out.csv"), None);
        assert_eq!(OutputFormat::from_path("out"), None);
    }

    #[test]
    fn workbook_cells_follow_record_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/dividend_yields.xlsx");

        write_records(&path, &records()).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let sheet = workbook.worksheet_range("Sheet1").unwrap();
        let rows: Vec<&[Data]> = sheet.rows().collect();

        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0],
            COLUMNS.map(|c| Data::String(c.to_string())).as_slice()
        );
        assert_eq!(
            rows[1],
            [
                Data::String("ABC Growth Fund".to_string()),
                Data::String("41388".to_string()),
                Data::String("3.10%".to_string()),
                Data::Float(3.1),
                Data::Empty,
            ]
            .as_slice()
        );
        // Missing values are blank cells, not empty strings
        assert_eq!(rows[2][2], Data::Empty);
        assert_eq!(rows[2][3], Data::Empty);
        assert_eq!(rows[2][4], Data::String("Timeout loading page".to_string()));
        assert_eq!(rows[3][2], Data::String("nan".to_string()));
        assert_eq!(rows[3][3], Data::Empty);
    }

    #[test]
    fn overwrites_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dividend_yields.json");
        std::fs::write(&path, "stale").unwrap();

        write_records(&path, &records()[..1]).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            serde_json::json!([{
                "fund_name": "ABC Growth Fund",
                "FUNDID": "41388",
                "raw_yield": "3.10%",
                "yield_%": 3.1,
                "error": "",
            }])
        );
    }

    #[test]
    fn json_keeps_missing_values_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_records(&path, &records()).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let rows = written.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["raw_yield"], serde_json::Value::Null);
        assert_eq!(rows[1]["yield_%"], serde_json::Value::Null);
        assert_eq!(rows[1]["error"], "Timeout loading page");
        // serde_json writes non-finite floats as null
        assert_eq!(rows[2]["yield_%"], serde_json::Value::Null);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_records(dir.path().join("out.csv"), &records()).unwrap_err();
        assert!(err.to_string().contains("Unsupported output format"));
    }
}
