//! Spreadsheet output

use std::path::Path;

use log::info;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, XlsxError};

use crate::error::{LineageError, Result};
use crate::report::Sheet;

/// Write `sheets` to an .xlsx file, header row first, one worksheet per sheet
pub fn write_workbook(path: &Path, sheets: &[Sheet]) -> Result<()> {
    let mut workbook = build_workbook(sheets).map_err(|source| LineageError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    workbook.save(path).map_err(|source| LineageError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} sheet(s) to {}", sheets.len(), path.display());
    Ok(())
}

fn build_workbook(sheets: &[Sheet]) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    // fixed creation time so the same tables always give the same file
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
    let bold = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            if !header.is_empty() {
                worksheet.write_string_with_format(0, col as u16, header, &bold)?;
            }
        }

        for (row, cells) in sheet.rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                // empty cells stay blank
                if !cell.is_empty() {
                    worksheet.write_string(row as u32 + 1, col as u16, cell)?;
                }
            }
        }

        worksheet.autofit();
    }

    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Reader, Xlsx, open_workbook};
    use tempfile::TempDir;

    fn sample() -> Vec<Sheet> {
        let mut lineage = Sheet::new("Data Lineage", &["Source Name", "Target Name"]);
        lineage.push_row(["S", "T"]);
        lineage.push_row(["", "T2"]);
        let mut session = Sheet::new("Session Info", &["Status"]);
        session.push_row(["Succeeded"]);
        vec![lineage, session]
    }

    #[test]
    fn test_write_and_read_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.xlsx");
        write_workbook(&path, &sample()).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Data Lineage", "Session Info"]);

        let range = workbook.worksheet_range("Data Lineage").unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["Source Name", "Target Name"],
                vec!["S", "T"],
                vec!["", "T2"],
            ]
        );
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.xlsx");
        let second = temp.path().join("second.xlsx");
        write_workbook(&first, &sample()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        write_workbook(&second, &sample()).unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn test_invalid_sheet_name() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.xlsx");
        let bad = vec![Sheet::new("bad[name]", &["A"])];
        let err = write_workbook(&path, &bad).unwrap_err();
        assert!(matches!(err, LineageError::Workbook { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("out.xlsx");
        assert!(write_workbook(&path, &sample()).is_err());
    }
}
