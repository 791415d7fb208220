//! XLSX writer
//!
//! Produces the subset the reader understands: cell values, cached formula
//! results, number formats, declared rows, sheet visibility and the date
//! system. Text goes out as inline strings, so there is no shared strings
//! part.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::XlsxResult;
use crate::styles::XlsxStyleTable;
use gridgate_core::{CellAddress, CellData, CellValue, Workbook, Worksheet};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CT_PREFIX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml";

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        log::debug!("writing workbook {}", path.display());
        Self::write(workbook, File::create(path)?)
    }

    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        let styles = XlsxStyleTable::build(workbook);
        let mut package = Package(ZipWriter::new(writer));

        package.part("[Content_Types].xml", &content_types(workbook))?;
        package.part("_rels/.rels", &root_rels())?;
        package.part("xl/workbook.xml", &workbook_part(workbook))?;
        package.part("xl/_rels/workbook.xml.rels", &workbook_rels(workbook))?;
        package.part("xl/styles.xml", &styles.to_styles_xml())?;
        for (i, sheet) in workbook.worksheets().enumerate() {
            let name = format!("xl/worksheets/sheet{}.xml", i + 1);
            package.part(&name, &sheet_part(sheet, &styles))?;
        }

        package.0.finish()?;
        Ok(())
    }
}

struct Package<W: Write + Seek>(ZipWriter<W>);

impl<W: Write + Seek> Package<W> {
    fn part(&mut self, name: &str, xml: &str) -> XlsxResult<()> {
        self.0.start_file(name, SimpleFileOptions::default())?;
        self.0.write_all(xml.as_bytes())?;
        Ok(())
    }
}

fn content_types(workbook: &Workbook) -> String {
    let sheets: String = (1..=workbook.sheet_count())
        .map(|n| {
            format!(
                r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="{CT_PREFIX}.worksheet+xml"/>"#
            )
        })
        .collect();
    format!(
        concat!(
            "{}\n",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="{}.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="{}.styles+xml"/>"#,
            "{}</Types>"
        ),
        XML_DECL, CT_PREFIX, CT_PREFIX, sheets
    )
}

fn root_rels() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="{NS_REL}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn workbook_part(workbook: &Workbook) -> String {
    let properties = if workbook.settings().date_1904 {
        r#"<workbookPr date1904="1"/>"#
    } else {
        ""
    };
    let sheets: String = workbook
        .worksheets()
        .enumerate()
        .map(|(i, sheet)| {
            let state = if sheet.is_visible() { "" } else { r#" state="hidden""# };
            format!(
                r#"<sheet name="{}" sheetId="{n}"{state} r:id="rId{n}"/>"#,
                escape_xml(sheet.name()),
                n = i + 1
            )
        })
        .collect();
    format!(
        r#"{XML_DECL}
<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}">{properties}<sheets>{sheets}</sheets></workbook>"#
    )
}

/// Sheets take `rId1..=rIdN`, styles the id after them
fn workbook_rels(workbook: &Workbook) -> String {
    let count = workbook.sheet_count();
    let sheets: String = (1..=count)
        .map(|n| {
            format!(
                r#"<Relationship Id="rId{n}" Type="{NS_REL}/worksheet" Target="worksheets/sheet{n}.xml"/>"#
            )
        })
        .collect();
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_PKG_REL}">{sheets}<Relationship Id="rId{}" Type="{NS_REL}/styles" Target="styles.xml"/></Relationships>"#,
        count + 1
    )
}

fn sheet_part(sheet: &Worksheet, styles: &XlsxStyleTable) -> String {
    let mut rows = String::new();
    let last = sheet.last_row_index();
    for row in last.into_iter().flat_map(|l| 0..=l).filter_map(|r| sheet.row(r)) {
        let number = row.index() + 1;
        if row.is_empty() {
            rows.push_str(&format!(r#"<row r="{number}"/>"#));
            continue;
        }
        rows.push_str(&format!(r#"<row r="{number}">"#));
        for (col, cell) in row.iter() {
            let reference = CellAddress::new(row.index(), col).to_a1_string();
            let xf_id = styles.xf_id_for(sheet.format_of(cell));
            rows.push_str(&cell_element(&reference, cell, xf_id));
        }
        rows.push_str("</row>");
    }
    format!(r#"{XML_DECL}
<worksheet xmlns="{NS_MAIN}"><sheetData>{rows}</sheetData></worksheet>"#)
}

/// `<c>` for one cell; a format-only cell with the default style is dropped
fn cell_element(reference: &str, cell: &CellData, xf_id: u32) -> String {
    let style = if xf_id == 0 {
        String::new()
    } else {
        format!(r#" s="{xf_id}""#)
    };

    let (kind, body) = match &cell.value {
        CellValue::Empty if xf_id == 0 => return String::new(),
        CellValue::Empty => return format!(r#"<c r="{reference}"{style}/>"#),
        CellValue::String(s) => (
            r#" t="inlineStr""#,
            format!(r#"<is><t xml:space="preserve">{}</t></is>"#, escape_xml(s.as_str())),
        ),
        CellValue::Formula { text, cached_value } => {
            let formula = escape_xml(text.strip_prefix('=').unwrap_or(text));
            let (kind, cached) = match cached_value.as_deref() {
                Some(CellValue::String(s)) => (r#" t="str""#, scalar(&escape_xml(s.as_str()))),
                Some(value @ (CellValue::Number(_) | CellValue::Boolean(_) | CellValue::Error(_))) => {
                    plain_value(value)
                }
                _ => ("", String::new()),
            };
            (kind, format!("<f>{formula}</f>{cached}"))
        }
        value => plain_value(value),
    };
    format!(r#"<c r="{reference}"{style}{kind}>{body}</c>"#)
}

/// Type attribute and `<v>` for numbers, booleans and errors
fn plain_value(value: &CellValue) -> (&'static str, String) {
    match value {
        CellValue::Boolean(b) => (r#" t="b""#, scalar(if *b { "1" } else { "0" })),
        CellValue::Error(e) => (r#" t="e""#, scalar(&escape_xml(e.as_str()))),
        CellValue::Number(n) => ("", scalar(&n.to_string())),
        _ => ("", String::new()),
    }
}

fn scalar(text: &str) -> String {
    format!("<v>{text}</v>")
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XlsxReader;
    use gridgate_core::{CellError, DateSystem, NumberFormat};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn round_trip(workbook: &Workbook) -> Workbook {
        let mut buf = Cursor::new(Vec::new());
        XlsxWriter::write(workbook, &mut buf).unwrap();
        buf.set_position(0);
        XlsxReader::read(buf).unwrap()
    }

    #[test]
    fn test_write_test_data_sheet() {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet_with_name("TC_02").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        sheet.set_cell_value("A1", " username ").unwrap();
        sheet.set_cell_value("B1", "Runmode").unwrap();
        sheet.set_cell_value("C1", "dob").unwrap();
        sheet.set_cell_value("A2", "R&D <admin>").unwrap();
        sheet.set_cell_value("B2", "Y").unwrap();
        sheet.set_cell_value("C2", 45415.0).unwrap();
        sheet
            .set_number_format("C2", NumberFormat::date_short())
            .unwrap();
        sheet.set_cell_value("D2", true).unwrap();
        sheet
            .set_cell_value(
                "E2",
                CellValue::formula("=C2+1", Some(CellValue::Number(45416.0))),
            )
            .unwrap();
        sheet
            .set_cell_value("F2", CellValue::Error(CellError::Div0))
            .unwrap();

        let read = round_trip(&wb);
        let sheet = read.worksheet_by_name("TC_02").unwrap();

        assert_eq!(sheet.get_value("A1").unwrap(), CellValue::string(" username "));
        assert_eq!(sheet.get_value("A2").unwrap(), CellValue::string("R&D <admin>"));
        assert_eq!(sheet.get_value("C2").unwrap(), CellValue::Number(45415.0));
        assert!(sheet.number_format_at(1, 2).is_date_format());
        assert_eq!(sheet.get_value("D2").unwrap(), CellValue::Boolean(true));
        assert_eq!(sheet.get_value("E2").unwrap().as_number(), Some(45416.0));
        assert_eq!(
            sheet.get_value("F2").unwrap(),
            CellValue::Error(CellError::Div0)
        );
    }

    #[test]
    fn test_write_preserves_sheet_order_and_declared_rows() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("TestSuite").unwrap();
        let idx = wb.add_worksheet_with_name("Empty Rows").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        sheet.set_cell_value("A1", "header").unwrap();
        sheet.declare_row(3).unwrap();

        let read = round_trip(&wb);
        assert_eq!(read.worksheet(0).unwrap().name(), "TestSuite");
        let sheet = read.worksheet(1).unwrap();
        assert_eq!(sheet.name(), "Empty Rows");
        assert_eq!(sheet.last_row_index(), Some(3));
        assert!(sheet.row(3).unwrap().is_empty());
        assert!(sheet.row(2).is_none());
    }

    #[test]
    fn test_write_1904_and_hidden() {
        let mut wb = Workbook::empty();
        wb.settings_mut().date_1904 = true;
        let idx = wb.add_worksheet_with_name("Lookup").unwrap();
        wb.worksheet_mut(idx).unwrap().set_visible(false);

        let read = round_trip(&wb);
        assert_eq!(read.date_system(), DateSystem::Excel1904);
        assert!(!read.worksheet(0).unwrap().is_visible());
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.xlsx");

        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet_with_name("Data").unwrap();
        wb.worksheet_mut(idx)
            .unwrap()
            .set_cell_value("B3", 7.5)
            .unwrap();

        XlsxWriter::write_file(&wb, &path).unwrap();
        let read = XlsxReader::read_file(&path).unwrap();
        assert_eq!(
            read.worksheet(0).unwrap().get_value("B3").unwrap(),
            CellValue::Number(7.5)
        );
    }
}
