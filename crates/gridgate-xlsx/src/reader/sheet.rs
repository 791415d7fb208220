//! Worksheet parts: `<sheetData>` rows and cells

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};

use super::strings::decode_excel_escapes;
use super::{attr_value, is_truthy, xml_reader};
use crate::error::{XlsxError, XlsxResult};
use gridgate_core::{CellAddress, CellError, CellValue, NumberFormat, Worksheet};

/// Tables from other parts that cells refer to by index
pub(super) struct SheetContext<'a> {
    pub shared_strings: &'a [String],
    /// Number format of each `cellXfs` entry
    pub formats: &'a [NumberFormat],
}

impl SheetContext<'_> {
    /// Number format for a style index; `None` when it is General
    fn format(&self, style: Option<u32>) -> XlsxResult<Option<&NumberFormat>> {
        let Some(index) = style.filter(|&s| s != 0) else {
            return Ok(None);
        };
        let format = self
            .formats
            .get(index as usize)
            .ok_or_else(|| XlsxError::Parse(format!("style index {} out of bounds", index)))?;
        Ok((*format != NumberFormat::General).then_some(format))
    }
}

/// Which text a `Text` event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Nothing,
    Value,
    Formula,
}

/// A `<c>` element collected up to its end tag
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: Option<u32>,
    raw: Option<String>,
    formula: Option<String>,
}

impl PendingCell {
    fn open(e: &BytesStart<'_>) -> Self {
        Self {
            reference: attr_value(e, b"r"),
            cell_type: attr_value(e, b"t"),
            style: attr_value(e, b"s").and_then(|s| s.trim().parse().ok()),
            ..Self::default()
        }
    }

    /// The decoded value; `None` for a cell that only carries a style
    fn into_value(self, shared_strings: &[String]) -> XlsxResult<Option<CellValue>> {
        let kind = self.cell_type.as_deref();
        if let Some(text) = self.formula {
            // The cached result of the last calculation, when one was saved
            let cached = self
                .raw
                .as_deref()
                .and_then(|raw| cached_result(kind, raw, shared_strings));
            let text = if text.starts_with('=') {
                text
            } else {
                format!("={}", text)
            };
            return Ok(Some(CellValue::formula(text, cached)));
        }
        self.raw
            .as_deref()
            .map(|raw| plain_value(kind, raw, shared_strings))
            .transpose()
    }
}

fn shared_string<'s>(raw: &str, table: &'s [String]) -> XlsxResult<&'s str> {
    let index: usize = raw
        .trim()
        .parse()
        .map_err(|_| XlsxError::Parse(format!("invalid shared string index: {}", raw)))?;
    table
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| XlsxError::Parse(format!("shared string index {} out of bounds", index)))
}

fn plain_value(kind: Option<&str>, raw: &str, shared_strings: &[String]) -> XlsxResult<CellValue> {
    let value = match kind {
        Some("s") => CellValue::string(shared_string(raw, shared_strings)?),
        Some("b") => CellValue::Boolean(is_truthy(raw)),
        Some("e") => CellError::parse(raw).map_or_else(|| CellValue::string(raw), CellValue::Error),
        Some("inlineStr" | "str") => CellValue::string(decode_excel_escapes(raw)),
        None | Some("n") => raw
            .trim()
            .parse::<f64>()
            .map_or_else(|_| CellValue::string(raw), CellValue::Number),
        // ISO 8601 date cells (`t="d"`) stay text
        Some(_) => CellValue::string(raw),
    };
    Ok(value)
}

/// Like [`plain_value`], but anything unreadable is no cached result at all
fn cached_result(kind: Option<&str>, raw: &str, shared_strings: &[String]) -> Option<CellValue> {
    match kind {
        Some("e") => CellError::parse(raw).map(CellValue::Error),
        None | Some("n") => raw.trim().parse::<f64>().ok().map(CellValue::Number),
        _ => plain_value(kind, raw, shared_strings).ok(),
    }
}

/// Fill `worksheet` from a worksheet part
///
/// Every `<row>` is declared, so rows without cells still exist.
pub(super) fn read_sheet_data<B: BufRead>(
    input: B,
    worksheet: &mut Worksheet,
    context: &SheetContext<'_>,
) -> XlsxResult<()> {
    let mut xml = xml_reader(input);
    let mut buf = Vec::new();

    let mut cell: Option<PendingCell> = None;
    let mut capture = Capture::Nothing;
    let mut in_inline_string = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"row" => declare_row(worksheet, &e)?,
                b"c" => cell = Some(PendingCell::open(&e)),
                b"v" if cell.is_some() => capture = Capture::Value,
                b"f" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.formula.get_or_insert_with(String::new);
                        capture = Capture::Formula;
                    }
                }
                b"is" => in_inline_string = cell.is_some(),
                b"t" if in_inline_string => capture = Capture::Value,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"row" => declare_row(worksheet, &e)?,
                b"c" => store(worksheet, PendingCell::open(&e), context)?,
                // A shared formula child: the text lives on the anchor cell
                b"f" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.formula.get_or_insert_with(String::new);
                    }
                }
                _ => {}
            },
            Event::Text(e) if capture != Capture::Nothing => {
                if let Some(cell) = cell.as_mut() {
                    let target = match capture {
                        Capture::Formula => cell.formula.get_or_insert_with(String::new),
                        _ => cell.raw.get_or_insert_with(String::new),
                    };
                    target.push_str(&e.unescape()?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"c" => {
                    if let Some(done) = cell.take() {
                        store(worksheet, done, context)?;
                    }
                }
                b"v" | b"f" | b"t" => capture = Capture::Nothing,
                b"is" => in_inline_string = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn declare_row(worksheet: &mut Worksheet, e: &BytesStart<'_>) -> XlsxResult<()> {
    match attr_value(e, b"r").and_then(|r| r.trim().parse::<u32>().ok()) {
        Some(number) if number > 0 => Ok(worksheet.declare_row(number - 1)?),
        _ => Ok(()),
    }
}

fn store(worksheet: &mut Worksheet, cell: PendingCell, context: &SheetContext<'_>) -> XlsxResult<()> {
    let Some(reference) = cell.reference.as_deref() else {
        log::warn!("cell without a reference in sheet '{}'", worksheet.name());
        return Ok(());
    };
    let at = CellAddress::parse(reference).map_err(|e| {
        XlsxError::Parse(format!("invalid cell reference '{}': {}", reference, e))
    })?;
    let format = context.format(cell.style)?;

    if let Some(value) = cell.into_value(context.shared_strings)? {
        worksheet.set_cell_value_at(at.row, at.col, value)?;
    }
    if let Some(format) = format {
        worksheet.set_number_format_at(at.row, at.col, format.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sheet_data: &str, shared_strings: &[String]) -> Worksheet {
        let formats = [NumberFormat::General, NumberFormat::date_short()];
        let context = SheetContext {
            shared_strings,
            formats: &formats,
        };
        let xml = format!(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            sheet_data
        );
        let mut sheet = Worksheet::new("Data");
        read_sheet_data(xml.as_bytes(), &mut sheet, &context).unwrap();
        sheet
    }

    #[test]
    fn test_inline_rich_text_runs_concatenate() {
        let sheet = parse(
            r#"<row r="1"><c r="A1" t="inlineStr"><is><r><t>ad</t></r><r><t xml:space="preserve">min </t></r></is></c></row>"#,
            &[],
        );
        assert_eq!(sheet.get_value("A1").unwrap(), CellValue::string("admin "));
    }

    #[test]
    fn test_unparseable_number_is_text() {
        let sheet = parse(r#"<row r="1"><c r="A1"><v>n/a</v></c></row>"#, &[]);
        assert_eq!(sheet.get_value("A1").unwrap(), CellValue::string("n/a"));
    }

    #[test]
    fn test_cached_shared_string_result() {
        let strings = vec!["Y".to_string()];
        let sheet = parse(
            r#"<row r="1"><c r="A1" t="s"><f>B1</f><v>0</v></c><c r="B1" t="s"><f>C1</f><v>9</v></c></row>"#,
            &strings,
        );
        assert_eq!(
            sheet.get_value("A1").unwrap().cached_value(),
            Some(&CellValue::string("Y"))
        );
        // Out-of-range cached index: the formula survives without a result
        assert_eq!(sheet.get_value("B1").unwrap().cached_value(), None);
    }

    #[test]
    fn test_bad_shared_string_index_fails() {
        let formats = [NumberFormat::General];
        let context = SheetContext {
            shared_strings: &[],
            formats: &formats,
        };
        let xml = r#"<sheetData><row r="1"><c r="A1" t="s"><v>3</v></c></row></sheetData>"#;
        let mut sheet = Worksheet::new("Data");
        let err = read_sheet_data(xml.as_bytes(), &mut sheet, &context).unwrap_err();
        assert!(matches!(err, XlsxError::Parse(_)));
    }

    #[test]
    fn test_styled_cell_gets_date_format() {
        let sheet = parse(r#"<row r="2"><c r="B2" s="1"><v>45415</v></c></row>"#, &[]);
        assert!(sheet.number_format_at(1, 1).is_date_format());
        assert_eq!(sheet.get_value_at(1, 1), CellValue::Number(45415.0));
    }
}
