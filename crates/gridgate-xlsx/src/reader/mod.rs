//! XLSX reader
//!
//! Reads the parts test data needs: the sheet list and date system from
//! `workbook.xml`, sheet paths from its relationships, shared strings, the
//! number format of every cell style, and each worksheet's cells.

mod sheet;
mod strings;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;
use gridgate_core::{NumberFormat, Workbook, Worksheet};
use sheet::{read_sheet_data, SheetContext};
use strings::read_shared_strings;

const CONTENT_TYPES: &str = "[Content_Types].xml";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const STYLES: &str = "xl/styles.xml";

/// Whitespace is significant in cell text, so nothing is trimmed
fn xml_reader<B: BufRead>(input: B) -> Reader<B> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(false);
    reader
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// A `<sheet>` entry of workbook.xml
#[derive(Debug)]
struct SheetEntry {
    name: String,
    r_id: String,
    hidden: bool,
}

#[derive(Debug, Default)]
struct WorkbookPart {
    sheets: Vec<SheetEntry>,
    date_1904: bool,
}

impl WorkbookPart {
    fn parse<B: BufRead>(input: B) -> XlsxResult<Self> {
        let mut xml = xml_reader(input);
        let mut buf = Vec::new();
        let mut part = WorkbookPart::default();

        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"workbookPr" => {
                        part.date_1904 = attr_value(&e, b"date1904").is_some_and(|v| is_truthy(&v));
                    }
                    b"sheet" => match (attr_value(&e, b"name"), attr_value(&e, b"r:id")) {
                        (Some(name), Some(r_id)) => {
                            // Both "hidden" and "veryHidden"
                            let hidden = attr_value(&e, b"state").is_some_and(|s| s != "visible");
                            part.sheets.push(SheetEntry { name, r_id, hidden });
                        }
                        _ => log::warn!("skipping a <sheet> without name or r:id"),
                    },
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(part)
    }
}

/// Worksheet relationship ids mapped to archive paths
fn parse_sheet_paths<B: BufRead>(input: B) -> XlsxResult<HashMap<String, String>> {
    let mut xml = xml_reader(input);
    let mut buf = Vec::new();
    let mut paths = HashMap::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                let is_sheet = attr_value(&e, b"Type").is_some_and(|t| t.ends_with("/worksheet"));
                if let (true, Some(id), Some(target)) =
                    (is_sheet, attr_value(&e, b"Id"), attr_value(&e, b"Target"))
                {
                    // Relative targets resolve against xl/
                    let path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_owned(),
                        None => format!("xl/{}", target),
                    };
                    paths.insert(id, path);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paths)
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        log::debug!("opening workbook {}", path.display());
        Self::read(File::open(path)?)
    }

    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = ZipArchive::new(reader)?;

        if archive.by_name(CONTENT_TYPES).is_err() {
            return Err(XlsxError::InvalidFormat(format!("missing {}", CONTENT_TYPES)));
        }

        let shared_strings = match archive.by_name(SHARED_STRINGS) {
            Ok(part) => read_shared_strings(BufReader::new(part))?,
            Err(_) => Vec::new(),
        };
        let formats = match archive.by_name(STYLES) {
            Ok(part) => read_styles_xml(part)?,
            Err(_) => vec![NumberFormat::General],
        };
        let workbook_part = WorkbookPart::parse(BufReader::new(required(&mut archive, WORKBOOK)?))?;
        let sheet_paths = parse_sheet_paths(BufReader::new(required(&mut archive, WORKBOOK_RELS)?))?;

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = workbook_part.date_1904;

        let context = SheetContext {
            shared_strings: &shared_strings,
            formats: &formats,
        };

        for entry in workbook_part.sheets {
            let Some(path) = sheet_paths.get(&entry.r_id) else {
                log::warn!(
                    "sheet '{}' has no worksheet relationship ({}), skipping",
                    entry.name,
                    entry.r_id
                );
                continue;
            };

            let mut worksheet = Worksheet::new(entry.name);
            worksheet.set_visible(!entry.hidden);
            let part = required(&mut archive, path)?;
            read_sheet_data(BufReader::new(part), &mut worksheet, &context)?;
            log::trace!(
                "read sheet '{}' from {}: {} cells",
                worksheet.name(),
                path,
                worksheet.cell_count()
            );
            workbook.add_existing_worksheet(worksheet)?;
        }

        log::debug!(
            "workbook loaded: {} sheets, {} shared strings, 1904 dates: {}",
            workbook.sheet_count(),
            shared_strings.len(),
            workbook_part.date_1904
        );

        Ok(workbook)
    }
}

fn required<'a, R: Read + Seek>(
    archive: &'a mut ZipArchive<R>,
    name: &str,
) -> XlsxResult<impl Read + 'a> {
    archive
        .by_name(name)
        .map_err(|_| XlsxError::MissingPart(name.to_owned()))
}
