//! XLSX styles (styles.xml) read/write helpers
//!
//! Only number formats are modelled. Every `cellXfs` entry is reduced to the
//! [`NumberFormat`] it references; fonts, fills and borders are ignored.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use gridgate_core::{NumberFormat, Workbook};

// === Writing ===

#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Distinct formats in xf order. Index 0 is General.
    formats: Vec<NumberFormat>,
    /// Format -> xf index
    xf_ids: HashMap<NumberFormat, u32>,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut table = Self {
            formats: vec![NumberFormat::General],
            xf_ids: HashMap::from([(NumberFormat::General, 0)]),
        };

        for sheet in workbook.worksheets() {
            for (_, _, cell) in sheet.iter_cells() {
                let format = sheet.format_of(cell);
                if !table.xf_ids.contains_key(format) {
                    let id = table.formats.len() as u32;
                    table.xf_ids.insert(format.clone(), id);
                    table.formats.push(format.clone());
                }
            }
        }

        table
    }

    pub(crate) fn xf_id_for(&self, format: &NumberFormat) -> u32 {
        self.xf_ids.get(format).copied().unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        // Assign numFmtIds: built-ins keep theirs, customs count up from 164
        let mut next_custom = NumberFormat::FIRST_CUSTOM_ID;
        let mut num_fmt_ids = Vec::with_capacity(self.formats.len());
        let mut custom_fmts: Vec<(u32, &str)> = Vec::new();
        for format in &self.formats {
            let id = match format {
                NumberFormat::General => NumberFormat::ID_GENERAL,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => {
                    let id = next_custom;
                    next_custom += 1;
                    custom_fmts.push((id, code.as_str()));
                    id
                }
            };
            num_fmt_ids.push(id);
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !custom_fmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", custom_fmts.len()));
            for (id, code) in &custom_fmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(
            r#"
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.formats.len()));
        for id in &num_fmt_ids {
            let apply = if *id != 0 {
                " applyNumberFormat=\"1\""
            } else {
                ""
            };
            xml.push_str(&format!(
                "\n    <xf numFmtId=\"{}\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"{}/>",
                id, apply
            ));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#,
        );

        xml
    }
}

fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// === Reading ===

/// Read styles.xml into the number format of each `cellXfs` entry.
///
/// The returned vector is indexed by a cell's `s` attribute. It always holds
/// at least one (General) entry.
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<NumberFormat>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut xf_fmt_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"numFmt" => read_num_fmt(&e, &mut numfmts),
                b"xf" if in_cell_xfs => xf_fmt_ids.push(num_fmt_id_of(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => read_num_fmt(&e, &mut numfmts),
                b"xf" if in_cell_xfs => xf_fmt_ids.push(num_fmt_id_of(&e)),
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }

        buf.clear();
    }

    log::trace!(
        "styles.xml: {} custom number formats, {} cell formats",
        numfmts.len(),
        xf_fmt_ids.len()
    );

    let formats: Vec<NumberFormat> = xf_fmt_ids
        .into_iter()
        .map(|id| match numfmts.get(&id) {
            Some(code) => NumberFormat::from_string(code.clone()),
            None => NumberFormat::from_id(id),
        })
        .collect();

    if formats.is_empty() {
        Ok(vec![NumberFormat::General])
    } else {
        Ok(formats)
    }
}

fn read_num_fmt(e: &BytesStart<'_>, numfmts: &mut HashMap<u32, String>) {
    let mut id = None;
    let mut code = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"numFmtId" => id = attr.unescape_value().ok().and_then(|s| s.parse().ok()),
            b"formatCode" => code = attr.unescape_value().ok().map(|s| s.to_string()),
            _ => {}
        }
    }
    if let (Some(id), Some(code)) = (id, code) {
        numfmts.insert(id, code);
    }
}

fn num_fmt_id_of(e: &BytesStart<'_>) -> u32 {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"numFmtId")
        .and_then(|attr| attr.unescape_value().ok().and_then(|s| s.parse().ok()))
        .unwrap_or(0)
}
