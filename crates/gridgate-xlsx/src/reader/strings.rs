//! Shared strings and Excel's `_xHHHH_` text escapes

use std::io::BufRead;

use quick_xml::events::Event;

use super::xml_reader;
use crate::error::XlsxResult;

/// Decode `_xHHHH_` escapes
///
/// XML cannot carry some characters, so Excel writes `_x000d_` for a
/// carriage return, `_x0009_` for a tab and `_x005f_` for a literal
/// underscore. Anything that is not a complete escape is kept as-is.
pub(super) fn decode_excel_escapes(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("_x") {
        decoded.push_str(&rest[..start]);
        rest = &rest[start..];
        match escaped_char(rest) {
            Some(c) => {
                decoded.push(c);
                rest = &rest["_xHHHH_".len()..];
            }
            None => {
                decoded.push('_');
                rest = &rest[1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}

/// The character of a `_xHHHH_` escape at the start of `s`
fn escaped_char(s: &str) -> Option<char> {
    let hex = s.strip_prefix("_x")?.get(..5)?.strip_suffix('_')?;
    if hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else {
        None
    }
}

/// Parse `sharedStrings.xml` into the table `t="s"` cells index into
///
/// Rich text runs of one item are concatenated. Phonetic runs (`rPh`) only
/// repeat the text as a reading guide and are skipped.
pub(super) fn read_shared_strings<B: BufRead>(input: B) -> XlsxResult<Vec<String>> {
    let mut xml = xml_reader(input);
    let mut buf = Vec::new();
    let mut table = Vec::new();

    let mut item: Option<String> = None;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"si" => item = Some(String::new()),
                b"rPh" => in_phonetic = true,
                b"t" => in_text = item.is_some() && !in_phonetic,
                _ => {}
            },
            Event::Text(e) if in_text => {
                if let Some(item) = item.as_mut() {
                    item.push_str(&e.unescape()?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"si" => {
                    if let Some(item) = item.take() {
                        table.push(decode_excel_escapes(&item));
                    }
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            // `<si/>` is an empty string, still taking an index
            Event::Empty(e) if e.name().as_ref() == b"si" => table.push(String::new()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    log::trace!("{} shared strings", table.len());
    Ok(table)
}
