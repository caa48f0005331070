//! Row and cell encoding for worksheet XML

use super::shared_strings::SharedStrings;
use super::xml_writer::XmlWriter;
use crate::error::Result;
use crate::types::{col_to_letter, CellValue};
use std::io::Write;

/// Style index of the date/time cell format in `styles.xml`
pub(crate) const DATETIME_STYLE: u64 = 1;

/// Error literals readers recognise in `t="e"` cells
const ERROR_LITERALS: &[&str] = &[
    "#DIV/0!",
    "#N/A",
    "#NAME?",
    "#NULL!",
    "#NUM!",
    "#REF!",
    "#VALUE!",
    "#GETTING_DATA",
];

/// Column letters cache (A, B, C, ...)
pub(crate) struct ColumnLetters {
    cache: Vec<String>,
}

impl ColumnLetters {
    pub(crate) fn new(prefill: u32) -> Self {
        ColumnLetters {
            cache: (0..prefill).map(col_to_letter).collect(),
        }
    }

    pub(crate) fn get(&mut self, col: u32) -> &str {
        while self.cache.len() <= col as usize {
            let next = self.cache.len() as u32;
            self.cache.push(col_to_letter(next));
        }
        &self.cache[col as usize]
    }
}

/// Write one `<row>` element. `row_num` is 1-based; empty cells are omitted.
///
/// Returns the number of `<c>` elements written.
pub(crate) fn write_row<'a, W, I>(
    xml: &mut XmlWriter<W>,
    letters: &mut ColumnLetters,
    shared: &mut SharedStrings,
    row_num: u32,
    values: I,
) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut written = 0;
    let mut opened = false;

    for (col, value) in values.into_iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        if !opened {
            xml.start_element("row")?;
            xml.attribute_int("r", row_num as u64)?;
            xml.close_start_tag()?;
            opened = true;
        }

        xml.start_element("c")?;
        xml.write_raw(b" r=\"")?;
        xml.write_str(letters.get(col as u32))?;
        xml.write_int(row_num as u64)?;
        xml.write_raw(b"\"")?;
        write_cell_body(xml, shared, value)?;
        xml.end_element("c")?;
        written += 1;
    }

    if opened {
        xml.end_element("row")?;
    }
    Ok(written)
}

// Writes type attributes, closes the `<c` start tag, and writes the content.
fn write_cell_body<W: Write>(
    xml: &mut XmlWriter<W>,
    shared: &mut SharedStrings,
    value: &CellValue,
) -> Result<()> {
    match value {
        CellValue::Empty => xml.close_start_tag(),
        CellValue::String(s) => shared_string(xml, shared, s),
        CellValue::Number(n) if n.is_finite() => {
            xml.close_start_tag()?;
            xml.text_element("v", &n.to_string())
        }
        CellValue::Number(_) => {
            xml.attribute("t", "e")?;
            xml.close_start_tag()?;
            xml.text_element("v", "#NUM!")
        }
        CellValue::Bool(b) => {
            xml.attribute("t", "b")?;
            xml.close_start_tag()?;
            xml.text_element("v", if *b { "1" } else { "0" })
        }
        CellValue::DateTime(d) => {
            xml.attribute_int("s", DATETIME_STYLE)?;
            xml.close_start_tag()?;
            xml.text_element("v", &d.to_string())
        }
        CellValue::Error(e) if ERROR_LITERALS.contains(&e.as_str()) => {
            xml.attribute("t", "e")?;
            xml.close_start_tag()?;
            xml.text_element("v", e)
        }
        CellValue::Error(e) => shared_string(xml, shared, e),
        CellValue::Formula(f) => {
            xml.close_start_tag()?;
            xml.text_element("f", f.strip_prefix('=').unwrap_or(f))
        }
    }
}

fn shared_string<W: Write>(xml: &mut XmlWriter<W>, shared: &mut SharedStrings, s: &str) -> Result<()> {
    let index = shared.add_string(s);
    xml.attribute("t", "s")?;
    xml.close_start_tag()?;
    xml.start_element("v")?;
    xml.close_start_tag()?;
    xml.write_int(index as u64)?;
    xml.end_element("v")
}
