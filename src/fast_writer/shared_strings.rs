//! Shared strings table for string deduplication

use super::xml_writer::XmlWriter;
use crate::error::Result;
use indexmap::IndexSet;
use std::io::Write;

/// Shared strings table that deduplicates strings across the workbook
///
/// Insertion order is the index order written to `sharedStrings.xml`.
#[derive(Debug, Default)]
pub struct SharedStrings {
    strings: IndexSet<String>,
    references: u64,
}

impl SharedStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string and get its index
    pub fn add_string(&mut self, s: &str) -> u32 {
        self.references += 1;
        if let Some(index) = self.strings.get_index_of(s) {
            return index as u32;
        }
        let (index, _) = self.strings.insert_full(s.to_string());
        index as u32
    }

    /// Get number of unique strings
    pub fn count(&self) -> usize {
        self.strings.len()
    }

    /// Write shared strings XML
    pub fn write_xml<W: Write>(&self, writer: &mut XmlWriter<W>) -> Result<()> {
        writer.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;

        writer.start_element("sst")?;
        writer.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        writer.attribute_int("count", self.references)?;
        writer.attribute_int("uniqueCount", self.strings.len() as u64)?;
        writer.close_start_tag()?;

        for s in &self.strings {
            writer.start_element("si")?;
            writer.close_start_tag()?;
            writer.start_element("t")?;
            // Keep leading/trailing whitespace intact
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                writer.attribute("xml:space", "preserve")?;
            }
            writer.close_start_tag()?;
            writer.write_escaped(s)?;
            writer.end_element("t")?;
            writer.end_element("si")?;
        }

        writer.end_element("sst")?;
        writer.flush()
    }
}
