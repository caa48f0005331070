//! Workbook packaging: zip container and the package parts around the sheets

use std::io::{Seek, Write};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use super::shared_strings::SharedStrings;
use super::worksheet::{self, ColumnLetters};
use super::xml_writer::XmlWriter;
use crate::error::{Result, TransposeError};
use crate::types::CellValue;

const SHEET_NAME_MAX: usize = 31;
const SHEET_NAME_FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Streaming workbook writer
///
/// Worksheets are written one after another; rows go straight into the zip
/// entry of the current sheet. Shared strings and the package parts are
/// written by [`FastWorkbook::close`].
pub struct FastWorkbook<W: Write + Seek> {
    zip: ZipWriter<W>,
    shared_strings: SharedStrings,
    letters: ColumnLetters,
    row_buffer: Vec<u8>,
    worksheets: Vec<String>,
    sheet_open: bool,
    current_row: u32,
    cells_written: u64,
    flush_interval: u32,
}

fn options() -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(6))
}

/// Check a worksheet name against spreadsheet naming rules
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("sheet name is empty".to_string())
    } else if name.chars().count() > SHEET_NAME_MAX {
        Some(format!("sheet name longer than {} characters", SHEET_NAME_MAX))
    } else if let Some(c) = name.chars().find(|c| SHEET_NAME_FORBIDDEN.contains(c)) {
        Some(format!("sheet name contains '{}'", c))
    } else if name.starts_with('\'') || name.ends_with('\'') {
        Some("sheet name starts or ends with an apostrophe".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TransposeError::InvalidConfig {
            field: "sheet_name",
            reason,
        }),
        None => Ok(()),
    }
}

impl<W: Write + Seek> FastWorkbook<W> {
    /// Create a workbook writing into `writer`
    pub fn new(writer: W) -> Self {
        FastWorkbook {
            zip: ZipWriter::new(writer),
            shared_strings: SharedStrings::new(),
            letters: ColumnLetters::new(100),
            row_buffer: Vec::with_capacity(8192),
            worksheets: Vec::new(),
            sheet_open: false,
            current_row: 0,
            cells_written: 0,
            flush_interval: 1000,
        }
    }

    /// Set flush interval (rows between flushes of the zip stream)
    pub fn set_flush_interval(&mut self, interval: u32) {
        self.flush_interval = interval.max(1);
    }

    /// Start a new worksheet; subsequent rows go to it
    pub fn add_worksheet(&mut self, name: &str) -> Result<()> {
        validate_sheet_name(name)?;
        if self.worksheets.iter().any(|s| s.eq_ignore_ascii_case(name)) {
            return Err(TransposeError::InvalidConfig {
                field: "sheet_name",
                reason: format!("duplicate sheet name '{}'", name),
            });
        }

        self.finish_current_worksheet()?;
        self.worksheets.push(name.to_string());

        let sheet_path = format!("xl/worksheets/sheet{}.xml", self.worksheets.len());
        self.zip.start_file(sheet_path, options())?;

        let mut xml = XmlWriter::new(&mut self.zip);
        xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
        xml.start_element("worksheet")?;
        xml.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        xml.attribute(
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        )?;
        xml.close_start_tag()?;
        xml.start_element("sheetData")?;
        xml.close_start_tag()?;
        xml.flush()?;

        self.sheet_open = true;
        self.current_row = 0;
        Ok(())
    }

    /// Write a row of typed values to the current worksheet
    pub fn write_row<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        if !self.sheet_open {
            return Err(TransposeError::Internal("no active worksheet".to_string()));
        }

        self.current_row += 1;
        let mut xml = XmlWriter::with_buffer(&mut self.zip, std::mem::take(&mut self.row_buffer));
        let written = worksheet::write_row(
            &mut xml,
            &mut self.letters,
            &mut self.shared_strings,
            self.current_row,
            values,
        )?;
        xml.flush()?;
        self.row_buffer = xml.into_buffer();
        self.cells_written += written as u64;

        if self.current_row % self.flush_interval == 0 {
            self.zip.flush()?;
        }
        Ok(())
    }

    /// Rows written to the current worksheet
    pub fn current_row(&self) -> u32 {
        self.current_row
    }

    /// Non-empty cells written across all worksheets
    pub fn cells_written(&self) -> u64 {
        self.cells_written
    }

    fn finish_current_worksheet(&mut self) -> Result<()> {
        if !self.sheet_open {
            return Ok(());
        }

        let mut xml = XmlWriter::new(&mut self.zip);
        xml.end_element("sheetData")?;
        xml.end_element("worksheet")?;
        xml.flush()?;

        self.sheet_open = false;
        Ok(())
    }

    /// Write the remaining package parts and finish the zip container
    ///
    /// Returns the underlying writer.
    pub fn close(mut self) -> Result<W> {
        if self.worksheets.is_empty() {
            self.add_worksheet("Sheet1")?;
        }
        self.finish_current_worksheet()?;

        self.zip.start_file("xl/sharedStrings.xml", options())?;
        {
            let mut xml = XmlWriter::new(&mut self.zip);
            self.shared_strings.write_xml(&mut xml)?;
        }

        self.zip.start_file("xl/workbook.xml", options())?;
        self.write_workbook_xml()?;

        self.zip.start_file("xl/_rels/workbook.xml.rels", options())?;
        self.write_workbook_rels()?;

        self.zip.start_file("xl/styles.xml", options())?;
        self.zip.write_all(STYLES_XML.as_bytes())?;

        self.zip.start_file("[Content_Types].xml", options())?;
        self.write_content_types()?;

        self.zip.start_file("_rels/.rels", options())?;
        self.zip.write_all(ROOT_RELS_XML.as_bytes())?;

        self.zip.start_file("docProps/app.xml", options())?;
        self.zip.write_all(APP_XML.as_bytes())?;

        self.zip.start_file("docProps/core.xml", options())?;
        self.write_core_props()?;

        Ok(self.zip.finish()?)
    }

    fn write_content_types(&mut self) -> Result<()> {
        let mut xml = XmlWriter::new(&mut self.zip);
        xml.write_str(concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
            "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
        ))?;
        for i in 1..=self.worksheets.len() {
            xml.write_str("<Override PartName=\"/xl/worksheets/sheet")?;
            xml.write_int(i as u64)?;
            xml.write_str(".xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>")?;
        }
        xml.write_str(concat!(
            "<Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>",
            "<Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>",
            "<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>",
            "<Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>",
            "</Types>",
        ))?;
        xml.flush()
    }

    fn write_core_props(&mut self) -> Result<()> {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let mut xml = XmlWriter::new(&mut self.zip);
        xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
        xml.write_str("<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">")?;
        xml.text_element("dc:creator", "xltranspose")?;
        xml.write_str("<dcterms:created xsi:type=\"dcterms:W3CDTF\">")?;
        xml.write_str(&now)?;
        xml.write_str("</dcterms:created><dcterms:modified xsi:type=\"dcterms:W3CDTF\">")?;
        xml.write_str(&now)?;
        xml.write_str("</dcterms:modified></cp:coreProperties>")?;
        xml.flush()
    }

    fn write_workbook_xml(&mut self) -> Result<()> {
        let mut xml = XmlWriter::new(&mut self.zip);

        xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
        xml.start_element("workbook")?;
        xml.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        xml.attribute(
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        )?;
        xml.close_start_tag()?;

        xml.start_element("sheets")?;
        xml.close_start_tag()?;
        for (i, name) in self.worksheets.iter().enumerate() {
            let sheet_id = i as u64 + 1;
            xml.start_element("sheet")?;
            xml.attribute("name", name)?;
            xml.attribute_int("sheetId", sheet_id)?;
            xml.attribute("r:id", &format!("rId{}", sheet_id))?;
            xml.close_empty()?;
        }
        xml.end_element("sheets")?;
        xml.end_element("workbook")?;
        xml.flush()
    }

    fn write_workbook_rels(&mut self) -> Result<()> {
        let sheet_count = self.worksheets.len();
        let mut xml = XmlWriter::new(&mut self.zip);

        xml.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
        xml.start_element("Relationships")?;
        xml.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/package/2006/relationships",
        )?;
        xml.close_start_tag()?;

        let mut relationship = |id: usize, kind: &str, target: &str| -> Result<()> {
            xml.start_element("Relationship")?;
            xml.attribute("Id", &format!("rId{}", id))?;
            xml.attribute(
                "Type",
                &format!(
                    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/{}",
                    kind
                ),
            )?;
            xml.attribute("Target", target)?;
            xml.close_empty()
        };

        for i in 1..=sheet_count {
            relationship(i, "worksheet", &format!("worksheets/sheet{}.xml", i))?;
        }
        relationship(sheet_count + 1, "styles", "styles.xml")?;
        relationship(sheet_count + 2, "sharedStrings", "sharedStrings.xml")?;

        xml.end_element("Relationships")?;
        xml.flush()
    }
}

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

const APP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>xltranspose</Application>
<DocSecurity>0</DocSecurity>
<ScaleCrop>false</ScaleCrop>
<LinksUpToDate>false</LinksUpToDate>
<SharedDoc>false</SharedDoc>
<HyperlinksChanged>false</HyperlinksChanged>
</Properties>"#;

// xf 1 carries the built-in "m/d/yy h:mm" format so date cells read back as dates.
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1">
<font><sz val="11"/><name val="Calibri"/></font>
</fonts>
<fills count="2">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
</fills>
<borders count="1">
<border><left/><right/><top/><bottom/><diagonal/></border>
</borders>
<cellStyleXfs count="1">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
</cellStyleXfs>
<cellXfs count="2">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="22" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
</cellXfs>
</styleSheet>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn read_entry(bytes: Vec<u8>, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut out = String::new();
        entry.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_fast_workbook() -> Result<()> {
        let mut workbook = FastWorkbook::new(Cursor::new(Vec::new()));
        workbook.add_worksheet("Data")?;
        workbook.write_row(&[CellValue::from("Name"), CellValue::from(30i64)])?;
        workbook.write_row(&[CellValue::Empty, CellValue::Bool(false)])?;
        assert_eq!(workbook.current_row(), 2);
        assert_eq!(workbook.cells_written(), 3);

        let bytes = workbook.close()?.into_inner();
        let sheet = read_entry(bytes.clone(), "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<row r=\"2\"><c r=\"B2\" t=\"b\"><v>0</v></c></row>"));

        let book = read_entry(bytes, "xl/workbook.xml");
        assert!(book.contains("<sheet name=\"Data\" sheetId=\"1\" r:id=\"rId1\"/>"));
        Ok(())
    }

    #[test]
    fn test_close_without_sheets_adds_default() -> Result<()> {
        let workbook = FastWorkbook::new(Cursor::new(Vec::new()));
        let bytes = workbook.close()?.into_inner();
        let types = read_entry(bytes, "[Content_Types].xml");
        assert!(types.contains("/xl/worksheets/sheet1.xml"));
        Ok(())
    }

    #[test]
    fn test_write_without_sheet_fails() {
        let mut workbook = FastWorkbook::new(Cursor::new(Vec::new()));
        assert!(workbook.write_row(&[CellValue::from(1i64)]).is_err());
    }

    #[test]
    fn test_sheet_names() {
        assert!(validate_sheet_name("Sheet1").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name("a/b").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());

        let mut workbook = FastWorkbook::new(Cursor::new(Vec::new()));
        workbook.add_worksheet("Data").unwrap();
        assert!(workbook.add_worksheet("DATA").is_err());
    }
}
