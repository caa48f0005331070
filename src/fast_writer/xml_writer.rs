//! Buffered XML writer with minimal allocations

use crate::error::Result;
use std::borrow::Cow;
use std::io::Write;

const FLUSH_THRESHOLD: usize = 4096;

/// XML writer that batches small writes into one buffer
pub struct XmlWriter<W: Write> {
    writer: W,
    buffer: Vec<u8>,
    ints: itoa::Buffer,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_buffer(writer, Vec::with_capacity(8192))
    }

    /// Reuse an existing buffer allocation; its contents are discarded
    pub fn with_buffer(writer: W, mut buffer: Vec<u8>) -> Self {
        buffer.clear();
        XmlWriter {
            writer,
            buffer,
            ints: itoa::Buffer::new(),
        }
    }

    /// Give the buffer back for reuse. Call after [`XmlWriter::flush`].
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }

    /// Write raw bytes directly
    #[inline]
    pub fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        if self.buffer.len() > FLUSH_THRESHOLD {
            self.flush_buffer()?;
        }
        Ok(())
    }

    /// Write string data without escaping
    #[inline]
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_raw(s.as_bytes())
    }

    /// Write an integer in decimal
    #[inline]
    pub fn write_int(&mut self, value: u64) -> Result<()> {
        let digits = self.ints.format(value);
        self.buffer.extend_from_slice(digits.as_bytes());
        Ok(())
    }

    #[inline]
    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.write_raw(b"<")?;
        self.write_str(name)
    }

    #[inline]
    pub fn end_element(&mut self, name: &str) -> Result<()> {
        self.write_raw(b"</")?;
        self.write_str(name)?;
        self.write_raw(b">")
    }

    #[inline]
    pub fn close_start_tag(&mut self) -> Result<()> {
        self.write_raw(b">")
    }

    /// Close a start tag as a self-closing element
    #[inline]
    pub fn close_empty(&mut self) -> Result<()> {
        self.write_raw(b"/>")
    }

    /// Write attribute with escaped value
    #[inline]
    pub fn attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.write_raw(b" ")?;
        self.write_str(name)?;
        self.write_raw(b"=\"")?;
        self.escape_into_buffer(value, false);
        self.write_raw(b"\"")
    }

    /// Write attribute with integer value
    #[inline]
    pub fn attribute_int(&mut self, name: &str, value: u64) -> Result<()> {
        self.write_raw(b" ")?;
        self.write_str(name)?;
        self.write_raw(b"=\"")?;
        self.write_int(value)?;
        self.write_raw(b"\"")
    }

    /// `<name>escaped text</name>`
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start_element(name)?;
        self.close_start_tag()?;
        self.write_escaped(text)?;
        self.end_element(name)
    }

    /// Write text content with XML escaping
    ///
    /// Control characters XML 1.0 cannot carry are written in the
    /// spreadsheet `_xHHHH_` form. A literal `_xHHHH_` in the text gets its
    /// underscore escaped as `_x005F_` so readers do not decode it.
    pub fn write_escaped(&mut self, text: &str) -> Result<()> {
        self.escape_into_buffer(text, true);
        if self.buffer.len() > FLUSH_THRESHOLD {
            self.flush_buffer()?;
        }
        Ok(())
    }

    fn escape_into_buffer(&mut self, text: &str, cell_text: bool) {
        let bytes = text.as_bytes();
        for (i, ch) in text.char_indices() {
            match ch {
                '&' => self.buffer.extend_from_slice(b"&amp;"),
                '<' => self.buffer.extend_from_slice(b"&lt;"),
                '>' => self.buffer.extend_from_slice(b"&gt;"),
                '"' => self.buffer.extend_from_slice(b"&quot;"),
                '\'' => self.buffer.extend_from_slice(b"&apos;"),
                '\t' | '\n' | '\r' => self.buffer.push(ch as u8),
                '_' if cell_text && escape_sequence_at(bytes, i).is_some() => {
                    self.buffer.extend_from_slice(b"_x005F_");
                }
                c if (c as u32) < 0x20 => {
                    self.buffer
                        .extend_from_slice(format!("_x{:04X}_", c as u32).as_bytes());
                }
                c => {
                    let mut utf8 = [0u8; 4];
                    self.buffer
                        .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                }
            }
        }
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Flush buffer to underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.flush_buffer()?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Code point of an `_xHHHH_` sequence starting at byte `i`, if there is one
fn escape_sequence_at(bytes: &[u8], i: usize) -> Option<u32> {
    let seq = bytes.get(i..i + 7)?;
    if seq[0] != b'_' || seq[1] != b'x' || seq[6] != b'_' {
        return None;
    }
    let hex = std::str::from_utf8(&seq[2..6]).ok()?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Decode `_xHHHH_` sequences in xlsx cell text
///
/// Inverse of the escaping done by [`XmlWriter::write_escaped`]. Sequences
/// are decoded in a single left-to-right pass, so `_x005F_x0041_` becomes
/// the literal `_x0041_`.
pub(crate) fn decode_escapes(text: &str) -> Cow<'_, str> {
    if !text.contains("_x") {
        return Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if let Some(ch) = escape_sequence_at(bytes, i).and_then(char::from_u32) {
            out.push(ch);
            i += 7;
            continue;
        }
        // i is always on a char boundary: escapes are pure ASCII
        let ch = text[i..].chars().next().unwrap_or('\u{FFFD}');
        out.push(ch);
        i += ch.len_utf8();
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_writer() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);

        writer.start_element("row").unwrap();
        writer.attribute_int("r", 12).unwrap();
        writer.close_start_tag().unwrap();
        writer.text_element("t", "a<b").unwrap();
        writer.end_element("row").unwrap();
        writer.flush().unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "<row r=\"12\"><t>a&lt;b</t></row>"
        );
    }

    #[test]
    fn test_xml_escaping() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);

        writer.write_escaped("\"Ñoño\" & 'x'\u{1}").unwrap();
        writer.flush().unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "&quot;Ñoño&quot; &amp; &apos;x&apos;_x0001_"
        );
    }

    #[test]
    fn test_literal_escape_sequence_protected() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);

        writer.write_escaped("_x0041_ and _xZZ_").unwrap();
        writer.attribute("name", "_x0041_").unwrap();
        writer.flush().unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "_x005F_x0041_ and _xZZ_ name=\"_x0041_\""
        );
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_escapes("plain"), "plain");
        assert_eq!(decode_escapes("a_x0001_b"), "a\u{1}b");
        assert_eq!(decode_escapes("_x005F_x0041_"), "_x0041_");
        assert_eq!(decode_escapes("_x00e9_t_x00E9_"), "été");
        assert_eq!(decode_escapes("_xD800_ _x12_"), "_xD800_ _x12_");
        assert_eq!(decode_escapes("ñ_x"), "ñ_x");
    }
}
