//! Minimal WordprocessingML writer: paragraphs, headings, bullets and bordered
//! tables, packaged into a `.docx` ZIP.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::RenderError;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Header cell shading.
const HEADER_FILL: &str = "D9E2F3";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// A4 with 2 cm margins (twentieths of a point).
const SECTION_PROPERTIES: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#;

/// Accumulates `w:body` content.
#[derive(Debug, Default)]
pub struct BodyBuilder {
    xml: String,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.xml.push_str(r#"<w:p><w:pPr><w:jc w:val="center"/><w:spacing w:after="240"/></w:pPr>"#);
        self.xml.push_str(&run(text, RunStyle::bold(32)));
        self.xml.push_str("</w:p>");
        self
    }

    pub fn heading(&mut self, text: &str) -> &mut Self {
        self.xml.push_str(r#"<w:p><w:pPr><w:spacing w:before="240" w:after="120"/></w:pPr>"#);
        self.xml.push_str(&run(text, RunStyle::bold(24)));
        self.xml.push_str("</w:p>");
        self
    }

    /// One paragraph; newlines inside `text` become line breaks. Blank text adds nothing.
    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        if !text.trim().is_empty() {
            self.xml.push_str("<w:p>");
            self.xml.push_str(&run(text, RunStyle::plain()));
            self.xml.push_str("</w:p>");
        }
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        if !text.trim().is_empty() {
            self.xml.push_str(r#"<w:p><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr>"#);
            self.xml.push_str(&run(&format!("• {}", text.trim()), RunStyle::plain()));
            self.xml.push_str("</w:p>");
        }
        self
    }

    /// Table whose first row is a shaded header.
    pub fn grid_table(&mut self, headers: &[&str], rows: &[Vec<&str>]) -> &mut Self {
        self.open_table();
        self.xml.push_str("<w:tr>");
        for header in headers {
            self.cell(header, true);
        }
        self.xml.push_str("</w:tr>");
        for row in rows {
            self.xml.push_str("<w:tr>");
            for value in row {
                self.cell(value, false);
            }
            self.xml.push_str("</w:tr>");
        }
        self.xml.push_str("</w:tbl>");
        self.spacer()
    }

    /// Two-column table: shaded label, value.
    pub fn key_value_table<V: AsRef<str>>(&mut self, rows: &[(&str, V)]) -> &mut Self {
        self.open_table();
        for (label, value) in rows {
            self.xml.push_str("<w:tr>");
            self.cell(label, true);
            self.cell(value.as_ref(), false);
            self.xml.push_str("</w:tr>");
        }
        self.xml.push_str("</w:tbl>");
        self.spacer()
    }

    pub fn into_xml(self) -> String {
        self.xml
    }

    fn open_table(&mut self) {
        self.xml.push_str(
            r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:left w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:right w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="000000"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="000000"/></w:tblBorders></w:tblPr>"#,
        );
    }

    fn cell(&mut self, text: &str, header: bool) {
        self.xml.push_str("<w:tc>");
        if header {
            self.xml.push_str(&format!(
                r#"<w:tcPr><w:shd w:val="clear" w:color="auto" w:fill="{HEADER_FILL}"/></w:tcPr>"#
            ));
        }
        // A cell must hold at least one paragraph, even when empty.
        self.xml.push_str("<w:p>");
        if !text.is_empty() {
            let style = if header { RunStyle::bold(20) } else { RunStyle::sized(20) };
            self.xml.push_str(&run(text, style));
        }
        self.xml.push_str("</w:p></w:tc>");
    }

    fn spacer(&mut self) -> &mut Self {
        self.xml.push_str("<w:p/>");
        self
    }
}

#[derive(Clone, Copy)]
struct RunStyle {
    bold: bool,
    /// Half-points.
    size: Option<u32>,
}

impl RunStyle {
    fn plain() -> Self {
        Self { bold: false, size: None }
    }

    fn sized(size: u32) -> Self {
        Self { bold: false, size: Some(size) }
    }

    fn bold(size: u32) -> Self {
        Self { bold: true, size: Some(size) }
    }
}

fn run(text: &str, style: RunStyle) -> String {
    let mut xml = String::from("<w:r>");
    if style.bold || style.size.is_some() {
        xml.push_str("<w:rPr>");
        if style.bold {
            xml.push_str("<w:b/>");
        }
        if let Some(size) = style.size {
            xml.push_str(&format!(r#"<w:sz w:val="{size}"/>"#));
        }
        xml.push_str("</w:rPr>");
    }
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape(line.trim_end_matches('\r')));
        xml.push_str("</w:t>");
    }
    xml.push_str("</w:r>");
    xml
}

/// Wraps body XML into a complete `.docx` package.
pub fn package_document(body_xml: &str) -> Result<Vec<u8>, RenderError> {
    let document_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body_xml}{SECTION_PROPERTIES}</w:body></w:document>"#
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS_XML),
        ("word/document.xml", document_xml.as_str()),
    ] {
        writer.start_file(name, options)?;
        writer.write_all(content.as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}
