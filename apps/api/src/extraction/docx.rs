//! DOCX text extraction: reads `word/document.xml` out of the package and
//! flattens it to lines.
//!
//! Output order: body paragraphs, then table rows (`" | "` between cells),
//! then list/bullet paragraphs a second time. The repeat is intentional; the
//! extraction prompt expects bullet lines.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{ExtractionError, EXTRACTION_TIMEOUT};

/// Decompressed size cap for `word/document.xml`.
pub const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

const BULLET_MARKERS: [char; 3] = ['*', '-', '•'];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Paragraph {
    /// Paragraph style id (`w:pStyle`), e.g. `ListBullet`.
    pub style: Option<String>,
    pub text: String,
}

impl Paragraph {
    fn is_list_item(&self) -> bool {
        let text = self.text.trim();
        !text.is_empty()
            && (self.style.as_deref().is_some_and(|s| s.starts_with("List"))
                || text.starts_with(BULLET_MARKERS))
    }
}

/// Body-level content. Paragraphs inside tables live in `tables`, never in `paragraphs`.
#[derive(Debug, Default)]
pub struct DocxBody {
    pub paragraphs: Vec<Paragraph>,
    /// Top-level tables as rows of cell texts; nested tables fold into their cell.
    pub tables: Vec<Vec<Vec<String>>>,
}

/// Runs `extract_docx` on the blocking pool under `EXTRACTION_TIMEOUT`.
pub async fn extract_docx_off_runtime(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    tokio::time::timeout(
        EXTRACTION_TIMEOUT,
        tokio::task::spawn_blocking(move || extract_docx(&bytes)),
    )
    .await
    .map_err(|_| ExtractionError::Docx("DOCX extraction timed out".to_string()))?
    .map_err(|e| ExtractionError::Docx(format!("task join error: {e}")))?
}

pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let xml = read_document_xml(bytes, MAX_DOCUMENT_XML_BYTES)?;
    let body = parse_document_xml(&xml)?;
    Ok(flatten(&body))
}

fn read_document_xml(bytes: &[u8], max_len: u64) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(format!("not a DOCX package: {e}")))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::Docx(format!("missing word/document.xml: {e}")))?;

    // The declared size comes from the upload and may lie; `take` bounds the read either way.
    if entry.size() > max_len {
        return Err(document_too_large(entry.size()));
    }
    let mut xml = String::new();
    entry.by_ref().take(max_len + 1).read_to_string(&mut xml)?;
    if xml.len() as u64 > max_len {
        return Err(document_too_large(xml.len() as u64));
    }
    Ok(xml)
}

fn document_too_large(len: u64) -> ExtractionError {
    ExtractionError::Docx(format!("document.xml too large ({len} bytes)"))
}

fn flatten(body: &DocxBody) -> String {
    let mut lines: Vec<String> = body
        .paragraphs
        .iter()
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();

    for row in body.tables.iter().flatten() {
        let cells: Vec<&str> = row
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if !cells.is_empty() {
            lines.push(cells.join(" | "));
        }
    }

    lines.extend(
        body.paragraphs
            .iter()
            .filter(|p| p.is_list_item())
            .map(|p| p.text.trim().to_string()),
    );

    lines.join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// WordprocessingML walker
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Walker {
    body: DocxBody,
    table_depth: usize,
    row: Option<Vec<String>>,
    /// Paragraph texts of the current top-level cell.
    cell: Option<Vec<String>>,
    /// Open paragraphs; more than one only for text boxes, whose text is dropped.
    paragraphs: Vec<Paragraph>,
    in_run: bool,
    in_text: bool,
}

pub fn parse_document_xml(xml: &str) -> Result<DocxBody, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut walker = Walker::default();

    loop {
        match reader.read_event().map_err(docx_error)? {
            Event::Start(e) => walker.open(&e)?,
            Event::Empty(e) => walker.empty(&e)?,
            Event::Text(t) => {
                if walker.in_text {
                    let text = t.unescape().map_err(docx_error)?;
                    walker.push_text(&text);
                }
            }
            Event::End(e) => walker.close(e.name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(walker.body)
}

impl Walker {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), ExtractionError> {
        match e.name().as_ref() {
            b"w:tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.body.tables.push(Vec::new());
                }
            }
            b"w:tr" if self.table_depth == 1 => self.row = Some(Vec::new()),
            b"w:tc" if self.table_depth == 1 => self.cell = Some(Vec::new()),
            b"w:p" => self.paragraphs.push(Paragraph::default()),
            b"w:r" => self.in_run = true,
            b"w:t" => self.in_text = true,
            b"w:pStyle" => self.set_style(e)?,
            _ => {}
        }
        Ok(())
    }

    fn empty(&mut self, e: &BytesStart<'_>) -> Result<(), ExtractionError> {
        match e.name().as_ref() {
            b"w:pStyle" => self.set_style(e)?,
            b"w:tab" if self.in_run => self.push_text("\t"),
            b"w:br" | b"w:cr" if self.in_run => self.push_text("\n"),
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:r" => self.in_run = false,
            b"w:p" => self.close_paragraph(),
            b"w:tc" if self.table_depth == 1 => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.push(cell.join("\n"));
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                if let (Some(row), Some(table)) = (self.row.take(), self.body.tables.last_mut()) {
                    table.push(row);
                }
            }
            b"w:tbl" => self.table_depth = self.table_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn close_paragraph(&mut self) {
        let Some(paragraph) = self.paragraphs.pop() else {
            return;
        };
        if !self.paragraphs.is_empty() {
            return;
        }
        if self.table_depth == 0 {
            self.body.paragraphs.push(paragraph);
        } else if let Some(cell) = self.cell.as_mut() {
            cell.push(paragraph.text);
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraphs.last_mut() {
            paragraph.text.push_str(text);
        }
    }

    fn set_style(&mut self, e: &BytesStart<'_>) -> Result<(), ExtractionError> {
        let Some(attr) = e.try_get_attribute("w:val").map_err(docx_error)? else {
            return Ok(());
        };
        let style = attr.unescape_value().map_err(docx_error)?.into_owned();
        if let Some(paragraph) = self.paragraphs.last_mut() {
            paragraph.style = Some(style);
        }
        Ok(())
    }
}

fn docx_error(e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Docx(format!("malformed document.xml: {e}"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::render::docx::package_document;

    fn run(text: &str) -> String {
        format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#)
    }

    fn para(text: &str) -> String {
        format!("<w:p>{}</w:p>", run(text))
    }

    fn styled(style: &str, text: &str) -> String {
        format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr>{}</w:p>"#,
            run(text)
        )
    }

    fn cell(text: &str) -> String {
        if text.is_empty() {
            "<w:tc><w:p/></w:tc>".to_string()
        } else {
            format!("<w:tc>{}</w:tc>", para(text))
        }
    }

    #[test]
    fn test_paragraphs_tables_then_repeated_bullets() {
        let body = [
            para("Name: Jane Doe"),
            styled("ListBullet", "Led household survey"),
            para(" - Wrote final report "),
            "<w:p/>".to_string(),
            para("   "),
            format!(
                "<w:tbl><w:tr>{}{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl>",
                cell("University X"),
                cell(""),
                cell("MSc"),
                cell(""),
                cell("")
            ),
            para("Nationality: Kenyan"),
        ]
        .concat();
        let bytes = package_document(&body).unwrap();

        let text = extract_docx(&bytes).unwrap();

        assert_eq!(
            text,
            "Name: Jane Doe\n\
             Led household survey\n\
             - Wrote final report\n\
             Nationality: Kenyan\n\
             University X | MSc\n\
             Led household survey\n\
             - Wrote final report"
        );
    }

    #[test]
    fn test_runs_tabs_breaks_and_entities() {
        let body = r#"<w:p>
            <w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
            <w:r><w:t>R&amp;D</w:t><w:tab/><w:t>Lead</w:t></w:r>
            <w:r><w:br/><w:t>Nairobi</w:t></w:r>
        </w:p>"#;
        let parsed = parse_document_xml(&wrap(body)).unwrap();
        assert_eq!(parsed.paragraphs.len(), 1);
        assert_eq!(parsed.paragraphs[0].text, "R&D\tLead\nNairobi");
    }

    #[test]
    fn test_multi_paragraph_cell_joins_with_newline() {
        let body = format!(
            "<w:tbl><w:tr><w:tc>{}{}</w:tc>{}</w:tr></w:tbl>",
            para("Line one"),
            para("Line two"),
            cell("2020")
        );
        let parsed = parse_document_xml(&wrap(&body)).unwrap();
        assert!(parsed.paragraphs.is_empty());
        assert_eq!(
            parsed.tables,
            vec![vec![vec!["Line one\nLine two".to_string(), "2020".to_string()]]]
        );
    }

    #[test]
    fn test_nested_table_folds_into_outer_cell() {
        let inner = format!("<w:tbl><w:tr>{}</w:tr></w:tbl>", cell("inner"));
        let body = format!(
            "<w:tbl><w:tr><w:tc>{}{}</w:tc></w:tr></w:tbl>",
            para("outer"),
            inner
        );
        let parsed = parse_document_xml(&wrap(&body)).unwrap();
        assert_eq!(parsed.tables.len(), 1);
        assert_eq!(parsed.tables[0], vec![vec!["outer\ninner".to_string()]]);
    }

    #[test]
    fn test_list_detection() {
        let item = |style: Option<&str>, text: &str| Paragraph {
            style: style.map(String::from),
            text: text.to_string(),
        };
        assert!(item(Some("ListParagraph"), "Item").is_list_item());
        assert!(item(None, "• Item").is_list_item());
        assert!(item(None, "  * Item").is_list_item());
        assert!(!item(Some("ListParagraph"), "  ").is_list_item());
        assert!(!item(Some("Heading1"), "Item").is_list_item());
    }

    #[test]
    fn test_package_without_document_part_is_error() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_docx(&bytes).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(ref msg) if msg.contains("word/document.xml")));
    }

    #[test]
    fn test_oversized_document_xml_is_rejected() {
        let body = format!("{}<w:p>{}</w:p>", para("Name: Jane Doe"), " ".repeat(8 * 1024));
        let bytes = package_document(&body).unwrap();

        let err = read_document_xml(&bytes, 4 * 1024).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(ref msg) if msg.contains("too large")));

        let xml = read_document_xml(&bytes, 64 * 1024).unwrap();
        assert!(xml.contains("Name: Jane Doe"));
    }

    #[tokio::test]
    async fn test_off_runtime_extraction_matches_inline() {
        let bytes = package_document(&para("Economist")).unwrap();
        let text = extract_docx_off_runtime(bytes.clone()).await.unwrap();
        assert_eq!(text, extract_docx(&bytes).unwrap());
        assert_eq!(text, "Economist");
    }

    #[test]
    fn test_non_zip_bytes_are_error() {
        assert!(matches!(
            extract_docx(b"plain text, not a package"),
            Err(ExtractionError::Docx(_))
        ));
    }

    fn wrap(body: &str) -> String {
        format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }
}
