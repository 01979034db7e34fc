use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum DocumentError {
    #[error("unsupported file format: {0} (only PDF and DOCX are accepted)")]
    UnsupportedFormat(String),

    #[error("could not extract text: {0}")]
    CorruptDocument(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Decides the format from the file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, DocumentError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err(DocumentError::UnsupportedFormat(filename.to_string())),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    fn magic(&self) -> &'static [u8] {
        match self {
            DocumentFormat::Pdf => b"%PDF",
            // DOCX is a zip container
            DocumentFormat::Docx => b"PK",
        }
    }
}

/// An uploaded file for the duration of one request.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub format: DocumentFormat,
    pub bytes: Bytes,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, bytes: Bytes) -> Result<Self, DocumentError> {
        let filename = filename.into();
        let format = DocumentFormat::from_filename(&filename)?;
        Ok(RawDocument {
            filename,
            format,
            bytes,
        })
    }
}

/// Extracts plain text from a PDF (pages in order) or DOCX (paragraphs in order).
pub fn load_text(doc: &RawDocument) -> Result<String, DocumentError> {
    if !doc.bytes.starts_with(doc.format.magic()) {
        return Err(DocumentError::CorruptDocument(format!(
            "'{}' is not a valid {:?} file",
            doc.filename, doc.format
        )));
    }

    let text = match doc.format {
        DocumentFormat::Pdf => extract_pdf(&doc.bytes)?,
        DocumentFormat::Docx => extract_docx(&doc.bytes)?,
    };

    if text.trim().is_empty() {
        return Err(DocumentError::CorruptDocument(format!(
            "no text found in '{}'",
            doc.filename
        )));
    }

    debug!(
        "Extracted {} chars from {} ({:?})",
        text.len(),
        doc.filename,
        doc.format
    );
    Ok(text)
}

fn extract_pdf(data: &[u8]) -> Result<String, DocumentError> {
    pdf_extract::extract_text_from_mem(data)
        .map_err(|e| DocumentError::CorruptDocument(format!("PDF parse failed: {e}")))
}

fn extract_docx(data: &[u8]) -> Result<String, DocumentError> {
    let docx = docx_rs::read_docx(data)
        .map_err(|e| DocumentError::CorruptDocument(format!("DOCX parse failed: {e}")))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for p_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = p_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn docx_bytes(paragraphs: &[&str]) -> Bytes {
        let mut docx = docx_rs::Docx::new();
        for p in paragraphs {
            docx = docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*p)),
            );
        }
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        Bytes::from(buf.into_inner())
    }

    /// Minimal PDF with one Helvetica text line per page; xref offsets are computed.
    fn pdf_bytes(pages: &[&str]) -> Bytes {
        let font_id = 3;
        let first_page_id = 4;
        let mut objects: Vec<String> = Vec::new();

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", first_page_id + 2 * i))
            .collect();
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ));
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());
        for (i, text) in pages.iter().enumerate() {
            let content_id = first_page_id + 2 * i + 1;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {content_id} 0 R >>"
            ));
            let stream = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        Bytes::from(out)
    }

    #[test]
    fn test_pdf_pages_in_order() {
        let bytes = pdf_bytes(&["Alpha page text", "Omega page text"]);
        let doc = RawDocument::new("two-pages.pdf", bytes).unwrap();
        let text = load_text(&doc).unwrap();

        let first = text.find("Alpha page text").expect("first page text");
        let second = text.find("Omega page text").expect("second page text");
        assert!(first < second);
    }

    #[test]
    fn test_txt_extension_is_unsupported() {
        let err = RawDocument::new("resume.txt", Bytes::from_static(b"hello")).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_extension_is_unsupported() {
        assert!(DocumentFormat::from_filename("resume").is_err());
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_filename("CV.PDF").unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_filename("cv.Docx").unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_pdf_without_magic_is_corrupt() {
        let doc = RawDocument::new("cv.pdf", Bytes::from_static(b"not a pdf")).unwrap();
        assert!(matches!(
            load_text(&doc),
            Err(DocumentError::CorruptDocument(_))
        ));
    }

    #[test]
    fn test_docx_without_zip_magic_is_corrupt() {
        let doc = RawDocument::new("cv.docx", Bytes::from_static(b"plain text")).unwrap();
        assert!(matches!(
            load_text(&doc),
            Err(DocumentError::CorruptDocument(_))
        ));
    }

    #[test]
    fn test_truncated_zip_is_corrupt() {
        let doc = RawDocument::new("cv.docx", Bytes::from_static(b"PK\x03\x04garbage")).unwrap();
        assert!(matches!(
            load_text(&doc),
            Err(DocumentError::CorruptDocument(_))
        ));
    }

    #[test]
    fn test_docx_paragraphs_in_document_order() {
        let bytes = docx_bytes(&["Jane Doe", "Skills", "Rust, SQL"]);
        let doc = RawDocument::new("jane.docx", bytes).unwrap();
        let text = load_text(&doc).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Jane Doe", "Skills", "Rust, SQL"]);
    }

    #[test]
    fn test_docx_without_text_is_corrupt() {
        let bytes = docx_bytes(&[""]);
        let doc = RawDocument::new("blank.docx", bytes).unwrap();
        assert!(matches!(
            load_text(&doc),
            Err(DocumentError::CorruptDocument(_))
        ));
    }
}
