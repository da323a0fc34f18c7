//! Text extraction from uploaded PDF and DOCX documents.
//!
//! Every document in a batch is handled independently: a file that cannot be
//! parsed, or whose format is not supported, produces a warning naming the
//! file and the batch continues with the rest.

use crate::types::{DocumentFormat, SourceRecord, UploadedDocument};
use docqa_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::panic::{self, AssertUnwindSafe};

/// Result of extracting a batch of documents.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    /// Text of all readable documents, concatenated in upload order
    pub text: String,

    /// One message per skipped document
    pub warnings: Vec<String>,

    /// Number of documents that were read successfully
    pub extracted_files: usize,

    /// Provenance of each successfully read document
    pub sources: Vec<SourceRecord>,
}

/// Extract and concatenate the text of a batch of documents.
pub fn extract_documents(documents: &[UploadedDocument]) -> ExtractionOutcome {
    let mut outcome = ExtractionOutcome::default();

    for document in documents {
        let result = DocumentFormat::from_name(&document.name)
            .and_then(|format| extract_text(document, format).map(|text| (format, text)));

        match result {
            Ok((format, text)) => {
                tracing::debug!(
                    "Extracted {} chars from '{}' ({})",
                    text.chars().count(),
                    document.name,
                    format
                );
                outcome.text.push_str(&text);
                outcome.extracted_files += 1;
                outcome.sources.push(SourceRecord {
                    name: document.name.clone(),
                    format,
                    size_bytes: document.bytes.len() as u64,
                    sha256: format!("{:x}", Sha256::digest(&document.bytes)),
                });
            }
            Err(e) => {
                tracing::warn!("Skipping '{}': {}", document.name, e);
                outcome.warnings.push(e.to_string());
            }
        }
    }

    tracing::info!(
        "Extracted {} of {} documents ({} chars)",
        outcome.extracted_files,
        documents.len(),
        outcome.text.chars().count()
    );

    outcome
}

/// Extract the text of one document.
///
/// A zero-byte document yields an empty string.
pub fn extract_text(document: &UploadedDocument, format: DocumentFormat) -> AppResult<String> {
    if document.bytes.is_empty() {
        return Ok(String::new());
    }

    let bytes = document.bytes.as_slice();
    let result = panic::catch_unwind(AssertUnwindSafe(|| match format {
        DocumentFormat::Pdf => extract_pdf(bytes),
        DocumentFormat::Docx => extract_docx(bytes),
    }));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(message)) => Err(AppError::Extraction {
            file: document.name.clone(),
            message,
        }),
        Err(_) => Err(AppError::Extraction {
            file: document.name.clone(),
            message: format!("{} parser aborted on malformed input", format),
        }),
    }
}

/// Page texts, each followed by a newline.
fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())?;

    let mut text = String::new();
    for page in pages {
        text.push_str(&page);
        text.push('\n');
    }
    Ok(text)
}

/// Top-level paragraph texts, each followed by a newline.
fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let doc = docx_rs::read_docx(bytes).map_err(|e| e.to_string())?;

    let mut text = String::new();
    for child in doc.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            for child in p.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(t) = child {
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
    use crate::tests::{docx_bytes, pdf_bytes};

    #[test]
    fn test_empty_files_contribute_nothing() {
        let docs = vec![
            UploadedDocument::new("empty.pdf", Vec::new()),
            UploadedDocument::new("empty.docx", Vec::new()),
        ];

        let outcome = extract_documents(&docs);
        assert_eq!(outcome.text, "");
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.extracted_files, 2);
    }

    #[test]
    fn test_docx_paragraphs_are_newline_terminated() {
        let doc = UploadedDocument::new(
            "policy.docx",
            docx_bytes(&["Invoices must be approved within 48 hours.", "Second rule."]),
        );

        let text = extract_text(&doc, DocumentFormat::Docx).unwrap();
        assert_eq!(
            text,
            "Invoices must be approved within 48 hours.\nSecond rule.\n"
        );
    }

    #[test]
    fn test_pdf_pages_are_newline_terminated_in_order() {
        let doc = UploadedDocument::new(
            "policy.pdf",
            pdf_bytes(&["Invoices must be approved within 48 hours.", "Second page rule."]),
        );

        let outcome = extract_documents(&[doc]);
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        assert_eq!(outcome.extracted_files, 1);
        assert_eq!(outcome.sources[0].format, DocumentFormat::Pdf);

        let text = outcome.text;
        let first = text
            .find("Invoices must be approved within 48 hours.\n")
            .unwrap();
        let second = text.find("Second page rule.\n").unwrap();
        assert!(first < second);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_corrupt_file_is_reported_and_batch_continues() {
        let docs = vec![
            UploadedDocument::new("broken.pdf", b"%PDF-1.4 this is not a pdf".to_vec()),
            UploadedDocument::new("good.docx", docx_bytes(&["Valid content."])),
        ];

        let outcome = extract_documents(&docs);
        assert_eq!(outcome.text, "Valid content.\n");
        assert_eq!(outcome.extracted_files, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("broken.pdf"));
        assert!(!outcome.warnings[0].contains("good.docx"));
    }

    #[test]
    fn test_unsupported_format_is_a_warning() {
        let docs = vec![
            UploadedDocument::new("notes.txt", b"plain text".to_vec()),
            UploadedDocument::new("a.docx", docx_bytes(&["A"])),
        ];

        let outcome = extract_documents(&docs);
        assert_eq!(outcome.text, "A\n");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("notes.txt"));
        assert!(outcome.warnings[0].contains("Unsupported"));
    }

    #[test]
    fn test_text_is_concatenated_in_upload_order() {
        let docs = vec![
            UploadedDocument::new("b.docx", docx_bytes(&["Second upload."])),
            UploadedDocument::new("a.docx", docx_bytes(&["First upload?"])),
        ];

        let outcome = extract_documents(&docs);
        assert_eq!(outcome.text, "Second upload.\nFirst upload?\n");
    }

    #[test]
    fn test_sources_record_digest() {
        let bytes = docx_bytes(&["x"]);
        let expected = format!("{:x}", Sha256::digest(&bytes));
        let outcome = extract_documents(&[UploadedDocument::new("x.docx", bytes.clone())]);

        assert_eq!(outcome.sources.len(), 1);
        let source = &outcome.sources[0];
        assert_eq!(source.name, "x.docx");
        assert_eq!(source.format, DocumentFormat::Docx);
        assert_eq!(source.size_bytes, bytes.len() as u64);
        assert_eq!(source.sha256, expected);
        assert_eq!(source.sha256.len(), 64);
    }
}
