//! Word文書（.docx）の段落読み込み

use super::SectionExtractor;
use crate::error::{AuditError, Result};
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
use std::path::Path;

/// docx-rs で本文の段落を読む（表の中の段落は対象外）
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl SectionExtractor for DocxExtractor {
    fn extension(&self) -> &str {
        "docx"
    }

    fn paragraphs(&self, document: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(document)?;
        let docx = docx_rs::read_docx(&bytes).map_err(|e| {
            AuditError::Document(format!("{} ({})", document.display(), e))
        })?;

        Ok(docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
                _ => None,
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect())
    }
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        collect_text(child, &mut text);
    }
    text
}

fn collect_text(child: &ParagraphChild, output: &mut String) {
    match child {
        ParagraphChild::Run(run) => {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => output.push_str(&t.text),
                    RunChild::Tab(_) => output.push('\t'),
                    _ => {}
                }
            }
        }
        ParagraphChild::Hyperlink(link) => {
            for inner in &link.children {
                collect_text(inner, output);
            }
        }
        _ => {}
    }
}
