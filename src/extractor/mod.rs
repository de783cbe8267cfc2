//! 見出し付きセクション抽出モジュール
//!
//! 文書を段落列として読み、タイトルに一致する段落の次から
//! 次の見出しらしい段落の手前までを1セクションとして取り出す。
//!
//! 文書形式ごとの読み込みは `SectionExtractor::paragraphs` で差し替える。

mod docx;

pub use self::docx::DocxExtractor;

use crate::error::{AuditError, Result};
use crate::export::prepare_output_dir;
use crate::outcome::RunSummary;
use crate::scanner::{self, FileFilter};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};

lazy_static! {
    /// 段落頭の列挙記号: "IV." "12." "(a)"
    static ref ENUMERATOR_RE: Regex = Regex::new(r"^(?:[IVX]+\.|\d+\.|\([a-zA-Z]\))").unwrap();
    static ref DOC_NUMBER_RE: Regex = Regex::new(r"^\d{6}$").unwrap();
}

/// 見出しとみなす段落の最大文字数（未満）
const HEADING_MAX_CHARS: usize = 100;
/// 出力ファイル名に使うタイトルの最大文字数
const TITLE_MAX_CHARS: usize = 50;

/// 抽出されたセクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// 一致した見出し段落（原文のまま）
    pub title: String,
    /// 本文（段落を改行で連結）
    pub text: String,
}

/// 文書からセクションを取り出す能力
pub trait SectionExtractor {
    /// 対象拡張子（ドットなし）
    fn extension(&self) -> &str;

    /// 空でない段落を前後の空白を除いて返す
    fn paragraphs(&self, document: &Path) -> Result<Vec<String>>;

    fn extract(&self, document: &Path, title_pattern: &Regex) -> Result<Option<Section>> {
        let paragraphs = self.paragraphs(document)?;
        Ok(find_section(&paragraphs, title_pattern))
    }
}

/// プレーンテキスト: 空行区切りではなく1行を1段落として扱う
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl SectionExtractor for PlainTextExtractor {
    fn extension(&self) -> &str {
        "txt"
    }

    fn paragraphs(&self, document: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(document)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// 見出しらしい段落か
pub fn is_heading_like(paragraph: &str) -> bool {
    if paragraph.chars().count() >= HEADING_MAX_CHARS {
        return false;
    }
    paragraph.ends_with(':') || paragraph.ends_with('।') || ENUMERATOR_RE.is_match(paragraph)
}

/// 段落列からセクションを探す
///
/// 本文が1段落もなければ None。
pub fn find_section(paragraphs: &[String], title_pattern: &Regex) -> Option<Section> {
    let start = paragraphs.iter().position(|p| title_pattern.is_match(p))?;
    let title = paragraphs[start].clone();

    let body: Vec<&str> = paragraphs[start + 1..]
        .iter()
        .take_while(|p| !is_heading_like(p))
        .map(String::as_str)
        .collect();

    if body.is_empty() {
        return None;
    }

    Some(Section {
        title,
        text: body.join("\n"),
    })
}

/// ファイル名に使えない文字を除き、先頭50文字に切り詰める
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .take(TITLE_MAX_CHARS)
        .collect()
}

/// ファイル名の語幹がちょうど6桁の数字ならそれを文書番号とする
pub fn document_number(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    DOC_NUMBER_RE.is_match(stem).then(|| stem.to_string())
}

/// タイトルパターンを大文字小文字無視でコンパイル
pub fn compile_title_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    if patterns.is_empty() {
        return Err(AuditError::Config("タイトルパターンを1つ以上指定してください".into()));
    }
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(AuditError::from)
        })
        .collect()
}

/// 抽出結果をヘッダー付きで保存
pub fn save_section(
    output_dir: &Path,
    doc_number: &str,
    source_name: &str,
    section: &Section,
) -> Result<PathBuf> {
    let file_name = format!("{}_{}.txt", doc_number, sanitize_title(&section.title));
    let path = output_dir.join(file_name);

    let content = format!(
        "Source Document: {}\nOriginal Title: {}\nExtraction Date: {}\n\n{}",
        source_name,
        section.title,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        section.text
    );
    std::fs::write(&path, content)?;
    Ok(path)
}

/// 抽出オプション
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub target_dir: PathBuf,
    pub output_dir: PathBuf,
    pub title_patterns: Vec<String>,
    pub recursive: bool,
}

/// 対象フォルダの文書からセクションを抽出して保存
///
/// `processed` は読み込めた文書数、`skipped` は読み込みに失敗した文書数。
pub fn run(options: &ExtractOptions, extractor: &dyn SectionExtractor) -> Result<RunSummary> {
    let patterns = compile_title_patterns(&options.title_patterns)?;
    scanner::ensure_dir(&options.target_dir)?;
    prepare_output_dir(&options.output_dir)?;

    let suffix = format!(".{}", extractor.extension());
    let documents: Vec<(PathBuf, String)> =
        scanner::walk_files(&options.target_dir, FileFilter::Suffix(suffix), options.recursive)?
            .filter_map(|path| document_number(&path).map(|n| (path, n)))
            .collect();

    let mut summary = RunSummary::default();
    if documents.is_empty() {
        tracing::warn!("6桁の数字のファイル名を持つ文書が見つかりません");
        return Ok(summary);
    }

    tracing::info!("{}件の文書を処理します", documents.len());
    let mut extractions = 0;

    for (index, (path, doc_number)) in documents.iter().enumerate() {
        let source_name = scanner::file_name_of(path);
        tracing::info!("処理中: {} ({}/{})", source_name, index + 1, documents.len());

        let paragraphs = match extractor.paragraphs(path) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("文書を読み込めません: {} ({})", path.display(), e);
                summary.skipped += 1;
                continue;
            }
        };
        summary.processed += 1;

        for pattern in &patterns {
            let Some(section) = find_section(&paragraphs, pattern) else {
                tracing::debug!("パターン '{}' は {} に見つかりません", pattern, source_name);
                continue;
            };
            match save_section(&options.output_dir, doc_number, &source_name, &section) {
                Ok(saved) => {
                    extractions += 1;
                    tracing::info!("保存: {}", saved.display());
                }
                Err(e) => tracing::error!("保存に失敗: {} ({})", section.title, e),
            }
        }
    }

    tracing::info!(
        "抽出完了: {}文書から{}セクション",
        summary.processed,
        extractions
    );
    Ok(summary)
}
