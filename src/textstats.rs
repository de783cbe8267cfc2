//! コーパスのテキスト統計
//!
//! 文数・語数（英字のみ、小文字化）・異なり語数・平均文長を求める。
//! 異なり語数はファイル単位とコーパス全体（全ファイルの和集合）の両方。

use crate::error::Result;
use crate::export::{self, format_float, prepare_output_file};
use crate::outcome::RunSummary;
use crate::scanner::{self, FileFilter};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use textaudit_common::ReportKind;

lazy_static! {
    static ref SENTENCE_END_RE: Regex = Regex::new(r"[.!?।]+").unwrap();
    static ref WORD_RE: Regex = Regex::new(r"\p{Alphabetic}+").unwrap();
}

/// 文分割・単語分割
pub trait Tokenizer {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;

    /// 英字のみからなる語を小文字化して返す
    fn words(&self, text: &str) -> Vec<String>;
}

/// 正規表現による簡易トークナイザ
///
/// 文末記号（. ! ? ।）で文を区切り、連続する英字を1語とする。
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        SENTENCE_END_RE
            .split(text)
            .map(str::trim)
            .filter(|s| s.chars().any(char::is_alphanumeric))
            .collect()
    }

    fn words(&self, text: &str) -> Vec<String> {
        WORD_RE
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }
}

/// 1ファイル分の統計
#[derive(Debug, Clone, PartialEq)]
pub struct TextStats {
    pub file_path: String,
    pub num_sentences: usize,
    pub num_tokens: usize,
    pub num_unique_words: usize,
    pub avg_sentence_length: f64,
}

/// コーパス全体の統計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusStats {
    pub files: usize,
    pub num_sentences: usize,
    pub num_tokens: usize,
    pub num_unique_words: usize,
    pub avg_sentence_length: f64,
}

fn average(tokens: usize, sentences: usize) -> f64 {
    if sentences == 0 {
        0.0
    } else {
        tokens as f64 / sentences as f64
    }
}

/// テキスト1件を解析（語彙はコーパスの集合にも追加）
pub fn analyze_text(
    file_path: &str,
    text: &str,
    tokenizer: &dyn Tokenizer,
    vocabulary: &mut HashSet<String>,
) -> TextStats {
    let num_sentences = tokenizer.sentences(text).len();
    let words = tokenizer.words(text);
    let unique: HashSet<&str> = words.iter().map(String::as_str).collect();

    let stats = TextStats {
        file_path: file_path.to_string(),
        num_sentences,
        num_tokens: words.len(),
        num_unique_words: unique.len(),
        avg_sentence_length: average(words.len(), num_sentences),
    };
    vocabulary.extend(words);
    stats
}

/// UTF-8として読めない部分は置換文字にして読む
fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Debug, Clone)]
pub struct StatsOptions {
    pub directory: PathBuf,
    pub output_file: Option<PathBuf>,
    pub precision: usize,
}

pub fn run(options: &StatsOptions, tokenizer: &dyn Tokenizer) -> Result<(RunSummary, CorpusStats)> {
    if let Some(output) = &options.output_file {
        prepare_output_file(output)?;
    }
    let files: Vec<PathBuf> =
        scanner::walk_files(&options.directory, FileFilter::text_files(), true)?.collect();

    let mut summary = RunSummary::default();
    if files.is_empty() {
        tracing::warn!("テキストファイルがありません: {}", options.directory.display());
        return Ok((summary, CorpusStats::default()));
    }
    tracing::info!("{}件のテキストファイルを処理します", files.len());

    let mut vocabulary: HashSet<String> = HashSet::new();
    let mut per_file: Vec<TextStats> = Vec::with_capacity(files.len());

    for path in &files {
        let text = match read_lossy(path) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("読み込めないためスキップ: {} ({})", path.display(), e);
                summary.skipped += 1;
                continue;
            }
        };
        let stats = analyze_text(&path.display().to_string(), &text, tokenizer, &mut vocabulary);
        tracing::debug!("{:?}", stats);
        per_file.push(stats);
        summary.processed += 1;
    }

    let num_sentences = per_file.iter().map(|s| s.num_sentences).sum();
    let num_tokens = per_file.iter().map(|s| s.num_tokens).sum();
    let corpus = CorpusStats {
        files: per_file.len(),
        num_sentences,
        num_tokens,
        num_unique_words: vocabulary.len(),
        avg_sentence_length: average(num_tokens, num_sentences),
    };

    if let Some(output) = &options.output_file {
        let precision = options.precision;
        export::write_table(
            output,
            ReportKind::TextStats,
            &[],
            per_file.iter().map(|s| {
                vec![
                    s.file_path.clone(),
                    s.num_sentences.to_string(),
                    s.num_tokens.to_string(),
                    s.num_unique_words.to_string(),
                    format_float(Some(s.avg_sentence_length), precision),
                ]
            }),
        )?;
        tracing::info!("ファイル別統計を保存: {}", output.display());
    }

    Ok((summary, corpus))
}
