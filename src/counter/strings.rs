//! 任意文字列の出現頻度
//!
//! ルート以下を再帰的に走査し、ファイル名が接頭辞に一致するファイルだけを数える。

use super::count_occurrences;
use crate::error::{AuditError, Result};
use crate::export::{self, prepare_output_file};
use crate::outcome::RunSummary;
use crate::scanner::{self, FileFilter};
use std::path::PathBuf;
use textaudit_common::ReportKind;

#[derive(Debug, Clone)]
pub struct CountStringsOptions {
    pub root_dir: PathBuf,
    pub file_prefix: String,
    pub strings: Vec<String>,
    pub output_file: PathBuf,
}

/// 文字列ごとの合計出現回数（指定順）
pub fn count_in_files(
    files: impl IntoIterator<Item = PathBuf>,
    strings: &[String],
) -> (Vec<(String, usize)>, RunSummary) {
    let mut totals: Vec<(String, usize)> = strings.iter().map(|s| (s.clone(), 0)).collect();
    let mut summary = RunSummary::default();

    for path in files {
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("読み込めないためスキップ: {} ({})", path.display(), e);
                summary.skipped += 1;
                continue;
            }
        };
        for (target, total) in totals.iter_mut() {
            *total += count_occurrences(&content, target);
        }
        summary.processed += 1;
    }

    (totals, summary)
}

pub fn count_strings(options: &CountStringsOptions) -> Result<RunSummary> {
    if options.strings.is_empty() {
        return Err(AuditError::Config("数える文字列を1つ以上指定してください".into()));
    }
    prepare_output_file(&options.output_file)?;

    let files = scanner::walk_files(
        &options.root_dir,
        FileFilter::Prefix(options.file_prefix.clone()),
        true,
    )?;
    let (totals, summary) = count_in_files(files, &options.strings);

    if !summary.succeeded() {
        tracing::warn!("'{}' で始まるファイルがありません", options.file_prefix);
        return Ok(summary);
    }

    export::write_table(
        &options.output_file,
        ReportKind::StringCounts,
        &[],
        totals
            .into_iter()
            .map(|(string, count)| vec![string, count.to_string()]),
    )?;
    tracing::info!(
        "{}ファイルを集計し保存: {}",
        summary.processed,
        options.output_file.display()
    );
    Ok(summary)
}
