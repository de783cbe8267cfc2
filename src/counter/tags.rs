//! 注釈タグの集計
//!
//! 入力は `<input>/<shot>/<model>/*.txt` の整理済みツリー。
//! 出力:
//! - 明細CSV（1ファイル1行）
//! - `summary_<name>.csv`: (shot, model) 別の合計・平均・標準偏差・割合
//! - `statistics_<stem>.xlsx`: 3シートの統計ブック

use super::count_occurrences;
use crate::error::{AuditError, Result};
use crate::export::{self, format_float, prepare_output_file, sibling_path};
use crate::outcome::RunSummary;
use crate::scanner::{self, FileFilter};
use std::path::{Path, PathBuf};
use textaudit_common::{summarize, GroupKey, Record, ReportKind, SummaryRow, SUMMARY_SUFFIXES};

/// 全タグの合計を表す指標名
pub const TOTAL: &str = "total";

/// 1ファイル分のタグ件数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub shot_category: String,
    pub model_category: String,
    /// 拡張子なしのファイル名
    pub file_name: String,
    /// 入力フォルダからの相対パス
    pub file_path: String,
    pub counts: Vec<(String, usize)>,
}

impl TagRecord {
    pub fn count(&self, tag: &str) -> Option<usize> {
        self.counts.iter().find(|(t, _)| t == tag).map(|(_, c)| *c)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }
}

impl Record for TagRecord {
    fn group_value(&self, key: GroupKey) -> &str {
        match key {
            GroupKey::Shot => &self.shot_category,
            GroupKey::Model => &self.model_category,
        }
    }

    fn value(&self, metric: &str) -> Option<f64> {
        if metric == TOTAL {
            return Some(self.total() as f64);
        }
        self.count(metric).map(|c| c as f64)
    }
}

/// 数えるタグ名の検査（1つ以上、空でなく角括弧を含まない）
pub fn validate_tags(tags: &[String]) -> Result<()> {
    if tags.is_empty() {
        return Err(AuditError::Config("タグが1つもありません".into()));
    }
    if let Some(tag) = tags
        .iter()
        .find(|t| t.is_empty() || t.contains(&['[', ']'][..]))
    {
        return Err(AuditError::Config(format!(
            "タグは角括弧なしで指定してください: {:?}",
            tag
        )));
    }
    Ok(())
}

/// テキスト中の `[TAG]` を数える
pub fn count_tags_in(text: &str, tags: &[String]) -> Vec<(String, usize)> {
    tags.iter()
        .map(|tag| (tag.clone(), count_occurrences(text, &format!("[{}]", tag))))
        .collect()
}

#[derive(Debug, Clone)]
pub struct CountTagsOptions {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub tags: Vec<String>,
    pub precision: usize,
}

/// 整理済みツリーを走査してレコードを作る
///
/// 読めないファイルは警告して飛ばす（件数0としては数えない）。
/// 戻り値は (shot, model, file_name) 順。
pub fn collect_records(input_dir: &Path, tags: &[String]) -> Result<(Vec<TagRecord>, usize)> {
    let mut records = Vec::new();
    let mut skipped = 0;

    for shot_dir in scanner::list_subdirs(input_dir)? {
        let shot = scanner::file_name_of(&shot_dir);
        tracing::info!("学習設定を処理中: {}", shot);

        let model_dirs = scanner::list_subdirs(&shot_dir)?;
        if model_dirs.is_empty() {
            tracing::warn!("モデルのフォルダがありません: {}", shot_dir.display());
            continue;
        }

        for model_dir in model_dirs {
            let model = scanner::file_name_of(&model_dir);
            tracing::debug!("モデルを処理中: {}/{}", shot, model);

            let files: Vec<PathBuf> =
                scanner::walk_files(&model_dir, FileFilter::text_files(), false)?.collect();
            if files.is_empty() {
                tracing::warn!("テキストファイルがありません: {}", model_dir.display());
                continue;
            }

            for path in files {
                let content = match std::fs::read_to_string(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::error!("読み込めないためスキップ: {} ({})", path.display(), e);
                        skipped += 1;
                        continue;
                    }
                };

                let record = TagRecord {
                    shot_category: shot.clone(),
                    model_category: model.clone(),
                    file_name: path
                        .file_stem()
                        .map(|s| s.to_string_lossy().to_string())
                        .unwrap_or_default(),
                    file_path: path
                        .strip_prefix(input_dir)
                        .unwrap_or(&path)
                        .display()
                        .to_string(),
                    counts: count_tags_in(&content, tags),
                };
                tracing::debug!("{}: {:?}", record.file_path, record.counts);
                records.push(record);
            }
        }
    }

    records.sort_by(|a, b| {
        (&a.shot_category, &a.model_category, &a.file_name)
            .cmp(&(&b.shot_category, &b.model_category, &b.file_name))
    });
    Ok((records, skipped))
}

/// 明細CSVの行
pub fn detail_rows(records: &[TagRecord]) -> impl Iterator<Item = Vec<String>> + '_ {
    records.iter().map(|r| {
        let mut row = vec![
            r.shot_category.clone(),
            r.model_category.clone(),
            r.file_name.clone(),
            r.file_path.clone(),
        ];
        row.extend(r.counts.iter().map(|(_, c)| c.to_string()));
        row.push(r.total().to_string());
        row
    })
}

/// 集計CSVの行
pub fn summary_rows(rows: &[SummaryRow], tags: &[String], precision: usize) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let mut cells = row.keys.clone();
            for name in tags.iter().map(String::as_str).chain([TOTAL]) {
                let stats = row.stats(name).copied().unwrap_or_default();
                for suffix in SUMMARY_SUFFIXES {
                    let value = match suffix {
                        "sum" => Some(stats.sum),
                        "mean" => stats.mean,
                        _ => stats.std,
                    };
                    cells.push(format_float(value, precision));
                }
            }
            cells.push(row.count.to_string());
            for tag in tags {
                cells.push(format_float(row.percentage(tag, TOTAL), precision));
            }
            cells
        })
        .collect()
}

/// タグ件数を集計して3種類のレポートを書き出す
pub fn count_tags(options: &CountTagsOptions) -> Result<RunSummary> {
    validate_tags(&options.tags)?;
    scanner::ensure_dir(&options.input_dir)?;
    prepare_output_file(&options.output_file)?;

    let (records, skipped) = collect_records(&options.input_dir, &options.tags)?;
    let summary = RunSummary {
        processed: records.len(),
        skipped,
    };
    if records.is_empty() {
        tracing::warn!("処理できたファイルがありません");
        return Ok(summary);
    }

    export::write_table(
        &options.output_file,
        ReportKind::TagCounts,
        &options.tags,
        detail_rows(&records),
    )?;
    tracing::info!("明細を保存: {}", options.output_file.display());

    let mut metrics = options.tags.clone();
    metrics.push(TOTAL.to_string());
    let grouped = summarize(&records, &[GroupKey::Shot, GroupKey::Model], &metrics);

    let summary_file = sibling_path(&options.output_file, "summary", None);
    export::write_table(
        &summary_file,
        ReportKind::TagSummary,
        &options.tags,
        summary_rows(&grouped, &options.tags, options.precision),
    )?;
    tracing::info!("集計を保存: {}", summary_file.display());

    let stats_file = sibling_path(&options.output_file, "statistics", Some("xlsx"));
    export::write_statistics_workbook(&stats_file, &records, &metrics)?;
    tracing::info!("統計ブックを保存: {}", stats_file.display());

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<String> {
        vec!["UCE".to_string(), "OGE".to_string()]
    }

    fn record(shot: &str, model: &str, name: &str, uce: usize, oge: usize) -> TagRecord {
        TagRecord {
            shot_category: shot.into(),
            model_category: model.into(),
            file_name: name.into(),
            file_path: format!("{}/{}/{}.txt", shot, model, name),
            counts: vec![("UCE".into(), uce), ("OGE".into(), oge)],
        }
    }

    #[test]
    fn test_count_tags_in_literal_brackets() {
        let counts = count_tags_in("a [UCE] b [UCE] UCE [OGE] [oge]", &tags());
        assert_eq!(counts, vec![("UCE".to_string(), 2), ("OGE".to_string(), 1)]);
    }

    #[test]
    fn test_validate_tags() {
        assert!(validate_tags(&tags()).is_ok());
        assert!(matches!(validate_tags(&[]), Err(AuditError::Config(_))));
        assert!(matches!(
            validate_tags(&["[UCE]".to_string()]),
            Err(AuditError::Config(_))
        ));
        assert!(validate_tags(&["UCE".to_string(), String::new()]).is_err());
    }

    #[test]
    fn test_record_total_and_value() {
        let r = record("oneshot", "llama", "100001", 2, 1);
        assert_eq!(r.total(), 3);
        assert_eq!(r.value(TOTAL), Some(3.0));
        assert_eq!(r.value("UCE"), Some(2.0));
        assert_eq!(r.value("MGE"), None);
    }

    #[test]
    fn test_summary_rows_with_percentages() {
        let records = vec![
            record("oneshot", "llama", "100001", 2, 1),
            record("oneshot", "llama", "100002", 0, 1),
        ];
        let mut metrics = tags();
        metrics.push(TOTAL.into());
        let grouped = summarize(&records, &[GroupKey::Shot, GroupKey::Model], &metrics);
        let rows = summary_rows(&grouped, &tags(), 2);

        assert_eq!(rows.len(), 1);
        let header = ReportKind::TagSummary.columns(&tags());
        assert_eq!(rows[0].len(), header.len());

        let cell = |name: &str| {
            let i = header.iter().position(|h| h == name).unwrap();
            rows[0][i].clone()
        };
        assert_eq!(cell("UCE_sum"), "2.00");
        assert_eq!(cell("OGE_mean"), "1.00");
        assert_eq!(cell("total_sum"), "4.00");
        assert_eq!(cell("total_files"), "2");
        assert_eq!(cell("UCE_percentage"), "50.00");
        assert_eq!(cell("OGE_percentage"), "50.00");
    }

    #[test]
    fn test_percentage_empty_when_no_tags() {
        let records = vec![record("zeroshot", "qwen", "100003", 0, 0)];
        let mut metrics = tags();
        metrics.push(TOTAL.into());
        let grouped = summarize(&records, &[GroupKey::Shot, GroupKey::Model], &metrics);
        let rows = summary_rows(&grouped, &tags(), 2);
        let last = rows[0].last().unwrap();
        assert_eq!(last, "");
    }
}
