//! 生成テキストの自動評価
//!
//! 1. 参照フォルダから 文書ID→参照ファイル の索引を作る
//! 2. 生成フォルダの .txt を照合
//! 3. 外部スコアラーで各組を採点
//! 4. 明細（合計・順位付き）と (shot, model) 別平均をCSVに書く

use crate::error::{AuditError, Result};
use crate::export::{self, format_float, prepare_output_file};
use crate::matcher::{self, DuplicatePolicy, ReferenceIndex};
use crate::outcome::RunSummary;
use crate::scanner;
use crate::scorer::{self, TextScorer};
use std::path::PathBuf;
use textaudit_common::{
    assign_ranks, summarize, Classifier, GroupKey, MetricRecord, MetricStats, ReportKind,
    SummaryRow,
};

#[derive(Debug, Clone)]
pub struct EvaluateOptions {
    pub generated_dir: PathBuf,
    pub reference_dir: PathBuf,
    pub output: PathBuf,
    pub summary: PathBuf,
    pub duplicate_policy: DuplicatePolicy,
    /// 照合だけ行い採点しない
    pub dry_run: bool,
    pub precision: usize,
    pub show_progress: bool,
}

/// 合計降順の順位（同点は文書ID、ファイルパスの昇順）
pub fn rank_records(records: &[MetricRecord]) -> Vec<usize> {
    assign_ranks(records, MetricRecord::sum, |r| {
        (r.document_id.clone(), r.file_path.clone())
    })
}

/// 明細CSVの行
pub fn metric_rows(
    records: &[MetricRecord],
    ranks: &[usize],
    precision: usize,
) -> Vec<Vec<String>> {
    records
        .iter()
        .zip(ranks)
        .map(|(r, rank)| {
            let mut row = vec![
                r.shot_category.clone(),
                r.model_category.clone(),
                r.document_id.clone(),
                r.file_path.clone(),
                r.reference_file.clone(),
            ];
            row.extend(r.scores.iter().map(|(_, v)| format_float(*v, precision)));
            row.push(format_float(r.sum(), precision));
            row.push(rank.to_string());
            row
        })
        .collect()
}

/// (shot, model) 別平均の行
pub fn summary_rows(rows: &[SummaryRow], metrics: &[String], precision: usize) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let mut cells = row.keys.clone();
            cells.push(row.count.to_string());
            cells.extend(
                metrics
                    .iter()
                    .map(|m| format_float(row.stats(m).and_then(|s| s.mean), precision)),
            );
            cells
        })
        .collect()
}

/// 全体平均をログに出す
fn log_overall_averages(records: &[MetricRecord], metrics: &[String]) {
    tracing::info!("全体平均 ({}件):", records.len());
    for metric in metrics {
        let values: Vec<f64> = records.iter().filter_map(|r| r.score(metric)).collect();
        let stats = MetricStats::from_values(&values);
        match stats.mean {
            Some(mean) => tracing::info!("  {}: {:.4} (n={})", metric, mean, stats.count),
            None => tracing::info!("  {}: -", metric),
        }
    }
}

pub fn run(
    options: &EvaluateOptions,
    classifier: &Classifier,
    scorers: &[Box<dyn TextScorer>],
) -> Result<RunSummary> {
    if scorers.is_empty() && !options.dry_run {
        return Err(AuditError::Config(
            "スコアラーが設定されていません（設定ファイルの scorers を確認してください）".into(),
        ));
    }
    scanner::ensure_dir(&options.generated_dir)?;
    scanner::ensure_dir(&options.reference_dir)?;
    if !options.dry_run {
        prepare_output_file(&options.output)?;
        prepare_output_file(&options.summary)?;
    }

    let index = ReferenceIndex::build(&options.reference_dir, options.duplicate_policy)?;
    if index.is_empty() {
        tracing::warn!("参照ファイルがありません: {}", options.reference_dir.display());
    } else {
        tracing::info!("参照ファイル {}件を索引化", index.len());
    }
    if !index.duplicates().is_empty() {
        tracing::warn!(
            "文書IDが重複する参照ファイル {}件 ({:?})",
            index.duplicates().len(),
            options.duplicate_policy
        );
    }

    let outcome = matcher::match_generated(&options.generated_dir, &index, classifier)?;
    tracing::info!(
        "照合: {}組 / 照合できないファイル {}件",
        outcome.pairs.len(),
        outcome.unmatched.len()
    );

    if options.dry_run {
        for pair in &outcome.pairs {
            tracing::info!(
                "[DRY RUN] {}/{} {} ↔ {}",
                pair.shot_category,
                pair.model_category,
                pair.generated_path.display(),
                pair.reference_path.display()
            );
        }
        return Ok(RunSummary {
            processed: outcome.pairs.len(),
            skipped: outcome.unmatched.len(),
        });
    }

    let metrics = scorer::metric_names(scorers);
    let evaluation = scorer::evaluate_pairs(&outcome.pairs, scorers, options.show_progress);
    let summary = RunSummary {
        processed: evaluation.records.len(),
        skipped: outcome.unmatched.len() + evaluation.skipped,
    };

    if evaluation.records.is_empty() {
        tracing::warn!("採点できた組がありません");
        return Ok(summary);
    }

    let ranks = rank_records(&evaluation.records);
    export::write_table(
        &options.output,
        ReportKind::Metrics,
        &metrics,
        metric_rows(&evaluation.records, &ranks, options.precision),
    )?;
    tracing::info!("明細を保存: {}", options.output.display());

    let grouped = summarize(
        &evaluation.records,
        &[GroupKey::Shot, GroupKey::Model],
        &metrics,
    );
    export::write_table(
        &options.summary,
        ReportKind::MetricSummary,
        &metrics,
        summary_rows(&grouped, &metrics, options.precision),
    )?;
    tracing::info!("グループ別平均を保存: {}", options.summary.display());

    log_overall_averages(&evaluation.records, &metrics);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, path: &str, bleu: Option<f64>, meteor: Option<f64>) -> MetricRecord {
        MetricRecord {
            document_id: id.into(),
            shot_category: "oneshot".into(),
            model_category: "llama".into(),
            file_path: path.into(),
            reference_file: format!("ref/{}.txt", id),
            scores: vec![("BLEU".into(), bleu), ("METEOR".into(), meteor)],
        }
    }

    #[test]
    fn test_rank_ties_by_document_id() {
        let records = vec![
            record("100002", "b.txt", Some(0.5), Some(0.5)),
            record("100001", "a.txt", Some(0.5), Some(0.5)),
            record("100003", "c.txt", Some(0.9), Some(0.9)),
        ];
        assert_eq!(rank_records(&records), vec![3, 2, 1]);
    }

    #[test]
    fn test_metric_rows_blank_missing_score() {
        let records = vec![record("100001", "a.txt", Some(0.5), None)];
        let rows = metric_rows(&records, &[1], 6);
        assert_eq!(
            rows[0],
            vec![
                "oneshot",
                "llama",
                "100001",
                "a.txt",
                "ref/100001.txt",
                "0.500000",
                "",
                "0.500000",
                "1"
            ]
        );
    }

    #[test]
    fn test_metric_rows_blank_sum_without_scores() {
        let records = vec![record("100001", "a.txt", None, None)];
        let rows = metric_rows(&records, &[1], 6);
        assert_eq!(rows[0][7], "");
    }

    #[test]
    fn test_rank_missing_sum_last() {
        let records = vec![
            record("100001", "a.txt", None, None),
            record("100002", "b.txt", Some(0.0), Some(0.0)),
        ];
        assert_eq!(rank_records(&records), vec![2, 1]);
    }

    #[test]
    fn test_summary_rows_mean() {
        let records = vec![
            record("100001", "a.txt", Some(0.2), Some(0.4)),
            record("100002", "b.txt", Some(0.4), None),
        ];
        let metrics = vec!["BLEU".to_string(), "METEOR".to_string()];
        let grouped = summarize(&records, &[GroupKey::Shot, GroupKey::Model], &metrics);
        let rows = summary_rows(&grouped, &metrics, 3);
        assert_eq!(rows, vec![vec!["oneshot", "llama", "2", "0.300", "0.400"]]);
    }

    #[test]
    fn test_no_scorers_is_configuration_error() {
        let options = EvaluateOptions {
            generated_dir: PathBuf::from("gen"),
            reference_dir: PathBuf::from("ref"),
            output: PathBuf::from("out.csv"),
            summary: PathBuf::from("summary.csv"),
            duplicate_policy: DuplicatePolicy::LastWins,
            dry_run: false,
            precision: 6,
            show_progress: false,
        };
        let result = run(&options, &Classifier::default(), &[]);
        assert!(matches!(result, Err(AuditError::Config(_))));
    }
}
