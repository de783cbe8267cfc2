//! レポート種別と出力列の定義
//!
//! レポートごとに出力列が異なるため、種別→列の対応をここに集約する。

use serde::{Deserialize, Serialize};

/// 出力レポートの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// 評価スコア明細（1組1行）
    Metrics,
    /// 評価スコアの (shot, model) 別平均
    MetricSummary,
    /// 注釈タグ件数明細（1ファイル1行）
    TagCounts,
    /// 注釈タグ件数の (shot, model) 別集計
    TagSummary,
    /// 文字列の出現頻度
    StringCounts,
    /// テキスト統計（1ファイル1行）
    TextStats,
}

/// 統計レポートで使う統計量の接尾辞
pub const SUMMARY_SUFFIXES: [&str; 3] = ["sum", "mean", "std"];

impl ReportKind {
    /// 出力する列名
    ///
    /// `metrics` は指標名（評価指標やタグ名）。宣言順で列になる。
    pub fn columns(&self, metrics: &[String]) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let push = |columns: &mut Vec<String>, names: &[&str]| {
            columns.extend(names.iter().map(|n| n.to_string()))
        };

        match self {
            ReportKind::Metrics => {
                push(
                    &mut columns,
                    &[
                        "shot_category",
                        "model_category",
                        "document_id",
                        "file_path",
                        "reference_file",
                    ],
                );
                columns.extend(metrics.iter().cloned());
                push(&mut columns, &["sum", "rank"]);
            }
            ReportKind::MetricSummary => {
                push(&mut columns, &["shot_category", "model_category", "count"]);
                columns.extend(metrics.iter().map(|m| format!("{}_mean", m)));
            }
            ReportKind::TagCounts => {
                push(
                    &mut columns,
                    &["shot_category", "model_category", "file_name", "file_path"],
                );
                columns.extend(metrics.iter().cloned());
                push(&mut columns, &["total"]);
            }
            ReportKind::TagSummary => {
                push(&mut columns, &["shot_category", "model_category"]);
                for name in metrics.iter().map(String::as_str).chain(["total"]) {
                    for suffix in SUMMARY_SUFFIXES {
                        columns.push(format!("{}_{}", name, suffix));
                    }
                }
                push(&mut columns, &["total_files"]);
                columns.extend(metrics.iter().map(|m| format!("{}_percentage", m)));
            }
            ReportKind::StringCounts => {
                push(&mut columns, &["String", "Frequency"]);
            }
            ReportKind::TextStats => {
                push(
                    &mut columns,
                    &[
                        "file_path",
                        "num_sentences",
                        "num_tokens",
                        "num_unique_words",
                        "avg_sentence_length",
                    ],
                );
            }
        }

        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_metrics_columns() {
        let cols = ReportKind::Metrics.columns(&names(&["BLEU", "METEOR"]));
        assert_eq!(
            cols,
            names(&[
                "shot_category",
                "model_category",
                "document_id",
                "file_path",
                "reference_file",
                "BLEU",
                "METEOR",
                "sum",
                "rank"
            ])
        );
    }

    #[test]
    fn test_tag_summary_columns() {
        let cols = ReportKind::TagSummary.columns(&names(&["UCE"]));
        assert_eq!(
            cols,
            names(&[
                "shot_category",
                "model_category",
                "UCE_sum",
                "UCE_mean",
                "UCE_std",
                "total_sum",
                "total_mean",
                "total_std",
                "total_files",
                "UCE_percentage"
            ])
        );
    }

    #[test]
    fn test_string_counts_columns() {
        assert_eq!(
            ReportKind::StringCounts.columns(&[]),
            names(&["String", "Frequency"])
        );
    }
}
