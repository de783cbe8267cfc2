//! 評価スコア計算モジュール
//!
//! BLEU/METEOR/ROUGE/BERTScore などの指標は外部実装に任せ、
//! ここでは `TextScorer` 越しに呼び出して結果をレコードにまとめる。
//! スコアラーの失敗はそのスコアラーの指標だけを欠損にし、他は計算を続ける。

mod command;

pub use command::{parse_scores, CommandScorer};

use crate::config::ScorerConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use textaudit_common::{MatchedPair, MetricRecord};

/// 2つのテキストからスコアを計算する外部能力
pub trait TextScorer {
    fn name(&self) -> &str;

    /// 返す指標名（CSVの列順）
    fn metrics(&self) -> &[String];

    fn score(&self, candidate: &str, reference: &str) -> anyhow::Result<HashMap<String, f64>>;
}

/// 設定からスコアラーを構築
pub fn scorers_from_config(configs: &[ScorerConfig]) -> Vec<Box<dyn TextScorer>> {
    configs
        .iter()
        .map(|c| Box::new(CommandScorer::from_config(c)) as Box<dyn TextScorer>)
        .collect()
}

/// 全スコアラーの指標名（重複は最初の1つ）
pub fn metric_names(scorers: &[Box<dyn TextScorer>]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in scorers.iter().flat_map(|s| s.metrics()) {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

/// 1組分のスコアを計算
///
/// 戻り値は `metrics` と同じ並び。失敗・未返却の指標は None。
pub fn score_texts(
    candidate: &str,
    reference: &str,
    scorers: &[Box<dyn TextScorer>],
    metrics: &[String],
) -> Vec<(String, Option<f64>)> {
    let mut values: HashMap<String, f64> = HashMap::new();

    for scorer in scorers {
        match scorer.score(candidate, reference) {
            Ok(scores) => {
                for name in scorer.metrics() {
                    match scores.get(name) {
                        Some(v) => {
                            values.entry(name.clone()).or_insert(*v);
                        }
                        None => tracing::debug!("{}: 指標 {} が返されませんでした", scorer.name(), name),
                    }
                }
            }
            Err(e) => {
                tracing::warn!("スコアラー {} が失敗しました: {:#}", scorer.name(), e);
            }
        }
    }

    metrics
        .iter()
        .map(|name| (name.clone(), values.get(name).copied()))
        .collect()
}

/// 評価結果
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub records: Vec<MetricRecord>,
    pub skipped: usize,
}

/// テキストを読み込む（空ならNone）
fn read_text(path: &std::path::Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                tracing::warn!("空のテキストのためスキップ: {}", path.display());
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(e) => {
            tracing::warn!("読み込めないためスキップ: {} ({})", path.display(), e);
            None
        }
    }
}

/// 照合済みの組をすべて評価
///
/// 読めない組と、全スコアラーが失敗した組は `skipped` に数える。
pub fn evaluate_pairs(
    pairs: &[MatchedPair],
    scorers: &[Box<dyn TextScorer>],
    show_progress: bool,
) -> Evaluation {
    let metrics = metric_names(scorers);
    let mut evaluation = Evaluation::default();

    let progress = if show_progress {
        let bar = ProgressBar::new(pairs.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    for pair in pairs {
        progress.set_message(pair.document_id.clone());

        let (Some(candidate), Some(reference)) =
            (read_text(&pair.generated_path), read_text(&pair.reference_path))
        else {
            evaluation.skipped += 1;
            progress.inc(1);
            continue;
        };

        let record = MetricRecord {
            document_id: pair.document_id.clone(),
            shot_category: pair.shot_category.clone(),
            model_category: pair.model_category.clone(),
            file_path: pair.generated_path.display().to_string(),
            reference_file: pair.reference_path.display().to_string(),
            scores: score_texts(&candidate, &reference, scorers, &metrics),
        };
        if record.has_scores() {
            evaluation.records.push(record);
        } else {
            tracing::warn!(
                "指標が1つも得られないためスキップ: {}",
                pair.generated_path.display()
            );
            evaluation.skipped += 1;
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    evaluation
}
