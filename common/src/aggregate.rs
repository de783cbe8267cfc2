//! 集計モジュール
//!
//! レコード列をキーでグループ化し、指標ごとに
//! 合計・平均・標準偏差・最大値・件数を求める。
//!
//! ## 処理フロー
//! 1. キー値の組でグループ化（キーの辞書順に整列）
//! 2. 欠損値を除いて指標ごとの統計量を計算
//! 3. 必要に応じて合計値に対する割合・順位を付与

use crate::types::MetricRecord;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// グループ化キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Shot,
    Model,
}

impl GroupKey {
    /// CSVの列名
    pub fn column(&self) -> &'static str {
        match self {
            GroupKey::Shot => "shot_category",
            GroupKey::Model => "model_category",
        }
    }
}

/// 集計対象のレコード
pub trait Record {
    fn group_value(&self, key: GroupKey) -> &str;
    fn value(&self, metric: &str) -> Option<f64>;
}

impl Record for MetricRecord {
    fn group_value(&self, key: GroupKey) -> &str {
        match key {
            GroupKey::Shot => &self.shot_category,
            GroupKey::Model => &self.model_category,
        }
    }

    fn value(&self, metric: &str) -> Option<f64> {
        if metric == "sum" {
            return self.sum();
        }
        self.score(metric)
    }
}

/// 1指標分の統計量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricStats {
    /// 欠損を除いた値の個数
    pub count: usize,
    pub sum: f64,
    pub mean: Option<f64>,
    /// 標本標準偏差（n-1）。2件未満では None
    pub std: Option<f64>,
    pub max: Option<f64>,
}

impl MetricStats {
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self::default();
        }

        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;
        let std = if count > 1 {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            Some(variance.sqrt())
        } else {
            None
        };
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            count,
            sum,
            mean: Some(mean),
            std,
            max: Some(max),
        }
    }
}

/// グループ1つ分の集計結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// キー値（GroupKeyの指定順）
    pub keys: Vec<String>,
    /// グループ内のレコード数
    pub count: usize,
    pub stats: Vec<(String, MetricStats)>,
}

impl SummaryRow {
    pub fn stats(&self, metric: &str) -> Option<&MetricStats> {
        self.stats
            .iter()
            .find(|(name, _)| name == metric)
            .map(|(_, s)| s)
    }

    /// `part` の合計が `total` の合計に占める割合（%）
    ///
    /// 合計が0なら None
    pub fn percentage(&self, part: &str, total: &str) -> Option<f64> {
        let part = self.stats(part)?.sum;
        let total = self.stats(total)?.sum;
        if total == 0.0 {
            None
        } else {
            Some(part / total * 100.0)
        }
    }
}

/// レコードをグループ化して集計
pub fn summarize<R: Record>(records: &[R], keys: &[GroupKey], metrics: &[String]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<Vec<String>, Vec<&R>> = BTreeMap::new();
    for record in records {
        let key: Vec<String> = keys
            .iter()
            .map(|k| record.group_value(*k).to_string())
            .collect();
        groups.entry(key).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(keys, members)| {
            let stats = metrics
                .iter()
                .map(|metric| {
                    let values: Vec<f64> =
                        members.iter().filter_map(|r| r.value(metric)).collect();
                    (metric.clone(), MetricStats::from_values(&values))
                })
                .collect();
            SummaryRow {
                keys,
                count: members.len(),
                stats,
            }
        })
        .collect()
}

/// スコア降順で1始まりの順位を付ける
///
/// スコアの無い項目は最下位側。同点は `tie_break` の昇順で決めるため、
/// 入力順に依存しない。戻り値は `items` と同じ並びの順位。
pub fn assign_ranks<T, S, K, O>(items: &[T], score: S, tie_break: K) -> Vec<usize>
where
    S: Fn(&T) -> Option<f64>,
    K: Fn(&T) -> O,
    O: Ord,
{
    let descending = |a: Option<f64>, b: Option<f64>| match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        descending(score(&items[a]), score(&items[b]))
            .then_with(|| tie_break(&items[a]).cmp(&tie_break(&items[b])))
    });

    let mut ranks = vec![0; items.len()];
    for (position, index) in order.into_iter().enumerate() {
        ranks[index] = position + 1;
    }
    ranks
}
