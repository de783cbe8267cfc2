//! 分類・照合・評価の型定義
//!
//! サブコマンド間で共有される型:
//! - ClassifiedFile / Classification: ファイル名分類の結果
//! - MatchedPair: 生成テキストと参照テキストの組
//! - MetricRecord: 1組あたりの評価スコア

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 分類済みファイル（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub shot_category: String,
    pub model_category: String,
    /// 6桁の文書ID
    pub document_id: String,
}

/// 分類できなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnclassifiedReason {
    MissingShot,
    MissingModel,
    MissingDocumentId,
}

impl fmt::Display for UnclassifiedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnclassifiedReason::MissingShot => write!(f, "shot設定のパターンなし"),
            UnclassifiedReason::MissingModel => write!(f, "モデル名のパターンなし"),
            UnclassifiedReason::MissingDocumentId => write!(f, "6桁の文書IDなし"),
        }
    }
}

/// ファイル名分類の結果
///
/// 例外と番兵値を混在させず、未分類は理由付きでこの型に集約する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Classified(ClassifiedFile),
    Unclassified {
        path: PathBuf,
        reasons: Vec<UnclassifiedReason>,
    },
}

impl Classification {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Classification::Classified(file) => &file.path,
            Classification::Unclassified { path, .. } => path,
        }
    }

    /// 分類済みならその値を返す
    pub fn classified(self) -> Option<ClassifiedFile> {
        match self {
            Classification::Classified(file) => Some(file),
            Classification::Unclassified { .. } => None,
        }
    }

    /// 人が読める未分類理由（分類済みなら空文字）
    pub fn reason_text(&self) -> String {
        match self {
            Classification::Classified(_) => String::new(),
            Classification::Unclassified { reasons, .. } => reasons
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// 生成テキストと参照テキストの組
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub generated_path: PathBuf,
    pub reference_path: PathBuf,
    pub document_id: String,
    pub shot_category: String,
    pub model_category: String,
}

/// 1組分の評価スコア
///
/// スコアはスコアラーが宣言した順序で保持する。
/// スコアラーが失敗した指標は `None`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub document_id: String,
    pub shot_category: String,
    pub model_category: String,
    pub file_path: String,
    pub reference_file: String,
    pub scores: Vec<(String, Option<f64>)>,
}

impl MetricRecord {
    pub fn score(&self, metric: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(name, _)| name == metric)
            .and_then(|(_, value)| *value)
    }

    /// 欠損を除いたスコアの合計（1つも無ければ None）
    pub fn sum(&self) -> Option<f64> {
        self.scores
            .iter()
            .filter_map(|(_, value)| *value)
            .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
    }

    /// 少なくとも1つの指標が得られたか
    pub fn has_scores(&self) -> bool {
        self.scores.iter().any(|(_, value)| value.is_some())
    }
}
