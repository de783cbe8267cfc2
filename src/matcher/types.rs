use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use textaudit_common::MatchedPair;

/// 参照フォルダで文書IDが重複したときの扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// 最初に見つかったファイルを使う
    FirstWins,
    /// 後から見つかったファイルで上書きする
    #[default]
    LastWins,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::FirstWins => write!(f, "first-wins"),
            DuplicatePolicy::LastWins => write!(f, "last-wins"),
        }
    }
}

/// 照合できなかった理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// ファイル名に6桁の文書IDがない
    NoDocumentId,
    /// パスからもファイル名からもカテゴリを決められない
    NoCategory,
    /// 対応する参照ファイルがない
    NoReference(String),
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::NoDocumentId => write!(f, "文書IDなし"),
            UnmatchedReason::NoCategory => write!(f, "shot/モデルを判定できない"),
            UnmatchedReason::NoReference(id) => write!(f, "参照ファイルなし (ID {})", id),
        }
    }
}

/// 照合できなかった生成ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmatched {
    pub path: PathBuf,
    pub reason: UnmatchedReason,
}

/// 照合結果
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub pairs: Vec<MatchedPair>,
    pub unmatched: Vec<Unmatched>,
}
