//! パターン表モジュール
//!
//! ファイル名に含まれる shot 設定やモデル名の表記ゆれを
//! カテゴリラベルへ対応付ける。
//!
//! パターンは排他的ではない（"chat" は "chatgpt" の部分文字列）ため、
//! 宣言順が優先順位になる。アルファベット順や最長一致ではない。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 1カテゴリ分のパターン
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub label: String,
    pub patterns: Vec<String>,
}

/// 順序付きパターン表
///
/// JSONでは `[{"label": ..., "patterns": [...]}, ...]` の配列で表す
/// （オブジェクトでは順序が保証されないため）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// エントリを末尾に追加（ビルダー形式）
    pub fn with(mut self, label: &str, patterns: &[&str]) -> Self {
        self.push(label, patterns.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn push(&mut self, label: impl Into<String>, patterns: Vec<String>) {
        self.entries.push(PatternEntry {
            label: label.into(),
            patterns,
        });
    }

    /// shot設定の既定パターン
    pub fn default_shot() -> Self {
        Self::new()
            .with("oneshot", &["one-shot", "oneshot", "1-shot", "1shot"])
            .with("zeroshot", &["zero-shot", "zeroshot", "0-shot", "0shot"])
            .with(
                "fewshot",
                &["few-shot", "fews-shot", "fewshot", "k-shot", "kshot"],
            )
    }

    /// モデル名の既定パターン
    pub fn default_model() -> Self {
        Self::new()
            .with("llama", &["llama", "llama2", "llama-2"])
            .with("qwen", &["qwen", "qwen-7b", "qwen-14b"])
            .with("chatgpt", &["chatgpt", "chat", "gpt", "gpt-3.5", "gpt-4"])
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 名前にパターンを含む最初のカテゴリを返す（大文字小文字を区別しない）
    pub fn first_match(&self, name: &str) -> Option<&str> {
        let lowered = name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .patterns
                    .iter()
                    .any(|p| lowered.contains(&p.to_lowercase()))
            })
            .map(|entry| entry.label.as_str())
    }

    /// 表の整合性チェック
    ///
    /// - 空の表・空のラベル・空のパターンは不可
    /// - ラベルの重複は不可
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::PatternTable("パターン表が空です".into()));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.label.trim().is_empty() {
                return Err(Error::PatternTable("空のラベルがあります".into()));
            }
            if !seen.insert(entry.label.as_str()) {
                return Err(Error::PatternTable(format!(
                    "ラベルが重複しています: {}",
                    entry.label
                )));
            }
            if entry.patterns.is_empty() || entry.patterns.iter().any(|p| p.is_empty()) {
                return Err(Error::PatternTable(format!(
                    "空のパターンがあります: {}",
                    entry.label
                )));
            }
        }
        Ok(())
    }
}
