use crate::counter::validate_tags;
use crate::error::{AuditError, Result};
use crate::matcher::DuplicatePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use textaudit_common::{Classifier, PatternTable};

/// 外部スコアラーの定義
///
/// `program` は標準入力でJSON `{"candidate", "reference"}` を受け取り、
/// 標準出力に指標名→数値のJSONオブジェクトを返すコマンド。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerConfig {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// このスコアラーが返す指標名（CSVの列順）
    pub metrics: Vec<String>,
}

/// 実行全体の設定
///
/// 起動時に一度だけ構築し、各コンポーネントへ明示的に渡す。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shot_patterns: PatternTable,
    pub model_patterns: PatternTable,
    /// 数える注釈タグ（角括弧なし）
    pub tags: Vec<String>,
    pub duplicate_policy: DuplicatePolicy,
    /// CSVに書く小数点以下の桁数
    pub float_precision: usize,
    pub scorers: Vec<ScorerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// 設定を読み込む
    ///
    /// 明示指定のファイルが無ければエラー。
    /// 既定パス（~/.config/textaudit/config.json）が無ければ既定値。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(AuditError::FileNotFound(path.display().to_string()));
            }
            return Self::from_file(path);
        }

        match Self::config_path() {
            Ok(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default_config()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AuditError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("textaudit").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            shot_patterns: PatternTable::default_shot(),
            model_patterns: PatternTable::default_model(),
            tags: ["UCE", "OGE", "UGE", "NNE", "DTE", "MGE"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            duplicate_policy: DuplicatePolicy::LastWins,
            float_precision: 6,
            scorers: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.shot_patterns.validate()?;
        self.model_patterns.validate()?;

        validate_tags(&self.tags)?;
        if self.float_precision > 12 {
            return Err(AuditError::Config(format!(
                "float_precision は12以下にしてください: {}",
                self.float_precision
            )));
        }
        for scorer in &self.scorers {
            if scorer.program.trim().is_empty() {
                return Err(AuditError::Config(format!(
                    "スコアラー {} の program が空です",
                    scorer.name
                )));
            }
            if scorer.metrics.is_empty() {
                return Err(AuditError::Config(format!(
                    "スコアラー {} の metrics が空です",
                    scorer.name
                )));
            }
        }
        Ok(())
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.shot_patterns.clone(), self.model_patterns.clone())
    }
}
