//! ファイル名分類モジュール
//!
//! ファイル名から (shot設定, モデル名, 6桁の文書ID) を取り出す。
//! 失敗しても例外にはせず、理由付きの `Classification::Unclassified` を返す。

use crate::patterns::PatternTable;
use crate::types::{Classification, ClassifiedFile, UnclassifiedReason};
use regex::Regex;
use std::path::Path;

lazy_static::lazy_static! {
    static ref DIGIT_RUN_RE: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// 最初の「ちょうど6桁」の数字列を文書IDとして抽出
///
/// 5桁や7桁以上の連続数字はIDとみなさない。
pub fn extract_document_id(name: &str) -> Option<&str> {
    DIGIT_RUN_RE
        .find_iter(name)
        .map(|m| m.as_str())
        .find(|run| run.len() == 6)
}

/// shot設定表とモデル表を持つ分類器
#[derive(Debug, Clone)]
pub struct Classifier {
    shot: PatternTable,
    model: PatternTable,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(PatternTable::default_shot(), PatternTable::default_model())
    }
}

impl Classifier {
    pub fn new(shot: PatternTable, model: PatternTable) -> Self {
        Self { shot, model }
    }

    pub fn shot_table(&self) -> &PatternTable {
        &self.shot
    }

    pub fn model_table(&self) -> &PatternTable {
        &self.model
    }

    /// カテゴリのみ判定
    pub fn categorize(&self, file_name: &str) -> (Option<&str>, Option<&str>) {
        (
            self.shot.first_match(file_name),
            self.model.first_match(file_name),
        )
    }

    /// パスのファイル名部分を分類
    pub fn classify(&self, path: &Path) -> Classification {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let (shot, model) = self.categorize(&file_name);
        let document_id = extract_document_id(&file_name);

        match (shot, model, document_id) {
            (Some(shot), Some(model), Some(id)) => Classification::Classified(ClassifiedFile {
                path: path.to_path_buf(),
                shot_category: shot.to_string(),
                model_category: model.to_string(),
                document_id: id.to_string(),
            }),
            _ => {
                let mut reasons = Vec::new();
                if shot.is_none() {
                    reasons.push(UnclassifiedReason::MissingShot);
                }
                if model.is_none() {
                    reasons.push(UnclassifiedReason::MissingModel);
                }
                if document_id.is_none() {
                    reasons.push(UnclassifiedReason::MissingDocumentId);
                }
                Classification::Unclassified {
                    path: path.to_path_buf(),
                    reasons,
                }
            }
        }
    }
}
