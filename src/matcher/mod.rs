//! 生成テキストと参照テキストの照合モジュール
//!
//! 参照フォルダを一度だけ走査して 文書ID→参照ファイル の索引を作り、
//! 生成ファイルごとに文書IDで引く。

mod types;

pub use types::{DuplicatePolicy, MatchOutcome, Unmatched, UnmatchedReason};

use crate::error::Result;
use crate::scanner::{self, FileFilter};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use textaudit_common::{extract_document_id, Classifier, MatchedPair};

/// 文書ID→参照ファイルの索引（構築後は読み取り専用）
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    map: BTreeMap<String, PathBuf>,
    duplicates: Vec<(String, PathBuf)>,
}

impl ReferenceIndex {
    /// 参照フォルダ直下の .txt から索引を作る
    pub fn build(reference_dir: &Path, policy: DuplicatePolicy) -> Result<Self> {
        let files = scanner::walk_files(reference_dir, FileFilter::text_files(), false)?;
        Ok(Self::from_paths(files, policy))
    }

    /// パス列から索引を作る（走査順が重複解決の順序）
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>, policy: DuplicatePolicy) -> Self {
        let mut index = Self::default();

        for path in paths {
            let name = scanner::file_name_of(&path);
            let Some(id) = extract_document_id(&name).map(str::to_string) else {
                tracing::warn!("参照ファイル名に文書IDがないためスキップ: {}", name);
                continue;
            };

            if let Some(existing) = index.map.get(&id) {
                tracing::warn!(
                    "参照の文書IDが重複: {} ({} / {}) → {}",
                    id,
                    existing.display(),
                    path.display(),
                    policy
                );
                index.duplicates.push((id.clone(), path.clone()));
                if policy == DuplicatePolicy::FirstWins {
                    continue;
                }
            }
            index.map.insert(id, path);
        }

        index
    }

    pub fn get(&self, document_id: &str) -> Option<&Path> {
        self.map.get(document_id).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// 重複として検出された (ID, 後から見つかったパス)
    pub fn duplicates(&self) -> &[(String, PathBuf)] {
        &self.duplicates
    }
}

/// 生成ファイルのパスから (shot, model) を決める
///
/// `<shot>/<model>/<file>` 構成ならディレクトリ名、
/// それより浅ければファイル名を分類器にかける。
pub fn categories_for(
    generated_root: &Path,
    path: &Path,
    classifier: &Classifier,
) -> Option<(String, String)> {
    let relative = path.strip_prefix(generated_root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    if parts.len() >= 3 {
        return Some((parts[0].clone(), parts[1].clone()));
    }

    let name = scanner::file_name_of(path);
    match classifier.categorize(&name) {
        (Some(shot), Some(model)) => Some((shot.to_string(), model.to_string())),
        _ => None,
    }
}

/// 生成ファイル1件を照合
pub fn pair_for(
    generated_root: &Path,
    path: &Path,
    index: &ReferenceIndex,
    classifier: &Classifier,
) -> std::result::Result<MatchedPair, UnmatchedReason> {
    let name = scanner::file_name_of(path);
    let document_id = extract_document_id(&name).ok_or(UnmatchedReason::NoDocumentId)?;
    let (shot_category, model_category) =
        categories_for(generated_root, path, classifier).ok_or(UnmatchedReason::NoCategory)?;
    let reference = index
        .get(document_id)
        .ok_or_else(|| UnmatchedReason::NoReference(document_id.to_string()))?;

    Ok(MatchedPair {
        generated_path: path.to_path_buf(),
        reference_path: reference.to_path_buf(),
        document_id: document_id.to_string(),
        shot_category,
        model_category,
    })
}

/// 生成ファイル列を照合
pub fn match_files(
    generated_root: &Path,
    files: impl IntoIterator<Item = PathBuf>,
    index: &ReferenceIndex,
    classifier: &Classifier,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for path in files {
        match pair_for(generated_root, &path, index, classifier) {
            Ok(pair) => {
                tracing::debug!(
                    "照合: {} ↔ {}",
                    pair.generated_path.display(),
                    pair.reference_path.display()
                );
                outcome.pairs.push(pair);
            }
            Err(reason) => {
                tracing::warn!("照合できないためスキップ: {} ({})", path.display(), reason);
                outcome.unmatched.push(Unmatched { path, reason });
            }
        }
    }

    outcome
}

/// 生成フォルダ以下の .txt を再帰的に照合
pub fn match_generated(
    generated_root: &Path,
    index: &ReferenceIndex,
    classifier: &Classifier,
) -> Result<MatchOutcome> {
    let files = scanner::walk_files(generated_root, FileFilter::text_files(), true)?;
    Ok(match_files(generated_root, files, index, classifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_index_last_wins() {
        let index = ReferenceIndex::from_paths(
            paths(&["ref/a_100001.txt", "ref/b_100001.txt", "ref/100002.txt"]),
            DuplicatePolicy::LastWins,
        );
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("100001"), Some(Path::new("ref/b_100001.txt")));
        assert_eq!(index.duplicates().len(), 1);
    }

    #[test]
    fn test_index_first_wins() {
        let index = ReferenceIndex::from_paths(
            paths(&["ref/a_100001.txt", "ref/b_100001.txt"]),
            DuplicatePolicy::FirstWins,
        );
        assert_eq!(index.get("100001"), Some(Path::new("ref/a_100001.txt")));
        assert_eq!(index.duplicates().len(), 1);
    }

    #[test]
    fn test_index_skips_files_without_id() {
        let index = ReferenceIndex::from_paths(paths(&["ref/readme.txt"]), DuplicatePolicy::LastWins);
        assert!(index.is_empty());
    }

    #[test]
    fn test_categories_from_directory_layout() {
        let classifier = Classifier::default();
        let cats = categories_for(
            Path::new("gen"),
            Path::new("gen/oneshot/llama/100001.txt"),
            &classifier,
        );
        assert_eq!(cats, Some(("oneshot".to_string(), "llama".to_string())));
    }

    #[test]
    fn test_categories_fallback_to_filename() {
        let classifier = Classifier::default();
        let cats = categories_for(
            Path::new("gen"),
            Path::new("gen/qwen_zeroshot_100001.txt"),
            &classifier,
        );
        assert_eq!(cats, Some(("zeroshot".to_string(), "qwen".to_string())));

        let none = categories_for(Path::new("gen"), Path::new("gen/100001.txt"), &classifier);
        assert_eq!(none, None);
    }

    #[test]
    fn test_match_one_pair_one_unmatched() {
        let classifier = Classifier::default();
        let index = ReferenceIndex::from_paths(
            paths(&["ref/100001.txt", "ref/100002.txt"]),
            DuplicatePolicy::LastWins,
        );
        let outcome = match_files(
            Path::new("gen"),
            paths(&["gen/oneshot/llama/100001.txt", "gen/oneshot/llama/999999.txt"]),
            &index,
            &classifier,
        );

        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].document_id, "100001");
        assert_eq!(outcome.pairs[0].reference_path, PathBuf::from("ref/100001.txt"));
        assert_eq!(outcome.unmatched.len(), 1);
        assert_eq!(
            outcome.unmatched[0].reason,
            UnmatchedReason::NoReference("999999".to_string())
        );
    }

    #[test]
    fn test_match_without_document_id() {
        let classifier = Classifier::default();
        let index = ReferenceIndex::default();
        let outcome = match_files(
            Path::new("gen"),
            paths(&["gen/oneshot/llama/notes.txt"]),
            &index,
            &classifier,
        );
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched[0].reason, UnmatchedReason::NoDocumentId);
    }
}
