//! ファイル走査モジュール
//!
//! ルート以下のファイルを接尾辞・接頭辞で絞り込んで列挙する。
//! シンボリックリンクはたどらない（walkdirの既定）。リンクの循環に対する
//! 独自の保護は持たない。

use crate::error::{AuditError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// ファイル名フィルタ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFilter {
    Any,
    /// 接尾辞一致（大文字小文字を区別しない）。例: ".txt"
    Suffix(String),
    /// 接頭辞一致。例: "log_"
    Prefix(String),
}

impl FileFilter {
    pub fn text_files() -> Self {
        FileFilter::Suffix(".txt".into())
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            FileFilter::Any => true,
            FileFilter::Suffix(suffix) => file_name
                .to_lowercase()
                .ends_with(&suffix.to_lowercase()),
            FileFilter::Prefix(prefix) => file_name.starts_with(prefix.as_str()),
        }
    }
}

/// フォルダの存在確認
pub fn ensure_dir(folder: &Path) -> Result<()> {
    if !folder.is_dir() {
        return Err(AuditError::FolderNotFound(folder.display().to_string()));
    }
    Ok(())
}

/// フィルタに一致するファイルを遅延列挙
///
/// `recursive` が false なら直下のみ。ファイル名順。
/// 読めないエントリは警告して飛ばす。
pub fn walk_files(
    root: &Path,
    filter: FileFilter,
    recursive: bool,
) -> Result<impl Iterator<Item = PathBuf>> {
    ensure_dir(root)?;

    let max_depth = if recursive { usize::MAX } else { 1 };

    let iter = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::warn!("走査できないエントリをスキップ: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(move |entry| filter.matches(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.into_path());

    Ok(iter)
}

/// 直下のサブフォルダを名前順で返す
pub fn list_subdirs(folder: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(folder)?;

    let mut dirs: Vec<PathBuf> = std::fs::read_dir(folder)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    dirs.sort();
    Ok(dirs)
}

/// ファイル名（拡張子込み）を文字列で取得
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
