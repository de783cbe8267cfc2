//! 正規表現によるファイル名の置換コピー
//!
//! 1回目の走査で全ての新しい名前を決め、衝突があれば何も書かずに中止する。
//! 2回目でコピーする。出力は常に出力フォルダ直下（再帰時も平坦化）。

use crate::error::{AuditError, Result};
use crate::outcome::RunSummary;
use crate::scanner::{self, FileFilter};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RenameOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pattern: String,
    /// 置換文字列（`${1}` `${name}` で捕獲グループを参照）
    pub replacement: String,
    pub recursive: bool,
    pub dry_run: bool,
    /// false なら拡張子込みのファイル名に適用
    pub preserve_extension: bool,
}

/// 1ファイル分の改名計画
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// 新しいファイル名を作る
pub fn new_name(path: &Path, pattern: &Regex, replacement: &str, preserve_extension: bool) -> String {
    if preserve_extension {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let new_stem = pattern.replace_all(&stem, replacement);
        match path.extension() {
            Some(ext) => format!("{}.{}", new_stem, ext.to_string_lossy()),
            None => new_stem.to_string(),
        }
    } else {
        let name = scanner::file_name_of(path);
        pattern.replace_all(&name, replacement).to_string()
    }
}

/// 全ファイルの改名計画を作る（衝突があればエラー）
pub fn plan_renames(
    files: &[PathBuf],
    output_dir: &Path,
    pattern: &Regex,
    replacement: &str,
    preserve_extension: bool,
) -> Result<Vec<RenamePlan>> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    let mut plans = Vec::with_capacity(files.len());

    for source in files {
        let name = new_name(source, pattern, replacement, preserve_extension);
        if name.is_empty() || name == "." {
            return Err(AuditError::NamingConflict(format!(
                "{} の新しい名前が空になります",
                source.display()
            )));
        }

        let target = output_dir.join(&name);
        if let Some(previous) = seen.get(&target) {
            return Err(AuditError::NamingConflict(format!(
                "{} と {} が同じ名前 {} になります",
                previous.display(),
                source.display(),
                name
            )));
        }
        seen.insert(target.clone(), source);
        plans.push(RenamePlan {
            source: source.clone(),
            target,
        });
    }

    Ok(plans)
}

pub fn run(options: &RenameOptions) -> Result<RunSummary> {
    let pattern = Regex::new(&options.pattern)?;
    let files: Vec<PathBuf> =
        scanner::walk_files(&options.input_dir, FileFilter::Any, options.recursive)?.collect();

    let mut summary = RunSummary::default();
    if files.is_empty() {
        tracing::warn!("入力フォルダにファイルがありません");
        return Ok(summary);
    }
    tracing::info!("{}件のファイルを処理します", files.len());

    let plans = plan_renames(
        &files,
        &options.output_dir,
        &pattern,
        &options.replacement,
        options.preserve_extension,
    )?;

    if !options.dry_run {
        crate::export::prepare_output_dir(&options.output_dir)?;
    }

    for plan in &plans {
        let old = plan.source.strip_prefix(&options.input_dir).unwrap_or(&plan.source);
        let new = scanner::file_name_of(&plan.target);

        if options.dry_run {
            tracing::info!("改名予定: {} → {}", old.display(), new);
            summary.processed += 1;
            continue;
        }

        match std::fs::copy(&plan.source, &plan.target) {
            Ok(_) => {
                tracing::info!("改名: {} → {}", old.display(), new);
                summary.processed += 1;
            }
            Err(e) => {
                tracing::error!("改名に失敗: {} ({})", old.display(), e);
                summary.skipped += 1;
            }
        }
    }

    tracing::info!(
        "{}改名完了: {} / {} 件",
        if options.dry_run { "[DRY RUN] " } else { "" },
        summary.processed,
        plans.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_name_preserves_extension() {
        let pattern = Regex::new(r"^(\d{4})_([a-z]+)").unwrap();
        let name = new_name(Path::new("in/2023_file.txt"), &pattern, "${2}_$1", true);
        assert_eq!(name, "file_2023.txt");
    }

    #[test]
    fn test_unbraced_group_followed_by_underscore() {
        // "$2_" はグループ "2_" の参照として扱われ空になる
        let pattern = Regex::new(r"^(\d{4})_([a-z]+)").unwrap();
        let name = new_name(Path::new("in/2023_file.txt"), &pattern, "$2_$1", true);
        assert_eq!(name, "2023.txt");
        let braced = new_name(Path::new("in/2023_file.txt"), &pattern, "${2}_${1}", true);
        assert_eq!(braced, "file_2023.txt");
    }

    #[test]
    fn test_new_name_whole_filename() {
        let pattern = Regex::new(r"\.txt$").unwrap();
        assert_eq!(new_name(Path::new("a.txt"), &pattern, ".text", false), "a.text");
        // 拡張子を保持する場合は語幹にしか当たらない
        assert_eq!(new_name(Path::new("a.txt"), &pattern, ".text", true), "a.txt");
    }

    #[test]
    fn test_new_name_removes_digits() {
        let pattern = Regex::new(r"\d+").unwrap();
        assert_eq!(new_name(Path::new("run42_llama.txt"), &pattern, "", true), "run_llama.txt");
    }

    #[test]
    fn test_plan_detects_conflict() {
        let pattern = Regex::new(r"\d+").unwrap();
        let files = vec![PathBuf::from("in/a1.txt"), PathBuf::from("in/a2.txt")];
        let result = plan_renames(&files, Path::new("out"), &pattern, "", true);
        assert!(matches!(result, Err(AuditError::NamingConflict(_))));
    }

    #[test]
    fn test_plan_targets_are_flat() {
        let pattern = Regex::new("old").unwrap();
        let files = vec![PathBuf::from("in/sub/old_a.txt")];
        let plans = plan_renames(&files, Path::new("out"), &pattern, "new", true).unwrap();
        assert_eq!(plans[0].target, PathBuf::from("out/new_a.txt"));
    }
}
