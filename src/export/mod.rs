//! レポート出力モジュール
//!
//! - csv_report: 列定義（ReportKind）に従ったCSV出力
//! - excel: 統計ブック（.xlsx）出力

pub mod csv_report;
pub mod excel;

pub use csv_report::{format_float, write_table};
pub use excel::write_statistics_workbook;

use crate::error::{AuditError, Result};
use std::path::{Path, PathBuf};

/// 出力フォルダを作成し、書き込めることを確認
pub fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| {
        AuditError::OutputNotWritable(format!("{} ({})", output_dir.display(), e))
    })?;

    let check_file = output_dir.join(".test_write");
    std::fs::write(&check_file, "test")
        .and_then(|_| std::fs::remove_file(&check_file))
        .map_err(|e| AuditError::OutputNotWritable(format!("{} ({})", output_dir.display(), e)))
}

/// 出力ファイルの親フォルダを作成
pub fn prepare_output_file(output_file: &Path) -> Result<()> {
    match output_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => prepare_output_dir(parent),
        _ => Ok(()),
    }
}

/// `out.csv` → `<prefix>_out.csv` のように同じフォルダの派生ファイル名を作る
pub fn sibling_path(output_file: &Path, prefix: &str, extension: Option<&str>) -> PathBuf {
    let parent = output_file.parent().unwrap_or_else(|| Path::new(""));
    let name = match extension {
        Some(ext) => {
            let stem = output_file
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("report");
            format!("{}_{}.{}", prefix, stem, ext)
        }
        None => {
            let file_name = output_file
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("report.csv");
            format!("{}_{}", prefix, file_name)
        }
    };
    parent.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sibling_path() {
        let out = Path::new("results/hallucinations.csv");
        assert_eq!(
            sibling_path(out, "summary", None),
            PathBuf::from("results/summary_hallucinations.csv")
        );
        assert_eq!(
            sibling_path(out, "statistics", Some("xlsx")),
            PathBuf::from("results/statistics_hallucinations.xlsx")
        );
        assert_eq!(
            sibling_path(Path::new("out.csv"), "summary", None),
            PathBuf::from("summary_out.csv")
        );
    }

    #[test]
    fn test_prepare_output_dir_creates_and_cleans_check_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a").join("b");
        prepare_output_dir(&target).unwrap();
        assert!(target.is_dir());
        assert!(!target.join(".test_write").exists());
    }
}
