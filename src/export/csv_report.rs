//! CSV出力
//!
//! ヘッダー行は `ReportKind::columns` から作る。

use crate::error::{AuditError, Result};
use std::path::Path;
use textaudit_common::ReportKind;

/// 浮動小数点を指定桁で文字列化（欠損は空セル）
pub fn format_float(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", precision, v),
        _ => String::new(),
    }
}

/// 表をCSVとして書き出す
///
/// 各行の列数はヘッダーと一致していなければならない。
/// 不一致は書き込み前に検出し、ファイルは作らない。
pub fn write_table<I>(path: &Path, kind: ReportKind, metrics: &[String], rows: I) -> Result<usize>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let header = kind.columns(metrics);
    let rows: Vec<Vec<String>> = rows.into_iter().collect();
    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != header.len())
    {
        return Err(AuditError::Report(format!(
            "{:?} の{}行目の列数が一致しません: ヘッダー {} 列 / 行 {} 列",
            kind,
            index + 1,
            header.len(),
            row.len()
        )));
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&header)?;
    for row in &rows {
        writer.write_record(row)?;
    }

    writer.flush()?;
    tracing::debug!("CSV出力: {} ({}行)", path.display(), rows.len());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(Some(0.5), 4), "0.5000");
        assert_eq!(format_float(Some(1.0 / 3.0), 6), "0.333333");
        assert_eq!(format_float(None, 4), "");
        assert_eq!(format_float(Some(f64::NAN), 4), "");
    }

    #[test]
    fn test_write_string_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let rows = vec![
            vec!["[UCE]".to_string(), "3".to_string()],
            vec!["foo, bar".to_string(), "1".to_string()],
        ];
        let written = write_table(&path, ReportKind::StringCounts, &[], rows).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "String,Frequency");
        assert_eq!(lines[1], "[UCE],3");
        // カンマを含む値は引用符で囲まれる
        assert_eq!(lines[2], "\"foo, bar\",1");
    }

    #[test]
    fn test_write_table_rejects_wrong_width() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let rows = vec![
            vec!["ok".to_string(), "1".to_string()],
            vec!["only-one".to_string()],
        ];
        let err = write_table(&path, ReportKind::StringCounts, &[], rows).unwrap_err();
        assert!(matches!(err, AuditError::Report(_)));
        assert!(!err.is_configuration());
        assert!(!path.exists());
    }
}
