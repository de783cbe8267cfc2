//! 統計ブック（.xlsx）出力
//!
//! 1ファイル3シート構成:
//! - Learning_Model_Stats: shot 別
//! - Model_Stats: model 別
//! - Combined_Stats: (shot, model) 別
//!
//! 各指標について `_sum` `_mean` `_std` `_max` の4列を出す。

use crate::error::Result;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;
use textaudit_common::{summarize, GroupKey, Record, SummaryRow};

/// シート名と集計キーの対応
pub const STATISTICS_SHEETS: [(&str, &[GroupKey]); 3] = [
    ("Learning_Model_Stats", &[GroupKey::Shot]),
    ("Model_Stats", &[GroupKey::Model]),
    ("Combined_Stats", &[GroupKey::Shot, GroupKey::Model]),
];

const STAT_SUFFIXES: [&str; 4] = ["sum", "mean", "std", "max"];

/// 統計ブックを書き出す
///
/// `metrics` はレコードから引く指標名（タグ名と "total" など）。
pub fn write_statistics_workbook<R: Record>(
    path: &Path,
    records: &[R],
    metrics: &[String],
) -> Result<()> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    for (sheet_name, keys) in STATISTICS_SHEETS {
        let rows = summarize(records, keys, metrics);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;
        write_sheet(worksheet, keys, metrics, &rows, &header_format)?;
    }

    workbook.save(path)?;
    tracing::debug!("統計ブック出力: {}", path.display());
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    keys: &[GroupKey],
    metrics: &[String],
    rows: &[SummaryRow],
    header_format: &Format,
) -> Result<()> {
    let mut col: u16 = 0;
    for key in keys {
        worksheet.write_string_with_format(0, col, key.column(), header_format)?;
        col += 1;
    }
    for metric in metrics {
        for suffix in STAT_SUFFIXES {
            let header = format!("{}_{}", metric, suffix);
            worksheet.write_string_with_format(0, col, &header, header_format)?;
            col += 1;
        }
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        let mut col: u16 = 0;
        for value in &row.keys {
            worksheet.write_string(r, col, value)?;
            col += 1;
        }
        for metric in metrics {
            let stats = row.stats(metric).copied().unwrap_or_default();
            let cells = [Some(stats.sum), stats.mean, stats.std, stats.max];
            for cell in cells {
                // 欠損は空セル
                if let Some(v) = cell {
                    worksheet.write_number(r, col, v)?;
                }
                col += 1;
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}
