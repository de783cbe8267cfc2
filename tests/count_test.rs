//! 注釈タグ・文字列集計の統合テスト

use calamine::{open_workbook, Reader, Xlsx};
use std::path::Path;
use tempfile::tempdir;
use textaudit::counter::{self, CountStringsOptions, CountTagsOptions};
use textaudit::error::AuditError;

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn build_tree(root: &Path) {
    write(&root.join("oneshot/llama/100001.txt"), "x [UCE] y [OGE] [UCE]");
    write(&root.join("oneshot/llama/100002.txt"), "[OGE]");
    write(&root.join("zeroshot/qwen/100001.txt"), "no tags here");
    write(&root.join("zeroshot/qwen/notes.md"), "[UCE]");
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}

#[test]
fn test_count_tags_writes_three_reports() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("organized");
    build_tree(&input);
    let output = dir.path().join("results/hallucinations.csv");

    let options = CountTagsOptions {
        input_dir: input,
        output_file: output.clone(),
        tags: vec!["UCE".into(), "OGE".into()],
        precision: 4,
    };
    let summary = counter::count_tags(&options).unwrap();
    assert_eq!(summary.processed, 3);

    // 明細: (shot, model, file) 順
    let (header, rows) = read_csv(&output);
    assert_eq!(
        header,
        vec!["shot_category", "model_category", "file_name", "file_path", "UCE", "OGE", "total"]
    );
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][..3], ["oneshot", "llama", "100001"]);
    assert_eq!(rows[0][4..], ["2", "1", "3"]);
    assert_eq!(rows[2][..2], ["zeroshot", "qwen"]);
    assert_eq!(rows[2][6], "0");

    // 集計
    let summary_path = dir.path().join("results/summary_hallucinations.csv");
    let (header, rows) = read_csv(&summary_path);
    assert_eq!(rows.len(), 2);
    let col = |name: &str| header.iter().position(|h| h == name).unwrap();
    assert_eq!(rows[0][col("total_sum")], "4.0000");
    assert_eq!(rows[0][col("total_files")], "2");
    assert_eq!(rows[0][col("UCE_percentage")], "50.0000");
    assert_eq!(rows[1][col("UCE_percentage")], "");

    // 統計ブック
    let stats_path = dir.path().join("results/statistics_hallucinations.xlsx");
    let mut workbook: Xlsx<_> = open_workbook(&stats_path).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["Learning_Model_Stats", "Model_Stats", "Combined_Stats"]
    );
    let combined = workbook.worksheet_range("Combined_Stats").unwrap();
    assert_eq!(combined.get((0, 0)).unwrap().to_string(), "shot_category");
    assert_eq!(combined.get((0, 2)).unwrap().to_string(), "UCE_sum");
    // ヘッダー + 2グループ
    assert_eq!(combined.height(), 3);
}

#[test]
fn test_count_tags_empty_tree_is_failure() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("organized");
    std::fs::create_dir_all(input.join("oneshot/llama")).unwrap();

    let options = CountTagsOptions {
        input_dir: input,
        output_file: dir.path().join("out.csv"),
        tags: vec!["UCE".into()],
        precision: 4,
    };
    let summary = counter::count_tags(&options).unwrap();
    assert!(!summary.succeeded());
    assert!(!dir.path().join("out.csv").exists());
}

#[test]
fn test_count_tags_rejects_bracketed_tag() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("organized");
    build_tree(&input);
    let output = dir.path().join("results/out.csv");

    let options = CountTagsOptions {
        input_dir: input,
        output_file: output.clone(),
        tags: vec!["[UCE]".into()],
        precision: 4,
    };
    let err = counter::count_tags(&options).unwrap_err();
    assert!(matches!(err, AuditError::Config(_)));
    assert!(!dir.path().join("results").exists());
}

#[test]
fn test_count_strings_by_prefix() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a/log_1.txt"), "[UCE] foo [UCE]");
    write(&dir.path().join("a/b/log_2.txt"), "foo");
    write(&dir.path().join("a/other.txt"), "[UCE] [UCE] [UCE]");

    let output = dir.path().join("output.csv");
    let options = CountStringsOptions {
        root_dir: dir.path().join("a"),
        file_prefix: "log_".into(),
        strings: vec!["[UCE]".into(), "foo".into(), "bar".into()],
        output_file: output.clone(),
    };
    let summary = counter::count_strings(&options).unwrap();
    assert_eq!(summary.processed, 2);

    let (header, rows) = read_csv(&output);
    assert_eq!(header, vec!["String", "Frequency"]);
    assert_eq!(
        rows,
        vec![
            vec!["[UCE]", "2"],
            vec!["foo", "2"],
            vec!["bar", "0"],
        ]
    );
}
