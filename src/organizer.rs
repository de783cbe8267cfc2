//! 生成テキストの整理
//!
//! ファイル名から (shot, model, 文書ID) を判定し、
//! `<out>/<shot>/<model>/<id>.txt` にコピーする。

use crate::error::Result;
use crate::export::prepare_output_dir;
use crate::outcome::RunSummary;
use crate::scanner::{self, FileFilter};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use textaudit_common::{Classification, Classifier, PatternTable};

pub const REPORT_FILE_NAME: &str = "organization_report.txt";

#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
}

/// 整理結果の集計
///
/// 件数表はパターン表の宣言順に並ぶ。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizeStats {
    pub counts: Vec<(String, Vec<(String, usize)>)>,
    /// (ファイル名, 理由)
    pub unclassified: Vec<(String, String)>,
    pub total: usize,
    pub organized: usize,
}

impl OrganizeStats {
    fn new(classifier: &Classifier) -> Self {
        let models: Vec<(String, usize)> = classifier
            .model_table()
            .labels()
            .map(|m| (m.to_string(), 0))
            .collect();
        Self {
            counts: classifier
                .shot_table()
                .labels()
                .map(|s| (s.to_string(), models.clone()))
                .collect(),
            ..Default::default()
        }
    }

    fn increment(&mut self, shot: &str, model: &str) {
        if let Some((_, models)) = self.counts.iter_mut().find(|(s, _)| s == shot) {
            if let Some((_, count)) = models.iter_mut().find(|(m, _)| m == model) {
                *count += 1;
            }
        }
        self.organized += 1;
    }

    pub fn count(&self, shot: &str, model: &str) -> usize {
        self.counts
            .iter()
            .find(|(s, _)| s == shot)
            .and_then(|(_, models)| models.iter().find(|(m, _)| m == model))
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// shot ごとの件数ブロック（0件のモデルは省く）
    fn render_counts(&self, out: &mut String) {
        for (shot, models) in &self.counts {
            out.push_str(&format!("\n{}:\n", shot.to_uppercase()));
            for (model, count) in models.iter().filter(|(_, c)| *c > 0) {
                out.push_str(&format!("  {}: {} files\n", model, count));
            }
        }
    }

    /// ログ用の要約
    pub fn render_summary(&self) -> String {
        let rule = "-".repeat(50);
        let mut out = format!("File Organization Summary:\n{}\n", rule);
        self.render_counts(&mut out);
        out.push_str(&format!("\nUnclassified: {} files\n{}\n", self.unclassified.len(), rule));
        out.push_str(&format!("Total files processed: {}\n", self.total));
        out.push_str(&format!("Successfully organized: {}\n", self.organized));
        out.push_str(&format!("Unclassified: {}", self.unclassified.len()));
        out
    }
}

/// 整理レポート本文
pub fn render_report(stats: &OrganizeStats, classifier: &Classifier, generated_on: &str) -> String {
    let mut out = String::from("File Organization Report\n");
    out.push_str(&format!("Generated on: {}\n", generated_on));
    out.push_str(&format!("{}\n\n", "-".repeat(50)));

    out.push_str("Organization Statistics:\n");
    stats.render_counts(&mut out);

    out.push_str("\nUnclassified Files:\n");
    for (name, reason) in &stats.unclassified {
        out.push_str(&format!("  {} ({})\n", name, reason));
    }

    out.push_str("\nPattern Information:\nShot patterns:\n");
    render_table(classifier.shot_table(), &mut out);
    out.push_str("\nModel patterns:\n");
    render_table(classifier.model_table(), &mut out);
    out
}

fn render_table(table: &PatternTable, out: &mut String) {
    for entry in table.entries() {
        out.push_str(&format!("  {}: {}\n", entry.label, entry.patterns.join(", ")));
    }
}

/// 分類済みファイルのコピー先
pub fn target_path(output_dir: &Path, shot: &str, model: &str, document_id: &str) -> PathBuf {
    output_dir
        .join(shot)
        .join(model)
        .join(format!("{}.txt", document_id))
}

/// 入力フォルダ以下の .txt を整理
pub fn organize(options: &OrganizeOptions, classifier: &Classifier) -> Result<(RunSummary, OrganizeStats)> {
    scanner::ensure_dir(&options.input_dir)?;
    if !options.dry_run {
        prepare_output_dir(&options.output_dir)?;
    }

    let files: Vec<PathBuf> =
        scanner::walk_files(&options.input_dir, FileFilter::text_files(), true)?.collect();

    let mut stats = OrganizeStats::new(classifier);
    stats.total = files.len();
    let mut summary = RunSummary::default();

    if files.is_empty() {
        tracing::warn!("入力フォルダに .txt ファイルがありません");
        return Ok((summary, stats));
    }
    tracing::info!("{}件のテキストファイルを処理します", files.len());

    let mut targets: HashSet<PathBuf> = HashSet::new();

    for (index, path) in files.iter().enumerate() {
        let name = scanner::file_name_of(path);
        tracing::debug!("処理中 {}/{}: {}", index + 1, files.len(), name);

        let file = match classifier.classify(path) {
            Classification::Classified(file) => file,
            unclassified => {
                let reason = unclassified.reason_text();
                tracing::warn!("分類できません: {} ({})", name, reason);
                stats.unclassified.push((name, reason));
                summary.skipped += 1;
                continue;
            }
        };

        let target = target_path(
            &options.output_dir,
            &file.shot_category,
            &file.model_category,
            &file.document_id,
        );
        let relative = format!(
            "{}/{}/{}.txt",
            file.shot_category, file.model_category, file.document_id
        );
        if !targets.insert(target.clone()) {
            tracing::warn!("コピー先が重複するため上書きします: {} → {}", name, relative);
        }

        if options.dry_run {
            tracing::info!("コピー予定: {} → {}", name, relative);
        } else {
            let copied = target
                .parent()
                .map_or(Ok(()), |dir| std::fs::create_dir_all(dir))
                .and_then(|_| std::fs::copy(path, &target));
            if let Err(e) = copied {
                tracing::error!("コピーに失敗: {} ({})", name, e);
                stats.unclassified.push((name, format!("コピー失敗: {}", e)));
                summary.skipped += 1;
                continue;
            }
            tracing::info!("コピー: {} → {}", name, relative);
        }

        stats.increment(&file.shot_category, &file.model_category);
        summary.processed += 1;
    }

    tracing::info!("\n{}", stats.render_summary());

    if !options.dry_run {
        let generated_on = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let report = render_report(&stats, classifier, &generated_on);
        std::fs::write(options.output_dir.join(REPORT_FILE_NAME), report)?;
    }

    Ok((summary, stats))
}
