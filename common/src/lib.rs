//! textaudit Common Library
//!
//! CLIのサブコマンド間で共有される型と純粋ロジック:
//! ファイル名分類、パターン表、集計、レポート列定義

pub mod types;
pub mod error;
pub mod patterns;
pub mod classifier;
pub mod aggregate;
pub mod report;

pub use types::{Classification, ClassifiedFile, MatchedPair, MetricRecord, UnclassifiedReason};
pub use error::{Error, Result};
pub use patterns::{PatternEntry, PatternTable};
pub use classifier::{extract_document_id, Classifier};
pub use aggregate::{assign_ranks, summarize, GroupKey, MetricStats, Record, SummaryRow};
pub use report::{ReportKind, SUMMARY_SUFFIXES};
