//! textaudit: 生成テキスト注釈ワークフロー用バッチツール

pub mod cli;
pub mod config;
pub mod counter;
pub mod error;
pub mod evaluate;
pub mod export;
pub mod extractor;
pub mod matcher;
pub mod organizer;
pub mod outcome;
pub mod renamer;
pub mod scanner;
pub mod scorer;
pub mod textstats;
