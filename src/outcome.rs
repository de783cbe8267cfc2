//! 実行結果の集計

use std::process::ExitCode;

/// 1回のバッチ実行の結果
///
/// 1件でも最後まで処理できれば成功（一部スキップは警告のみ）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.processed > 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
