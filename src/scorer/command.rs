//! 外部コマンド連携スコアラー
//!
//! 指標計算は外部プログラム（Pythonスクリプト等）に任せる:
//! - 標準入力: `{"candidate": "...", "reference": "..."}`
//! - 標準出力: `{"BLEU": 0.41, "METEOR": 0.37}` （```json ブロックでも可）

use super::TextScorer;
use crate::config::ScorerConfig;
use anyhow::{bail, Context};
use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};

/// 外部コマンドを呼び出すスコアラー
#[derive(Debug, Clone)]
pub struct CommandScorer {
    name: String,
    program: String,
    args: Vec<String>,
    metrics: Vec<String>,
}

impl CommandScorer {
    pub fn new(name: &str, program: &str, args: Vec<String>, metrics: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            args,
            metrics,
        }
    }

    pub fn from_config(config: &ScorerConfig) -> Self {
        Self::new(
            &config.name,
            &config.program,
            config.args.clone(),
            config.metrics.clone(),
        )
    }

    fn run(&self, payload: &str) -> anyhow::Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("{} の起動に失敗", self.program))?;

        {
            let mut stdin = child.stdin.take().context("標準入力を開けません")?;
            stdin
                .write_all(payload.as_bytes())
                .context("標準入力への書き込みに失敗")?;
        }

        let output = child
            .wait_with_output()
            .context("スコアラーの終了待ちに失敗")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} failed (code {:?}): {}",
                self.program,
                output.status.code(),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl TextScorer for CommandScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn metrics(&self) -> &[String] {
        &self.metrics
    }

    fn score(&self, candidate: &str, reference: &str) -> anyhow::Result<HashMap<String, f64>> {
        let payload = serde_json::json!({
            "candidate": candidate,
            "reference": reference,
        });
        let response = self.run(&payload.to_string())?;
        tracing::debug!("{}: レスポンス長 {} chars", self.name, response.len());
        parse_scores(&response)
    }
}

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...}
fn extract_json_object(response: &str) -> Option<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7;
        if let Some(end_offset) = response[start..].find("```") {
            return Some(response[start..start + end_offset].trim());
        }
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end >= start).then(|| &response[start..=end])
}

/// 指標名→数値のJSONをパース
///
/// 数値でない値（null、文字列）は欠損として捨てる。
pub fn parse_scores(response: &str) -> anyhow::Result<HashMap<String, f64>> {
    let json = extract_json_object(response).context("JSONオブジェクトが見つかりません")?;
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(json).context("スコアJSONのパースに失敗")?;

    Ok(object
        .into_iter()
        .filter_map(|(name, value)| value.as_f64().map(|v| (name, v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scores_raw_object() {
        let scores = parse_scores(r#"{"BLEU": 0.5, "METEOR": 0.25}"#).unwrap();
        assert_eq!(scores.get("BLEU"), Some(&0.5));
        assert_eq!(scores.get("METEOR"), Some(&0.25));
    }

    #[test]
    fn test_parse_scores_json_block() {
        let response = "computing...\n```json\n{\"ROUGE-W\": 0.31}\n```\ndone";
        let scores = parse_scores(response).unwrap();
        assert_eq!(scores.get("ROUGE-W"), Some(&0.31));
    }

    #[test]
    fn test_parse_scores_drops_non_numeric() {
        let scores = parse_scores(r#"{"BLEU": null, "METEOR": "n/a", "BERT_F1": 0.9}"#).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get("BERT_F1"), Some(&0.9));
    }

    #[test]
    fn test_parse_scores_without_json() {
        assert!(parse_scores("Traceback (most recent call last)").is_err());
    }

    #[test]
    fn test_missing_program_is_error() {
        let scorer = CommandScorer::new(
            "missing",
            "/nonexistent/textaudit-scorer",
            vec![],
            vec!["BLEU".into()],
        );
        assert!(scorer.score("a", "b").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_scorer_roundtrip_through_shell() {
        let scorer = CommandScorer::new(
            "echo",
            "sh",
            vec![
                "-c".into(),
                r#"cat > /dev/null; echo '{"BLEU": 0.5, "METEOR": 0.4}'"#.into(),
            ],
            vec!["BLEU".into(), "METEOR".into()],
        );
        let scores = scorer.score("the cat", "a cat").unwrap();
        assert_eq!(scores.get("BLEU"), Some(&0.5));
        assert_eq!(scores.get("METEOR"), Some(&0.4));
    }
}
