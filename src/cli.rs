use crate::matcher::DuplicatePolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "textaudit")]
#[command(about = "生成テキスト注釈ワークフロー用バッチツール", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（JSON）。省略時は ~/.config/textaudit/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 生成テキストを <shot>/<model>/<id>.txt に整理
    Organize {
        /// 入力フォルダ
        #[arg(short, long = "input-directory", visible_alias = "input")]
        input: PathBuf,

        /// 出力フォルダ
        #[arg(short, long = "output-directory", visible_alias = "output")]
        output: PathBuf,

        /// 実際にはコピーせず予定だけ表示
        #[arg(long)]
        dry_run: bool,
    },

    /// 正規表現でファイル名を置換してコピー
    Rename {
        /// 入力フォルダ
        #[arg(short, long = "input-directory", visible_alias = "input")]
        input: PathBuf,

        /// 出力フォルダ
        #[arg(short, long = "output-directory", visible_alias = "output")]
        output: PathBuf,

        /// ファイル名に当てる正規表現
        #[arg(short, long)]
        pattern: String,

        /// 置換文字列（${1} ${2} で捕獲グループを参照。例: "${2}_${1}"）
        ///
        /// "$2_$1" は名前付きグループ "2_" と解釈され空になるため、
        /// 後ろに英数字や _ が続くときは必ず波括弧で囲む。
        #[arg(short, long, allow_hyphen_values = true)]
        replacement: String,

        /// サブフォルダも処理
        #[arg(short = 'R', long)]
        recursive: bool,

        /// 実際にはコピーせず予定だけ表示
        #[arg(long)]
        dry_run: bool,

        /// 拡張子込みのファイル名に適用
        #[arg(long)]
        no_preserve_extension: bool,
    },

    /// 文書から見出し付きセクションを抽出
    ///
    /// 見出しとみなすのは100文字未満で、末尾が ":" か "।"、
    /// または "IV." "12." "(a)" などの番号で始まる段落。
    /// "." で終わる短い段落はセクションの区切りにならない。
    Extract {
        /// 文書フォルダ（ファイル名が6桁の数字の文書だけが対象）
        #[arg(short, long)]
        target_directory: PathBuf,

        /// 出力フォルダ
        #[arg(short, long)]
        output: PathBuf,

        /// 見出しのパターン（正規表現、大文字小文字無視）
        #[arg(required = true)]
        patterns: Vec<String>,

        /// サブフォルダも検索
        #[arg(short, long)]
        recursive: bool,

        /// .docx ではなく .txt を1行1段落として読む
        #[arg(long)]
        plain_text: bool,
    },

    /// 整理済みツリーの注釈タグ（[UCE] など）を集計
    CountTags {
        /// <shot>/<model>/*.txt 構成のフォルダ
        #[arg(short, long = "input-directory", visible_alias = "input")]
        input: PathBuf,

        /// 明細CSV（集計CSV・統計ブックは同じフォルダに出力）
        #[arg(short, long)]
        output_file: PathBuf,

        /// 数えるタグ（角括弧なし）。省略時は設定ファイルの tags
        #[arg(short, long, num_args = 1..)]
        tags: Vec<String>,
    },

    /// 接頭辞で選んだファイル群の文字列出現頻度を集計
    CountStrings {
        /// 検索を始めるフォルダ
        #[arg(short, long)]
        root_dir: PathBuf,

        /// ファイル名の接頭辞（例: log_）
        #[arg(short = 'p', long)]
        file_pattern: String,

        /// 数える文字列
        #[arg(short, long, num_args = 1.., required = true)]
        strings: Vec<String>,

        /// 出力CSV
        #[arg(short, long, default_value = "output.csv")]
        output_file: PathBuf,
    },

    /// テキストの文数・語数・異なり語数を集計
    Stats {
        /// テキストフォルダ（再帰）
        #[arg(required = true)]
        directory: PathBuf,

        /// ファイル別統計のCSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 生成テキストを参照テキストと照合して自動評価
    Evaluate {
        /// 生成テキストのフォルダ（<shot>/<model>/<id>.txt）
        #[arg(long)]
        generated_dir: PathBuf,

        /// 参照テキストのフォルダ
        #[arg(long)]
        reference_dir: PathBuf,

        /// 明細CSV
        #[arg(short, long, default_value = "automatic_scores.csv")]
        output: PathBuf,

        /// グループ別平均のCSV
        #[arg(long, default_value = "grouped_evaluation_metrics.csv")]
        summary: PathBuf,

        /// 参照の文書IDが重複したときの扱い（省略時は設定ファイル）
        #[arg(long, value_enum)]
        duplicate_policy: Option<DuplicatePolicy>,

        /// 照合だけ行い採点しない
        #[arg(long)]
        dry_run: bool,
    },

    /// 設定の表示・初期化
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,
    },
}
