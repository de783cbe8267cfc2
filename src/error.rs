use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("出力先に書き込めません: {0}")]
    OutputNotWritable(String),

    #[error("正規表現が不正です: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("出力ファイル名が衝突します: {0}")]
    NamingConflict(String),

    #[error("文書読み込みエラー: {0}")]
    Document(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("レポート生成エラー: {0}")]
    Report(String),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(#[from] rust_xlsxwriter::XlsxError),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] textaudit_common::Error),
}

impl AuditError {
    /// 処理開始前に検出される設定・引数のエラーか
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AuditError::Config(_)
                | AuditError::FileNotFound(_)
                | AuditError::FolderNotFound(_)
                | AuditError::OutputNotWritable(_)
                | AuditError::InvalidPattern(_)
                | AuditError::Common(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
