use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("テナントIDが設定されていません。`vendor-import config --set-tenant <UUID>` で設定してください")]
    MissingTenant,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ファイルを開けません: {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("UTF-8テキストとして読み込めません: {0}")]
    InvalidText(String),

    #[error("CSV解析エラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel読み込みエラー: {0}")]
    Spreadsheet(String),

    #[error("データがありません（ヘッダー行なし）: {0}")]
    EmptyFile(String),

    #[error("列マッピングエラー: {0}")]
    Mapping(#[from] vendor_import_common::Error),

    #[error("保存データとの競合: {0}")]
    StoreConflict(String),

    #[error("保存エラー: {0}")]
    Store(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("取り込みをキャンセルしました")]
    Cancelled,

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("バックグラウンド処理エラー: {0}")]
    Task(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// ファイル読み込み段階のエラーか（マッピング以降は実行しない）
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ImportError::FileNotFound(_)
                | ImportError::Unreadable { .. }
                | ImportError::InvalidText(_)
                | ImportError::Csv(_)
                | ImportError::Spreadsheet(_)
                | ImportError::EmptyFile(_)
        )
    }
}

impl From<rust_xlsxwriter::XlsxError> for ImportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ImportError::ExcelGeneration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
