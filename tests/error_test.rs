//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use vendor_import::error::ImportError;

/// ImportErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ImportError::Config("テスト設定エラー".to_string()),
        ImportError::MissingTenant,
        ImportError::FileNotFound("vendors.csv".to_string()),
        ImportError::InvalidText("vendors.csv".to_string()),
        ImportError::Spreadsheet("壊れたファイル".to_string()),
        ImportError::EmptyFile("empty.csv".to_string()),
        ImportError::StoreConflict("Acme".to_string()),
        ImportError::Store("バージョン不一致".to_string()),
        ImportError::Cancelled,
        ImportError::ExcelGeneration("Excel生成エラー".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "Error display should not be empty");
    }
}

/// パース段階のエラー判定
#[test]
fn test_parse_error_classification() {
    assert!(ImportError::FileNotFound("a.csv".into()).is_parse_error());
    assert!(ImportError::EmptyFile("a.csv".into()).is_parse_error());
    assert!(!ImportError::Cancelled.is_parse_error());
    assert!(!ImportError::StoreConflict("x".into()).is_parse_error());
}

/// マッピングエラーの変換
#[test]
fn test_mapping_error_conversion() {
    let inner = vendor_import_common::Error::UnknownField("colour".into());
    let err: ImportError = inner.into();
    assert!(matches!(err, ImportError::Mapping(_)));
    assert!(err.to_string().contains("colour"));
}

/// IOエラーの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ImportError = io_err.into();
    assert!(matches!(err, ImportError::Io(_)));
}

/// JSONエラーの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
    let err: ImportError = json_err.into();
    assert!(matches!(err, ImportError::JsonParse(_)));
}
