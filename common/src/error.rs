//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown import mode: {0} (use add or sync)")]
    UnknownMode(String),

    #[error("Column {column} is out of range ({width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid mapping override: {0}")]
    InvalidOverride(String),

    #[error("Invalid tenant id: {0}")]
    InvalidTenant(String),

    #[error("Required field is not mapped: {0}")]
    RequiredFieldUnmapped(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_field() {
        let error = Error::UnknownField("vendorz".to_string());
        assert_eq!(format!("{}", error), "Unknown field: vendorz");
    }

    #[test]
    fn test_error_display_column_out_of_range() {
        let error = Error::ColumnOutOfRange { column: 7, width: 3 };
        let display = format!("{}", error);
        assert!(display.contains("7"));
        assert!(display.contains("3 columns"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::InvalidOverride("vendor_name".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidOverride"));
        assert!(debug.contains("vendor_name"));
    }
}
