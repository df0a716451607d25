//! エラーハンドリングシステム
//!
//! 編集コア全体で使用される統一されたエラー型を定義
//! 前提条件違反は握りつぶさず、呼び出し元へ `Result` として返す

use crate::buffer::Coordinates;
use thiserror::Error;

/// 編集コア全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// バッファ操作エラー
    #[error("Buffer operation failed: {0}")]
    Buffer(#[from] BufferError),

    /// 編集操作エラー
    #[error("Edit operation failed: {0}")]
    Edit(#[from] EditError),

    /// 色付けエラー
    #[error("Syntax highlighting failed: {0}")]
    Highlight(#[from] HighlightError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// バッファ操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("the last remaining line cannot be removed")]
    LastLine,

    #[error("line {line} is out of range (line count {line_count})")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("inverted range: {start} .. {end}")]
    InvertedRange {
        start: Coordinates,
        end: Coordinates,
    },

    #[error("invalid character range {start}..{end} in line {line}")]
    InvalidCharRange {
        line: usize,
        start: usize,
        end: usize,
    },
}

/// 編集操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("editor is read-only: {operation} refused")]
    ReadOnly { operation: &'static str },
}

/// 色付け固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// トークナイザが前進しなかった（ハイライタの契約違反）
    #[error("token pattern `{pattern}` matched an empty string at column {column}")]
    NoProgress { pattern: String, column: usize },

    #[error("invalid token pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid options document: {message}")]
    InvalidDocument { message: String },

    #[error("failed to serialize {what}: {message}")]
    Serialization { what: &'static str, message: String },
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, EditorError>;

/// 各モジュール固有のResult型
pub mod buffer {
    pub type Result<T> = std::result::Result<T, super::BufferError>;
}

pub mod highlight {
    pub type Result<T> = std::result::Result<T, super::HighlightError>;
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::InvalidDocument {
            message: error.to_string(),
        }
    }
}
