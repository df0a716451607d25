//! エディタ設定
//!
//! タブ幅・インデント方式・読み取り専用などの動作オプションを保持し、
//! JSON との相互変換を提供

use crate::buffer::text::{clamp_tab_size, DEFAULT_TAB_SIZE};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// 1ページ移動で進む行数の既定値
pub const DEFAULT_PAGE_LINES: usize = 20;

/// `get_text` が出力する改行コード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// エディタの動作オプション
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorOptions {
    /// タブ幅（1..=32 に丸められる）
    pub tab_size: usize,
    /// Tab 入力・インデントを空白で行う
    pub indent_with_spaces: bool,
    /// 読み取り専用
    pub read_only: bool,
    /// 上書きモード
    pub overwrite: bool,
    /// インクリメンタル色付けを行うか
    pub colorizer_enabled: bool,
    /// PageUp/PageDown の移動行数
    pub page_lines: usize,
    /// テキスト取得時の改行コード
    pub line_ending: LineEnding,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            tab_size: DEFAULT_TAB_SIZE,
            indent_with_spaces: false,
            read_only: false,
            overwrite: false,
            colorizer_enabled: true,
            page_lines: DEFAULT_PAGE_LINES,
            line_ending: LineEnding::Lf,
        }
    }
}

impl EditorOptions {
    /// JSON 文書から読み込む（範囲外の値は丸める）
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let options: EditorOptions = serde_json::from_str(document)?;
        Ok(options.sanitized())
    }

    /// JSON 文書へ書き出す
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
            what: "editor options",
            message: e.to_string(),
        })
    }

    /// 値を有効範囲へ丸めたコピーを返す
    pub fn sanitized(mut self) -> Self {
        let tab_size = clamp_tab_size(self.tab_size);
        if tab_size != self.tab_size {
            log::warn!("tab size {} clamped to {}", self.tab_size, tab_size);
            self.tab_size = tab_size;
        }
        if self.page_lines == 0 {
            self.page_lines = 1;
        }
        self
    }

    /// 改行コードの文字列表現
    pub fn newline(&self) -> &'static str {
        self.line_ending.as_str()
    }
}
