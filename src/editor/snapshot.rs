//! 状態のダンプ
//!
//! 診断・テスト用。設定・選択・行マーカー・本文を決定的な JSON として書き出す。
//! 書式そのものは互換性を保証しない。

use super::selection::SelectionMode;
use super::TextEditor;
use crate::buffer::Coordinates;
use crate::config::EditorOptions;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub options: EditorOptions,
    pub selection: SelectionSnapshot,
    pub breakpoints: Vec<usize>,
    pub error_markers: BTreeMap<usize, String>,
    pub text_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub cursor: Coordinates,
    pub start: Coordinates,
    pub end: Coordinates,
    pub mode: SelectionMode,
}

impl EditorSnapshot {
    /// JSON 文字列へ（同じ状態からは常に同じ文字列になる）
    pub fn to_json(&self) -> std::result::Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
            what: "editor snapshot",
            message: e.to_string(),
        })
    }
}

impl TextEditor {
    /// 現在の状態を写し取る
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            options: self.options.clone(),
            selection: SelectionSnapshot {
                cursor: self.cursor_position(),
                start: self.selection.start(),
                end: self.selection.end(),
                mode: self.selection.mode(),
            },
            breakpoints: self.breakpoints.lines().collect(),
            error_markers: self
                .error_markers
                .iter()
                .map(|(line, message)| (line, message.clone()))
                .collect(),
            text_lines: self.text.text_lines(),
        }
    }

    /// 状態を JSON 文字列として書き出す
    pub fn serialize_state(&self) -> Result<String> {
        Ok(self.snapshot().to_json()?)
    }
}
