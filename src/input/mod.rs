//! 入力処理モジュール
//!
//! キーバインドとイベントハンドリングを提供

pub mod event_handler;
pub mod keybinding;

// 公開API
pub use keybinding::{EditorAction, Key, KeyCode, KeyMap, KeyModifiers, KeyParseError};
