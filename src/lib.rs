//! editcore - 組み込み用テキスト編集コア
//!
//! タブ幅を考慮した行バッファ、選択、取り消し履歴、
//! インクリメンタル色付け、行マーカーを1つの `TextEditor` にまとめる。
//! 描画とファイル入出力はホスト側の責務。

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod buffer;

// 編集層
pub mod editor;

// 色付け
pub mod highlight;

// 入力
pub mod input;

// 公開API
pub use buffer::{ColorIndex, Coordinates, Glyph, TextBuffer, TextChange};
pub use config::{EditorOptions, LineEnding};
pub use editor::{EditorSnapshot, SelectionMode, TextEditor};
pub use error::{EditorError, Result};
pub use highlight::{LanguageDefinition, PlainHighlighter, RegexHighlighter, SyntaxHighlighter};
pub use input::{EditorAction, Key, KeyMap};
