//! 色付け
//!
//! ハイライタの契約（`SyntaxHighlighter`）と、フレーム単位で進む
//! インクリメンタル色付けスケジューラ（`Colorizer`）

pub mod colorizer;
pub mod language;

pub use colorizer::Colorizer;
pub use language::{LanguageDefinition, RegexHighlighter, ScanState};

use crate::buffer::{ColorIndex, Glyph};
use crate::error::highlight::Result;
use std::fmt;

/// 1フレームで色付けする行数の既定値
pub const DEFAULT_MAX_LINES_PER_FRAME: usize = 1000;

/// 構文ハイライタ
///
/// 1行分のグリフの色を書き換え、次の行へ引き継ぐ状態（carry state）を返す。
/// 最初の行、または前の行が状態を持たない場合は `None` が渡される。
pub trait SyntaxHighlighter {
    /// 行をまたいで引き継ぐ状態
    type State: Clone + PartialEq + fmt::Debug;

    /// 改行時に前の行のインデントを引き継ぐか
    fn auto_indentation(&self) -> bool {
        true
    }

    /// 1フレームで処理する最大行数
    fn max_lines_per_frame(&self) -> usize {
        DEFAULT_MAX_LINES_PER_FRAME
    }

    /// 識別子のツールチップ
    fn tooltip(&self, _identifier: &str) -> Option<String> {
        None
    }

    /// 行を色付けし、次の行へ渡す状態を返す
    fn colorize(
        &self,
        line: &mut [Glyph],
        state: Option<&Self::State>,
    ) -> Result<Option<Self::State>>;
}

/// 何も色付けしないハイライタ
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl SyntaxHighlighter for PlainHighlighter {
    type State = ();

    fn colorize(&self, line: &mut [Glyph], _state: Option<&()>) -> Result<Option<()>> {
        for glyph in line {
            *glyph = Glyph::with_color(glyph.ch, ColorIndex::Default);
        }
        Ok(None)
    }
}
