//! 選択範囲
//!
//! カーソルと選択の始点・終点。始点 ≤ 終点 を常に保ち、
//! 単語・行単位の選択モードでは境界へ吸着させる。

use crate::buffer::{Coordinates, TextBuffer};
use serde::{Deserialize, Serialize};

/// 選択の粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Normal,
    Word,
    Line,
}

/// 取り消し・やり直しで復元するカーソルと選択の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    pub cursor: Coordinates,
    pub start: Coordinates,
    pub end: Coordinates,
}

/// 選択範囲とカーソル
#[derive(Debug, Clone, Default)]
pub struct Selection {
    state: SelectionState,
    interactive_start: Coordinates,
    interactive_end: Coordinates,
    mode: SelectionMode,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// 状態をそのまま復元する（整合はしない）
    pub fn restore(&mut self, state: SelectionState) {
        self.state = state;
        self.interactive_start = state.start;
        self.interactive_end = state.end;
    }

    /// 原点へ戻す
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start(&self) -> Coordinates {
        self.state.start
    }

    pub fn end(&self) -> Coordinates {
        self.state.end
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    pub fn has_selection(&self) -> bool {
        self.state.end > self.state.start
    }

    /// 保持しているカーソル位置（整合前）
    pub fn raw_cursor(&self) -> Coordinates {
        self.state.cursor
    }

    /// バッファに合わせて丸めたカーソル位置
    pub fn cursor(&self, text: &TextBuffer) -> Coordinates {
        text.sanitize_coordinates(self.state.cursor)
    }

    pub fn set_cursor(&mut self, text: &TextBuffer, at: Coordinates) {
        self.state.cursor = text.sanitize_coordinates(at);
    }

    /// 丸めずにカーソルを置く（縦移動で列を保つ）
    pub fn place_cursor(&mut self, at: Coordinates) {
        self.state.cursor = at;
    }

    pub fn interactive_start(&self) -> Coordinates {
        self.interactive_start
    }

    pub fn interactive_end(&self) -> Coordinates {
        self.interactive_end
    }

    pub fn set_interactive(&mut self, start: Coordinates, end: Coordinates) {
        self.interactive_start = start;
        self.interactive_end = end;
    }

    /// 始点を設定する（終点を越えたら入れ替える）
    pub fn set_start(&mut self, text: &TextBuffer, at: Coordinates) {
        self.state.start = text.sanitize_coordinates(at);
        if self.state.start > self.state.end {
            std::mem::swap(&mut self.state.start, &mut self.state.end);
        }
    }

    /// 終点を設定する（始点より前なら入れ替える）
    pub fn set_end(&mut self, text: &TextBuffer, at: Coordinates) {
        self.state.end = text.sanitize_coordinates(at);
        if self.state.start > self.state.end {
            std::mem::swap(&mut self.state.start, &mut self.state.end);
        }
    }

    /// 範囲を選択し、モードに応じて境界へ吸着させる
    pub fn select(
        &mut self,
        text: &TextBuffer,
        start: Coordinates,
        end: Coordinates,
        mode: SelectionMode,
    ) {
        self.state.start = text.sanitize_coordinates(start);
        self.state.end = text.sanitize_coordinates(end);
        if self.state.start > self.state.end {
            std::mem::swap(&mut self.state.start, &mut self.state.end);
        }

        match mode {
            SelectionMode::Normal => {}
            SelectionMode::Word => {
                self.state.start = text.find_word_start(self.state.start);
                if !text.is_on_word_boundary(self.state.end) {
                    self.state.end = text.find_word_end(text.find_word_start(self.state.end));
                }
            }
            SelectionMode::Line => {
                let (first, last) = (self.state.start.line, self.state.end.line);
                self.state.start = Coordinates::new(first, 0);
                self.state.end = Coordinates::new(last, text.line_max_column(last));
            }
        }
    }

    /// 全体を選択する
    ///
    /// 終点は最終行の次の行頭を指定し、丸めによって最終行の行末になる。
    pub fn select_all(&mut self, text: &TextBuffer) {
        self.select(
            text,
            Coordinates::origin(),
            Coordinates::new(text.line_count(), 0),
            SelectionMode::Normal,
        );
    }

    /// カーソル下の単語を選択する
    pub fn select_word_under_cursor(&mut self, text: &TextBuffer) {
        let cursor = self.cursor(text);
        let start = text.find_word_start(cursor);
        let end = text.find_word_end(cursor);
        self.select(text, start, end, SelectionMode::Normal);
    }

    /// 選択を解除してカーソル位置へ畳む
    pub fn collapse_to(&mut self, text: &TextBuffer, at: Coordinates) {
        let at = text.sanitize_coordinates(at);
        self.state = SelectionState {
            cursor: at,
            start: at,
            end: at,
        };
        self.interactive_start = at;
        self.interactive_end = at;
    }
}
