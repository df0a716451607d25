//! カーソル移動
//!
//! テキストは変更しない。選択を伸ばす移動では、移動前のカーソルと
//! 一致する側の端点（interactive anchor）だけを動かす。

use super::selection::SelectionMode;
use super::TextEditor;
use crate::buffer::Coordinates;

impl TextEditor {
    /// 移動前後のカーソルから選択の端点を更新する
    fn update_interactive(&mut self, old: Coordinates, new: Coordinates, extend: bool) {
        self.selection.place_cursor(new);

        let (start, end) = if extend {
            let (start, end) = (
                self.selection.interactive_start(),
                self.selection.interactive_end(),
            );
            if old == start {
                (new, end)
            } else if old == end {
                (start, new)
            } else {
                (old, new)
            }
        } else {
            (new, new)
        };

        let mode = if extend {
            self.selection.mode()
        } else {
            SelectionMode::Normal
        };
        self.selection.set_interactive(start, end);
        self.selection.set_mode(mode);
        self.selection.select(&self.text, start, end, mode);
    }

    /// 上へ `amount` 行
    pub fn move_up(&mut self, amount: usize, extend: bool) {
        let old = self.selection.raw_cursor();
        let new = Coordinates::new(old.line.saturating_sub(amount), old.column);
        if new != old {
            self.update_interactive(old, new, extend);
        }
    }

    /// 下へ `amount` 行
    pub fn move_down(&mut self, amount: usize, extend: bool) {
        let old = self.selection.raw_cursor();
        let last = self.text.line_count() - 1;
        let new = Coordinates::new(old.line.saturating_add(amount).min(last), old.column);
        if new != old {
            self.update_interactive(old, new, extend);
        }
    }

    /// 左へ `amount` 文字（`word` なら単語単位）
    pub fn move_left(&mut self, amount: usize, extend: bool, word: bool) {
        let old = self.selection.raw_cursor();
        let mut cursor = self.cursor_position();
        let mut line = cursor.line;
        let mut index = self.text.character_index(cursor).unwrap_or(0);

        for _ in 0..amount {
            if index == 0 {
                if line == 0 {
                    break;
                }
                line -= 1;
                index = self.text.line(line).map_or(0, |l| l.len());
            } else {
                index -= 1;
            }
            cursor = Coordinates::new(line, self.text.character_column(line, index));
            if word {
                cursor = self.text.find_word_start(cursor);
                index = self.text.character_index(cursor).unwrap_or(0);
            }
        }

        let new = Coordinates::new(line, self.text.character_column(line, index));
        if new != old {
            self.update_interactive(old, new, extend);
        }
    }

    /// 右へ `amount` 文字（`word` なら次の単語の先頭へ）
    pub fn move_right(&mut self, amount: usize, extend: bool, word: bool) {
        let old = self.selection.raw_cursor();
        let mut cursor = self.cursor_position();
        let mut index = self.text.character_index(cursor).unwrap_or(0);

        for _ in 0..amount {
            let len = self.text.line(cursor.line).map_or(0, |l| l.len());
            if index >= len {
                if cursor.line + 1 >= self.text.line_count() {
                    break;
                }
                cursor = Coordinates::new(cursor.line + 1, 0);
                index = 0;
            } else {
                index += 1;
                cursor = Coordinates::new(
                    cursor.line,
                    self.text.character_column(cursor.line, index),
                );
                if word {
                    cursor = self.text.find_next_word(cursor);
                    index = self.text.character_index(cursor).unwrap_or(0);
                }
            }
        }

        if cursor != old {
            self.update_interactive(old, cursor, extend);
        }
    }

    /// バッファ先頭へ
    pub fn move_to_start_of_file(&mut self, extend: bool) {
        let old = self.selection.raw_cursor();
        let new = Coordinates::origin();
        if new != old {
            self.update_interactive(old, new, extend);
        }
    }

    /// バッファ末尾（最終行の行末）へ
    pub fn move_to_end_of_file(&mut self, extend: bool) {
        let old = self.selection.raw_cursor();
        let new = self.text.end_coordinates();
        if new != old {
            self.update_interactive(old, new, extend);
        }
    }

    /// 行頭へ
    pub fn move_to_start_of_line(&mut self, extend: bool) {
        let old = self.selection.raw_cursor();
        let new = Coordinates::new(self.cursor_position().line, 0);
        if new != old {
            self.update_interactive(old, new, extend);
        }
    }

    /// 行末へ
    pub fn move_to_end_of_line(&mut self, extend: bool) {
        let old = self.selection.raw_cursor();
        let line = self.cursor_position().line;
        let new = Coordinates::new(line, self.text.line_max_column(line));
        if new != old {
            self.update_interactive(old, new, extend);
        }
    }

    pub fn page_up(&mut self, extend: bool) {
        self.move_up(self.options.page_lines, extend);
    }

    pub fn page_down(&mut self, extend: bool) {
        self.move_down(self.options.page_lines, extend);
    }

    /// マウス押下。1/2/3 回クリックで文字/単語/行単位の選択を始める
    ///
    /// `extend` なら既存の始点を残して終点だけを動かす。
    pub fn mouse_press(&mut self, at: Coordinates, clicks: u8, extend: bool) {
        self.selection.set_cursor(&self.text, at);
        let cursor = self.selection.raw_cursor();

        let mode = match clicks {
            0 | 1 => SelectionMode::Normal,
            2 => SelectionMode::Word,
            _ => SelectionMode::Line,
        };
        let start = if extend && mode == SelectionMode::Normal {
            self.selection.interactive_start()
        } else {
            cursor
        };

        self.selection.set_interactive(start, cursor);
        self.selection.set_mode(mode);
        self.selection.select(&self.text, start, cursor, mode);
    }

    /// マウスドラッグ。押下時のモードのまま終点を動かす
    pub fn mouse_drag(&mut self, at: Coordinates) {
        self.selection.set_cursor(&self.text, at);
        let cursor = self.selection.raw_cursor();
        let start = self.selection.interactive_start();
        let mode = self.selection.mode();

        self.selection.set_interactive(start, cursor);
        self.selection.select(&self.text, start, cursor, mode);
    }
}
