//! 編集操作
//!
//! 各操作は「編集前の選択を記録 → バッファを変更 → 編集後の選択を記録」
//! の順に進み、追加・削除した範囲を1つの `UndoRecord` として履歴へ積む。

use super::selection::SelectionMode;
use super::undo::{TextSpan, UndoRecord};
use super::TextEditor;
use crate::buffer::{Coordinates, Glyph};
use crate::error::Result;

/// 履歴内部で使う改行（`insert_text_at` が分割する文字）
const NEWLINE: &str = "\n";

impl TextEditor {
    /// 文字を入力する
    ///
    /// 選択があれば置き換える。複数行にまたがる選択での Tab は
    /// インデント（`shift` なら逆インデント）になる。
    pub fn enter_character(&mut self, ch: char, shift: bool) -> Result<()> {
        self.ensure_writable("enter character")?;

        if ch == '\t'
            && self.selection.has_selection()
            && self.selection.start().line != self.selection.end().line
        {
            return self.indent_selection(shift);
        }

        let mut record = UndoRecord::new(self.selection.state());
        let overwrite = self.options.overwrite && ch != '\n';

        if self.selection.has_selection() {
            let start = self.text.sanitize_coordinates(self.selection.start());
            let mut end = self.text.sanitize_coordinates(self.selection.end());
            if overwrite {
                end = self.next_in_line(end).unwrap_or(end);
            }
            record.removed = Some(self.remove_span(start, end)?);
            self.selection.collapse_to(&self.text, start);
        }

        let at = self.cursor_position();
        if overwrite && record.removed.is_none() {
            if let Some(next) = self.next_in_line(at) {
                record.removed = Some(self.remove_span(at, next)?);
            }
        }

        let inserted = match ch {
            '\n' => {
                let mut inserted = String::from(NEWLINE);
                if self.colorizer.auto_indentation() {
                    if let Some(line) = self.text.line(at.line) {
                        inserted.extend(line.iter().take_while(|g| g.is_blank()).map(|g| g.ch));
                    }
                }
                inserted
            }
            '\t' if self.options.indent_with_spaces => {
                let tab = self.text.tab_size();
                " ".repeat(tab - at.column % tab)
            }
            _ => ch.to_string(),
        };

        let end = self.insert_span(&mut record, at, inserted);
        self.selection.collapse_to(&self.text, end);
        self.commit(record, at.line, end.line);
        Ok(())
    }

    /// 文字列を挿入する（選択があれば置き換える）
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        self.ensure_writable("insert text")?;
        let text = text.replace('\r', "");
        if text.is_empty() {
            return Ok(());
        }

        let mut record = UndoRecord::new(self.selection.state());
        record.removed = self.remove_selection()?;
        let at = self.cursor_position();
        let end = self.insert_span(&mut record, at, text);
        self.selection.collapse_to(&self.text, end);
        self.commit(record, at.line, end.line);
        Ok(())
    }

    /// カーソル前の1文字（行頭なら前の行との結合）を削除する
    pub fn backspace(&mut self) -> Result<()> {
        self.ensure_writable("backspace")?;
        let mut record = UndoRecord::new(self.selection.state());

        if let Some(removed) = self.remove_selection()? {
            let line = removed.start.line;
            record.removed = Some(removed);
            self.commit(record, line, line);
            return Ok(());
        }

        let at = self.cursor_position();
        let index = self.text.character_index(at).unwrap_or(0);
        let (start, end) = if index == 0 {
            if at.line == 0 {
                return Ok(());
            }
            let previous = at.line - 1;
            (
                Coordinates::new(previous, self.text.line_max_column(previous)),
                Coordinates::new(at.line, 0),
            )
        } else {
            (
                Coordinates::new(at.line, self.text.character_column(at.line, index - 1)),
                Coordinates::new(at.line, self.text.character_column(at.line, index)),
            )
        };

        record.removed = Some(self.remove_span(start, end)?);
        self.selection.collapse_to(&self.text, start);
        self.commit(record, start.line, start.line);
        Ok(())
    }

    /// カーソル後の1文字（行末なら次の行との結合）を削除する
    pub fn delete(&mut self) -> Result<()> {
        self.ensure_writable("delete")?;
        let mut record = UndoRecord::new(self.selection.state());

        if let Some(removed) = self.remove_selection()? {
            let line = removed.start.line;
            record.removed = Some(removed);
            self.commit(record, line, line);
            return Ok(());
        }

        let at = self.cursor_position();
        let (start, end) = match self.next_in_line(at) {
            Some(next) => {
                let index = self.text.character_index(at).unwrap_or(0);
                let start = Coordinates::new(at.line, self.text.character_column(at.line, index));
                (start, next)
            }
            None => {
                if at.line + 1 >= self.text.line_count() {
                    return Ok(());
                }
                (
                    Coordinates::new(at.line, self.text.line_max_column(at.line)),
                    Coordinates::new(at.line + 1, 0),
                )
            }
        };

        record.removed = Some(self.remove_span(start, end)?);
        self.selection.collapse_to(&self.text, at);
        self.commit(record, at.line, at.line);
        Ok(())
    }

    /// 選択範囲の行をインデント（`unindent` なら逆インデント）する
    ///
    /// 選択終点が行頭ちょうどにある場合、その行は対象外。
    /// 逆インデントは先頭のタブ1つ、なければ最大タブ幅分の空白を取り除く。
    pub fn indent_selection(&mut self, unindent: bool) -> Result<()> {
        self.ensure_writable("indent")?;

        let had_selection = self.selection.has_selection();
        let (selection_start, selection_end) = if had_selection {
            (
                self.text.sanitize_coordinates(self.selection.start()),
                self.text.sanitize_coordinates(self.selection.end()),
            )
        } else {
            let cursor = self.cursor_position();
            (cursor, cursor)
        };

        let first = selection_start.line;
        let mut last = selection_end.line;
        if selection_end.column == 0 && last > first {
            last -= 1;
        }

        let start = Coordinates::new(first, 0);
        let old_end = Coordinates::new(last, self.text.line_max_column(last));
        let original = self.text.text(start, old_end, NEWLINE);

        let tab = self.text.tab_size();
        let with_spaces = self.options.indent_with_spaces;
        let cursor_index = self.text.character_index(selection_start).unwrap_or(0);
        let mut cursor_shift = (0, 0);
        let mut modified = false;
        for index in first..=last {
            let Some(line) = self.text.line_mut(index) else {
                continue;
            };
            let shift = if unindent {
                let count = match line.get(0) {
                    Some(glyph) if glyph.ch == '\t' => 1,
                    _ => line.iter().take(tab).take_while(|g| g.ch == ' ').count(),
                };
                if count > 0 {
                    line.remove_range(0..count);
                }
                (0, count)
            } else if with_spaces {
                line.insert_str(0, &" ".repeat(tab));
                (tab, 0)
            } else {
                line.insert(0, Glyph::new('\t'));
                (1, 0)
            };
            modified |= shift != (0, 0);
            if index == selection_start.line {
                cursor_shift = shift;
            }
        }

        if !modified {
            return Ok(());
        }

        let new_end = Coordinates::new(last, self.text.line_max_column(last));
        let mut record = UndoRecord::new(self.selection.state());
        record.removed = Some(TextSpan::new(original, start, old_end));
        record.added = Some(TextSpan::new(
            self.text.text(start, new_end, NEWLINE),
            start,
            new_end,
        ));

        if had_selection {
            let end = if last < selection_end.line {
                selection_end
            } else {
                new_end
            };
            self.selection.set_interactive(start, end);
            self.selection.select(&self.text, start, end, SelectionMode::Normal);
        } else {
            // カーソルは同じ文字の前に留める
            let (added, removed) = cursor_shift;
            let index = cursor_index.saturating_sub(removed) + added;
            let cursor = Coordinates::new(first, self.text.character_column(first, index));
            self.selection.collapse_to(&self.text, cursor);
        }

        self.commit(record, first, last);
        Ok(())
    }

    /// 選択範囲（なければ現在行）をクリップボードへ写す
    pub fn copy(&mut self) {
        let content = if self.selection.has_selection() {
            self.selected_text()
        } else {
            self.current_line_text()
        };
        self.clipboard.set_text(&content);
    }

    /// 選択範囲を切り取る。読み取り専用ならコピーだけ行う
    pub fn cut(&mut self) -> Result<()> {
        if self.options.read_only {
            self.copy();
            return Ok(());
        }
        if !self.selection.has_selection() {
            return Ok(());
        }

        let mut record = UndoRecord::new(self.selection.state());
        self.copy();
        if let Some(removed) = self.remove_selection()? {
            let line = removed.start.line;
            record.removed = Some(removed);
            self.commit(record, line, line);
        }
        Ok(())
    }

    /// クリップボードの内容で選択範囲を置き換える。空なら何もしない
    pub fn paste(&mut self) -> Result<()> {
        self.ensure_writable("paste")?;
        match self.clipboard.get_text() {
            Some(content) if !content.is_empty() => self.insert_text(&content),
            _ => Ok(()),
        }
    }

    // ---- 内部 -----------------------------------------------------------

    /// 同じ行で `at` の次の文字境界（行末なら `None`）
    fn next_in_line(&self, at: Coordinates) -> Option<Coordinates> {
        let line = self.text.line(at.line)?;
        let index = self.text.character_index(at)?;
        (index < line.len())
            .then(|| Coordinates::new(at.line, self.text.character_column(at.line, index + 1)))
    }

    /// 範囲を削除し、削除した文字列を範囲付きで返す
    fn remove_span(&mut self, start: Coordinates, end: Coordinates) -> Result<TextSpan> {
        let span = TextSpan::new(self.text.text(start, end, NEWLINE), start, end);
        self.text.delete_range(start, end)?;
        Ok(span)
    }

    /// 選択範囲を削除してカーソルを始点へ畳む（選択がなければ `None`）
    fn remove_selection(&mut self) -> Result<Option<TextSpan>> {
        if !self.selection.has_selection() {
            return Ok(None);
        }
        let start = self.text.sanitize_coordinates(self.selection.start());
        let end = self.text.sanitize_coordinates(self.selection.end());
        if start >= end {
            self.selection.collapse_to(&self.text, start);
            return Ok(None);
        }

        let span = self.remove_span(start, end)?;
        self.selection.collapse_to(&self.text, start);
        Ok(Some(span))
    }

    /// `at` へ挿入して記録の追加範囲を埋め、挿入後の末尾を返す
    fn insert_span(
        &mut self,
        record: &mut UndoRecord,
        at: Coordinates,
        text: String,
    ) -> Coordinates {
        let mut end = at;
        self.text.insert_text_at(&mut end, &text);
        record.added = Some(TextSpan::new(text, at, end));
        end
    }

    /// 編集を確定する（依存テーブルへの配信、再色付け、履歴への追加）
    fn commit(&mut self, mut record: UndoRecord, first: usize, last: usize) {
        record.after = self.selection.state();
        self.sync_dependents();
        self.invalidate_around(first, last);
        self.undo.add(record);
        self.text_changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{MemoryClipboard, TextEditor};
    use crate::highlight::{LanguageDefinition, RegexHighlighter};

    fn c(line: usize, column: usize) -> Coordinates {
        Coordinates::new(line, column)
    }

    fn editor_with(text: &str) -> TextEditor {
        let mut editor = TextEditor::new();
        editor.set_text(text);
        editor
    }

    fn type_text(editor: &mut TextEditor, text: &str) {
        for ch in text.chars() {
            editor.enter_character(ch, false).unwrap();
        }
    }

    #[test]
    fn test_typing_and_undo() {
        let mut editor = TextEditor::new();
        type_text(&mut editor, "ab");
        assert_eq!(editor.all_text(), "ab");
        assert_eq!(editor.cursor_position(), c(0, 2));
        assert_eq!(editor.undo_len(), 2);

        editor.undo(1).unwrap();
        assert_eq!(editor.all_text(), "a");
        assert_eq!(editor.cursor_position(), c(0, 1));
        editor.redo(1).unwrap();
        assert_eq!(editor.all_text(), "ab");
    }

    #[test]
    fn test_newline_copies_leading_whitespace() {
        let mut editor = editor_with("\t  body");
        editor.set_cursor_position(c(0, 7));
        editor.enter_character('\n', false).unwrap();
        assert_eq!(editor.text_lines(), vec!["\t  b", "\t  ody"]);
        assert_eq!(editor.cursor_position(), c(1, 6));

        editor.undo(1).unwrap();
        assert_eq!(editor.all_text(), "\t  body");
        editor.redo(1).unwrap();
        assert_eq!(editor.text_lines(), vec!["\t  b", "\t  ody"]);
        assert_eq!(editor.cursor_position(), c(1, 6));
    }

    #[test]
    fn test_overwrite_replaces_character() {
        let mut editor = editor_with("abc");
        editor.set_overwrite(true);
        editor.set_cursor_position(c(0, 1));
        editor.enter_character('X', false).unwrap();
        assert_eq!(editor.all_text(), "aXc");
        assert_eq!(editor.cursor_position(), c(0, 2));

        editor.set_cursor_position(c(0, 3));
        editor.enter_character('!', false).unwrap();
        assert_eq!(editor.all_text(), "aXc!");

        editor.undo(2).unwrap();
        assert_eq!(editor.all_text(), "abc");
    }

    #[test]
    fn test_overwrite_with_selection_consumes_next_character() {
        let mut editor = editor_with("abcdef");
        editor.set_overwrite(true);
        editor.select(c(0, 1), c(0, 3), SelectionMode::Normal);
        editor.enter_character('Z', false).unwrap();
        assert_eq!(editor.all_text(), "aZef");
        editor.undo(1).unwrap();
        assert_eq!(editor.all_text(), "abcdef");
        assert_eq!(editor.selection_start(), c(0, 1));
        assert_eq!(editor.selection_end(), c(0, 3));
    }

    #[test]
    fn test_tab_with_spaces_fills_to_tab_stop() {
        let mut editor = editor_with("ab");
        editor.set_indent_with_spaces(true);
        editor.set_cursor_position(c(0, 1));
        editor.enter_character('\t', false).unwrap();
        assert_eq!(editor.all_text(), "a   b");
        assert_eq!(editor.cursor_position(), c(0, 4));
    }

    #[test]
    fn test_backspace_joins_lines_and_handles_tabs() {
        let mut editor = editor_with("ab\n\tc");
        editor.set_cursor_position(c(1, 4));
        editor.backspace().unwrap();
        assert_eq!(editor.all_text(), "ab\nc");
        assert_eq!(editor.cursor_position(), c(1, 0));

        editor.backspace().unwrap();
        assert_eq!(editor.all_text(), "abc");
        assert_eq!(editor.cursor_position(), c(0, 2));

        editor.set_cursor_position(c(0, 0));
        editor.backspace().unwrap();
        assert_eq!(editor.undo_len(), 2);

        editor.undo(2).unwrap();
        assert_eq!(editor.all_text(), "ab\n\tc");
        assert_eq!(editor.cursor_position(), c(1, 4));
    }

    #[test]
    fn test_delete_joins_lines_and_stops_at_end() {
        let mut editor = editor_with("ab\ncd");
        editor.set_cursor_position(c(0, 1));
        editor.delete().unwrap();
        assert_eq!(editor.all_text(), "a\ncd");
        editor.delete().unwrap();
        assert_eq!(editor.all_text(), "acd");
        assert_eq!(editor.cursor_position(), c(0, 1));

        editor.move_to_end_of_file(false);
        editor.delete().unwrap();
        assert_eq!(editor.undo_len(), 2);

        editor.undo(1).unwrap();
        assert_eq!(editor.all_text(), "a\ncd");
    }

    #[test]
    fn test_indent_excludes_line_touched_at_column_zero() {
        let mut editor = editor_with("a\nb\nc");
        editor.select(c(0, 0), c(2, 0), SelectionMode::Normal);
        editor.enter_character('\t', false).unwrap();
        assert_eq!(editor.all_text(), "\ta\n\tb\nc");
        assert_eq!(editor.selection_start(), c(0, 0));
        assert_eq!(editor.selection_end(), c(2, 0));

        editor.enter_character('\t', true).unwrap();
        assert_eq!(editor.all_text(), "a\nb\nc");
        assert_eq!(editor.undo_len(), 2);
    }

    #[test]
    fn test_indent_with_spaces_and_unindent() {
        let mut editor = editor_with("x\ny");
        editor.set_indent_with_spaces(true);
        editor.select_all();
        editor.indent_selection(false).unwrap();
        assert_eq!(editor.all_text(), "    x\n    y");
        assert_eq!(editor.selection_end(), c(1, 5));

        editor.indent_selection(true).unwrap();
        assert_eq!(editor.all_text(), "x\ny");

        // 何も取り除けなければ履歴は増えない
        editor.indent_selection(true).unwrap();
        assert_eq!(editor.undo_len(), 2);
    }

    #[test]
    fn test_indent_without_selection_keeps_cursor_on_same_character() {
        let mut editor = editor_with("abc");
        editor.set_cursor_position(c(0, 2));
        editor.indent_selection(false).unwrap();
        assert_eq!(editor.all_text(), "\tabc");
        assert_eq!(editor.cursor_position(), c(0, 6));

        editor.undo(1).unwrap();
        assert_eq!(editor.all_text(), "abc");
        assert_eq!(editor.cursor_position(), c(0, 2));
        editor.redo(1).unwrap();
        assert_eq!(editor.cursor_position(), c(0, 6));

        editor.indent_selection(true).unwrap();
        assert_eq!(editor.all_text(), "abc");
        assert_eq!(editor.cursor_position(), c(0, 2));
    }

    #[test]
    fn test_unindent_pulls_cursor_out_of_removed_indentation() {
        let mut editor = editor_with("    x");
        editor.set_cursor_position(c(0, 2));
        editor.indent_selection(true).unwrap();
        assert_eq!(editor.all_text(), "x");
        assert_eq!(editor.cursor_position(), c(0, 0));
    }

    #[test]
    fn test_newline_without_auto_indentation() {
        let mut editor = editor_with("\t  body");
        let definition = LanguageDefinition {
            auto_indentation: false,
            ..LanguageDefinition::c_like()
        };
        editor.set_highlighter(RegexHighlighter::new(definition).unwrap());
        editor.set_cursor_position(c(0, 7));
        editor.enter_character('\n', false).unwrap();
        assert_eq!(editor.text_lines(), vec!["\t  b", "ody"]);
        assert_eq!(editor.cursor_position(), c(1, 0));

        editor.undo(1).unwrap();
        assert_eq!(editor.all_text(), "\t  body");
        assert_eq!(editor.cursor_position(), c(0, 7));
        editor.redo(1).unwrap();
        assert_eq!(editor.text_lines(), vec!["\t  b", "ody"]);
        assert_eq!(editor.cursor_position(), c(1, 0));
    }

    #[test]
    fn test_cut_copy_paste() {
        let mut editor = editor_with("hello world");
        editor.select(c(0, 0), c(0, 5), SelectionMode::Normal);
        editor.cut().unwrap();
        assert_eq!(editor.all_text(), " world");

        editor.move_to_end_of_line(false);
        editor.paste().unwrap();
        assert_eq!(editor.all_text(), " worldhello");
        assert_eq!(editor.cursor_position(), c(0, 11));

        editor.undo(1).unwrap();
        assert_eq!(editor.all_text(), " world");
    }

    #[test]
    fn test_copy_without_selection_takes_current_line() {
        let mut editor = editor_with("first\nsecond");
        editor.set_cursor_position(c(1, 2));
        editor.copy();
        assert_eq!(editor.clipboard_mut().get_text().as_deref(), Some("second"));
    }

    #[test]
    fn test_cut_degrades_to_copy_when_read_only() {
        let mut editor = editor_with("keep me");
        editor.select(c(0, 0), c(0, 4), SelectionMode::Normal);
        editor.set_read_only(true);
        editor.cut().unwrap();
        assert_eq!(editor.all_text(), "keep me");
        assert_eq!(editor.clipboard_mut().get_text().as_deref(), Some("keep"));
        assert!(editor.paste().is_err());
    }

    #[test]
    fn test_paste_empty_clipboard_is_noop() {
        let mut editor = editor_with("abc");
        editor.paste().unwrap();
        editor.set_clipboard(Box::new(MemoryClipboard::with_text("")));
        editor.paste().unwrap();
        assert_eq!(editor.all_text(), "abc");
        assert_eq!(editor.undo_len(), 0);
    }

    #[test]
    fn test_paste_multiline_replaces_selection() {
        let mut editor = editor_with("a[x]b");
        editor.set_clipboard(Box::new(MemoryClipboard::with_text("1\r\n2")));
        editor.select(c(0, 1), c(0, 4), SelectionMode::Normal);
        editor.paste().unwrap();
        assert_eq!(editor.text_lines(), vec!["a1", "2b"]);
        assert_eq!(editor.cursor_position(), c(1, 1));

        editor.undo(1).unwrap();
        assert_eq!(editor.all_text(), "a[x]b");
        editor.redo(1).unwrap();
        assert_eq!(editor.text_lines(), vec!["a1", "2b"]);
    }
}
