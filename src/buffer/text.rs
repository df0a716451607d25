//! テキストバッファ
//!
//! 行ごとのグリフ列を保持し、タブ展開を考慮した表示列⇄文字インデックス変換、
//! 挿入・削除、単語境界探索を提供する。
//!
//! 行数は常に1以上。行の挿入・削除は `TextChange` として記録され、
//! 所有者が `take_changes` で取り出して依存テーブルへ配信する。

use super::change::TextChange;
use super::coordinates::Coordinates;
use super::line::Line;
use crate::error::buffer::Result;
use crate::error::BufferError;

pub const MIN_TAB_SIZE: usize = 1;
pub const MAX_TAB_SIZE: usize = 32;
pub const DEFAULT_TAB_SIZE: usize = 4;

/// タブ幅を有効範囲へ丸める
pub fn clamp_tab_size(tab_size: usize) -> usize {
    tab_size.clamp(MIN_TAB_SIZE, MAX_TAB_SIZE)
}

/// 行単位のテキストバッファ
#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<Line>,
    tab_size: usize,
    changes: Vec<TextChange>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// 空のバッファ（空行1行）を作成
    pub fn new() -> Self {
        Self::with_tab_size(DEFAULT_TAB_SIZE)
    }

    pub fn with_tab_size(tab_size: usize) -> Self {
        Self {
            lines: vec![Line::new()],
            tab_size: clamp_tab_size(tab_size),
            changes: Vec::new(),
        }
    }

    /// 文字列からバッファを作成（変更イベントは残さない）
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.set_text(text);
        buffer.changes.clear();
        buffer
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    pub fn set_tab_size(&mut self, tab_size: usize) {
        self.tab_size = clamp_tab_size(tab_size);
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub(crate) fn line_mut(&mut self, index: usize) -> Option<&mut Line> {
        self.lines.get_mut(index)
    }

    /// 行の文字列（範囲外なら空文字列）
    pub fn line_text(&self, index: usize) -> String {
        self.lines.get(index).map(Line::text).unwrap_or_default()
    }

    /// 全行の文字列
    pub fn text_lines(&self) -> Vec<String> {
        self.lines.iter().map(Line::text).collect()
    }

    /// 蓄積された構造変更を取り出す
    pub fn take_changes(&mut self) -> Vec<TextChange> {
        std::mem::take(&mut self.changes)
    }

    /// 未配信の構造変更があるか
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    // ---- 全体置換 -------------------------------------------------------

    /// `\n` で分割して全行を置き換える（`\r` は無視）
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(Line::from_str).collect();
        self.changes.push(TextChange::AllTextReplaced);
    }

    /// 行の配列で全行を置き換える
    pub fn set_text_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.lines = lines.iter().map(|l| Line::from_str(l.as_ref())).collect();
        if self.lines.is_empty() {
            self.lines.push(Line::new());
        }
        self.changes.push(TextChange::AllTextReplaced);
    }

    // ---- テキスト取得 -----------------------------------------------------

    /// 2点間の文字列を取得する（改行は `newline` で出力）
    pub fn text(&self, start: Coordinates, end: Coordinates, newline: &str) -> String {
        let start = self.sanitize_coordinates(start);
        let end = self.sanitize_coordinates(end);
        if end <= start {
            return String::new();
        }

        let mut line_no = start.line;
        let mut index = self.character_index(start).unwrap_or(0);
        let end_index = self.character_index(end).unwrap_or(0);
        let mut out = String::new();

        while index < end_index || line_no < end.line {
            let line = &self.lines[line_no];
            if index < line.len() {
                out.push(line[index].ch);
                index += 1;
            } else {
                index = 0;
                line_no += 1;
                out.push_str(newline);
            }
        }

        out
    }

    /// 全文を取得
    pub fn all_text(&self, newline: &str) -> String {
        self.text(Coordinates::origin(), self.end_coordinates(), newline)
    }

    /// バッファ末尾の座標
    pub fn end_coordinates(&self) -> Coordinates {
        let last = self.lines.len() - 1;
        Coordinates::new(last, self.line_max_column(last))
    }

    // ---- 座標変換 -------------------------------------------------------

    fn next_column(&self, column: usize, ch: char) -> usize {
        if ch == '\t' {
            column / self.tab_size * self.tab_size + self.tab_size
        } else {
            column + 1
        }
    }

    /// 表示列から文字インデックスを求める（行が範囲外なら `None`）
    ///
    /// タブの途中を指す列は、その列に到達した最初のインデックスになる。
    pub fn character_index(&self, at: Coordinates) -> Option<usize> {
        let line = self.lines.get(at.line)?;
        let mut column = 0;
        let mut index = 0;
        while index < line.len() && column < at.column {
            column = self.next_column(column, line[index].ch);
            index += 1;
        }
        Some(index)
    }

    /// 文字インデックスから表示列を求める
    pub fn character_column(&self, line: usize, index: usize) -> usize {
        self.lines.get(line).map_or(0, |l| {
            l.iter()
                .take(index)
                .fold(0, |column, g| self.next_column(column, g.ch))
        })
    }

    /// 行全体の表示幅
    pub fn line_max_column(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |l| {
            l.iter().fold(0, |column, g| self.next_column(column, g.ch))
        })
    }

    /// 座標をバッファの有効範囲へ丸める
    pub fn sanitize_coordinates(&self, at: Coordinates) -> Coordinates {
        if at.line >= self.lines.len() {
            let last = self.lines.len() - 1;
            Coordinates::new(last, self.line_max_column(last))
        } else {
            Coordinates::new(at.line, at.column.min(self.line_max_column(at.line)))
        }
    }

    fn check_line(&self, line: usize) -> Result<()> {
        if line < self.lines.len() {
            Ok(())
        } else {
            Err(BufferError::LineOutOfRange {
                line,
                line_count: self.lines.len(),
            })
        }
    }

    // ---- 変更操作 -------------------------------------------------------

    /// 文字列を挿入し、処理した改行の数を返す
    ///
    /// `at` は挿入後の末尾位置へ更新される。`\r` は無視する。
    pub fn insert_text_at(&mut self, at: &mut Coordinates, text: &str) -> usize {
        *at = self.sanitize_coordinates(*at);
        let mut index = self.character_index(*at).unwrap_or(0);

        let mut segments = text.split('\n');
        let first = segments.next().unwrap_or("");
        index += self.lines[at.line].insert_str(index, first);

        let mut new_lines: Vec<Line> = segments.map(Line::from_str).collect();
        let inserted = new_lines.len();
        if inserted > 0 {
            let tail = self.lines[at.line].split_off(index);
            let last = &mut new_lines[inserted - 1];
            index = last.len();
            last.append(tail);

            let first_new = at.line + 1;
            self.lines.splice(first_new..first_new, new_lines);
            self.changes
                .extend((first_new..first_new + inserted).map(TextChange::LineInserted));
            at.line += inserted;
        }

        at.column = self.character_column(at.line, index);
        inserted
    }

    /// 1文字を挿入し、挿入後の位置を返す
    pub fn insert_char_at(&mut self, at: Coordinates, ch: char) -> Coordinates {
        let mut end = at;
        let mut encoded = [0u8; 4];
        self.insert_text_at(&mut end, ch.encode_utf8(&mut encoded));
        end
    }

    /// 行内の文字範囲 `[start, end)` を削除し、削除文字列を返す
    pub fn remove_in_line(&mut self, line: usize, start: usize, end: usize) -> Result<String> {
        self.check_line(line)?;
        let target = &mut self.lines[line];
        if start > end || end > target.len() {
            return Err(BufferError::InvalidCharRange { line, start, end });
        }
        Ok(target.remove_range(start..end))
    }

    /// 2点間を削除する
    ///
    /// 複数行にまたがる場合、削除された行は1つの `LinesRemoved` として記録する。
    pub fn delete_range(&mut self, start: Coordinates, end: Coordinates) -> Result<()> {
        if end < start {
            log::error!("delete_range called with inverted range {} .. {}", start, end);
            return Err(BufferError::InvertedRange { start, end });
        }
        if end == start {
            return Ok(());
        }
        self.check_line(start.line)?;
        self.check_line(end.line)?;

        let start_index = self.character_index(start).unwrap_or(0);
        let end_index = self.character_index(end).unwrap_or(0);

        if start.line == end.line {
            if end.column >= self.line_max_column(start.line) {
                self.lines[start.line].truncate(start_index);
            } else {
                self.lines[start.line].remove_range(start_index..end_index);
            }
        } else {
            let tail = self.lines[end.line].split_off(end_index);
            let first = &mut self.lines[start.line];
            first.truncate(start_index);
            first.append(tail);
            self.remove_lines(start.line + 1, end.line)?;
        }

        Ok(())
    }

    /// 行を挿入する
    pub fn insert_line(&mut self, index: usize, line: Line) -> Result<()> {
        if index > self.lines.len() {
            return Err(BufferError::LineOutOfRange {
                line: index,
                line_count: self.lines.len(),
            });
        }
        self.lines.insert(index, line);
        self.changes.push(TextChange::LineInserted(index));
        Ok(())
    }

    /// 行を削除する（最後の1行は削除できない）
    pub fn remove_line(&mut self, index: usize) -> Result<()> {
        self.remove_lines(index, index)
    }

    /// `[start, end]`（両端含む）の行を削除する
    pub fn remove_lines(&mut self, start: usize, end: usize) -> Result<()> {
        if start > end {
            return Err(BufferError::InvertedRange {
                start: Coordinates::new(start, 0),
                end: Coordinates::new(end, 0),
            });
        }
        self.check_line(end)?;
        if end - start + 1 >= self.lines.len() {
            log::error!("refusing to remove lines {}..={}: buffer would be empty", start, end);
            return Err(BufferError::LastLine);
        }

        self.lines.drain(start..=end);
        self.changes.push(TextChange::LinesRemoved { start, end });
        Ok(())
    }

    /// 行末へ文字列を連結する
    pub fn append_to_line(&mut self, index: usize, text: &str) -> Result<()> {
        self.check_line(index)?;
        let line = &mut self.lines[index];
        let len = line.len();
        line.insert_str(len, text);
        Ok(())
    }

    // ---- 単語境界 -------------------------------------------------------

    /// 単語の先頭を探す
    ///
    /// 直前の空白の連続を1つ飛ばし、同じ色分類が続く限り後退する。
    pub fn find_word_start(&self, at: Coordinates) -> Coordinates {
        let Some(line) = self.lines.get(at.line) else {
            return at;
        };
        let Some(mut index) = self.character_index(at) else {
            return at;
        };
        if index >= line.len() {
            return at;
        }

        while index > 0 && line[index].ch.is_whitespace() {
            index -= 1;
        }

        let color = line[index].color;
        while index > 0 {
            let prev = line[index - 1];
            if prev.ch.is_whitespace() || prev.color != color {
                break;
            }
            index -= 1;
        }

        Coordinates::new(at.line, self.character_column(at.line, index))
    }

    /// 単語の末尾を探す
    ///
    /// 色分類が変わるか、空白/非空白が切り替わった所で止まる。
    /// 単語に続く空白は末尾に含める。
    pub fn find_word_end(&self, at: Coordinates) -> Coordinates {
        let Some(line) = self.lines.get(at.line) else {
            return at;
        };
        let Some(mut index) = self.character_index(at) else {
            return at;
        };
        if index >= line.len() {
            return at;
        }

        let starts_in_space = line[index].ch.is_whitespace();
        let color = line[index].color;
        while index < line.len() {
            let glyph = line[index];
            if glyph.color != color {
                break;
            }
            if starts_in_space != glyph.ch.is_whitespace() {
                if glyph.ch.is_whitespace() {
                    while index < line.len() && line[index].ch.is_whitespace() {
                        index += 1;
                    }
                }
                break;
            }
            index += 1;
        }

        Coordinates::new(at.line, self.character_column(at.line, index))
    }

    /// 次の単語の先頭を探す
    ///
    /// 現在単語の中にいればそれを飛ばし、英数字の最初の文字まで進む。
    /// バッファ末尾に達したら最終行の行末を返す。
    pub fn find_next_word(&self, at: Coordinates) -> Coordinates {
        if at.line >= self.lines.len() {
            return at;
        }

        let mut line_no = at.line;
        let mut index = self.character_index(at).unwrap_or(0);
        let mut skip = self.lines[line_no]
            .get(index)
            .map_or(false, |g| g.ch.is_alphanumeric());

        loop {
            let Some(line) = self.lines.get(line_no) else {
                return self.end_coordinates();
            };
            match line.get(index) {
                Some(glyph) => {
                    let is_word = glyph.ch.is_alphanumeric();
                    if is_word && !skip {
                        return Coordinates::new(line_no, self.character_column(line_no, index));
                    }
                    if !is_word {
                        skip = false;
                    }
                    index += 1;
                }
                None => {
                    line_no += 1;
                    index = 0;
                    skip = false;
                }
            }
        }
    }

    /// 単語境界上にあるか
    pub fn is_on_word_boundary(&self, at: Coordinates) -> bool {
        if at.line >= self.lines.len() || at.column == 0 {
            return true;
        }
        let line = &self.lines[at.line];
        let index = self.character_index(at).unwrap_or(0);
        if index == 0 || index >= line.len() {
            return true;
        }

        let (prev, current) = (line[index - 1], line[index]);
        prev.color != current.color || prev.ch.is_whitespace() != current.ch.is_whitespace()
    }

    /// 1文字進める（行末なら次行の先頭へ）
    pub fn advance(&self, at: Coordinates) -> Coordinates {
        let Some(line) = self.lines.get(at.line) else {
            return at;
        };
        let index = self.character_index(at).unwrap_or(0);
        if index < line.len() {
            Coordinates::new(at.line, self.character_column(at.line, index + 1))
        } else if at.line + 1 < self.lines.len() {
            Coordinates::new(at.line + 1, 0)
        } else {
            at
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::glyph::ColorIndex;

    fn c(line: usize, column: usize) -> Coordinates {
        Coordinates::new(line, column)
    }

    #[test]
    fn test_empty_buffer_has_one_line() {
        let mut buffer = TextBuffer::new();
        assert_eq!(buffer.line_count(), 1);
        buffer.set_text("");
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.take_changes(), vec![TextChange::AllTextReplaced]);
    }

    #[test]
    fn test_set_text_ignores_carriage_returns() {
        let buffer = TextBuffer::from_text("one\r\ntwo\r\n");
        assert_eq!(buffer.text_lines(), vec!["one", "two", ""]);
        assert_eq!(buffer.all_text("\n"), "one\ntwo\n");
        assert!(!buffer.has_pending_changes());
    }

    #[test]
    fn test_tab_size_is_clamped() {
        let mut buffer = TextBuffer::with_tab_size(0);
        assert_eq!(buffer.tab_size(), 1);
        buffer.set_tab_size(64);
        assert_eq!(buffer.tab_size(), 32);
    }

    #[test]
    fn test_tab_expansion() {
        let buffer = TextBuffer::from_text("a\tb\t\tc");
        // a=0, tab→4, b=4, tab→8, tab→12, c=12
        assert_eq!(buffer.character_column(0, 1), 1);
        assert_eq!(buffer.character_column(0, 2), 4);
        assert_eq!(buffer.character_column(0, 3), 5);
        assert_eq!(buffer.character_column(0, 5), 12);
        assert_eq!(buffer.line_max_column(0), 13);

        assert_eq!(buffer.character_index(c(0, 4)), Some(2));
        // タブの途中はタブの直後のインデックス
        assert_eq!(buffer.character_index(c(0, 2)), Some(2));
        assert_eq!(buffer.character_index(c(0, 100)), Some(6));
        assert_eq!(buffer.character_index(c(5, 0)), None);
    }

    #[test]
    fn test_sanitize_coordinates() {
        let buffer = TextBuffer::from_text("abc\n\tx");
        assert_eq!(buffer.sanitize_coordinates(c(0, 10)), c(0, 3));
        assert_eq!(buffer.sanitize_coordinates(c(1, 2)), c(1, 2));
        assert_eq!(buffer.sanitize_coordinates(c(9, 0)), c(1, 5));
    }

    #[test]
    fn test_get_text_across_lines() {
        let buffer = TextBuffer::from_text("one\ntwo\nthree");
        assert_eq!(buffer.text(c(0, 2), c(2, 1), "\n"), "e\ntwo\nt");
        assert_eq!(buffer.text(c(0, 1), c(0, 3), "\n"), "ne");
        assert_eq!(buffer.text(c(1, 0), c(1, 0), "\n"), "");
        assert_eq!(buffer.text(c(0, 3), c(1, 0), "\r\n"), "\r\n");
        assert_eq!(buffer.text(c(2, 1), c(0, 0), "\n"), "");
    }

    #[test]
    fn test_insert_text_at_splits_lines() {
        let mut buffer = TextBuffer::from_text("hello world");
        let mut at = c(0, 5);
        let lines = buffer.insert_text_at(&mut at, ",\nbig\r\nnew");
        assert_eq!(lines, 2);
        assert_eq!(at, c(2, 3));
        assert_eq!(buffer.text_lines(), vec!["hello,", "big", "new world"]);
        assert_eq!(
            buffer.take_changes(),
            vec![TextChange::LineInserted(1), TextChange::LineInserted(2)]
        );
    }

    #[test]
    fn test_insert_char_at_tracks_tab_columns() {
        let mut buffer = TextBuffer::new();
        let end = buffer.insert_char_at(c(0, 0), '\t');
        assert_eq!(end, c(0, 4));
        let end = buffer.insert_char_at(end, 'x');
        assert_eq!(end, c(0, 5));
        let end = buffer.insert_char_at(end, '\n');
        assert_eq!(end, c(1, 0));
        assert_eq!(buffer.line_count(), 2);
    }

    #[test]
    fn test_delete_range_single_and_multi_line() {
        let mut buffer = TextBuffer::from_text("one\ntwo\nthree\nfour");
        buffer.delete_range(c(0, 1), c(0, 2)).unwrap();
        assert_eq!(buffer.line_text(0), "oe");

        buffer.delete_range(c(0, 1), c(2, 2)).unwrap();
        assert_eq!(buffer.text_lines(), vec!["oree", "four"]);
        // 複数行の削除は1イベントにまとめる
        assert_eq!(
            buffer.take_changes(),
            vec![TextChange::LinesRemoved { start: 1, end: 2 }]
        );
    }

    #[test]
    fn test_delete_range_rejects_inverted_range() {
        let mut buffer = TextBuffer::from_text("abc\ndef");
        let result = buffer.delete_range(c(1, 0), c(0, 1));
        assert!(matches!(result, Err(BufferError::InvertedRange { .. })));
        assert_eq!(buffer.all_text("\n"), "abc\ndef");
    }

    #[test]
    fn test_last_line_cannot_be_removed() {
        let mut buffer = TextBuffer::from_text("only");
        assert_eq!(buffer.remove_line(0), Err(BufferError::LastLine));

        let mut buffer = TextBuffer::from_text("a\nb\nc");
        assert_eq!(buffer.remove_lines(0, 2), Err(BufferError::LastLine));
        buffer.remove_line(1).unwrap();
        assert_eq!(buffer.text_lines(), vec!["a", "c"]);
    }

    #[test]
    fn test_insert_line_and_append() {
        let mut buffer = TextBuffer::from_text("a\nc");
        buffer.insert_line(1, Line::from_str("b")).unwrap();
        buffer.append_to_line(2, "++").unwrap();
        assert_eq!(buffer.text_lines(), vec!["a", "b", "c++"]);
        assert!(buffer.insert_line(9, Line::new()).is_err());
        assert_eq!(buffer.take_changes(), vec![TextChange::LineInserted(1)]);
    }

    #[test]
    fn test_remove_in_line() {
        let mut buffer = TextBuffer::from_text("abcdef");
        assert_eq!(buffer.remove_in_line(0, 1, 3).unwrap(), "bc");
        assert!(buffer.remove_in_line(0, 3, 2).is_err());
        assert!(buffer.remove_in_line(4, 0, 0).is_err());
    }

    #[test]
    fn test_word_boundaries_on_plain_text() {
        let buffer = TextBuffer::from_text("foo bar  baz");
        assert_eq!(buffer.find_word_start(c(0, 5)), c(0, 4));
        assert_eq!(buffer.find_word_start(c(0, 4)), c(0, 4));
        // 空白上からは直前の単語の先頭へ
        assert_eq!(buffer.find_word_start(c(0, 8)), c(0, 4));
        // 単語末尾の空白は含める
        assert_eq!(buffer.find_word_end(c(0, 4)), c(0, 9));
        assert_eq!(buffer.find_word_end(c(0, 12)), c(0, 12));
    }

    #[test]
    fn test_word_boundaries_follow_color_changes() {
        let mut buffer = TextBuffer::from_text("foo(bar)");
        for (index, glyph) in buffer.line_mut(0).unwrap().glyphs_mut().iter_mut().enumerate() {
            glyph.color = match index {
                3 | 7 => ColorIndex::Punctuation,
                _ => ColorIndex::Identifier,
            };
        }
        assert_eq!(buffer.find_word_start(c(0, 6)), c(0, 4));
        assert_eq!(buffer.find_word_end(c(0, 4)), c(0, 7));
        assert!(buffer.is_on_word_boundary(c(0, 3)));
        assert!(buffer.is_on_word_boundary(c(0, 4)));
        assert!(!buffer.is_on_word_boundary(c(0, 5)));
    }

    #[test]
    fn test_find_next_word_wraps_lines() {
        let buffer = TextBuffer::from_text("ab, cd\n  ef\n--");
        assert_eq!(buffer.find_next_word(c(0, 0)), c(0, 4));
        assert_eq!(buffer.find_next_word(c(0, 4)), c(1, 2));
        assert_eq!(buffer.find_next_word(c(1, 2)), c(2, 2));
    }

    #[test]
    fn test_advance_crosses_line_boundary() {
        let buffer = TextBuffer::from_text("a\tb\nc");
        assert_eq!(buffer.advance(c(0, 1)), c(0, 4));
        assert_eq!(buffer.advance(c(0, 5)), c(1, 0));
        assert_eq!(buffer.advance(c(1, 1)), c(1, 1));
    }
}
