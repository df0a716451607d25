//! 行
//!
//! グリフの可変長列。長さは文字数であり表示幅ではない

use super::glyph::Glyph;
use std::ops::{Index, Range};

/// 1行分のグリフ列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    glyphs: Vec<Glyph>,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字列から行を作成（`\r` は捨てる）
    pub fn from_str(text: &str) -> Self {
        text.chars().filter(|&ch| ch != '\r').map(Glyph::new).collect()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Glyph> {
        self.glyphs.get(index)
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> &mut [Glyph] {
        &mut self.glyphs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Glyph> {
        self.glyphs.iter()
    }

    /// 指定位置へ挿入（範囲外なら末尾）
    pub fn insert(&mut self, index: usize, glyph: Glyph) {
        let index = index.min(self.glyphs.len());
        self.glyphs.insert(index, glyph);
    }

    /// 指定位置へ文字列を挿入し、挿入した文字数を返す
    pub fn insert_str(&mut self, index: usize, text: &str) -> usize {
        let index = index.min(self.glyphs.len());
        let before = self.glyphs.len();
        self.glyphs.splice(
            index..index,
            text.chars().filter(|&ch| ch != '\r').map(Glyph::new),
        );
        self.glyphs.len() - before
    }

    pub fn push(&mut self, glyph: Glyph) {
        self.glyphs.push(glyph);
    }

    /// 範囲を削除し、削除した文字列を返す
    pub fn remove_range(&mut self, range: Range<usize>) -> String {
        let end = range.end.min(self.glyphs.len());
        let start = range.start.min(end);
        self.glyphs.drain(start..end).map(|g| g.ch).collect()
    }

    pub fn truncate(&mut self, len: usize) {
        self.glyphs.truncate(len);
    }

    /// `index` 以降を切り離して返す
    pub fn split_off(&mut self, index: usize) -> Line {
        let index = index.min(self.glyphs.len());
        Line {
            glyphs: self.glyphs.split_off(index),
        }
    }

    /// 別の行を末尾へ連結
    pub fn append(&mut self, mut other: Line) {
        self.glyphs.append(&mut other.glyphs);
    }

    /// 先頭の空白・タブの数
    pub fn leading_blank_count(&self) -> usize {
        self.glyphs.iter().take_while(|g| g.is_blank()).count()
    }

    /// 行の文字列表現
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }
}

impl Index<usize> for Line {
    type Output = Glyph;

    fn index(&self, index: usize) -> &Glyph {
        &self.glyphs[index]
    }
}

impl FromIterator<Glyph> for Line {
    fn from_iter<I: IntoIterator<Item = Glyph>>(iter: I) -> Self {
        Line {
            glyphs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_drops_carriage_returns() {
        let line = Line::from_str("ab\r");
        assert_eq!(line.len(), 2);
        assert_eq!(line.text(), "ab");
    }

    #[test]
    fn test_split_and_append() {
        let mut line = Line::from_str("hello world");
        let tail = line.split_off(5);
        assert_eq!(line.text(), "hello");
        assert_eq!(tail.text(), " world");

        line.append(tail);
        assert_eq!(line.text(), "hello world");
    }

    #[test]
    fn test_remove_range_clamps() {
        let mut line = Line::from_str("abcdef");
        assert_eq!(line.remove_range(2..4), "cd");
        assert_eq!(line.remove_range(3..100), "f");
        assert_eq!(line.text(), "abe");
    }

    #[test]
    fn test_leading_blanks_and_insert_str() {
        let mut line = Line::from_str("\t  x");
        assert_eq!(line.leading_blank_count(), 3);
        assert_eq!(line.insert_str(1, "yz"), 2);
        assert_eq!(line.text(), "\tyz  x");
    }
}
