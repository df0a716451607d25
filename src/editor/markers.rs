//! 行マーカー
//!
//! ブレークポイントとエラーマーカー。行番号（0ベース）をキーに持ち、
//! 行の挿入・削除に合わせて番号を付け替える。

use crate::buffer::TextChange;
use std::collections::BTreeMap;

/// 行番号をキーとする付随テーブル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarkers<V> {
    entries: BTreeMap<usize, V>,
}

impl<V> Default for LineMarkers<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

/// ブレークポイントの集合
pub type Breakpoints = LineMarkers<()>;

/// 行ごとのエラーメッセージ
pub type ErrorMarkers = LineMarkers<String>;

impl<V> LineMarkers<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, line: usize) -> bool {
        self.entries.contains_key(&line)
    }

    pub fn get(&self, line: usize) -> Option<&V> {
        self.entries.get(&line)
    }

    pub fn insert(&mut self, line: usize, value: V) -> Option<V> {
        self.entries.insert(line, value)
    }

    pub fn remove(&mut self, line: usize) -> Option<V> {
        self.entries.remove(&line)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 昇順の行番号
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &V)> + '_ {
        self.entries.iter().map(|(line, value)| (*line, value))
    }

    /// 構造変更に合わせて行番号を付け替える
    pub fn on_change(&mut self, change: &TextChange) {
        match *change {
            TextChange::AllTextReplaced => self.entries.clear(),
            TextChange::LineInserted(index) => {
                let shifted = self.entries.split_off(&index);
                self.entries
                    .extend(shifted.into_iter().map(|(line, value)| (line + 1, value)));
            }
            TextChange::LinesRemoved { start, end } => {
                let count = change.removed_count();
                let mut removed = self.entries.split_off(&start);
                let kept = removed.split_off(&(end + 1));
                if !removed.is_empty() {
                    log::debug!("dropped {} markers in lines {}..={}", removed.len(), start, end);
                }
                self.entries
                    .extend(kept.into_iter().map(|(line, value)| (line - count, value)));
            }
        }
    }
}

impl Breakpoints {
    /// ブレークポイントを追加し、新規なら真を返す
    pub fn add(&mut self, line: usize) -> bool {
        self.entries.insert(line, ()).is_none()
    }

    /// 切り替えて、切り替え後に設定されていれば真を返す
    pub fn toggle(&mut self, line: usize) -> bool {
        if self.entries.remove(&line).is_some() {
            false
        } else {
            self.entries.insert(line, ());
            true
        }
    }
}

impl FromIterator<usize> for Breakpoints {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|line| (line, ())).collect(),
        }
    }
}

impl FromIterator<(usize, String)> for ErrorMarkers {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(markers: &Breakpoints) -> Vec<usize> {
        markers.lines().collect()
    }

    #[test]
    fn test_insert_shifts_lines_at_and_after() {
        let mut breakpoints: Breakpoints = [2, 5, 9].into_iter().collect();
        breakpoints.on_change(&TextChange::LineInserted(3));
        assert_eq!(lines(&breakpoints), vec![2, 6, 10]);

        breakpoints.on_change(&TextChange::LineInserted(2));
        assert_eq!(lines(&breakpoints), vec![3, 7, 11]);
    }

    #[test]
    fn test_remove_drops_and_shifts() {
        let mut breakpoints: Breakpoints = [2, 5, 9].into_iter().collect();
        breakpoints.on_change(&TextChange::LinesRemoved { start: 4, end: 6 });
        assert_eq!(lines(&breakpoints), vec![2, 6]);
    }

    #[test]
    fn test_error_markers_keep_messages() {
        let mut markers: ErrorMarkers = [(1, "bad".to_string()), (4, "worse".to_string())]
            .into_iter()
            .collect();
        markers.on_change(&TextChange::LinesRemoved { start: 0, end: 1 });
        assert_eq!(markers.len(), 1);
        assert_eq!(markers.get(2).map(String::as_str), Some("worse"));

        markers.on_change(&TextChange::AllTextReplaced);
        assert!(markers.is_empty());
    }

    #[test]
    fn test_toggle_and_add() {
        let mut breakpoints = Breakpoints::new();
        assert!(breakpoints.add(3));
        assert!(!breakpoints.add(3));
        assert!(!breakpoints.toggle(3));
        assert!(breakpoints.toggle(3));
        assert!(breakpoints.contains(3));
    }
}
