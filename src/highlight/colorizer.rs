//! インクリメンタル色付けスケジューラ
//!
//! 汚れ範囲 `[start, end)` を保持し、呼び出しごとに最大
//! `max_lines_per_frame` 行だけ色付けを進める。
//! 行ごとの引き継ぎ状態はハイライタ固有の型のまま保持する。

use super::{PlainHighlighter, SyntaxHighlighter};
use crate::buffer::{Glyph, TextBuffer, TextChange};
use crate::error::highlight::Result;
use std::ops::Range;

/// ハイライタと行ごとの引き継ぎ状態をまとめて扱うための内部トレイト
trait LineColorizer {
    fn auto_indentation(&self) -> bool;
    fn max_lines_per_frame(&self) -> usize;
    fn tooltip(&self, identifier: &str) -> Option<String>;
    /// 行を色付けし、引き継ぎ状態が変化したかを返す
    fn colorize_line(&mut self, index: usize, glyphs: &mut [Glyph]) -> Result<bool>;
    fn line_inserted(&mut self, index: usize);
    fn lines_removed(&mut self, start: usize, end: usize);
    fn reset(&mut self);
}

struct CarriedStates<H: SyntaxHighlighter> {
    highlighter: H,
    states: Vec<Option<H::State>>,
}

impl<H: SyntaxHighlighter> LineColorizer for CarriedStates<H> {
    fn auto_indentation(&self) -> bool {
        self.highlighter.auto_indentation()
    }

    fn max_lines_per_frame(&self) -> usize {
        self.highlighter.max_lines_per_frame()
    }

    fn tooltip(&self, identifier: &str) -> Option<String> {
        self.highlighter.tooltip(identifier)
    }

    fn colorize_line(&mut self, index: usize, glyphs: &mut [Glyph]) -> Result<bool> {
        let incoming = match index {
            0 => None,
            _ => self.states.get(index - 1).and_then(Option::as_ref),
        };
        let outgoing = self.highlighter.colorize(glyphs, incoming)?;

        if self.states.len() <= index {
            self.states.resize(index + 1, None);
        }
        let changed = self.states[index] != outgoing;
        self.states[index] = outgoing;
        Ok(changed)
    }

    fn line_inserted(&mut self, index: usize) {
        if index <= self.states.len() {
            self.states.insert(index, None);
        }
    }

    fn lines_removed(&mut self, start: usize, end: usize) {
        let len = self.states.len();
        if start < len {
            self.states.drain(start..(end + 1).min(len));
        }
    }

    fn reset(&mut self) {
        self.states.clear();
    }
}

/// インクリメンタル色付けスケジューラ
pub struct Colorizer {
    highlighter: Box<dyn LineColorizer>,
    enabled: bool,
    dirty: Option<Range<usize>>,
}

impl Default for Colorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Colorizer {
    /// `PlainHighlighter` を使う色付け器を作成
    pub fn new() -> Self {
        Self {
            highlighter: Box::new(CarriedStates {
                highlighter: PlainHighlighter,
                states: Vec::new(),
            }),
            enabled: true,
            dirty: None,
        }
    }

    /// ハイライタを差し替え、全行を汚れとして登録する
    pub fn set_highlighter<H>(&mut self, highlighter: H, line_count: usize)
    where
        H: SyntaxHighlighter + 'static,
    {
        self.highlighter = Box::new(CarriedStates {
            highlighter,
            states: Vec::new(),
        });
        self.dirty = None;
        self.invalidate(0, None, line_count);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// 色付け待ちの範囲（なければ `None`）
    pub fn dirty_range(&self) -> Option<Range<usize>> {
        self.dirty.clone()
    }

    /// 色付け待ちの行が残っているか
    pub fn is_pending(&self) -> bool {
        self.dirty.is_some()
    }

    pub fn auto_indentation(&self) -> bool {
        self.highlighter.auto_indentation()
    }

    pub fn max_lines_per_frame(&self) -> usize {
        self.highlighter.max_lines_per_frame()
    }

    pub fn tooltip(&self, identifier: &str) -> Option<String> {
        self.highlighter.tooltip(identifier)
    }

    /// `[from, from + count)` を汚れ範囲に加える
    ///
    /// `count` が `None` ならバッファ末尾まで。範囲は広がるのみで縮まない。
    pub fn invalidate(&mut self, from: usize, count: Option<usize>, line_count: usize) {
        if from >= line_count {
            return;
        }
        let end = count
            .map_or(line_count, |count| from.saturating_add(count))
            .min(line_count);
        if end <= from {
            return;
        }

        self.dirty = Some(match self.dirty.take() {
            Some(range) => range.start.min(from)..range.end.max(end),
            None => from..end,
        });
    }

    /// バッファの構造変更を反映する
    pub fn on_change(&mut self, change: &TextChange, line_count: usize) {
        match *change {
            TextChange::AllTextReplaced => {
                self.highlighter.reset();
                self.dirty = None;
                self.invalidate(0, None, line_count);
            }
            TextChange::LineInserted(index) => {
                self.highlighter.line_inserted(index);
                self.dirty = self.dirty.take().map(|range| {
                    let shift = |bound: usize| if bound > index { bound + 1 } else { bound };
                    let start = if range.start >= index {
                        range.start + 1
                    } else {
                        range.start
                    };
                    start..shift(range.end)
                });
                self.clamp_dirty(line_count);
                self.invalidate(index, Some(1), line_count);
            }
            TextChange::LinesRemoved { start, end } => {
                self.highlighter.lines_removed(start, end);
                let count = end - start + 1;
                let shift = |bound: usize| {
                    if bound <= start {
                        bound
                    } else if bound > end {
                        bound - count
                    } else {
                        start
                    }
                };
                self.dirty = self
                    .dirty
                    .take()
                    .map(|range| shift(range.start)..shift(range.end));
                self.clamp_dirty(line_count);
                self.invalidate(start, Some(1), line_count);
            }
        }
    }

    fn clamp_dirty(&mut self, line_count: usize) {
        self.dirty = self
            .dirty
            .take()
            .map(|range| range.start..range.end.min(line_count))
            .filter(|range| range.start < range.end);
    }

    /// 汚れ範囲の先頭から最大 `max_lines_per_frame` 行を色付けする
    ///
    /// 処理した行数を返す。最後の汚れ行で引き継ぎ状態が変わった場合は、
    /// 次の行も汚れ範囲に含める。ハイライタがエラーを返した場合は
    /// その行から再開できるよう範囲を残す。
    pub fn colorize_incremental(&mut self, text: &mut TextBuffer) -> Result<usize> {
        if !self.enabled {
            return Ok(0);
        }
        let Some(range) = self.dirty.clone() else {
            return Ok(0);
        };

        let line_count = text.line_count();
        let budget = self.highlighter.max_lines_per_frame().max(1);
        let mut line = range.start;
        let mut end = range.end.min(line_count);
        let mut processed = 0;

        while line < end && processed < budget {
            let Some(target) = text.line_mut(line) else {
                break;
            };
            match self.highlighter.colorize_line(line, target.glyphs_mut()) {
                Ok(changed) => {
                    if changed && line + 1 == end && end < line_count {
                        end += 1;
                    }
                }
                Err(error) => {
                    log::error!("colorizer stopped at line {}: {}", line, error);
                    self.dirty = Some(line..end);
                    return Err(error);
                }
            }
            line += 1;
            processed += 1;
        }

        self.dirty = (line < end).then(|| line..end);
        Ok(processed)
    }
}

impl std::fmt::Debug for Colorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Colorizer")
            .field("enabled", &self.enabled)
            .field("dirty", &self.dirty)
            .finish()
    }
}
