//! 取り消し・やり直し
//!
//! 編集1回分を「削除した範囲」と「追加した範囲」、前後の選択状態で表し、
//! 線形の履歴として保持する。新しい編集はやり直し側を切り捨てる。

use super::selection::{Selection, SelectionState};
use crate::buffer::{Coordinates, TextBuffer};
use crate::error::buffer::Result;

/// 文字列と、それが占める範囲
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    pub start: Coordinates,
    pub end: Coordinates,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, start: Coordinates, end: Coordinates) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// 1回分の編集記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    pub before: SelectionState,
    pub after: SelectionState,
    pub added: Option<TextSpan>,
    pub removed: Option<TextSpan>,
}

impl UndoRecord {
    /// 編集前の状態から記録を始める
    pub fn new(before: SelectionState) -> Self {
        Self {
            before,
            after: before,
            added: None,
            removed: None,
        }
    }

    /// 記録を適用する（削除 → 追加 → 編集後の選択）
    pub fn apply(&self, ctx: &mut ReplayContext<'_>) -> Result<()> {
        if let Some(removed) = &self.removed {
            ctx.text.delete_range(removed.start, removed.end)?;
            ctx.touch(removed.start.line, removed.start.line);
        }
        if let Some(added) = &self.added {
            let mut at = added.start;
            ctx.text.insert_text_at(&mut at, &added.text);
            ctx.touch(added.start.line, at.line);
        }
        ctx.selection.restore(self.after);
        Ok(())
    }

    /// 記録を打ち消す（追加の削除 → 削除の復元 → 編集前の選択）
    pub fn undo(&self, ctx: &mut ReplayContext<'_>) -> Result<()> {
        if let Some(added) = &self.added {
            ctx.text.delete_range(added.start, added.end)?;
            ctx.touch(added.start.line, added.start.line);
        }
        if let Some(removed) = &self.removed {
            let mut at = removed.start;
            ctx.text.insert_text_at(&mut at, &removed.text);
            ctx.touch(removed.start.line, at.line);
        }
        ctx.selection.restore(self.before);
        Ok(())
    }
}

/// 履歴の1要素。複数の操作を1ステップとしてまとめられる
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Single(UndoRecord),
    Sequence(Vec<Operation>),
}

impl Operation {
    pub fn apply(&self, ctx: &mut ReplayContext<'_>) -> Result<()> {
        match self {
            Operation::Single(record) => record.apply(ctx),
            Operation::Sequence(operations) => {
                operations.iter().try_for_each(|operation| operation.apply(ctx))
            }
        }
    }

    pub fn undo(&self, ctx: &mut ReplayContext<'_>) -> Result<()> {
        match self {
            Operation::Single(record) => record.undo(ctx),
            Operation::Sequence(operations) => operations
                .iter()
                .rev()
                .try_for_each(|operation| operation.undo(ctx)),
        }
    }
}

impl From<UndoRecord> for Operation {
    fn from(record: UndoRecord) -> Self {
        Operation::Single(record)
    }
}

/// 再生時に書き換える対象
///
/// 触れた行の範囲を記録し、呼び出し元が色付けの無効化に使う。
pub struct ReplayContext<'a> {
    pub text: &'a mut TextBuffer,
    pub selection: &'a mut Selection,
    touched: Option<(usize, usize)>,
}

impl<'a> ReplayContext<'a> {
    pub fn new(text: &'a mut TextBuffer, selection: &'a mut Selection) -> Self {
        Self {
            text,
            selection,
            touched: None,
        }
    }

    fn touch(&mut self, first: usize, last: usize) {
        self.touched = Some(match self.touched {
            Some((low, high)) => (low.min(first), high.max(last)),
            None => (first, last),
        });
    }

    /// 再生中に触れた行 `(最初, 最後)`
    pub fn touched_lines(&self) -> Option<(usize, usize)> {
        self.touched
    }
}

/// 線形の編集履歴
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    buffer: Vec<Operation>,
    index: usize,
    group: Vec<Operation>,
    group_depth: usize,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 履歴の長さ
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 次に取り消す操作の位置（= 適用済みの操作数）
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.buffer.len()
    }

    /// 操作を追加する
    ///
    /// グループ中ならグループへ溜め、そうでなければやり直し側を捨てて積む。
    pub fn add(&mut self, operation: impl Into<Operation>) {
        let operation = operation.into();
        if self.group_depth > 0 {
            self.group.push(operation);
            return;
        }
        self.buffer.truncate(self.index);
        self.buffer.push(operation);
        self.index += 1;
    }

    /// グループを開始する（入れ子可）
    pub fn begin_group(&mut self) {
        self.group_depth += 1;
    }

    /// グループを閉じ、最外周なら溜めた操作を1ステップとして積む
    pub fn end_group(&mut self) {
        if self.group_depth == 0 {
            log::warn!("end_group called without a matching begin_group");
            return;
        }
        self.group_depth -= 1;
        if self.group_depth > 0 {
            return;
        }

        let mut operations = std::mem::take(&mut self.group);
        match operations.len() {
            0 => {}
            1 => {
                if let Some(operation) = operations.pop() {
                    self.add(operation);
                }
            }
            _ => self.add(Operation::Sequence(operations)),
        }
    }

    pub fn in_group(&self) -> bool {
        self.group_depth > 0
    }

    /// 開いているグループを入れ子ごと閉じて履歴へ積む
    pub fn close_groups(&mut self) {
        if self.group_depth > 0 {
            log::debug!("closing {} open undo group(s) before replay", self.group_depth);
            self.group_depth = 1;
            self.end_group();
        }
    }

    /// 最大 `steps` 回取り消し、実際に取り消した回数を返す
    ///
    /// 開いているグループは先に閉じ、1ステップとして扱う。
    pub fn undo(&mut self, steps: usize, ctx: &mut ReplayContext<'_>) -> Result<usize> {
        self.close_groups();
        let mut done = 0;
        while done < steps && self.can_undo() {
            self.index -= 1;
            self.buffer[self.index].undo(ctx)?;
            done += 1;
        }
        Ok(done)
    }

    /// 最大 `steps` 回やり直し、実際にやり直した回数を返す
    pub fn redo(&mut self, steps: usize, ctx: &mut ReplayContext<'_>) -> Result<usize> {
        self.close_groups();
        let mut done = 0;
        while done < steps && self.can_redo() {
            self.buffer[self.index].apply(ctx)?;
            self.index += 1;
            done += 1;
        }
        Ok(done)
    }

    /// 履歴を空にする
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.index = 0;
        self.group.clear();
        self.group_depth = 0;
    }
}
