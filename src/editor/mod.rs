//! 編集層
//!
//! テキストバッファ・選択・履歴・色付け・行マーカーを束ね、
//! 構造変更を依存テーブルへ配信する `TextEditor` を提供する。
//!
//! 操作はすべて呼び出しスレッド上で完結する。色付けはホストが
//! 描画フレームごとに `colorize_incremental` を呼ぶことで進む。

pub mod clipboard;
pub mod markers;
pub mod modify;
pub mod movement;
pub mod selection;
pub mod snapshot;
pub mod undo;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use markers::{Breakpoints, ErrorMarkers, LineMarkers};
pub use selection::{Selection, SelectionMode, SelectionState};
pub use snapshot::EditorSnapshot;
pub use undo::{Operation, ReplayContext, TextSpan, UndoRecord, UndoStack};

use crate::buffer::{ChangeListener, ChangeNotifier, Coordinates, TextBuffer, TextChange};
use crate::config::EditorOptions;
use crate::error::{EditError, Result};
use crate::highlight::{Colorizer, SyntaxHighlighter};
use crate::input::KeyMap;
use std::fmt;

/// 編集コアの本体
pub struct TextEditor {
    text: TextBuffer,
    selection: Selection,
    undo: UndoStack,
    colorizer: Colorizer,
    breakpoints: Breakpoints,
    error_markers: ErrorMarkers,
    options: EditorOptions,
    clipboard: Box<dyn Clipboard>,
    notifier: ChangeNotifier,
    keymap: KeyMap,
    text_changed: bool,
}

impl Default for TextEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEditor {
    /// 既定設定のエディタを作成
    pub fn new() -> Self {
        Self::with_options(EditorOptions::default())
    }

    pub fn with_options(options: EditorOptions) -> Self {
        let options = options.sanitized();
        let mut colorizer = Colorizer::new();
        colorizer.set_enabled(options.colorizer_enabled);

        Self {
            text: TextBuffer::with_tab_size(options.tab_size),
            selection: Selection::new(),
            undo: UndoStack::new(),
            colorizer,
            breakpoints: Breakpoints::new(),
            error_markers: ErrorMarkers::new(),
            options,
            clipboard: Box::new(MemoryClipboard::new()),
            notifier: ChangeNotifier::new(),
            keymap: KeyMap::default(),
            text_changed: false,
        }
    }

    // ---- 設定 -----------------------------------------------------------

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// 設定を置き換える（範囲外の値は丸める）
    pub fn set_options(&mut self, options: EditorOptions) {
        self.options = options.sanitized();
        self.text.set_tab_size(self.options.tab_size);
        self.colorizer.set_enabled(self.options.colorizer_enabled);
    }

    pub fn tab_size(&self) -> usize {
        self.text.tab_size()
    }

    pub fn set_tab_size(&mut self, tab_size: usize) {
        self.text.set_tab_size(tab_size);
        self.options.tab_size = self.text.tab_size();
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.options.read_only = read_only;
    }

    pub fn is_overwrite(&self) -> bool {
        self.options.overwrite
    }

    pub fn set_overwrite(&mut self, overwrite: bool) {
        self.options.overwrite = overwrite;
    }

    pub fn indent_with_spaces(&self) -> bool {
        self.options.indent_with_spaces
    }

    pub fn set_indent_with_spaces(&mut self, enabled: bool) {
        self.options.indent_with_spaces = enabled;
    }

    pub fn set_colorizer_enabled(&mut self, enabled: bool) {
        self.options.colorizer_enabled = enabled;
        self.colorizer.set_enabled(enabled);
    }

    // ---- 協調オブジェクト -------------------------------------------------

    /// ハイライタを差し替え、全行を再色付け対象にする
    pub fn set_highlighter<H>(&mut self, highlighter: H)
    where
        H: SyntaxHighlighter + 'static,
    {
        self.colorizer
            .set_highlighter(highlighter, self.text.line_count());
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub fn clipboard_mut(&mut self) -> &mut dyn Clipboard {
        self.clipboard.as_mut()
    }

    /// 構造変更のリスナーを登録する
    pub fn add_change_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.notifier.add_listener(listener);
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn keymap_mut(&mut self) -> &mut KeyMap {
        &mut self.keymap
    }

    pub fn set_keymap(&mut self, keymap: KeyMap) {
        self.keymap = keymap;
    }

    // ---- テキスト -------------------------------------------------------

    pub fn buffer(&self) -> &TextBuffer {
        &self.text
    }

    /// 全文を置き換える（履歴・マーカーは消える）
    pub fn set_text(&mut self, text: &str) {
        self.text.set_text(text);
        self.sync_dependents();
        self.text_changed = true;
    }

    pub fn set_text_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.text.set_text_lines(lines);
        self.sync_dependents();
        self.text_changed = true;
    }

    /// 全文（改行は設定の改行コード）
    pub fn all_text(&self) -> String {
        self.text.all_text(self.options.newline())
    }

    pub fn text_lines(&self) -> Vec<String> {
        self.text.text_lines()
    }

    pub fn text_range(&self, start: Coordinates, end: Coordinates) -> String {
        self.text.text(start, end, self.options.newline())
    }

    pub fn selected_text(&self) -> String {
        self.text_range(self.selection.start(), self.selection.end())
    }

    pub fn current_line_text(&self) -> String {
        self.text.line_text(self.cursor_position().line)
    }

    pub fn line_count(&self) -> usize {
        self.text.line_count()
    }

    /// 前回の `clear_text_changed` 以降に本文が変わったか
    pub fn is_text_changed(&self) -> bool {
        self.text_changed
    }

    pub fn clear_text_changed(&mut self) {
        self.text_changed = false;
    }

    // ---- カーソルと選択 ---------------------------------------------------

    /// バッファに合わせて丸めたカーソル位置
    pub fn cursor_position(&self) -> Coordinates {
        self.selection.cursor(&self.text)
    }

    pub fn set_cursor_position(&mut self, at: Coordinates) {
        self.selection.set_cursor(&self.text, at);
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_start(&self) -> Coordinates {
        self.selection.start()
    }

    pub fn selection_end(&self) -> Coordinates {
        self.selection.end()
    }

    pub fn has_selection(&self) -> bool {
        self.selection.has_selection()
    }

    pub fn select(&mut self, start: Coordinates, end: Coordinates, mode: SelectionMode) {
        self.selection.set_interactive(start, end);
        self.selection.set_mode(mode);
        self.selection.select(&self.text, start, end, mode);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.text);
    }

    pub fn select_word_under_cursor(&mut self) {
        self.selection.select_word_under_cursor(&self.text);
    }

    /// カーソル位置の単語
    pub fn word_under_cursor(&self) -> String {
        self.word_at(self.cursor_position())
    }

    pub fn word_at(&self, at: Coordinates) -> String {
        let at = self.text.sanitize_coordinates(at);
        let start = self.text.find_word_start(at);
        let end = self.text.find_word_end(at);
        self.text.text(start, end, self.options.newline())
    }

    // ---- 履歴 -----------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo_index(&self) -> usize {
        self.undo.index()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// 最大 `steps` 回取り消し、実際に取り消した回数を返す
    ///
    /// 開いている取り消しグループは先に閉じる。
    pub fn undo(&mut self, steps: usize) -> Result<usize> {
        self.ensure_writable("undo")?;
        let mut ctx = ReplayContext::new(&mut self.text, &mut self.selection);
        let result = self.undo.undo(steps, &mut ctx);
        let touched = ctx.touched_lines();
        self.after_replay(touched);
        Ok(result?)
    }

    /// 最大 `steps` 回やり直し、実際にやり直した回数を返す
    pub fn redo(&mut self, steps: usize) -> Result<usize> {
        self.ensure_writable("redo")?;
        let mut ctx = ReplayContext::new(&mut self.text, &mut self.selection);
        let result = self.undo.redo(steps, &mut ctx);
        let touched = ctx.touched_lines();
        self.after_replay(touched);
        Ok(result?)
    }

    /// 以降の編集を `end_undo_group` まで1ステップにまとめる
    pub fn begin_undo_group(&mut self) {
        self.undo.begin_group();
    }

    pub fn end_undo_group(&mut self) {
        self.undo.end_group();
    }

    fn after_replay(&mut self, touched: Option<(usize, usize)>) {
        self.sync_dependents();
        if let Some((first, last)) = touched {
            self.invalidate_around(first, last);
            self.text_changed = true;
        }
    }

    // ---- 行マーカー -------------------------------------------------------

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn set_breakpoints<I: IntoIterator<Item = usize>>(&mut self, lines: I) {
        self.breakpoints = lines.into_iter().collect();
    }

    pub fn toggle_breakpoint(&mut self, line: usize) -> bool {
        self.breakpoints.toggle(line)
    }

    pub fn error_markers(&self) -> &ErrorMarkers {
        &self.error_markers
    }

    pub fn set_error_markers<I: IntoIterator<Item = (usize, String)>>(&mut self, markers: I) {
        self.error_markers = markers.into_iter().collect();
    }

    // ---- 色付け ---------------------------------------------------------

    pub fn colorizer(&self) -> &Colorizer {
        &self.colorizer
    }

    /// 色付けを1フレーム分進め、処理した行数を返す
    pub fn colorize_incremental(&mut self) -> Result<usize> {
        Ok(self.colorizer.colorize_incremental(&mut self.text)?)
    }

    /// `[from, from + count)` を再色付け対象にする（`None` は末尾まで）
    pub fn invalidate_color(&mut self, from: usize, count: Option<usize>) {
        self.colorizer
            .invalidate(from, count, self.text.line_count());
    }

    /// 位置にある識別子のツールチップ
    pub fn tooltip_at(&self, at: Coordinates) -> Option<String> {
        let at = self.text.sanitize_coordinates(at);
        let start = self.text.find_word_start(at);
        let line = self.text.line(start.line)?;
        let index = self.text.character_index(start)?;
        let identifier: String = line.glyphs()[index..]
            .iter()
            .map(|g| g.ch)
            .take_while(|ch| ch.is_alphanumeric() || *ch == '_')
            .collect();
        if identifier.is_empty() {
            return None;
        }
        self.colorizer.tooltip(&identifier)
    }

    // ---- 内部 -----------------------------------------------------------

    fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        if self.options.read_only {
            log::warn!("{} refused: editor is read-only", operation);
            return Err(EditError::ReadOnly { operation }.into());
        }
        Ok(())
    }

    /// 編集行の前後を含めて再色付け対象にする
    fn invalidate_around(&mut self, first: usize, last: usize) {
        let from = first.saturating_sub(1);
        let count = last.saturating_sub(from) + 2;
        self.invalidate_color(from, Some(count));
    }

    /// バッファに溜まった構造変更を依存テーブルとリスナーへ配信する
    fn sync_dependents(&mut self) {
        let line_count = self.text.line_count();
        for change in self.text.take_changes() {
            log::debug!("text change: {:?}", change);
            self.colorizer.on_change(&change, line_count);
            self.breakpoints.on_change(&change);
            self.error_markers.on_change(&change);
            if change == TextChange::AllTextReplaced {
                self.undo.clear();
                self.selection.reset();
            }
            self.notifier.notify(&change);
        }
    }
}

impl fmt::Debug for TextEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextEditor")
            .field("lines", &self.text.line_count())
            .field("selection", &self.selection.state())
            .field("undo_index", &self.undo.index())
            .field("options", &self.options)
            .field("colorizer", &self.colorizer)
            .finish()
    }
}
