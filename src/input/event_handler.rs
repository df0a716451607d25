//! イベントハンドリング
//!
//! キー入力をキーマップで編集アクションへ変換し、エディタ上で実行する

use super::keybinding::{EditorAction, Key};
use crate::editor::TextEditor;
use crate::error::Result;
use crossterm::event::{Event, KeyEventKind};

impl TextEditor {
    /// アクションを実行する
    ///
    /// 読み取り専用のエディタでは本文を変えるアクションを実行せず `false` を返す。
    pub fn execute(&mut self, action: EditorAction) -> Result<bool> {
        if action.is_mutating() && self.is_read_only() {
            log::debug!("ignored {:?}: editor is read-only", action);
            return Ok(false);
        }

        match action {
            EditorAction::Undo => {
                self.undo(1)?;
            }
            EditorAction::Redo => {
                self.redo(1)?;
            }
            EditorAction::MoveUp { extend } => self.move_up(1, extend),
            EditorAction::MoveDown { extend } => self.move_down(1, extend),
            EditorAction::MoveLeft { extend, word } => self.move_left(1, extend, word),
            EditorAction::MoveRight { extend, word } => self.move_right(1, extend, word),
            EditorAction::MoveToStartOfLine { extend } => self.move_to_start_of_line(extend),
            EditorAction::MoveToEndOfLine { extend } => self.move_to_end_of_line(extend),
            EditorAction::MoveToStartOfFile { extend } => self.move_to_start_of_file(extend),
            EditorAction::MoveToEndOfFile { extend } => self.move_to_end_of_file(extend),
            EditorAction::PageUp { extend } => self.page_up(extend),
            EditorAction::PageDown { extend } => self.page_down(extend),
            EditorAction::Tab { unindent } => self.enter_character('\t', unindent)?,
            EditorAction::SelectAll => self.select_all(),
            EditorAction::Copy => self.copy(),
            EditorAction::Cut => self.cut()?,
            EditorAction::Paste => self.paste()?,
            EditorAction::ToggleOverwrite => self.set_overwrite(!self.is_overwrite()),
            EditorAction::Delete => self.delete()?,
            EditorAction::Backspace => self.backspace()?,
            EditorAction::Newline => self.enter_character('\n', false)?,
            EditorAction::InsertChar(ch) => self.enter_character(ch, false)?,
        }
        Ok(true)
    }

    /// キー入力を処理し、何らかのアクションを実行したかを返す
    pub fn handle_key(&mut self, key: Key) -> Result<bool> {
        match self.keymap().lookup(&key) {
            Some(action) => self.execute(action),
            None => Ok(false),
        }
    }

    /// ターミナルイベントを処理する（キー押下と貼り付けのみ扱う）
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                self.handle_key(key_event.into())
            }
            Event::Paste(text) if !self.is_read_only() => {
                self.insert_text(&text)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
