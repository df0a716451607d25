//! キーバインド
//!
//! キー入力の内部表現と、キーから編集アクションへの対応表を管理

use crossterm::event::{KeyCode as CrosstermKeyCode, KeyEvent, KeyModifiers as CrosstermModifiers};
use std::collections::HashMap;
use thiserror::Error;

/// キー入力の内部表現
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    /// 修飾キー
    pub modifiers: KeyModifiers,
    /// 基本キー
    pub code: KeyCode,
}

/// 修飾キーの組み合わせ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyModifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
    };
    pub const ALT: Self = Self {
        ctrl: false,
        alt: true,
        shift: false,
    };
    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
    };
    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        alt: false,
        shift: true,
    };
}

/// 基本キーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
    Esc,
    Unknown,
}

impl Key {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { modifiers, code }
    }

    /// 修飾キーなし
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CTRL)
    }

    pub const fn alt(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::ALT)
    }

    pub const fn shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }

    pub const fn ctrl_shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CTRL_SHIFT)
    }

    /// 挿入可能な文字かどうかを判定
    pub fn is_insertable_char(&self) -> bool {
        matches!(self.code, KeyCode::Char(ch) if !ch.is_control())
            && !self.modifiers.ctrl
            && !self.modifiers.alt
    }

    /// 文字列表現からパース（例: `C-z`, `C-S-z`, `S-Tab`, `PageUp`）
    pub fn parse(s: &str) -> Result<Self, KeyParseError> {
        if s.is_empty() {
            return Err(KeyParseError::EmptySequence);
        }

        let mut modifiers = KeyModifiers::NONE;
        let mut remaining = s;

        // 修飾キーの解析
        loop {
            if let Some(rest) = remaining.strip_prefix("C-") {
                modifiers.ctrl = true;
                remaining = rest;
            } else if let Some(rest) = remaining.strip_prefix("M-") {
                modifiers.alt = true;
                remaining = rest;
            } else if let Some(rest) = remaining.strip_prefix("S-") {
                modifiers.shift = true;
                remaining = rest;
            } else {
                break;
            }
        }

        let code = match remaining {
            "Enter" => KeyCode::Enter,
            "Backspace" => KeyCode::Backspace,
            "Delete" => KeyCode::Delete,
            "Tab" => KeyCode::Tab,
            "Up" => KeyCode::Up,
            "Down" => KeyCode::Down,
            "Left" => KeyCode::Left,
            "Right" => KeyCode::Right,
            "Home" => KeyCode::Home,
            "End" => KeyCode::End,
            "PageUp" => KeyCode::PageUp,
            "PageDown" => KeyCode::PageDown,
            "Insert" => KeyCode::Insert,
            "Esc" => KeyCode::Esc,
            "Space" => KeyCode::Char(' '),
            "" => return Err(KeyParseError::InvalidFormat(s.to_string())),
            rest => {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => KeyCode::Char(ch),
                    _ => match rest.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                        Some(n) => KeyCode::F(n),
                        None => return Err(KeyParseError::UnknownKey(rest.to_string())),
                    },
                }
            }
        };

        Ok(Key { modifiers, code })
    }
}

/// crossterm統合
///
/// Ctrl 付きの文字は小文字へ正規化し、BackTab は Shift+Tab として扱う。
impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        let mut modifiers = KeyModifiers {
            ctrl: event.modifiers.contains(CrosstermModifiers::CONTROL),
            alt: event.modifiers.contains(CrosstermModifiers::ALT),
            shift: event.modifiers.contains(CrosstermModifiers::SHIFT),
        };

        let code = match event.code {
            CrosstermKeyCode::Char(c) if modifiers.ctrl => KeyCode::Char(c.to_ascii_lowercase()),
            CrosstermKeyCode::Char(c) => KeyCode::Char(c),
            CrosstermKeyCode::Enter => KeyCode::Enter,
            CrosstermKeyCode::Backspace => KeyCode::Backspace,
            CrosstermKeyCode::Delete => KeyCode::Delete,
            CrosstermKeyCode::Tab => KeyCode::Tab,
            CrosstermKeyCode::BackTab => {
                modifiers.shift = true;
                KeyCode::Tab
            }
            CrosstermKeyCode::Up => KeyCode::Up,
            CrosstermKeyCode::Down => KeyCode::Down,
            CrosstermKeyCode::Left => KeyCode::Left,
            CrosstermKeyCode::Right => KeyCode::Right,
            CrosstermKeyCode::Home => KeyCode::Home,
            CrosstermKeyCode::End => KeyCode::End,
            CrosstermKeyCode::PageUp => KeyCode::PageUp,
            CrosstermKeyCode::PageDown => KeyCode::PageDown,
            CrosstermKeyCode::Insert => KeyCode::Insert,
            CrosstermKeyCode::F(n) => KeyCode::F(n),
            CrosstermKeyCode::Esc => KeyCode::Esc,
            _ => KeyCode::Unknown,
        };

        Key { modifiers, code }
    }
}

/// 編集アクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Undo,
    Redo,
    MoveUp { extend: bool },
    MoveDown { extend: bool },
    MoveLeft { extend: bool, word: bool },
    MoveRight { extend: bool, word: bool },
    MoveToStartOfLine { extend: bool },
    MoveToEndOfLine { extend: bool },
    MoveToStartOfFile { extend: bool },
    MoveToEndOfFile { extend: bool },
    PageUp { extend: bool },
    PageDown { extend: bool },
    /// Tab 入力（複数行選択中ならインデント、`unindent` で逆インデント）
    Tab { unindent: bool },
    SelectAll,
    Copy,
    Cut,
    Paste,
    ToggleOverwrite,
    Delete,
    Backspace,
    Newline,
    InsertChar(char),
}

impl EditorAction {
    /// 本文を書き換えるアクションか（読み取り専用では実行しない）
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            EditorAction::Undo
                | EditorAction::Redo
                | EditorAction::Tab { .. }
                | EditorAction::Paste
                | EditorAction::Delete
                | EditorAction::Backspace
                | EditorAction::Newline
                | EditorAction::InsertChar(_)
        )
    }
}

/// キーパースエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("Invalid key format: {0}")]
    InvalidFormat(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Empty key sequence")]
    EmptySequence,
}

/// キーから編集アクションへの対応表
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<Key, EditorAction>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut keymap = Self::empty();
        keymap.register_default_bindings();
        keymap
    }
}

impl KeyMap {
    /// 既定のキーマップを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 割り当てのないキーマップ（印字可能文字の挿入だけが残る）
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::with_capacity(48),
        }
    }

    fn register_default_bindings(&mut self) {
        use EditorAction::*;

        // 履歴
        self.bind(Key::ctrl(KeyCode::Char('z')), Undo);
        self.bind(Key::alt(KeyCode::Backspace), Undo);
        self.bind(Key::ctrl(KeyCode::Char('y')), Redo);
        self.bind(Key::ctrl_shift(KeyCode::Char('z')), Redo);

        // 移動系（Shift で選択を伸ばし、Ctrl で単語単位）
        for extend in [false, true] {
            let modifiers = KeyModifiers {
                shift: extend,
                ..KeyModifiers::NONE
            };
            let with_ctrl = KeyModifiers {
                ctrl: true,
                ..modifiers
            };

            for (word, mods) in [(false, modifiers), (true, with_ctrl)] {
                self.bind(Key::new(KeyCode::Left, mods), MoveLeft { extend, word });
                self.bind(Key::new(KeyCode::Right, mods), MoveRight { extend, word });
            }

            let bindings = [
                (KeyCode::Up, modifiers, MoveUp { extend }),
                (KeyCode::Down, modifiers, MoveDown { extend }),
                (KeyCode::Home, modifiers, MoveToStartOfLine { extend }),
                (KeyCode::End, modifiers, MoveToEndOfLine { extend }),
                (KeyCode::Home, with_ctrl, MoveToStartOfFile { extend }),
                (KeyCode::End, with_ctrl, MoveToEndOfFile { extend }),
                (KeyCode::PageUp, modifiers, PageUp { extend }),
                (KeyCode::PageDown, modifiers, PageDown { extend }),
            ];
            for (code, modifiers, action) in bindings {
                self.bind(Key::new(code, modifiers), action);
            }
        }

        // 編集系
        self.bind(Key::plain(KeyCode::Tab), Tab { unindent: false });
        self.bind(Key::shift(KeyCode::Tab), Tab { unindent: true });
        self.bind(Key::plain(KeyCode::Enter), Newline);
        self.bind(Key::plain(KeyCode::Delete), Delete);
        self.bind(Key::plain(KeyCode::Backspace), Backspace);
        self.bind(Key::plain(KeyCode::Insert), ToggleOverwrite);

        // クリップボード
        self.bind(Key::ctrl(KeyCode::Char('a')), SelectAll);
        self.bind(Key::ctrl(KeyCode::Char('c')), Copy);
        self.bind(Key::ctrl(KeyCode::Insert), Copy);
        self.bind(Key::ctrl(KeyCode::Char('x')), Cut);
        self.bind(Key::shift(KeyCode::Delete), Cut);
        self.bind(Key::ctrl(KeyCode::Char('v')), Paste);
        self.bind(Key::shift(KeyCode::Insert), Paste);
    }

    /// キーを割り当て、以前の割り当てを返す
    pub fn bind(&mut self, key: Key, action: EditorAction) -> Option<EditorAction> {
        self.bindings.insert(key, action)
    }

    /// 文字列表現のキーを割り当てる
    pub fn bind_str(
        &mut self,
        key: &str,
        action: EditorAction,
    ) -> Result<Option<EditorAction>, KeyParseError> {
        Ok(self.bind(Key::parse(key)?, action))
    }

    pub fn unbind(&mut self, key: &Key) -> Option<EditorAction> {
        self.bindings.remove(key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// キーに対応するアクションを探す
    ///
    /// 割り当てがなく挿入可能な文字であれば `InsertChar` になる。
    pub fn lookup(&self, key: &Key) -> Option<EditorAction> {
        if let Some(action) = self.bindings.get(key) {
            return Some(*action);
        }
        match key.code {
            KeyCode::Char(ch) if key.is_insertable_char() => Some(EditorAction::InsertChar(ch)),
            _ => None,
        }
    }
}
