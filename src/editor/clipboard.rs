//! クリップボード
//!
//! ホストのクリップボードへの窓口。既定はプロセス内のメモリ実装

/// クリップボードの抽象
pub trait Clipboard {
    /// 現在の内容（なければ `None`）
    fn get_text(&mut self) -> Option<String>;
    fn set_text(&mut self, text: &str);
}

/// メモリ上のクリップボード
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    content: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.content.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.content = Some(text.to_string());
    }
}
