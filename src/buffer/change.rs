//! 変更通知
//!
//! バッファの構造変更イベントと、それを受け取るリスナー

/// バッファの構造変更
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChange {
    /// 全テキストが置き換えられた
    AllTextReplaced,
    /// 指定位置に行が挿入された
    LineInserted(usize),
    /// `[start, end]`（両端含む）の行が削除された
    LinesRemoved { start: usize, end: usize },
}

impl TextChange {
    /// 削除行数（削除イベント以外は0）
    pub fn removed_count(&self) -> usize {
        match self {
            TextChange::LinesRemoved { start, end } => end - start + 1,
            _ => 0,
        }
    }
}

/// 変更通知リスナー
pub trait ChangeListener {
    fn on_change(&mut self, change: &TextChange);
}

impl<F> ChangeListener for F
where
    F: FnMut(&TextChange),
{
    fn on_change(&mut self, change: &TextChange) {
        self(change)
    }
}

/// 変更通知システム
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// リスナーを追加
    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    /// 登録済みリスナー数
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// 変更を通知
    pub fn notify(&mut self, change: &TextChange) {
        for listener in &mut self.listeners {
            listener.on_change(change);
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
