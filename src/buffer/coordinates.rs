//! 座標
//!
//! (行, 表示列) の組。列はタブ展開後の表示列で数える

use serde::{Deserialize, Serialize};
use std::fmt;

/// テキスト内の位置（0ベース）
///
/// 順序は行優先、同一行では列で比較する。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Coordinates {
    /// 行番号
    pub line: usize,
    /// 表示列（タブ展開後）
    pub column: usize,
}

impl Coordinates {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// 原点 (0, 0)
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

impl From<(usize, usize)> for Coordinates {
    fn from((line, column): (usize, usize)) -> Self {
        Self::new(line, column)
    }
}
