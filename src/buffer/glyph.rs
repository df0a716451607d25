//! グリフ
//!
//! 1文字と、その色分類・コメント/プリプロセッサフラグ

/// 構文色の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorIndex {
    #[default]
    Default,
    Keyword,
    Number,
    String,
    CharLiteral,
    Punctuation,
    Preprocessor,
    Identifier,
    KnownIdentifier,
    PreprocIdentifier,
    Comment,
    MultiLineComment,
}

/// グリフのフラグ集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlyphFlags(u8);

impl GlyphFlags {
    pub const COMMENT: GlyphFlags = GlyphFlags(0b001);
    pub const MULTI_LINE_COMMENT: GlyphFlags = GlyphFlags(0b010);
    pub const PREPROCESSOR: GlyphFlags = GlyphFlags(0b100);

    pub const fn empty() -> Self {
        GlyphFlags(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: GlyphFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, flag: GlyphFlags, enabled: bool) {
        if enabled {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }
}

/// 色付き文字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub color: ColorIndex,
    pub flags: GlyphFlags,
}

impl Glyph {
    pub fn new(ch: char) -> Self {
        Self::with_color(ch, ColorIndex::Default)
    }

    pub fn with_color(ch: char, color: ColorIndex) -> Self {
        Self {
            ch,
            color,
            flags: GlyphFlags::empty(),
        }
    }

    pub fn is_comment(&self) -> bool {
        self.flags.contains(GlyphFlags::COMMENT)
    }

    pub fn is_multi_line_comment(&self) -> bool {
        self.flags.contains(GlyphFlags::MULTI_LINE_COMMENT)
    }

    pub fn is_preprocessor(&self) -> bool {
        self.flags.contains(GlyphFlags::PREPROCESSOR)
    }

    pub fn set_comment(&mut self, enabled: bool) {
        self.flags.set(GlyphFlags::COMMENT, enabled);
    }

    pub fn set_multi_line_comment(&mut self, enabled: bool) {
        self.flags.set(GlyphFlags::MULTI_LINE_COMMENT, enabled);
    }

    pub fn set_preprocessor(&mut self, enabled: bool) {
        self.flags.set(GlyphFlags::PREPROCESSOR, enabled);
    }

    /// 空白またはタブ
    pub fn is_blank(&self) -> bool {
        self.ch == ' ' || self.ch == '\t'
    }
}
