//! 言語定義駆動の正規表現ハイライタ
//!
//! キーワード・既知識別子・トークンパターン・コメント記号から成る
//! `LanguageDefinition` をもとに行を色付けする。
//! ブロックコメントの内側にいるかを行をまたいで引き継ぐ。

use super::{SyntaxHighlighter, DEFAULT_MAX_LINES_PER_FRAME};
use crate::buffer::{ColorIndex, Glyph};
use crate::error::highlight::Result;
use crate::error::HighlightError;
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};

/// 行をまたいで引き継ぐ走査状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// ブロックコメントの内側で行が終わった
    InBlockComment,
}

/// 言語定義
#[derive(Debug, Clone)]
pub struct LanguageDefinition {
    pub name: String,
    pub keywords: HashSet<String>,
    /// 既知識別子とそのツールチップ
    pub identifiers: HashMap<String, String>,
    /// プリプロセッサ行でのみ有効な識別子とそのツールチップ
    pub preprocessor_identifiers: HashMap<String, String>,
    /// 先頭から順に試すトークンパターン
    pub token_patterns: Vec<(String, ColorIndex)>,
    pub single_line_comment: String,
    pub comment_start: String,
    pub comment_end: String,
    pub preprocessor_char: Option<char>,
    pub auto_indentation: bool,
    pub case_sensitive: bool,
    pub max_lines_per_frame: usize,
}

impl Default for LanguageDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            keywords: HashSet::new(),
            identifiers: HashMap::new(),
            preprocessor_identifiers: HashMap::new(),
            token_patterns: Vec::new(),
            single_line_comment: String::new(),
            comment_start: String::new(),
            comment_end: String::new(),
            preprocessor_char: None,
            auto_indentation: true,
            case_sensitive: true,
            max_lines_per_frame: DEFAULT_MAX_LINES_PER_FRAME,
        }
    }
}

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Bool", "_Complex", "_Imaginary",
];

const C_IDENTIFIERS: &[(&str, &str)] = &[
    ("printf", "int printf(const char *format, ...)"),
    ("malloc", "void *malloc(size_t size)"),
    ("free", "void free(void *ptr)"),
    ("memcpy", "void *memcpy(void *dest, const void *src, size_t n)"),
    ("strlen", "size_t strlen(const char *s)"),
    ("size_t", "unsigned integer type of the result of sizeof"),
    ("NULL", "null pointer constant"),
];

const C_PREPROCESSOR_IDENTIFIERS: &[(&str, &str)] = &[
    ("include", "include a header file"),
    ("define", "define a macro"),
    ("ifdef", "conditional on macro definition"),
    ("endif", "end of conditional block"),
];

impl LanguageDefinition {
    /// C 系言語の定義
    pub fn c_like() -> Self {
        let patterns = [
            (r"[ \t]*#[ \t]*[a-zA-Z_]+", ColorIndex::Preprocessor),
            (r#"L?"(\\.|[^"\\])*""#, ColorIndex::String),
            (r"'\\?[^']'", ColorIndex::CharLiteral),
            (r"0[xX][0-9a-fA-F]+[uU]?[lL]?[lL]?", ColorIndex::Number),
            (
                r"[+-]?([0-9]+([.][0-9]*)?|[.][0-9]+)([eE][+-]?[0-9]+)?[fF]?",
                ColorIndex::Number,
            ),
            (r"[a-zA-Z_][a-zA-Z0-9_]*", ColorIndex::Identifier),
            (
                r"[\[\]{}!%^&*()\-+=~|<>?/;,.:]",
                ColorIndex::Punctuation,
            ),
        ];

        Self {
            name: "C".to_string(),
            keywords: C_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            identifiers: C_IDENTIFIERS
                .iter()
                .map(|(name, tip)| (name.to_string(), tip.to_string()))
                .collect(),
            preprocessor_identifiers: C_PREPROCESSOR_IDENTIFIERS
                .iter()
                .map(|(name, tip)| (name.to_string(), tip.to_string()))
                .collect(),
            token_patterns: patterns
                .iter()
                .map(|(pattern, color)| (pattern.to_string(), *color))
                .collect(),
            single_line_comment: "//".to_string(),
            comment_start: "/*".to_string(),
            comment_end: "*/".to_string(),
            preprocessor_char: Some('#'),
            ..Self::default()
        }
    }
}

/// 言語定義に従う正規表現ハイライタ
#[derive(Debug, Clone)]
pub struct RegexHighlighter {
    definition: LanguageDefinition,
    patterns: Vec<(Regex, String, ColorIndex)>,
    keywords: HashSet<String>,
    identifiers: HashMap<String, String>,
    preprocessor_identifiers: HashMap<String, String>,
    single_line_comment: Vec<char>,
    comment_start: Vec<char>,
    comment_end: Vec<char>,
}

impl RegexHighlighter {
    /// 言語定義からハイライタを構築する（パターンは行頭固定でコンパイル）
    pub fn new(definition: LanguageDefinition) -> Result<Self> {
        let patterns = definition
            .token_patterns
            .iter()
            .map(|(pattern, color)| {
                RegexBuilder::new(&format!(r"\A(?:{})", pattern))
                    .case_insensitive(!definition.case_sensitive)
                    .build()
                    .map(|regex| (regex, pattern.clone(), *color))
                    .map_err(|e| HighlightError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let fold = |name: &String| {
            if definition.case_sensitive {
                name.clone()
            } else {
                name.to_lowercase()
            }
        };
        let keywords = definition.keywords.iter().map(fold).collect();
        let identifiers = definition
            .identifiers
            .iter()
            .map(|(name, tip)| (fold(name), tip.clone()))
            .collect();
        let preprocessor_identifiers = definition
            .preprocessor_identifiers
            .iter()
            .map(|(name, tip)| (fold(name), tip.clone()))
            .collect();

        log::debug!(
            "language `{}` compiled with {} token patterns",
            definition.name,
            patterns.len()
        );

        Ok(Self {
            single_line_comment: definition.single_line_comment.chars().collect(),
            comment_start: definition.comment_start.chars().collect(),
            comment_end: definition.comment_end.chars().collect(),
            patterns,
            keywords,
            identifiers,
            preprocessor_identifiers,
            definition,
        })
    }

    /// C 系言語のハイライタ
    pub fn c_like() -> Result<Self> {
        Self::new(LanguageDefinition::c_like())
    }

    pub fn definition(&self) -> &LanguageDefinition {
        &self.definition
    }

    fn fold_case(&self, name: &str) -> String {
        if self.definition.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }

    /// コメント・プリプロセッサのフラグ付け。行末でブロックコメント内なら真
    fn mark_flags(&self, line: &mut [Glyph], mut in_block: bool) -> bool {
        let chars: Vec<char> = line.iter().map(|g| g.ch).collect();
        let starts_with = |index: usize, marker: &[char]| {
            !marker.is_empty() && chars[index..].starts_with(marker)
        };

        let mut in_line_comment = false;
        let mut in_string: Option<char> = None;
        let mut preprocessor = false;
        let mut seen_text = false;
        let mut index = 0;

        while index < chars.len() {
            let ch = chars[index];
            if !seen_text && !in_block && Some(ch) == self.definition.preprocessor_char {
                preprocessor = true;
            }
            if ch != ' ' && ch != '\t' {
                seen_text = true;
            }

            let mut span = 1;
            let mut block_here = in_block;
            if in_block {
                if starts_with(index, &self.comment_end) {
                    span = self.comment_end.len();
                    in_block = false;
                }
            } else if in_line_comment {
                // 行末までコメント
            } else if let Some(quote) = in_string {
                if ch == '\\' && index + 1 < chars.len() {
                    span = 2;
                } else if ch == quote {
                    in_string = None;
                }
            } else if ch == '"' || ch == '\'' {
                in_string = Some(ch);
            } else if starts_with(index, &self.single_line_comment) {
                in_line_comment = true;
            } else if starts_with(index, &self.comment_start) {
                in_block = true;
                block_here = true;
                span = self.comment_start.len();
            }

            for glyph in &mut line[index..index + span] {
                glyph.set_comment(in_line_comment);
                glyph.set_multi_line_comment(block_here);
                glyph.set_preprocessor(preprocessor);
            }
            index += span;
        }

        in_block
    }

    /// トークン単位の色付け
    fn tokenize(&self, line: &mut [Glyph]) -> Result<()> {
        let text: String = line.iter().map(|g| g.ch).collect();
        let mut byte = 0;
        let mut index = 0;

        while index < line.len() {
            let ch = line[index].ch;
            if ch.is_whitespace() {
                line[index].color = token_color(&line[index], ColorIndex::Default);
                byte += ch.len_utf8();
                index += 1;
                continue;
            }

            let rest = &text[byte..];
            let mut token: Option<(&str, ColorIndex)> = None;
            for (regex, pattern, color) in &self.patterns {
                if let Some(found) = regex.find(rest) {
                    if found.end() == 0 {
                        return Err(HighlightError::NoProgress {
                            pattern: pattern.clone(),
                            column: index,
                        });
                    }
                    token = Some((found.as_str(), *color));
                    break;
                }
            }

            let (token, color) = match token {
                Some((token, color)) => (token, self.classify(token, color, &line[index])),
                None => (&rest[..ch.len_utf8()], ColorIndex::Default),
            };

            let count = token.chars().count();
            for glyph in &mut line[index..index + count] {
                glyph.color = token_color(glyph, color);
            }
            byte += token.len();
            index += count;
        }

        Ok(())
    }

    fn classify(&self, token: &str, color: ColorIndex, first: &Glyph) -> ColorIndex {
        if color != ColorIndex::Identifier {
            return color;
        }
        let name = self.fold_case(token);
        if first.is_preprocessor() && self.preprocessor_identifiers.contains_key(&name) {
            ColorIndex::PreprocIdentifier
        } else if self.keywords.contains(&name) {
            ColorIndex::Keyword
        } else if self.identifiers.contains_key(&name) {
            ColorIndex::KnownIdentifier
        } else {
            ColorIndex::Identifier
        }
    }
}

/// コメント内のグリフはトークンの色よりコメント色を優先する
fn token_color(glyph: &Glyph, color: ColorIndex) -> ColorIndex {
    if glyph.is_multi_line_comment() {
        ColorIndex::MultiLineComment
    } else if glyph.is_comment() {
        ColorIndex::Comment
    } else {
        color
    }
}

impl SyntaxHighlighter for RegexHighlighter {
    type State = ScanState;

    fn auto_indentation(&self) -> bool {
        self.definition.auto_indentation
    }

    fn max_lines_per_frame(&self) -> usize {
        self.definition.max_lines_per_frame
    }

    fn tooltip(&self, identifier: &str) -> Option<String> {
        let name = self.fold_case(identifier);
        self.identifiers
            .get(&name)
            .or_else(|| self.preprocessor_identifiers.get(&name))
            .cloned()
    }

    fn colorize(
        &self,
        line: &mut [Glyph],
        state: Option<&ScanState>,
    ) -> Result<Option<ScanState>> {
        let in_block = self.mark_flags(line, state == Some(&ScanState::InBlockComment));
        self.tokenize(line)?;
        Ok(in_block.then_some(ScanState::InBlockComment))
    }
}
