//! バッファ層
//!
//! 座標・グリフ・行・テキストバッファと、構造変更イベント

pub mod change;
pub mod coordinates;
pub mod glyph;
pub mod line;
pub mod text;

pub use change::{ChangeListener, ChangeNotifier, TextChange};
pub use coordinates::Coordinates;
pub use glyph::{ColorIndex, Glyph, GlyphFlags};
pub use line::Line;
pub use text::TextBuffer;
