//! TextEditor public API scenarios
//!
//! Exercises the editor the way a host would: through `TextEditor` only,
//! checking text, cursor, history and colorization state after each step.

use anyhow::Result;
use editcore::buffer::{ColorIndex, Coordinates};
use editcore::config::{EditorOptions, LineEnding};
use editcore::editor::{MemoryClipboard, SelectionMode};
use editcore::highlight::{LanguageDefinition, RegexHighlighter};
use editcore::TextEditor;

fn c(line: usize, column: usize) -> Coordinates {
    Coordinates::new(line, column)
}

fn colorize_all(editor: &mut TextEditor) -> Result<()> {
    while editor.colorizer().is_pending() {
        editor.colorize_incremental()?;
    }
    Ok(())
}

const C_SAMPLE: &str = "#include <stdio.h>\n\
int main(void)\n\
{\n\
\t/* entry\n\
\t   point */\n\
\tint count = 42;\n\
\tif (count > 0)\n\
\t\tprintf(\"%d\\n\", count);\n\
\treturn 0; // done\n\
}";

#[test]
fn test_backspace_across_selection() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.set_text("one\ntwo\nthree");
    editor.select(c(0, 2), c(2, 1), SelectionMode::Normal);
    editor.backspace()?;

    assert_eq!(editor.all_text(), "onhree");
    assert_eq!(editor.cursor_position(), c(0, 2));
    assert_eq!(editor.undo_len(), 1);

    editor.undo(1)?;
    assert_eq!(editor.all_text(), "one\ntwo\nthree");
    assert_eq!(editor.selection_start(), c(0, 2));
    assert_eq!(editor.selection_end(), c(2, 1));
    Ok(())
}

#[test]
fn test_word_insertion_then_replace_all() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.enter_character('a', false)?;
    assert_eq!(editor.all_text(), "a");
    assert_eq!(editor.cursor_position(), c(0, 1));

    editor.enter_character('b', false)?;
    assert_eq!(editor.all_text(), "ab");
    assert_eq!(editor.cursor_position(), c(0, 2));

    editor.select_all();
    editor.enter_character('c', false)?;
    assert_eq!(editor.all_text(), "c");
    assert_eq!(editor.cursor_position(), c(0, 1));
    assert_eq!(editor.undo_len(), 3);
    assert_eq!(editor.undo_index(), 3);
    Ok(())
}

#[test]
fn test_undo_then_redo_restores_exact_state() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.set_text(C_SAMPLE);
    editor.set_breakpoints([5, 8]);

    editor.select(c(5, 5), c(7, 3), SelectionMode::Normal);
    let before = editor.serialize_state()?;
    editor.enter_character('\n', false)?;
    let after = editor.serialize_state()?;

    editor.undo(1)?;
    assert_eq!(editor.serialize_state()?, before);
    editor.redo(1)?;
    assert_eq!(editor.serialize_state()?, after);
    Ok(())
}

#[test]
fn test_indent_then_unindent_restores_text() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.set_text(C_SAMPLE);
    editor.select(c(2, 0), c(9, 1), SelectionMode::Normal);

    editor.indent_selection(false)?;
    assert_eq!(editor.text_lines()[5], "\t\tint count = 42;");
    assert_eq!(editor.text_lines()[9], "\t}");

    editor.indent_selection(true)?;
    assert_eq!(editor.all_text(), C_SAMPLE);
    Ok(())
}

#[test]
fn test_group_undoes_as_one_step() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.begin_undo_group();
    for ch in "word".chars() {
        editor.enter_character(ch, false)?;
    }
    editor.end_undo_group();
    assert_eq!(editor.undo_len(), 1);

    assert_eq!(editor.undo(5)?, 1);
    assert_eq!(editor.all_text(), "");
    assert_eq!(editor.redo(1)?, 1);
    assert_eq!(editor.all_text(), "word");
    Ok(())
}

#[test]
fn test_undo_inside_open_group_undoes_the_group() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.enter_character('a', false)?;
    editor.begin_undo_group();
    editor.enter_character('b', false)?;
    editor.enter_character('c', false)?;

    assert_eq!(editor.undo(1)?, 1);
    assert_eq!(editor.all_text(), "a");
    assert_eq!(editor.undo_len(), 2);

    // 閉じた後の編集はグループに入らない
    editor.end_undo_group();
    editor.enter_character('x', false)?;
    assert_eq!(editor.undo_len(), 2);
    assert_eq!(editor.undo(1)?, 1);
    assert_eq!(editor.all_text(), "a");
    Ok(())
}

#[test]
fn test_new_edit_discards_redo_tail() -> Result<()> {
    let mut editor = TextEditor::new();
    for ch in "abc".chars() {
        editor.enter_character(ch, false)?;
    }
    editor.undo(2)?;
    assert!(editor.can_redo());

    editor.enter_character('z', false)?;
    assert!(!editor.can_redo());
    assert_eq!(editor.undo_len(), 2);
    assert_eq!(editor.all_text(), "az");
    Ok(())
}

#[test]
fn test_markers_follow_line_edits() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.set_text("0\n1\n2\n3\n4\n5\n6\n7\n8\n9\n10");
    editor.set_breakpoints([2, 5, 9]);
    editor.set_error_markers([(5, "expected ';'".to_string())]);

    editor.set_cursor_position(c(2, 1));
    editor.enter_character('\n', false)?;
    assert_eq!(editor.breakpoints().lines().collect::<Vec<_>>(), vec![2, 6, 10]);
    assert_eq!(editor.error_markers().get(6).map(String::as_str), Some("expected ';'"));

    editor.undo(1)?;
    assert_eq!(editor.breakpoints().lines().collect::<Vec<_>>(), vec![2, 5, 9]);

    // 行 4..=6 を削除
    editor.select(c(3, 1), c(6, 1), SelectionMode::Normal);
    editor.delete()?;
    assert_eq!(editor.breakpoints().lines().collect::<Vec<_>>(), vec![2, 6]);
    assert!(editor.error_markers().is_empty());
    Ok(())
}

#[test]
fn test_colorization_scheduling() -> Result<()> {
    let definition = LanguageDefinition {
        max_lines_per_frame: 2,
        ..LanguageDefinition::c_like()
    };
    let mut editor = TextEditor::new();
    editor.set_text(&vec!["x"; 20].join("\n"));
    editor.set_highlighter(RegexHighlighter::new(definition)?);
    colorize_all(&mut editor)?;
    assert_eq!(editor.colorizer().dirty_range(), None);

    editor.invalidate_color(5, Some(5));
    assert_eq!(editor.colorize_incremental()?, 2);
    assert_eq!(editor.colorize_incremental()?, 2);
    assert_eq!(editor.colorize_incremental()?, 1);
    assert_eq!(editor.colorizer().dirty_range(), None);
    assert_eq!(editor.colorize_incremental()?, 0);
    Ok(())
}

#[test]
fn test_c_sample_colors() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.set_text(C_SAMPLE);
    editor.set_highlighter(RegexHighlighter::c_like()?);
    colorize_all(&mut editor)?;

    let buffer = editor.buffer();
    let color = |line: usize, index: usize| buffer.line(line).map(|l| l[index].color);

    assert_eq!(color(0, 0), Some(ColorIndex::Preprocessor));
    assert_eq!(color(1, 0), Some(ColorIndex::Keyword));
    assert_eq!(color(4, 4), Some(ColorIndex::MultiLineComment));
    assert_eq!(color(5, 13), Some(ColorIndex::Number));
    assert_eq!(color(7, 2), Some(ColorIndex::KnownIdentifier));
    assert_eq!(color(7, 9), Some(ColorIndex::String));
    assert_eq!(color(8, 12), Some(ColorIndex::Comment));
    Ok(())
}

#[test]
fn test_block_comment_reopens_following_lines() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.set_text("a\nb\nc");
    editor.set_highlighter(RegexHighlighter::c_like()?);
    colorize_all(&mut editor)?;
    assert_eq!(editor.buffer().line(2).map(|l| l[0].color), Some(ColorIndex::Identifier));

    editor.set_cursor_position(c(0, 0));
    editor.enter_character('/', false)?;
    editor.enter_character('*', false)?;
    colorize_all(&mut editor)?;
    assert_eq!(
        editor.buffer().line(2).map(|l| l[0].color),
        Some(ColorIndex::MultiLineComment)
    );
    Ok(())
}

#[test]
fn test_clipboard_round_trip_with_crlf_output() -> Result<()> {
    let mut editor = TextEditor::with_options(EditorOptions {
        line_ending: LineEnding::CrLf,
        ..EditorOptions::default()
    });
    editor.set_clipboard(Box::new(MemoryClipboard::new()));
    editor.set_text("first\nsecond");
    editor.select_all();
    editor.copy();
    assert_eq!(editor.clipboard_mut().get_text().as_deref(), Some("first\r\nsecond"));

    editor.move_to_end_of_file(false);
    editor.enter_character('\n', false)?;
    editor.paste()?;
    assert_eq!(editor.text_lines(), vec!["first", "second", "first", "second"]);
    Ok(())
}

#[test]
fn test_line_count_never_drops_below_one() -> Result<()> {
    let mut editor = TextEditor::new();
    editor.set_text("");
    assert_eq!(editor.line_count(), 1);

    editor.set_text("a\nb");
    editor.select_all();
    editor.delete()?;
    assert_eq!(editor.line_count(), 1);
    assert_eq!(editor.all_text(), "");

    editor.backspace()?;
    editor.delete()?;
    assert_eq!(editor.line_count(), 1);
    Ok(())
}

#[test]
fn test_options_from_json_apply_to_editor() -> Result<()> {
    let options = EditorOptions::from_json(r#"{ "tabSize": 2, "indentWithSpaces": true }"#)?;
    let mut editor = TextEditor::with_options(options);
    editor.set_text("a");
    editor.move_to_end_of_line(false);
    editor.enter_character('\t', false)?;
    assert_eq!(editor.all_text(), "a ");
    assert_eq!(editor.cursor_position(), c(0, 2));
    Ok(())
}
