//! File load/save behavior: the persisted format, recoverable load failure,
//! and history reset on load.

use core_config::Config;
use core_state::Document;
use core_text::{Glyph, Position, SelectionShape};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("trace")
        .with_test_writer()
        .try_init();
}

fn document_with(raw: &str) -> Document {
    let mut doc = Document::new(&Config::default());
    let fragment = doc.decode_str(raw);
    doc.insert_text(
        Position::origin(),
        &fragment,
        Position::origin(),
        SelectionShape::TextLike,
        false,
    );
    doc
}

#[test]
fn save_then_load_is_the_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");

    let mut doc = document_with("print_if_you_want\nHello\nWorld!");
    doc.set_path(&path);
    doc.save_to_file().unwrap();

    let mut reloaded = Document::new(&Config::default());
    reloaded.load_from_file(&path).unwrap();
    assert_eq!(reloaded.total_rows(), 3);
    assert_eq!(reloaded.contents(), doc.contents());
    assert_eq!(reloaded.path(), path);
}

#[test]
fn tabs_keep_logical_form_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabs.txt");
    std::fs::write(&path, "a\tb\n").unwrap();

    let mut doc = Document::new(&Config::default());
    doc.load_from_file(&path).unwrap();

    let tab = doc.glyph_at(Position::new(1, 0));
    assert_eq!(tab.logical(), "\t");
    assert_eq!(tab.rendered(), "\u{2192}");

    doc.save_to_file().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\tb\n");
}

#[test]
fn trailing_newline_does_not_create_an_empty_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trailing.txt");
    std::fs::write(&path, "ab\ncd\n").unwrap();

    let mut doc = Document::new(&Config::default());
    doc.load_from_file(&path).unwrap();
    assert_eq!(doc.total_rows(), 2);
    assert_eq!(doc.row_width(-1), 2);
}

#[test]
fn empty_file_loads_as_single_empty_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "").unwrap();

    let mut doc = Document::new(&Config::default());
    doc.load_from_file(&path).unwrap();
    assert_eq!(doc.total_rows(), 1);
    assert!(doc.buffer().is_empty());
}

#[test]
fn failed_load_leaves_document_untouched() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let mut doc = document_with("ab");
    doc.insert_glyph(
        Position::new(1, 0),
        Glyph::new("X"),
        Position::new(2, 0),
        SelectionShape::TextLike,
        true,
    );
    let contents = doc.contents();
    let path = doc.path().to_path_buf();

    assert!(doc.load_from_file(dir.path().join("absent.txt")).is_err());
    assert_eq!(doc.contents(), contents);
    assert_eq!(doc.path(), path);
    // History is intact: the edit is still undoable.
    assert_eq!(doc.history().len(), 1);
    assert!(doc.undo().is_some());
    assert_eq!(doc.contents(), "ab\n");
}

#[test]
fn successful_load_resets_history() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    std::fs::write(&path, "fresh\n").unwrap();

    let mut doc = document_with("ab");
    doc.insert_glyph(
        Position::new(1, 0),
        Glyph::new("X"),
        Position::new(2, 0),
        SelectionShape::TextLike,
        true,
    );
    assert_eq!(doc.history().len(), 1);

    doc.load_from_file(&path).unwrap();
    assert_eq!(doc.history().len(), 0);
    assert!(doc.undo().is_none());
    assert_eq!(doc.contents(), "fresh\n");
    doc.log_history();
}
