use notes_pdf::{Book, ExportError, Labels, LayoutConfig, Pt};
use std::io::Write;
use tempfile::NamedTempFile;

fn file_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn partial_configs_keep_the_defaults() {
    let file = file_with(
        r##"{
            "pageSize": "a5",
            "imageCountOfLine": 3,
            "dividerColour": "#FF336699",
            "labels": {"author": "作者：", "noteCount": "共 {count} 条书摘"}
        }"##,
    );
    let config = LayoutConfig::load(file.path()).unwrap();

    assert_eq!(config.page_size(), (Pt(419.0), Pt(595.0)));
    assert_eq!(config.image_count_of_line, 3);
    assert_eq!(config.divider_colour.to_rgb_bytes(), [0x33, 0x66, 0x99]);
    assert_eq!(config.labels.author, "作者：");
    assert_eq!(config.labels.isbn, Labels::english().isbn);
    assert_eq!(config.labels.note_count(2), "共 2 条书摘");
    assert_eq!(config.margin, Pt(10.0));
    assert_eq!(config.line_spacing, 1.6);
}

#[test]
fn impossible_configs_are_rejected() {
    let file = file_with(r#"{"margin": 400}"#);
    let err = LayoutConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ExportError::Config(_)), "{err}");
}

#[test]
fn malformed_configs_are_rejected() {
    let file = file_with(r#"{"dividerColour": "grey"}"#);
    let err = LayoutConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ExportError::Json(_)), "{err}");
}

#[test]
fn books_load_from_disk() {
    let file = file_with(
        r#"{
            "cover": "cover.jpeg",
            "name": "The Little Prince",
            "author": "Antoine de Saint-Exupéry",
            "noteList": [
                {"content": "What is essential is invisible to the eye.", "position": "Chapter 21"},
                {"content": "It is the time you have wasted for your rose.", "idea": "!"}
            ]
        }"#,
    );
    let book = Book::load(file.path()).unwrap();
    assert_eq!(book.notes.len(), 2);
    assert_eq!(book.notes[1].idea, "!");
    assert!(book.notes[1].images.is_empty());
    assert_eq!(book.default_file_name(), "《The Little Prince》.pdf");
}

#[test]
fn missing_books_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = Book::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ExportError::Io(_)));
}
