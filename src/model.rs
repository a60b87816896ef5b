//! The book being exported: metadata plus the notes taken on it.
//!
//! Books are usually read from JSON; both the field names below and the camel-cased names
//! used by reading apps (`pubDate`, `noteList`, `image`) are accepted.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Path of the cover image, resolved by the image source
    #[serde(default)]
    pub cover: PathBuf,
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub translator: String,
    #[serde(default)]
    pub press: String,
    #[serde(default)]
    pub pub_date: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default, alias = "noteList")]
    pub notes: Vec<Note>,
}

impl Book {
    /// Read a book from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Book> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// The file name the exported notes are saved under by default
    pub fn default_file_name(&self) -> String {
        format!("《{}》.pdf", self.name)
    }
}

/// One excerpt from the book
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub content: String,
    /// The reader's own thoughts on the excerpt
    #[serde(default)]
    pub idea: String,
    #[serde(default)]
    pub images: Vec<NoteImage>,
    /// Where in the book the excerpt is from, e.g. a date and chapter
    #[serde(default)]
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteImage {
    #[serde(alias = "image")]
    pub path: PathBuf,
}

impl<P: Into<PathBuf>> From<P> for NoteImage {
    fn from(path: P) -> NoteImage {
        NoteImage { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reading_app_field_names() {
        let book: Book = serde_json::from_str(
            r#"{
                "cover": "小王子.jpeg",
                "name": "小王子",
                "author": "安东尼·德·圣-埃克苏佩里",
                "pubDate": "2017-3-1",
                "noteList": [
                    {"content": "c", "images": [{"image": "测试8.jpeg"}], "position": "Chapter 05"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(book.pub_date, "2017-3-1");
        assert_eq!(book.translator, "");
        assert_eq!(book.notes.len(), 1);
        assert_eq!(book.notes[0].idea, "");
        assert_eq!(book.notes[0].images[0].path, PathBuf::from("测试8.jpeg"));
        assert_eq!(book.default_file_name(), "《小王子》.pdf");
    }

    #[test]
    fn a_name_is_required() {
        assert!(serde_json::from_str::<Book>(r#"{"author": "x"}"#).is_err());
    }
}
