//! Data models for Jotter

mod note;

pub use note::{is_valid_title, NewNote, Note, NoteId, NotePatch};
