//! jotter-core - Core library for Jotter
//!
//! This crate contains the note model, the backend boundary (hosted Supabase
//! project or an in-memory stand-in), navigation, and the headless screen
//! controllers that front-ends drive.

pub mod auth;
pub mod backend;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod screens;
pub mod util;

pub use error::{Error, Result};
pub use models::{Note, NoteId};
