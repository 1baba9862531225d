//! Program files, stepping console, and CLI for Beatline.
//!
//! This crate provides:
//! - [`Console`] - Interactive stepping console over an engine
//! - [`LineEditor`] - Line editing abstraction with a rustyline backend
//! - Program serialization to and from `MessagePack` files
//! - The `beatline` command-line binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod console;
mod editor;
mod program_file;

pub use console::{COMMANDS, Console, Reply, Transcript, install_demo_components};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use program_file::{from_bytes, load_from_file, save_to_file, to_bytes};
