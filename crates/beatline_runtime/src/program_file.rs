//! Program encoding and decoding using `MessagePack`.
//!
//! Only the instruction sequence is stored. Variables, stacks, and
//! registrations belong to a running engine and are never written out.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use beatline_foundation::{Error, ErrorKind, Result};
use beatline_machine::Program;
use tracing::debug;

/// Serializes a program to bytes using `MessagePack` format.
///
/// Uses named serialization so instruction fields survive reordering.
///
/// # Errors
///
/// Returns an error if an operand holds a value that cannot be serialized,
/// such as an opaque host value.
pub fn to_bytes(program: &Program) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(program)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Deserializes a program from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid encoded program.
pub fn from_bytes(bytes: &[u8]) -> Result<Program> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Saves a program to a file, creating or truncating it.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to,
/// or if serialization fails.
pub fn save_to_file<P: AsRef<Path>>(program: &Program, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(program)?;

    let file = File::create(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to create file '{}': {e}",
            path.display()
        )))
    })?;

    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to write to file '{}': {e}",
            path.display()
        )))
    })?;
    writer.flush().map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to flush file '{}': {e}",
            path.display()
        )))
    })?;

    debug!(path = %path.display(), instructions = program.len(), "program saved");
    Ok(())
}

/// Loads a program from a `MessagePack` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Program> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to open file '{}': {e}",
            path.display()
        )))
    })?;

    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to read file '{}': {e}",
            path.display()
        )))
    })?;

    let program = from_bytes(&bytes)?;
    debug!(path = %path.display(), instructions = program.len(), "program loaded");
    Ok(program)
}
