//! Beatline - Embeddable instruction-stepping engine
//!
//! This crate re-exports all layers of the Beatline system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: beatline_runtime    — Program files, stepping console, CLI
//! Layer 1: beatline_machine    — Instructions, variables, registries, engine
//! Layer 0: beatline_foundation — Core types (Value, Type, Error)
//! ```

pub use beatline_foundation as foundation;
pub use beatline_machine as machine;
pub use beatline_runtime as runtime;
