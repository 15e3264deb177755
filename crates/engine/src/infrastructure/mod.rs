//! Infrastructure implementations.
//!
//! Contains port trait implementations for the dev binary and tests. The
//! host application supplies its own adapters for the same ports.

pub mod clock;
pub mod console;
pub mod formula_scan;
pub mod memory;
pub mod ports;
pub mod settings;
