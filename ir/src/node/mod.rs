//! Graph nodes.
//!
//! - [`core`] - Node struct and attribute accessors
//! - [`constructors`] - Constructor methods, one per opcode
//! - [`display`] - Single-line rendering

pub mod constructors;
pub mod core;
pub mod display;

pub use core::Node;
