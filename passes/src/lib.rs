//! Module passes over the tessera IR.
//!
//! Passes implement [`ModulePass`]: they take the whole [`Program`] by
//! exclusive reference, restricted to a set of execution threads, and report
//! whether anything changed. Passes that add or remove nodes keep the
//! program's schedule consistent.
//!
//! # Module Organization
//!
//! - [`pass`] - Pass trait and sequential pipelines
//! - [`async_collective`] - Conversion of synchronous collectives into start/done pairs
//!   - Predicate configuration with `TESSERA_*` environment fallbacks
//!   - One rewriter per collective family
//! - [`dce`] - Dead code elimination honoring side effects
//! - [`error`] - Error types and result handling
//!
//! [`Program`]: tessera_ir::Program

pub mod async_collective;
pub mod dce;
pub mod error;
pub mod pass;


pub use async_collective::{AsyncCollectiveConfig, AsyncCollectiveCreator, CollectiveKind, NodePredicate};
pub use dce::DeadCodeElimination;
pub use error::{Error, Result};
pub use pass::{ModulePass, PassPipeline};
