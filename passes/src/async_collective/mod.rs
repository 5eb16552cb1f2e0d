//! Conversion of synchronous collectives into asynchronous start/done pairs.
//!
//! For every non-fusion computation on the requested threads the pass
//! snapshots the collectives accepted by their family predicate, rewrites
//! each one, and if the computation is scheduled replaces each rewritten
//! entry of its sequence with the nodes that took its place.
//!
//! - `all-reduce` becomes `all-reduce-start` (same shape) and `all-reduce-done`.
//! - `all-gather` becomes `all-gather-start` with shape `(operands, output)`
//!   and `all-gather-done`.
//! - `collective-permute` becomes `collective-permute-start` with shape
//!   `(input, output, u32[], u32[])`, completed by `collective-permute-done`
//!   or, when send and receive are tracked separately, by the side-effecting
//!   `$cp_recv_done` and `$cp_send_done` custom calls.
//! - `all-to-all` is wrapped in a generic `all-to-all-start` / `all-to-all-done` pair.
//!
//! # Module Organization
//!
//! - [`config`] - Family predicates, builder and environment fallbacks
//! - [`rewrite`] - One [`AsyncRewriter`](rewrite::AsyncRewriter) per family
//! - [`schedule`] - Sequence splicing for scheduled computations

pub mod config;
pub mod rewrite;
pub mod schedule;

mod select;

use std::collections::HashMap;

use snafu::ResultExt;
use tessera_ir::{ComputationId, ExecutionThreads, NodeId, Program};

pub use config::{AsyncCollectiveConfig, CollectiveKind, NodePredicate, always, never, predicate};
pub use schedule::ReplacedAsync;

use crate::error::*;
use crate::pass::ModulePass;
use schedule::splice_sequence;
use select::select_candidates;

/// Module pass converting synchronous collectives into start/done pairs.
#[derive(Debug, Clone, Default)]
pub struct AsyncCollectiveCreator {
    config: AsyncCollectiveConfig,
}

impl AsyncCollectiveCreator {
    pub fn new(config: AsyncCollectiveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AsyncCollectiveConfig {
        &self.config
    }

    fn run_on_computation(&self, program: &mut Program, id: ComputationId) -> Result<bool> {
        let should_update_schedule = program.is_computation_scheduled(id);
        let computation =
            program.computation_mut(id).context(IrSnafu { context: format!("rewriting collectives of {id}") })?;
        let candidates = select_candidates(computation, &self.config);
        if candidates.is_empty() {
            return Ok(false);
        }

        let mut replaced: HashMap<NodeId, ReplacedAsync> = HashMap::with_capacity(candidates.len());
        for candidate in candidates {
            let pair = candidate.kind.rewriter().rewrite(computation, candidate.id, &self.config)?;
            tracing::debug!(
                computation = computation.name(),
                kind = %candidate.kind,
                node = %candidate.id,
                start = %pair.start,
                done = %pair.done,
                "converted collective"
            );
            if should_update_schedule {
                replaced.insert(candidate.id, pair);
            }
        }
        tracing::trace!(computation.tree = %computation.tree(), "rewritten computation");

        if should_update_schedule
            && let Some(schedule) = program.schedule_mut()
            && let Some(sequence) = schedule.sequence(id)
        {
            let spliced = splice_sequence(sequence, &replaced);
            tracing::trace!(computation = %id, before = sequence.len(), after = spliced.len(), "spliced schedule");
            schedule.set_sequence(id, spliced);
        }
        Ok(true)
    }
}

impl ModulePass for AsyncCollectiveCreator {
    fn name(&self) -> &str {
        "async-collective-creator"
    }

    #[tracing::instrument(skip_all, fields(program = program.name()))]
    fn run(&self, program: &mut Program, threads: &ExecutionThreads) -> Result<bool> {
        let mut changed = false;
        for id in program.nonfusion_computations(threads) {
            changed |= self.run_on_computation(program, id)?;
        }
        tracing::debug!(changed, "async collective creation finished");
        Ok(changed)
    }
}
