//! Programs: the unit a module pass transforms.

use std::collections::HashSet;

use snafu::OptionExt;

use crate::computation::Computation;
use crate::error::*;
use crate::schedule::Schedule;
use crate::types::ComputationId;

/// Execution threads a pass is restricted to. Empty means every thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionThreads(HashSet<String>);

impl ExecutionThreads {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(threads: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(threads.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, thread: &str) -> bool {
        self.0.is_empty() || self.0.contains(thread)
    }

    pub fn is_all(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordered collection of computations with an optional schedule.
#[derive(Debug, Clone)]
pub struct Program {
    name: String,
    computations: Vec<Computation>,
    entry: Option<ComputationId>,
    schedule: Option<Schedule>,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), computations: Vec::new(), entry: None, schedule: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_computation(&mut self, computation: Computation) -> ComputationId {
        let id = ComputationId(self.computations.len() as u32);
        self.computations.push(computation);
        id
    }

    pub fn add_entry_computation(&mut self, computation: Computation) -> ComputationId {
        let id = self.add_computation(computation);
        self.entry = Some(id);
        id
    }

    pub fn entry(&self) -> Option<ComputationId> {
        self.entry
    }

    pub fn computation(&self, id: ComputationId) -> Result<&Computation> {
        self.computations
            .get(id.index())
            .with_context(|| UnknownComputationSnafu { id, program: self.name.clone() })
    }

    pub fn computation_mut(&mut self, id: ComputationId) -> Result<&mut Computation> {
        let program = &self.name;
        self.computations
            .get_mut(id.index())
            .with_context(|| UnknownComputationSnafu { id, program: program.clone() })
    }

    pub fn computations(&self) -> impl Iterator<Item = (ComputationId, &Computation)> + '_ {
        self.computations.iter().enumerate().map(|(i, computation)| (ComputationId(i as u32), computation))
    }

    pub fn computation_ids(&self) -> Vec<ComputationId> {
        (0..self.computations.len() as u32).map(ComputationId).collect()
    }

    pub fn computation_by_name(&self, name: &str) -> Option<ComputationId> {
        self.computations().find(|(_, computation)| computation.name() == name).map(|(id, _)| id)
    }

    /// Computations that are not fusion bodies and run on one of `threads`.
    pub fn nonfusion_computations(&self, threads: &ExecutionThreads) -> Vec<ComputationId> {
        self.computations()
            .filter(|(_, computation)| !computation.is_fusion() && threads.contains(computation.execution_thread()))
            .map(|(id, _)| id)
            .collect()
    }

    // =========================================================================
    // Schedule
    // =========================================================================

    pub fn has_schedule(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    pub fn schedule_mut(&mut self) -> Option<&mut Schedule> {
        self.schedule.as_mut()
    }

    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.schedule = Some(schedule);
    }

    pub fn clear_schedule(&mut self) -> Option<Schedule> {
        self.schedule.take()
    }

    /// Whether `id` has a sequence in the program's schedule.
    pub fn is_computation_scheduled(&self, id: ComputationId) -> bool {
        self.schedule.as_ref().is_some_and(|schedule| schedule.is_computation_scheduled(id))
    }
}
