//! Pass trait and sequential pipelines.

use tessera_ir::{ExecutionThreads, Program};

use crate::error::Result;

/// Transformation over a whole program.
pub trait ModulePass {
    /// Stable name used in logs.
    fn name(&self) -> &str;

    /// Run over the computations of `program` that execute on `threads`.
    ///
    /// Returns whether the program changed.
    ///
    /// # Errors
    /// Returns error if the pass could not complete. Computations processed
    /// before the failure stay rewritten.
    fn run(&self, program: &mut Program, threads: &ExecutionThreads) -> Result<bool>;
}

/// Ordered list of passes run one after another.
///
/// A pipeline is itself a [`ModulePass`], so pipelines nest.
pub struct PassPipeline {
    name: String,
    passes: Vec<Box<dyn ModulePass>>,
}

impl PassPipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), passes: Vec::new() }
    }

    pub fn add_pass(&mut self, pass: impl ModulePass + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn with_pass(mut self, pass: impl ModulePass + 'static) -> Self {
        self.add_pass(pass);
        self
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|pass| pass.name())
    }
}

impl ModulePass for PassPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip_all, fields(pipeline = %self.name, program = program.name()))]
    fn run(&self, program: &mut Program, threads: &ExecutionThreads) -> Result<bool> {
        let mut changed = false;
        for pass in &self.passes {
            let pass_changed = pass.run(program, threads)?;
            tracing::debug!(pass = pass.name(), changed = pass_changed, "pass finished");
            changed |= pass_changed;
        }
        Ok(changed)
    }
}
