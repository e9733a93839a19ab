//! Midend passes and the driver that schedules them
//!
//! Each pass consumes a program and returns the rewritten one. A pass that
//! changes nothing hands back the same `Rc`, which is how the driver detects
//! a fixed point.

pub mod local_copyprop;
mod options;

pub use local_copyprop::{CopyPropStats, DoLocalCopyPropagation, LocalCopyPropagation};
pub use options::MidendOptions;

use crate::error::Result;
use crate::ir::Program;
use log::{debug, info};
use std::rc::Rc;

/// Trait for midend passes
pub trait MidendPass {
    /// Get the name of this pass
    fn name(&self) -> &'static str;

    /// Run the pass over the whole program
    fn run(&mut self, program: &Rc<Program>) -> Result<Rc<Program>>;

    /// Check if this pass should run
    fn should_run(&self) -> bool {
        true
    }

    /// Named counters accumulated over every run
    fn statistics(&self) -> Vec<(&'static str, usize)> {
        Vec::new()
    }
}

/// Runs a sequence of passes, optionally until nothing changes
pub struct PassManager {
    passes: Vec<Box<dyn MidendPass>>,
    iterate_to_fixed_point: bool,
    max_iterations: usize,
    iterations: usize,
}

impl PassManager {
    /// An empty manager that runs its passes once
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            iterate_to_fixed_point: false,
            max_iterations: 1,
            iterations: 0,
        }
    }

    /// The standard midend pipeline for `options`
    pub fn from_options(options: &MidendOptions) -> Result<Self> {
        options.validate()?;
        let mut manager = Self::new();
        manager.iterate_to_fixed_point = options.iterate_to_fixed_point;
        manager.max_iterations = options.max_iterations;
        if options.local_copy_propagation {
            let pass = if options.eliminate_dead_stores {
                LocalCopyPropagation::new()
            } else {
                LocalCopyPropagation::without_dead_store_elimination()
            };
            manager.add_pass(Box::new(pass));
        }
        Ok(manager)
    }

    pub fn add_pass(&mut self, pass: Box<dyn MidendPass>) {
        self.passes.push(pass);
    }

    pub fn with_fixed_point(mut self, max_iterations: usize) -> Self {
        self.iterate_to_fixed_point = true;
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn passes(&self) -> impl Iterator<Item = &dyn MidendPass> {
        self.passes.iter().map(|pass| pass.as_ref())
    }

    /// Number of times the pass sequence ran in the last `run`
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn run(&mut self, program: &Rc<Program>) -> Result<Rc<Program>> {
        let rounds = if self.iterate_to_fixed_point {
            self.max_iterations
        } else {
            1
        };

        let mut current = program.clone();
        self.iterations = 0;
        for round in 0..rounds {
            self.iterations += 1;
            let start = current.clone();
            for pass in self.passes.iter_mut().filter(|pass| pass.should_run()) {
                debug!("running {} (round {})", pass.name(), round + 1);
                current = pass.run(&current)?;
            }
            if Rc::ptr_eq(&start, &current) {
                info!("midend converged after {} round(s)", self.iterations);
                return Ok(current);
            }
        }
        if self.iterate_to_fixed_point {
            debug!("midend did not converge within {} rounds", rounds);
        }
        Ok(current)
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}
