//! p4-midend: flow-sensitive IR transformations for a P4 compiler middle end
//!
//! This library provides the IR tree, a generic transformation engine over
//! it, and local copy propagation with dead-store elimination built on that
//! engine.

pub mod analysis;
pub mod cli;
pub mod error;
pub mod ir;
pub mod midend;
pub mod visitor;

pub use error::{Error as MidendError, Result as MidendResult};

// Re-export commonly used types
pub use ir::{Expression, Program, Statement};
pub use midend::{LocalCopyPropagation, MidendOptions, MidendPass, PassManager};
pub use visitor::{FlowState, Transform, VisitContext};
