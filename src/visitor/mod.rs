//! Tree transformation engine
//!
//! A [`Transform`] supplies pre-order and post-order hooks per node kind; the
//! walker drives them depth first, splices the returned nodes back into
//! their parents, and rebuilds a parent only when one of its children
//! changed. Analysis state travels explicitly as `Transform::State` and is
//! split and merged at `if` and `switch`.

mod context;
mod transform;
mod walker;

pub use context::VisitContext;
pub use transform::{FlowState, Transform, Visit};
pub use walker::{apply_block, apply_expression, apply_program, apply_statement};
