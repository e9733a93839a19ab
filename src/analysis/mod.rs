//! Read-only queries over IR expressions
//!
//! These predicates are consumed by the midend passes to decide whether an
//! expression may be duplicated or dropped, and whether a cached value is
//! invalidated by a write.

mod expr_uses;
mod side_effects;

pub use expr_uses::expr_uses;
pub use side_effects::has_side_effects;
