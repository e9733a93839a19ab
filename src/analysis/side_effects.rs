use crate::ir::Expression;

/// Check whether evaluating `expr` may have an observable effect.
///
/// Every call is assumed to have side effects; nothing else in an
/// expression does.
pub fn has_side_effects(expr: &Expression) -> bool {
    expr.any(&mut |e| matches!(e, Expression::MethodCall(_)))
}
