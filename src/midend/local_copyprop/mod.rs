//! Local copy propagation
//!
//! A single forward walk over each action body. Side-effect free values
//! assigned to variables are remembered and substituted into later reads;
//! the facts are split and merged at `if` and `switch`. When the action is
//! left, locals whose every read was substituted are removed together with
//! their stores. Removing a store can leave another local unread, so the body
//! is re-analysed and pruned again until nothing more is removed.
//!
//! The analysis never revisits a statement, so it assumes action bodies have
//! no backward control transfer.

mod elim_dead;
mod facts;

pub use facts::{CopyPropState, FactTable, VariableFact};

use self::elim_dead::EliminateDeadStores;
use super::MidendPass;
use crate::analysis::has_side_effects;
use crate::error::{Error, Result};
use crate::ir::{
    Action, AssignmentStatement, Expression, MethodCallExpression, Node, NodeKind,
    PathExpression, Primitive, Program, Statement, VariableDeclaration,
};
use crate::visitor::{apply_block, apply_program, Transform, Visit, VisitContext};
use log::{debug, info, trace};
use std::fmt;
use std::ops::AddAssign;
use std::rc::Rc;

/// Counters collected by a copy propagation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyPropStats {
    /// Reads replaced by a known value
    pub propagated: usize,
    /// `x = x` statements removed
    pub noop_assignments: usize,
    pub dead_declarations: usize,
    pub dead_assignments: usize,
}

impl AddAssign for CopyPropStats {
    fn add_assign(&mut self, other: Self) {
        self.propagated += other.propagated;
        self.noop_assignments += other.noop_assignments;
        self.dead_declarations += other.dead_declarations;
        self.dead_assignments += other.dead_assignments;
    }
}

impl fmt::Display for CopyPropStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} propagated, {} no-op assignments, {} dead declarations, {} dead assignments",
            self.propagated, self.noop_assignments, self.dead_declarations, self.dead_assignments
        )
    }
}

/// The copy propagation transform itself. Use [`LocalCopyPropagation`] to
/// run it as a pass.
pub struct DoLocalCopyPropagation {
    eliminate_dead_stores: bool,
    stats: CopyPropStats,
}

impl DoLocalCopyPropagation {
    pub fn new(eliminate_dead_stores: bool) -> Self {
        Self {
            eliminate_dead_stores,
            stats: CopyPropStats::default(),
        }
    }

    pub fn stats(&self) -> CopyPropStats {
        self.stats
    }

    fn is_self_assignment(cx: &VisitContext, assignment: &AssignmentStatement) -> bool {
        if assignment.left == assignment.right {
            return true;
        }
        match cx.original() {
            Some(Node::Statement(Statement::Assignment(original))) => {
                original.left == original.right
            }
            _ => false,
        }
    }
}

impl Transform for DoLocalCopyPropagation {
    type State = CopyPropState;

    /// Shared nodes must be seen again in every flow context
    fn visit_dag_once(&self) -> bool {
        false
    }

    fn preorder_action(
        &mut self,
        _cx: &VisitContext,
        state: &mut CopyPropState,
        action: Rc<Action>,
    ) -> Visit<Rc<Action>> {
        if state.in_action || !state.available.is_empty() {
            return Err(Error::internal(format!(
                "fact table not reset on entry to action `{}`",
                action.name
            )));
        }
        state.in_action = true;
        debug!("local copy propagation working on action {}", action.name);
        Ok(Some(action))
    }

    fn postorder_action(
        &mut self,
        _cx: &VisitContext,
        state: &mut CopyPropState,
        action: Rc<Action>,
    ) -> Visit<Rc<Action>> {
        let mut action = action;
        if self.eliminate_dead_stores {
            let mut facts = std::mem::take(&mut state.available);
            let mut body = action.body.clone();
            loop {
                let mut dead = EliminateDeadStores::new(&facts);
                let pruned = apply_block(&mut dead, &body, &mut ())?;
                self.stats.dead_declarations += dead.removed_declarations;
                self.stats.dead_assignments += dead.removed_assignments;
                if Rc::ptr_eq(&pruned, &body) {
                    break;
                }
                // A removed store may have held the only read of another local
                trace!("re-analysing action {} after removing dead stores", action.name);
                let mut rerun = CopyPropState {
                    in_action: true,
                    available: FactTable::new(),
                };
                body = apply_block(&mut *self, &pruned, &mut rerun)?;
                facts = rerun.available;
            }
            if !Rc::ptr_eq(&body, &action.body) {
                action = Rc::new(Action {
                    name: action.name.clone(),
                    parameters: action.parameters.clone(),
                    body,
                });
            }
        }
        state.in_action = false;
        state.available.clear();
        trace!("finished action:\n{}", action);
        Ok(Some(action))
    }

    fn postorder_variable(
        &mut self,
        _cx: &VisitContext,
        state: &mut CopyPropState,
        var: Rc<VariableDeclaration>,
    ) -> Visit<Rc<VariableDeclaration>> {
        if !state.in_action {
            return Ok(Some(var));
        }
        let fact = state.available.declare_local(&var.name)?;
        if let Some(init) = &var.initializer {
            if has_side_effects(init) {
                fact.live = true;
            } else {
                trace!("saving initial value of {}", var.name);
                fact.value = Some(init.clone());
            }
        }
        Ok(Some(var))
    }

    fn postorder_path(
        &mut self,
        cx: &VisitContext,
        state: &mut CopyPropState,
        path: Rc<PathExpression>,
    ) -> Visit<Expression> {
        if !state.in_action {
            return Ok(Some(Expression::Path(path)));
        }
        if cx.is_write() {
            // Only a whole assignment target leaves the old storage unused.
            // Out arguments and partial writes still name the variable, so
            // its declaration has to survive dead-store elimination.
            if cx.parent_kind() != Some(NodeKind::Assignment) {
                state.available.mark_live(&path.name);
            }
            return Ok(Some(Expression::Path(path)));
        }
        if let Some(value) = state.available.value(&path.name) {
            trace!("propagating {} for {}", value, path.name);
            self.stats.propagated += 1;
            return Ok(Some(value.clone()));
        }
        trace!("using {} with no propagated value", path.name);
        state.available.mark_live(&path.name);
        Ok(Some(Expression::Path(path)))
    }

    fn postorder_assignment(
        &mut self,
        cx: &VisitContext,
        state: &mut CopyPropState,
        assignment: Rc<AssignmentStatement>,
    ) -> Visit<Statement> {
        if Self::is_self_assignment(cx, &assignment) {
            debug!(
                "removing no-op assignment {} = {}",
                assignment.left, assignment.right
            );
            self.stats.noop_assignments += 1;
            return Ok(None);
        }
        if !state.in_action {
            return Ok(Some(Statement::Assignment(assignment)));
        }

        match assignment.left.as_path() {
            Some(dest) => {
                state.available.drop_values_using(&dest.name);
                if has_side_effects(&assignment.right) {
                    state.available.mark_live(&dest.name);
                } else if !assignment.right.is_list() {
                    trace!("saving value of {}", dest.name);
                    state.available.entry(&dest.name).value = Some(assignment.right.clone());
                }
            }
            None => {
                if let Some(root) = assignment.left.lvalue_root() {
                    state.available.drop_values_using(root);
                }
            }
        }
        Ok(Some(Statement::Assignment(assignment)))
    }

    fn postorder_method_call(
        &mut self,
        _cx: &VisitContext,
        state: &mut CopyPropState,
        call: Rc<MethodCallExpression>,
    ) -> Visit<Expression> {
        if !state.in_action {
            return Ok(Some(Expression::MethodCall(call)));
        }
        for (index, param) in call.method_type.parameters.iter().enumerate() {
            if !param.direction.is_output() {
                continue;
            }
            let argument = call.arguments.get(index).ok_or_else(|| {
                Error::internal(format!(
                    "no argument for {} parameter `{}` of `{}`",
                    param.direction.keyword().unwrap_or_default(),
                    param.name,
                    call.method
                ))
            })?;
            if let Some(root) = argument.lvalue_root() {
                state.available.drop_values_using(root);
            }
        }
        Ok(Some(Expression::MethodCall(call)))
    }

    fn postorder_primitive(
        &mut self,
        _cx: &VisitContext,
        state: &mut CopyPropState,
        primitive: Rc<Primitive>,
    ) -> Visit<Statement> {
        if state.in_action {
            for (index, operand) in primitive.operands.iter().enumerate() {
                if !primitive.is_output(index) {
                    continue;
                }
                if let Some(root) = operand.lvalue_root() {
                    state.available.drop_values_using(root);
                }
            }
        }
        Ok(Some(Statement::Primitive(primitive)))
    }
}

/// Local copy propagation with dead-store elimination, as a midend pass
pub struct LocalCopyPropagation {
    eliminate_dead_stores: bool,
    stats: CopyPropStats,
}

impl LocalCopyPropagation {
    pub fn new() -> Self {
        Self {
            eliminate_dead_stores: true,
            stats: CopyPropStats::default(),
        }
    }

    /// Keep dead locals and stores in place, only propagate
    pub fn without_dead_store_elimination() -> Self {
        Self {
            eliminate_dead_stores: false,
            ..Self::new()
        }
    }

    /// Totals over every run of this pass
    pub fn stats(&self) -> CopyPropStats {
        self.stats
    }
}

impl Default for LocalCopyPropagation {
    fn default() -> Self {
        Self::new()
    }
}

impl MidendPass for LocalCopyPropagation {
    fn name(&self) -> &'static str {
        "LocalCopyPropagation"
    }

    fn run(&mut self, program: &Rc<Program>) -> Result<Rc<Program>> {
        let mut transform = DoLocalCopyPropagation::new(self.eliminate_dead_stores);
        let mut state = CopyPropState::default();
        let result = apply_program(&mut transform, program, &mut state)?;
        if state.in_action || !state.available.is_empty() {
            return Err(Error::internal("fact table left open after the program walk"));
        }

        let stats = transform.stats();
        info!("{}: {}", self.name(), stats);
        self.stats += stats;
        Ok(result)
    }

    fn statistics(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("propagated", self.stats.propagated),
            ("noop_assignments", self.stats.noop_assignments),
            ("dead_declarations", self.stats.dead_declarations),
            ("dead_assignments", self.stats.dead_assignments),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::*;
    use crate::ir::Direction;
    use crate::visitor::apply_statement;

    fn run_on_body(body: Vec<Statement>) -> (Rc<crate::ir::BlockStatement>, CopyPropStats) {
        let program = program(vec![action("a", vec![], block(body))]);
        let mut transform = DoLocalCopyPropagation::new(true);
        let mut state = CopyPropState::default();
        let result = apply_program(&mut transform, &program, &mut state).unwrap();
        let body = result.find_action("a").unwrap().body.clone();
        (body, transform.stats())
    }

    #[test]
    fn test_value_is_propagated_and_store_removed() {
        let (body, stats) = run_on_body(vec![
            declare("x", "bit<8>", None),
            assign(path("x"), constant(3)),
            assign(path("out"), add(path("x"), constant(1))),
        ]);
        assert_eq!(
            body,
            block(vec![assign(path("out"), add(constant(3), constant(1)))])
        );
        assert_eq!(stats.propagated, 1);
        assert_eq!(stats.dead_declarations, 1);
        assert_eq!(stats.dead_assignments, 1);
    }

    #[test]
    fn test_self_assignment_outside_action() {
        let mut transform = DoLocalCopyPropagation::new(true);
        let mut state = CopyPropState::default();
        let stmt = assign(member(path("hdr"), "f"), member(path("hdr"), "f"));
        let result = apply_statement(&mut transform, &stmt, &mut state).unwrap();
        assert!(result.is_none());
        assert_eq!(transform.stats().noop_assignments, 1);
    }

    #[test]
    fn test_side_effecting_source_keeps_store() {
        let read = call(member(path("r"), "read"), vec![], vec![]);
        let (body, _) = run_on_body(vec![
            declare("x", "bit<8>", None),
            assign(path("x"), read.clone()),
        ]);
        assert_eq!(
            body,
            block(vec![declare("x", "bit<8>", None), assign(path("x"), read)])
        );
    }

    #[test]
    fn test_out_argument_keeps_local() {
        let (body, _) = run_on_body(vec![
            declare("z", "bit<8>", None),
            call_statement(
                path("f"),
                vec![param("v", Direction::Out, "bit<8>")],
                vec![path("z")],
            ),
        ]);
        assert_eq!(body.components.len(), 2);
    }

    #[test]
    fn test_nested_action_state_is_internal_error() {
        let mut transform = DoLocalCopyPropagation::new(true);
        let mut state = CopyPropState {
            in_action: true,
            available: FactTable::new(),
        };
        let program = program(vec![action("a", vec![], block(vec![]))]);
        let err = apply_program(&mut transform, &program, &mut state).unwrap_err();
        assert!(err.is_internal());
    }
}
