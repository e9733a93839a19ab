use super::facts::FactTable;
use crate::error::Error;
use crate::ir::{AssignmentStatement, Statement, VariableDeclaration};
use crate::visitor::{Transform, Visit, VisitContext};
use log::debug;
use std::rc::Rc;

/// Removes declarations of and assignments to locals that were never read
/// without a substitution. Runs over one action body with the facts reached
/// at its end.
pub(super) struct EliminateDeadStores<'a> {
    facts: &'a FactTable,
    pub removed_declarations: usize,
    pub removed_assignments: usize,
}

impl<'a> EliminateDeadStores<'a> {
    pub fn new(facts: &'a FactTable) -> Self {
        Self {
            facts,
            removed_declarations: 0,
            removed_assignments: 0,
        }
    }
}

impl Transform for EliminateDeadStores<'_> {
    type State = ();

    fn preorder_variable(
        &mut self,
        _cx: &VisitContext,
        _state: &mut (),
        var: Rc<VariableDeclaration>,
    ) -> Visit<Rc<VariableDeclaration>> {
        let fact = self.facts.get(&var.name).ok_or_else(|| {
            Error::internal(format!("local `{}` missing from the fact table", var.name))
        })?;
        if fact.local && !fact.live {
            debug!("removing dead local {}", var.name);
            self.removed_declarations += 1;
            return Ok(None);
        }
        Ok(Some(var))
    }

    fn postorder_assignment(
        &mut self,
        _cx: &VisitContext,
        _state: &mut (),
        assignment: Rc<AssignmentStatement>,
    ) -> Visit<Statement> {
        if let Some(dest) = assignment.left.as_path() {
            if let Some(fact) = self.facts.get(&dest.name) {
                if fact.local && !fact.live {
                    debug!("removing dead assignment to {}", dest.name);
                    self.removed_assignments += 1;
                    return Ok(None);
                }
            }
        }
        Ok(Some(Statement::Assignment(assignment)))
    }
}

/// Run the sub-pass directly over `body`
#[cfg(test)]
pub(super) fn eliminate(
    facts: &FactTable,
    body: &Rc<crate::ir::BlockStatement>,
) -> crate::error::Result<Rc<crate::ir::BlockStatement>> {
    crate::visitor::apply_block(&mut EliminateDeadStores::new(facts), body, &mut ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::*;

    #[test]
    fn test_dead_local_and_its_stores_are_removed() {
        let mut facts = FactTable::new();
        facts.declare_local("x").unwrap();
        facts.declare_local("y").unwrap().live = true;

        let body = block(vec![
            declare("x", "bit<8>", None),
            declare("y", "bit<8>", None),
            assign(path("x"), constant(1)),
            assign(path("y"), constant(2)),
            if_else(path("c"), assign(path("x"), constant(3)), None),
        ]);
        let result = eliminate(&facts, &body).unwrap();
        assert_eq!(
            result,
            block(vec![
                declare("y", "bit<8>", None),
                assign(path("y"), constant(2)),
                if_else(path("c"), Statement::empty(), None),
            ])
        );
    }

    #[test]
    fn test_non_local_targets_are_kept() {
        let mut facts = FactTable::new();
        facts.entry("meta");
        let body = block(vec![assign(path("meta"), constant(1))]);
        let result = eliminate(&facts, &body).unwrap();
        assert!(Rc::ptr_eq(&result, &body));
    }

    #[test]
    fn test_untracked_declaration_is_internal_error() {
        let facts = FactTable::new();
        let body = block(vec![declare("x", "bit<8>", None)]);
        assert!(eliminate(&facts, &body).unwrap_err().is_internal());
    }
}
