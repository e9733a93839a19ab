use p4_midend::error::Result;
use p4_midend::ir::builder::*;
use p4_midend::ir::{
    AssignmentStatement, BlockStatement, Expression, IrNode, Node, NodeKind, PathExpression,
    Statement,
};
use p4_midend::visitor::{
    apply_block, apply_program, apply_statement, FlowState, Transform, Visit, VisitContext,
};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Renames one variable and counts how many paths it rewrote
struct Rename {
    from: &'static str,
    to: &'static str,
    renamed: usize,
    dag_once: bool,
}

impl Rename {
    fn new(from: &'static str, to: &'static str) -> Self {
        Rename {
            from,
            to,
            renamed: 0,
            dag_once: true,
        }
    }
}

impl Transform for Rename {
    type State = ();

    fn visit_dag_once(&self) -> bool {
        self.dag_once
    }

    fn postorder_path(
        &mut self,
        _cx: &VisitContext,
        _state: &mut (),
        path: Rc<PathExpression>,
    ) -> Visit<Expression> {
        if path.name == self.from {
            self.renamed += 1;
            return Ok(Some(p4_midend::ir::builder::path(self.to)));
        }
        Ok(Some(Expression::Path(path)))
    }
}

#[test]
fn test_shared_node_visited_once() {
    let shared = add(path("a"), constant(1));
    let body = block(vec![
        assign(path("x"), shared.clone()),
        assign(path("y"), shared.clone()),
    ]);

    let mut rename = Rename::new("a", "b");
    let result = apply_block(&mut rename, &body, &mut ()).unwrap();
    assert_eq!(rename.renamed, 1);

    let first = &result.components[0].as_assignment().unwrap().right;
    let second = &result.components[1].as_assignment().unwrap().right;
    assert_eq!(*first, add(path("b"), constant(1)));
    assert!(first.same_node(second));
}

#[test]
fn test_shared_node_revisited_when_not_dag_once() {
    let shared = add(path("a"), constant(1));
    let body = block(vec![
        assign(path("x"), shared.clone()),
        assign(path("y"), shared),
    ]);

    let mut rename = Rename::new("a", "b");
    rename.dag_once = false;
    let result = apply_block(&mut rename, &body, &mut ()).unwrap();
    assert_eq!(rename.renamed, 2);
    assert_eq!(
        result,
        block(vec![
            assign(path("x"), add(path("b"), constant(1))),
            assign(path("y"), add(path("b"), constant(1))),
        ])
    );
}

#[test]
fn test_substituted_node_is_not_descended() {
    // `a` becomes `a + a`; the new paths must not be renamed again
    struct Expand;

    impl Transform for Expand {
        type State = ();

        fn postorder_path(
            &mut self,
            _cx: &VisitContext,
            _state: &mut (),
            p: Rc<PathExpression>,
        ) -> Visit<Expression> {
            if p.name == "a" {
                return Ok(Some(add(path("a"), path("a"))));
            }
            Ok(Some(Expression::Path(p)))
        }
    }

    let stmt = assign(path("x"), path("a"));
    let result = apply_statement(&mut Expand, &stmt, &mut ()).unwrap();
    assert_eq!(result, Some(assign(path("x"), add(path("a"), path("a")))));
}

/// Deletes every assignment
struct DropAssignments;

impl Transform for DropAssignments {
    type State = ();

    fn postorder_assignment(
        &mut self,
        _cx: &VisitContext,
        _state: &mut (),
        _assignment: Rc<AssignmentStatement>,
    ) -> Visit<Statement> {
        Ok(None)
    }
}

#[test]
fn test_deletion_slot_rules() {
    let body = block(vec![
        assign(path("x"), constant(1)),
        if_else(
            path("c"),
            assign(path("x"), constant(2)),
            Some(assign(path("x"), constant(3))),
        ),
        ret(None),
    ]);
    let result = apply_block(&mut DropAssignments, &body, &mut ()).unwrap();
    assert_eq!(
        result,
        block(vec![
            if_else(path("c"), Statement::empty(), None),
            ret(None),
        ])
    );
}

#[test]
fn test_deleted_body_becomes_empty_block() {
    struct DropBlocks;

    impl Transform for DropBlocks {
        type State = ();

        fn preorder_block(
            &mut self,
            _cx: &VisitContext,
            _state: &mut (),
            _block: Rc<BlockStatement>,
        ) -> Visit<Rc<BlockStatement>> {
            Ok(None)
        }
    }

    let input = program(vec![action(
        "a",
        vec![],
        block(vec![assign(path("x"), constant(1))]),
    )]);
    let result = apply_program(&mut DropBlocks, &input, &mut ()).unwrap();
    assert!(result.find_action("a").unwrap().body.components.is_empty());
}

#[test]
fn test_deleting_required_expression_is_internal_error() {
    struct DropPaths;

    impl Transform for DropPaths {
        type State = ();

        fn postorder_path(
            &mut self,
            _cx: &VisitContext,
            _state: &mut (),
            _path: Rc<PathExpression>,
        ) -> Visit<Expression> {
            Ok(None)
        }
    }

    let err = apply_statement(&mut DropPaths, &assign(path("x"), constant(1)), &mut ())
        .unwrap_err();
    assert!(err.is_internal());

    // Arguments live in a container and are simply erased
    let stmt = call_statement(path_free_call(), vec![], vec![path("a"), constant(2)]);
    let result = apply_statement(&mut DropPaths, &stmt, &mut ()).unwrap();
    assert_eq!(
        result,
        Some(call_statement(path_free_call(), vec![], vec![constant(2)]))
    );
}

fn path_free_call() -> Expression {
    member(constant(0), "apply")
}

#[test]
fn test_preorder_deletion_skips_children() {
    struct DropIfs {
        paths: usize,
    }

    impl Transform for DropIfs {
        type State = ();

        fn preorder_statement(
            &mut self,
            _cx: &VisitContext,
            _state: &mut (),
            stmt: Statement,
        ) -> Visit<Statement> {
            Ok((!stmt.is(NodeKind::If)).then_some(stmt))
        }

        fn postorder_path(
            &mut self,
            _cx: &VisitContext,
            _state: &mut (),
            path: Rc<PathExpression>,
        ) -> Visit<Expression> {
            self.paths += 1;
            Ok(Some(Expression::Path(path)))
        }
    }

    let body = block(vec![
        if_else(path("c"), assign(path("x"), path("y")), None),
        assign(path("z"), constant(1)),
    ]);
    let mut transform = DropIfs { paths: 0 };
    let result = apply_block(&mut transform, &body, &mut ()).unwrap();
    assert_eq!(transform.paths, 1);
    assert_eq!(result, block(vec![assign(path("z"), constant(1))]));
}

/// Names assigned on every path so far
#[derive(Debug, Clone, Default)]
struct Assigned(BTreeSet<String>);

impl FlowState for Assigned {
    fn flow_merge(&mut self, other: Self) -> Result<()> {
        self.0.retain(|name| other.0.contains(name));
        Ok(())
    }
}

struct DefiniteAssignment;

impl Transform for DefiniteAssignment {
    type State = Assigned;

    fn postorder_assignment(
        &mut self,
        _cx: &VisitContext,
        state: &mut Assigned,
        assignment: Rc<AssignmentStatement>,
    ) -> Visit<Statement> {
        if let Some(dest) = assignment.left.as_path() {
            state.0.insert(dest.name.clone());
        }
        Ok(Some(Statement::Assignment(assignment)))
    }
}

fn assigned_after(stmt: Statement) -> Vec<String> {
    let mut state = Assigned::default();
    apply_statement(&mut DefiniteAssignment, &stmt, &mut state).unwrap();
    state.0.into_iter().collect()
}

#[test]
fn test_if_merges_both_arms() {
    let both = if_else(
        path("c"),
        block_statement(vec![assign(path("x"), constant(1)), assign(path("y"), constant(1))]),
        Some(assign(path("x"), constant(2))),
    );
    assert_eq!(assigned_after(both), vec!["x".to_string()]);

    let then_only = if_else(path("c"), assign(path("x"), constant(1)), None);
    assert!(assigned_after(then_only).is_empty());
}

#[test]
fn test_switch_merges_case_bodies() {
    let with_default = switch(
        path("t"),
        vec![
            case(Some(constant(1)), None),
            case(Some(constant(2)), Some(block(vec![assign(path("x"), constant(1))]))),
            case(
                None,
                Some(block(vec![assign(path("x"), constant(2)), assign(path("y"), constant(2))])),
            ),
        ],
    );
    assert_eq!(assigned_after(with_default), vec!["x".to_string()]);

    let without_default = switch(
        path("t"),
        vec![
            case(Some(constant(1)), Some(block(vec![assign(path("x"), constant(1))]))),
            case(Some(constant(2)), Some(block(vec![assign(path("x"), constant(2))]))),
        ],
    );
    assert!(assigned_after(without_default).is_empty());
}

#[test]
fn test_context_sees_original_and_ancestors() {
    #[derive(Default)]
    struct Inspect {
        original_right: Option<Expression>,
        in_action: bool,
        depth: usize,
    }

    impl Transform for Inspect {
        type State = ();

        fn postorder_path(
            &mut self,
            cx: &VisitContext,
            _state: &mut (),
            p: Rc<PathExpression>,
        ) -> Visit<Expression> {
            if p.name == "a" {
                self.in_action = cx.enclosing(NodeKind::Action).is_some();
                self.depth = cx.depth();
                return Ok(Some(constant(9)));
            }
            Ok(Some(Expression::Path(p)))
        }

        fn postorder_assignment(
            &mut self,
            cx: &VisitContext,
            _state: &mut (),
            assignment: Rc<AssignmentStatement>,
        ) -> Visit<Statement> {
            if let Some(Node::Statement(Statement::Assignment(original))) = cx.original() {
                self.original_right = Some(original.right.clone());
            }
            Ok(Some(Statement::Assignment(assignment)))
        }
    }

    let input = program(vec![action(
        "act",
        vec![],
        block(vec![assign(path("x"), path("a"))]),
    )]);
    let mut inspect = Inspect::default();
    let result = apply_program(&mut inspect, &input, &mut ()).unwrap();

    assert!(inspect.in_action);
    // program, action, block, assignment, path
    assert_eq!(inspect.depth, 5);
    assert_eq!(inspect.original_right, Some(path("a")));
    assert_eq!(
        result.find_action("act").unwrap().body,
        block(vec![assign(path("x"), constant(9))])
    );
}
