use super::VisitContext;
use crate::error::Result;
use crate::ir::{
    Action, AssignmentStatement, BlockStatement, Control, Expression, IfStatement,
    MethodCallExpression, MethodCallStatement, PathExpression, Primitive, Statement,
    SwitchStatement, VariableDeclaration,
};
use std::rc::Rc;

/// Outcome of a callback: the node to keep in the slot, or `None` to delete it
pub type Visit<T> = Result<Option<T>>;

/// Analysis state carried along control flow.
///
/// At a branch the walker clones the state once per path and folds the path
/// states back together with `flow_merge` before visiting the next node.
pub trait FlowState: Clone {
    /// Fold the state reached along another path into `self`
    fn flow_merge(&mut self, other: Self) -> Result<()>;
}

impl FlowState for () {
    fn flow_merge(&mut self, _other: Self) -> Result<()> {
        Ok(())
    }
}

/// Pre-order / post-order rewriting of the IR.
///
/// Every hook receives the node and returns what should take its place.
/// Pre-order hooks returning `None` delete the node without visiting its
/// children. Post-order hooks see the node with its children already
/// transformed. Kind-specific post-order hooks default to the hook of their
/// category (`postorder_assignment` forwards to `postorder_statement`), and
/// category hooks default to keeping the node.
#[allow(unused_variables)]
pub trait Transform {
    type State: FlowState;

    /// Whether a node shared by several parents is transformed only once,
    /// with the result reused at every other occurrence. Flow-sensitive
    /// transforms must see shared nodes again in each flow context.
    fn visit_dag_once(&self) -> bool {
        true
    }

    fn preorder_control(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        control: Rc<Control>,
    ) -> Visit<Rc<Control>> {
        Ok(Some(control))
    }

    fn postorder_control(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        control: Rc<Control>,
    ) -> Visit<Rc<Control>> {
        Ok(Some(control))
    }

    fn preorder_action(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        action: Rc<Action>,
    ) -> Visit<Rc<Action>> {
        Ok(Some(action))
    }

    fn postorder_action(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        action: Rc<Action>,
    ) -> Visit<Rc<Action>> {
        Ok(Some(action))
    }

    fn preorder_variable(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        var: Rc<VariableDeclaration>,
    ) -> Visit<Rc<VariableDeclaration>> {
        Ok(Some(var))
    }

    fn postorder_variable(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        var: Rc<VariableDeclaration>,
    ) -> Visit<Rc<VariableDeclaration>> {
        Ok(Some(var))
    }

    fn preorder_block(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        block: Rc<BlockStatement>,
    ) -> Visit<Rc<BlockStatement>> {
        Ok(Some(block))
    }

    fn postorder_block(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        block: Rc<BlockStatement>,
    ) -> Visit<Rc<BlockStatement>> {
        Ok(Some(block))
    }

    /// Pre-order hook for statements other than blocks and declarations
    fn preorder_statement(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        stmt: Statement,
    ) -> Visit<Statement> {
        Ok(Some(stmt))
    }

    fn postorder_statement(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        stmt: Statement,
    ) -> Visit<Statement> {
        Ok(Some(stmt))
    }

    fn postorder_assignment(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        assignment: Rc<AssignmentStatement>,
    ) -> Visit<Statement> {
        self.postorder_statement(cx, state, Statement::Assignment(assignment))
    }

    fn postorder_method_call_statement(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        stmt: Rc<MethodCallStatement>,
    ) -> Visit<Statement> {
        self.postorder_statement(cx, state, Statement::MethodCall(stmt))
    }

    fn postorder_primitive(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        primitive: Rc<Primitive>,
    ) -> Visit<Statement> {
        self.postorder_statement(cx, state, Statement::Primitive(primitive))
    }

    fn postorder_if(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        stmt: Rc<IfStatement>,
    ) -> Visit<Statement> {
        self.postorder_statement(cx, state, Statement::If(stmt))
    }

    fn postorder_switch(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        stmt: Rc<SwitchStatement>,
    ) -> Visit<Statement> {
        self.postorder_statement(cx, state, Statement::Switch(stmt))
    }

    fn preorder_expression(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        expr: Expression,
    ) -> Visit<Expression> {
        Ok(Some(expr))
    }

    fn postorder_expression(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        expr: Expression,
    ) -> Visit<Expression> {
        Ok(Some(expr))
    }

    fn postorder_path(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        path: Rc<PathExpression>,
    ) -> Visit<Expression> {
        self.postorder_expression(cx, state, Expression::Path(path))
    }

    fn postorder_method_call(
        &mut self,
        cx: &VisitContext,
        state: &mut Self::State,
        call: Rc<MethodCallExpression>,
    ) -> Visit<Expression> {
        self.postorder_expression(cx, state, Expression::MethodCall(call))
    }
}
