use super::{FlowState, Transform, VisitContext};
use crate::error::{Error, Result};
use crate::ir::{
    Access, Action, ArrayIndex, AssignmentStatement, BinaryExpression, BlockStatement, Control,
    Declaration, Direction, Expression, IfStatement, IrNode, ListExpression, Member,
    MethodCallExpression, MethodCallStatement, Mux, Node, NodeId, Primitive, Program,
    ReturnStatement, Slice, Statement, SwitchCase, SwitchStatement, UnaryExpression,
    VariableDeclaration,
};
use log::trace;
use std::collections::HashMap;
use std::rc::Rc;

/// Run `transform` over a whole program
pub fn apply_program<T: Transform>(
    transform: &mut T,
    program: &Rc<Program>,
    state: &mut T::State,
) -> Result<Rc<Program>> {
    Walker::new(transform).program(program, state)
}

/// Run `transform` over a block; a deleted block comes back empty
pub fn apply_block<T: Transform>(
    transform: &mut T,
    block: &Rc<BlockStatement>,
    state: &mut T::State,
) -> Result<Rc<BlockStatement>> {
    Walker::new(transform).required_block(block, state)
}

pub fn apply_statement<T: Transform>(
    transform: &mut T,
    stmt: &Statement,
    state: &mut T::State,
) -> Result<Option<Statement>> {
    Walker::new(transform).statement(stmt, state)
}

/// Run `transform` over an expression in read position
pub fn apply_expression<T: Transform>(
    transform: &mut T,
    expr: &Expression,
    state: &mut T::State,
) -> Result<Option<Expression>> {
    Walker::new(transform).expression(expr, Access::Read, state)
}

/// Node handles the walker can memoize
trait Visited: Clone {
    fn id(&self) -> NodeId;
    fn into_node(self) -> Node;
    fn from_node(node: &Node) -> Option<Self>;
}

impl Visited for Statement {
    fn id(&self) -> NodeId {
        self.node_id()
    }

    fn into_node(self) -> Node {
        Node::Statement(self)
    }

    fn from_node(node: &Node) -> Option<Self> {
        node.as_statement().cloned()
    }
}

impl Visited for Expression {
    fn id(&self) -> NodeId {
        self.node_id()
    }

    fn into_node(self) -> Node {
        Node::Expression(self)
    }

    fn from_node(node: &Node) -> Option<Self> {
        node.as_expression().cloned()
    }
}

impl Visited for Rc<BlockStatement> {
    fn id(&self) -> NodeId {
        NodeId::of(self)
    }

    fn into_node(self) -> Node {
        Node::Statement(Statement::Block(self))
    }

    fn from_node(node: &Node) -> Option<Self> {
        node.as_statement()?.as_block().cloned()
    }
}

impl Visited for Rc<VariableDeclaration> {
    fn id(&self) -> NodeId {
        NodeId::of(self)
    }

    fn into_node(self) -> Node {
        Node::Statement(Statement::Declaration(self))
    }

    fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Statement(Statement::Declaration(var))
            | Node::Declaration(Declaration::Variable(var)) => Some(var.clone()),
            _ => None,
        }
    }
}

impl Visited for Rc<Action> {
    fn id(&self) -> NodeId {
        NodeId::of(self)
    }

    fn into_node(self) -> Node {
        Node::Declaration(Declaration::Action(self))
    }

    fn from_node(node: &Node) -> Option<Self> {
        match node.as_declaration()? {
            Declaration::Action(action) => Some(action.clone()),
            _ => None,
        }
    }
}

impl Visited for Rc<Control> {
    fn id(&self) -> NodeId {
        NodeId::of(self)
    }

    fn into_node(self) -> Node {
        Node::Declaration(Declaration::Control(self))
    }

    fn from_node(node: &Node) -> Option<Self> {
        match node.as_declaration()? {
            Declaration::Control(control) => Some(control.clone()),
            _ => None,
        }
    }
}

/// A finished visit. Holding the original keeps its address from being
/// reused by a node allocated later in the same walk.
struct Memo {
    #[allow(dead_code)]
    original: Node,
    result: Option<Node>,
}

fn same_optional<N: IrNode>(a: &Option<N>, b: &Option<N>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_node(b),
        (None, None) => true,
        _ => false,
    }
}

fn argument_access(direction: Option<Direction>) -> Access {
    match direction {
        Some(Direction::Out) => Access::Write,
        Some(Direction::InOut) => Access::ReadWrite,
        _ => Access::Read,
    }
}

struct Walker<'a, T: Transform> {
    transform: &'a mut T,
    cx: VisitContext,
    dag_once: bool,
    memo: HashMap<NodeId, Memo>,
}

impl<'a, T: Transform> Walker<'a, T> {
    fn new(transform: &'a mut T) -> Self {
        let dag_once = transform.visit_dag_once();
        Walker {
            transform,
            cx: VisitContext::new(),
            dag_once,
            memo: HashMap::new(),
        }
    }

    fn memoized<N, F>(&mut self, node: &N, state: &mut T::State, walk: F) -> Result<Option<N>>
    where
        N: Visited,
        F: FnOnce(&mut Self, &mut T::State) -> Result<Option<N>>,
    {
        if !self.dag_once {
            return walk(self, state);
        }

        let id = node.id();
        if let Some(memo) = self.memo.get(&id) {
            trace!("reusing visit result for {:?}", id);
            match &memo.result {
                None => return Ok(None),
                Some(result) => {
                    if let Some(result) = N::from_node(result) {
                        return Ok(Some(result));
                    }
                }
            }
        }

        let result = walk(self, state)?;
        if let Some(replacement) = &result {
            let replacement_id = replacement.id();
            if replacement_id != id {
                self.memo.entry(replacement_id).or_insert_with(|| Memo {
                    original: replacement.clone().into_node(),
                    result: Some(replacement.clone().into_node()),
                });
            }
        }
        self.memo.insert(
            id,
            Memo {
                original: node.clone().into_node(),
                result: result.clone().map(Visited::into_node),
            },
        );
        Ok(result)
    }

    fn program(&mut self, program: &Rc<Program>, state: &mut T::State) -> Result<Rc<Program>> {
        self.cx.enter(Node::Program(program.clone()), Access::Read);
        let declarations = program
            .declarations
            .visit_each(|_, decl| self.declaration(decl, state));
        self.cx.leave();

        Ok(match declarations? {
            Some(declarations) => Rc::new(Program { declarations }),
            None => program.clone(),
        })
    }

    fn declaration(&mut self, decl: &Declaration, state: &mut T::State) -> Result<Option<Declaration>> {
        Ok(match decl {
            Declaration::Variable(var) => self.variable(var, state)?.map(Declaration::Variable),
            Declaration::Action(action) => self.action(action, state)?.map(Declaration::Action),
            Declaration::Control(control) => {
                self.control(control, state)?.map(Declaration::Control)
            }
        })
    }

    fn control(&mut self, control: &Rc<Control>, state: &mut T::State) -> Result<Option<Rc<Control>>> {
        self.memoized(control, state, |w, state| {
            w.cx.enter(
                Node::Declaration(Declaration::Control(control.clone())),
                Access::Read,
            );
            let result = w.visit_control(control, state);
            w.cx.leave();
            result
        })
    }

    fn visit_control(
        &mut self,
        original: &Rc<Control>,
        state: &mut T::State,
    ) -> Result<Option<Rc<Control>>> {
        let control = match self
            .transform
            .preorder_control(&self.cx, state, original.clone())?
        {
            Some(control) if Rc::ptr_eq(&control, original) => control,
            other => return Ok(other),
        };

        let locals = control
            .locals
            .visit_each(|_, decl| self.declaration(decl, state))?;
        let body = self.required_block(&control.body, state)?;

        let control = if locals.is_none() && Rc::ptr_eq(&body, &control.body) {
            control
        } else {
            Rc::new(Control {
                name: control.name.clone(),
                parameters: control.parameters.clone(),
                locals: locals.unwrap_or_else(|| control.locals.clone()),
                body,
            })
        };
        self.transform.postorder_control(&self.cx, state, control)
    }

    fn action(&mut self, action: &Rc<Action>, state: &mut T::State) -> Result<Option<Rc<Action>>> {
        self.memoized(action, state, |w, state| {
            w.cx.enter(
                Node::Declaration(Declaration::Action(action.clone())),
                Access::Read,
            );
            let result = w.visit_action(action, state);
            w.cx.leave();
            result
        })
    }

    fn visit_action(
        &mut self,
        original: &Rc<Action>,
        state: &mut T::State,
    ) -> Result<Option<Rc<Action>>> {
        let action = match self
            .transform
            .preorder_action(&self.cx, state, original.clone())?
        {
            Some(action) if Rc::ptr_eq(&action, original) => action,
            other => return Ok(other),
        };

        let body = self.required_block(&action.body, state)?;
        let action = if Rc::ptr_eq(&body, &action.body) {
            action
        } else {
            Rc::new(Action {
                name: action.name.clone(),
                parameters: action.parameters.clone(),
                body,
            })
        };
        self.transform.postorder_action(&self.cx, state, action)
    }

    fn required_block(
        &mut self,
        block: &Rc<BlockStatement>,
        state: &mut T::State,
    ) -> Result<Rc<BlockStatement>> {
        Ok(self
            .block(block, state)?
            .unwrap_or_else(BlockStatement::empty))
    }

    fn block(
        &mut self,
        block: &Rc<BlockStatement>,
        state: &mut T::State,
    ) -> Result<Option<Rc<BlockStatement>>> {
        self.memoized(block, state, |w, state| {
            w.cx.enter(Node::Statement(Statement::Block(block.clone())), Access::Read);
            let result = w.visit_block(block, state);
            w.cx.leave();
            result
        })
    }

    fn visit_block(
        &mut self,
        original: &Rc<BlockStatement>,
        state: &mut T::State,
    ) -> Result<Option<Rc<BlockStatement>>> {
        let block = match self
            .transform
            .preorder_block(&self.cx, state, original.clone())?
        {
            Some(block) if Rc::ptr_eq(&block, original) => block,
            other => return Ok(other),
        };

        let components = block
            .components
            .visit_each(|_, stmt| self.statement(stmt, state))?;
        let block = match components {
            Some(components) => Rc::new(BlockStatement { components }),
            None => block,
        };
        self.transform.postorder_block(&self.cx, state, block)
    }

    fn variable(
        &mut self,
        var: &Rc<VariableDeclaration>,
        state: &mut T::State,
    ) -> Result<Option<Rc<VariableDeclaration>>> {
        self.memoized(var, state, |w, state| {
            w.cx.enter(Node::Statement(Statement::Declaration(var.clone())), Access::Read);
            let result = w.visit_variable(var, state);
            w.cx.leave();
            result
        })
    }

    fn visit_variable(
        &mut self,
        original: &Rc<VariableDeclaration>,
        state: &mut T::State,
    ) -> Result<Option<Rc<VariableDeclaration>>> {
        let var = match self
            .transform
            .preorder_variable(&self.cx, state, original.clone())?
        {
            Some(var) if Rc::ptr_eq(&var, original) => var,
            other => return Ok(other),
        };

        let initializer = match &var.initializer {
            Some(init) => self.expression(init, Access::Read, state)?,
            None => None,
        };
        let var = if same_optional(&initializer, &var.initializer) {
            var
        } else {
            Rc::new(VariableDeclaration {
                name: var.name.clone(),
                type_name: var.type_name.clone(),
                initializer,
            })
        };
        self.transform.postorder_variable(&self.cx, state, var)
    }

    /// A statement slot that cannot be left absent; deletion leaves `;`
    fn required_statement(&mut self, stmt: &Statement, state: &mut T::State) -> Result<Statement> {
        Ok(self.statement(stmt, state)?.unwrap_or_else(Statement::empty))
    }

    fn statement(&mut self, stmt: &Statement, state: &mut T::State) -> Result<Option<Statement>> {
        match stmt {
            Statement::Block(block) => Ok(self.block(block, state)?.map(Statement::Block)),
            Statement::Declaration(var) => {
                Ok(self.variable(var, state)?.map(Statement::Declaration))
            }
            _ => self.memoized(stmt, state, |w, state| {
                w.cx.enter(Node::Statement(stmt.clone()), Access::Read);
                let result = w.visit_statement(stmt, state);
                w.cx.leave();
                result
            }),
        }
    }

    fn visit_statement(
        &mut self,
        original: &Statement,
        state: &mut T::State,
    ) -> Result<Option<Statement>> {
        let stmt = match self
            .transform
            .preorder_statement(&self.cx, state, original.clone())?
        {
            Some(stmt) if stmt.same_node(original) => stmt,
            other => return Ok(other),
        };

        match stmt {
            Statement::Assignment(assignment) => {
                let left =
                    self.required_expression(&assignment.left, Access::Write, state, "assignment target")?;
                let right =
                    self.required_expression(&assignment.right, Access::Read, state, "assignment source")?;
                let assignment =
                    if left.same_node(&assignment.left) && right.same_node(&assignment.right) {
                        assignment
                    } else {
                        Rc::new(AssignmentStatement { left, right })
                    };
                self.transform.postorder_assignment(&self.cx, state, assignment)
            }
            Statement::MethodCall(call_stmt) => {
                let call = Expression::MethodCall(call_stmt.call.clone());
                let call = match self.expression(&call, Access::Read, state)? {
                    Some(Expression::MethodCall(call)) => call,
                    Some(other) => {
                        return Err(Error::internal(format!(
                            "call statement rewritten to non-call expression `{}`",
                            other
                        )))
                    }
                    None => return Err(Error::internal("cannot remove the call of a call statement")),
                };
                let call_stmt = if Rc::ptr_eq(&call, &call_stmt.call) {
                    call_stmt
                } else {
                    Rc::new(MethodCallStatement { call })
                };
                self.transform
                    .postorder_method_call_statement(&self.cx, state, call_stmt)
            }
            Statement::Primitive(primitive) => {
                let operands = primitive.operands.visit_each(|index, operand| {
                    self.expression(operand, primitive.operand_access(index), state)
                })?;
                let primitive = match operands {
                    Some(operands) => Rc::new(Primitive {
                        name: primitive.name.clone(),
                        operands,
                    }),
                    None => primitive,
                };
                self.transform.postorder_primitive(&self.cx, state, primitive)
            }
            Statement::If(if_stmt) => {
                let if_stmt = self.visit_if(if_stmt, state)?;
                self.transform.postorder_if(&self.cx, state, if_stmt)
            }
            Statement::Switch(switch) => {
                let switch = self.visit_switch(switch, state)?;
                self.transform.postorder_switch(&self.cx, state, switch)
            }
            Statement::Return(ret) => {
                let expression = match &ret.expression {
                    Some(expr) => self.expression(expr, Access::Read, state)?,
                    None => None,
                };
                let stmt = if same_optional(&expression, &ret.expression) {
                    Statement::Return(ret)
                } else {
                    Statement::Return(Rc::new(ReturnStatement { expression }))
                };
                self.transform.postorder_statement(&self.cx, state, stmt)
            }
            other => self.transform.postorder_statement(&self.cx, state, other),
        }
    }

    /// Both arms start from the state reaching the condition; a missing else
    /// arm is the path on which that state passes through untouched.
    fn visit_if(&mut self, stmt: Rc<IfStatement>, state: &mut T::State) -> Result<Rc<IfStatement>> {
        let condition =
            self.required_expression(&stmt.condition, Access::Read, state, "if condition")?;

        let mut else_state = state.clone();
        let if_true = self.required_statement(&stmt.if_true, state)?;
        let if_false = match &stmt.if_false {
            Some(if_false) => self.statement(if_false, &mut else_state)?,
            None => None,
        };
        state.flow_merge(else_state)?;

        if condition.same_node(&stmt.condition)
            && if_true.same_node(&stmt.if_true)
            && same_optional(&if_false, &stmt.if_false)
        {
            return Ok(stmt);
        }
        Ok(Rc::new(IfStatement {
            condition,
            if_true,
            if_false,
        }))
    }

    /// Labels are evaluated before any arm runs. Every arm with a body starts
    /// from the state after the labels; arms without a body fall through and
    /// add no path. Without a `default` arm the no-match path is merged too.
    fn visit_switch(
        &mut self,
        stmt: Rc<SwitchStatement>,
        state: &mut T::State,
    ) -> Result<Rc<SwitchStatement>> {
        let expression =
            self.required_expression(&stmt.expression, Access::Read, state, "switch expression")?;
        let mut changed = !expression.same_node(&stmt.expression);

        let mut labels = Vec::with_capacity(stmt.cases.len());
        for case in &stmt.cases {
            let label = match &case.label {
                Some(label) => {
                    Some(self.required_expression(label, Access::Read, state, "case label")?)
                }
                None => None,
            };
            changed |= !same_optional(&label, &case.label);
            labels.push(label);
        }

        let entry = state.clone();
        let mut exits = Vec::new();
        let mut cases = Vec::with_capacity(stmt.cases.len());
        for (case, label) in stmt.cases.iter().zip(labels) {
            let body = match &case.body {
                Some(body) => {
                    let mut path = entry.clone();
                    let result = self.required_block(body, &mut path)?;
                    exits.push(path);
                    changed |= !Rc::ptr_eq(&result, body);
                    Some(result)
                }
                None => None,
            };
            cases.push(SwitchCase { label, body });
        }
        if !stmt.cases.iter().any(SwitchCase::is_default) {
            exits.push(entry);
        }

        let mut exits = exits.into_iter();
        if let Some(first) = exits.next() {
            *state = first;
            for exit in exits {
                state.flow_merge(exit)?;
            }
        }

        if !changed {
            return Ok(stmt);
        }
        Ok(Rc::new(SwitchStatement { expression, cases }))
    }

    fn required_expression(
        &mut self,
        expr: &Expression,
        access: Access,
        state: &mut T::State,
        slot: &str,
    ) -> Result<Expression> {
        self.expression(expr, access, state)?
            .ok_or_else(|| Error::internal(format!("cannot remove the {} `{}`", slot, expr)))
    }

    fn expression(
        &mut self,
        expr: &Expression,
        access: Access,
        state: &mut T::State,
    ) -> Result<Option<Expression>> {
        self.memoized(expr, state, |w, state| {
            w.cx.enter(Node::Expression(expr.clone()), access);
            let result = w.visit_expression(expr, access, state);
            w.cx.leave();
            result
        })
    }

    fn visit_expression(
        &mut self,
        original: &Expression,
        access: Access,
        state: &mut T::State,
    ) -> Result<Option<Expression>> {
        let expr = match self
            .transform
            .preorder_expression(&self.cx, state, original.clone())?
        {
            Some(expr) if expr.same_node(original) => expr,
            other => return Ok(other),
        };

        let expr = match self.expression_children(&expr, access, state)? {
            Some(rebuilt) => rebuilt,
            None => expr,
        };
        match expr {
            Expression::Path(path) => self.transform.postorder_path(&self.cx, state, path),
            Expression::MethodCall(call) => {
                self.transform.postorder_method_call(&self.cx, state, call)
            }
            other => self.transform.postorder_expression(&self.cx, state, other),
        }
    }

    /// Visit the children of `expr`; `Some` carries a rebuilt node when any
    /// child changed
    fn expression_children(
        &mut self,
        expr: &Expression,
        access: Access,
        state: &mut T::State,
    ) -> Result<Option<Expression>> {
        Ok(match expr {
            Expression::Constant(_) | Expression::Bool(_) | Expression::Path(_) => None,
            Expression::Member(m) => {
                let base = self.required_expression(&m.expr, access, state, "member base")?;
                (!base.same_node(&m.expr)).then(|| {
                    Expression::Member(Rc::new(Member {
                        expr: base,
                        member: m.member.clone(),
                    }))
                })
            }
            Expression::ArrayIndex(a) => {
                let base = self.required_expression(&a.base, access, state, "array base")?;
                let index =
                    self.required_expression(&a.index, Access::Read, state, "array index")?;
                (!base.same_node(&a.base) || !index.same_node(&a.index))
                    .then(|| Expression::ArrayIndex(Rc::new(ArrayIndex { base, index })))
            }
            Expression::Slice(s) => {
                let base = self.required_expression(&s.expr, access, state, "slice base")?;
                (!base.same_node(&s.expr)).then(|| {
                    Expression::Slice(Rc::new(Slice {
                        expr: base,
                        hi: s.hi,
                        lo: s.lo,
                    }))
                })
            }
            Expression::Unary(u) => {
                let operand = self.required_expression(&u.expr, Access::Read, state, "operand")?;
                (!operand.same_node(&u.expr)).then(|| {
                    Expression::Unary(Rc::new(UnaryExpression {
                        op: u.op,
                        expr: operand,
                    }))
                })
            }
            Expression::Binary(b) => {
                let left = self.required_expression(&b.left, Access::Read, state, "left operand")?;
                let right =
                    self.required_expression(&b.right, Access::Read, state, "right operand")?;
                (!left.same_node(&b.left) || !right.same_node(&b.right)).then(|| {
                    Expression::Binary(Rc::new(BinaryExpression {
                        op: b.op,
                        left,
                        right,
                    }))
                })
            }
            Expression::Mux(m) => {
                let condition =
                    self.required_expression(&m.condition, Access::Read, state, "condition")?;
                let if_true =
                    self.required_expression(&m.if_true, Access::Read, state, "true value")?;
                let if_false =
                    self.required_expression(&m.if_false, Access::Read, state, "false value")?;
                (!condition.same_node(&m.condition)
                    || !if_true.same_node(&m.if_true)
                    || !if_false.same_node(&m.if_false))
                    .then(|| {
                        Expression::Mux(Rc::new(Mux {
                            condition,
                            if_true,
                            if_false,
                        }))
                    })
            }
            Expression::List(l) => l
                .components
                .visit_each(|_, component| self.expression(component, Access::Read, state))?
                .map(|components| Expression::List(Rc::new(ListExpression { components }))),
            Expression::MethodCall(call) => self.call_children(call, state)?.map(Expression::MethodCall),
        })
    }

    /// Arguments are visited with the access of the parameter they bind to
    fn call_children(
        &mut self,
        call: &Rc<MethodCallExpression>,
        state: &mut T::State,
    ) -> Result<Option<Rc<MethodCallExpression>>> {
        let method = self.required_expression(&call.method, Access::Read, state, "call target")?;
        let arguments = call.arguments.visit_each(|index, argument| {
            let direction = call
                .method_type
                .parameters
                .get(index)
                .map(|param| param.direction);
            self.expression(argument, argument_access(direction), state)
        })?;

        if method.same_node(&call.method) && arguments.is_none() {
            return Ok(None);
        }
        Ok(Some(Rc::new(MethodCallExpression {
            method,
            method_type: call.method_type.clone(),
            arguments: arguments.unwrap_or_else(|| call.arguments.clone()),
        })))
    }
}
