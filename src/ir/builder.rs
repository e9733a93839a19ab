//! Terse constructors for IR nodes
//!
//! ```
//! use p4_midend::ir::builder::*;
//!
//! let body = block(vec![
//!     declare("x", "bit<8>", None),
//!     assign(path("x"), constant(3)),
//! ]);
//! let program = program(vec![action("a", vec![], body)]);
//! assert_eq!(program.declarations.len(), 1);
//! ```

use super::*;
use num_bigint::BigInt;

pub fn constant(value: i64) -> Expression {
    Expression::Constant(Rc::new(Constant {
        value: BigInt::from(value),
        width: None,
    }))
}

pub fn sized_constant(value: i64, width: u32) -> Expression {
    Expression::Constant(Rc::new(Constant {
        value: BigInt::from(value),
        width: Some(width),
    }))
}

pub fn boolean(value: bool) -> Expression {
    Expression::Bool(Rc::new(BoolLiteral { value }))
}

pub fn path(name: &str) -> Expression {
    Expression::Path(Rc::new(PathExpression {
        name: name.to_string(),
    }))
}

pub fn member(expr: Expression, member: &str) -> Expression {
    Expression::Member(Rc::new(Member {
        expr,
        member: member.to_string(),
    }))
}

pub fn index(base: Expression, index: Expression) -> Expression {
    Expression::ArrayIndex(Rc::new(ArrayIndex { base, index }))
}

pub fn slice(expr: Expression, hi: u32, lo: u32) -> Expression {
    Expression::Slice(Rc::new(Slice { expr, hi, lo }))
}

pub fn unary(op: UnaryOp, expr: Expression) -> Expression {
    Expression::Unary(Rc::new(UnaryExpression { op, expr }))
}

pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    Expression::Binary(Rc::new(BinaryExpression { op, left, right }))
}

pub fn add(left: Expression, right: Expression) -> Expression {
    binary(BinaryOp::Add, left, right)
}

pub fn eq(left: Expression, right: Expression) -> Expression {
    binary(BinaryOp::Eq, left, right)
}

pub fn mux(condition: Expression, if_true: Expression, if_false: Expression) -> Expression {
    Expression::Mux(Rc::new(Mux {
        condition,
        if_true,
        if_false,
    }))
}

pub fn list(components: Vec<Expression>) -> Expression {
    Expression::List(Rc::new(ListExpression {
        components: components.into(),
    }))
}

pub fn param(name: &str, direction: Direction, type_name: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        direction,
        type_name: type_name.to_string(),
    }
}

/// Call `method` whose signature is `parameters`
pub fn call(method: Expression, parameters: Vec<Parameter>, arguments: Vec<Expression>) -> Expression {
    Expression::MethodCall(method_call(method, parameters, arguments))
}

pub fn method_call(
    method: Expression,
    parameters: Vec<Parameter>,
    arguments: Vec<Expression>,
) -> Rc<MethodCallExpression> {
    Rc::new(MethodCallExpression {
        method,
        method_type: MethodType { parameters },
        arguments: arguments.into(),
    })
}

pub fn assign(left: Expression, right: Expression) -> Statement {
    Statement::Assignment(Rc::new(AssignmentStatement { left, right }))
}

pub fn call_statement(
    method: Expression,
    parameters: Vec<Parameter>,
    arguments: Vec<Expression>,
) -> Statement {
    Statement::MethodCall(Rc::new(MethodCallStatement {
        call: method_call(method, parameters, arguments),
    }))
}

pub fn primitive(name: &str, operands: Vec<Expression>) -> Statement {
    Statement::Primitive(Rc::new(Primitive {
        name: name.to_string(),
        operands: operands.into(),
    }))
}

pub fn if_else(condition: Expression, if_true: Statement, if_false: Option<Statement>) -> Statement {
    Statement::If(Rc::new(IfStatement {
        condition,
        if_true,
        if_false,
    }))
}

/// Switch arm; `label: None` is `default`, `body: None` falls through
pub fn case(label: Option<Expression>, body: Option<Rc<BlockStatement>>) -> SwitchCase {
    SwitchCase { label, body }
}

pub fn switch(expression: Expression, cases: Vec<SwitchCase>) -> Statement {
    Statement::Switch(Rc::new(SwitchStatement { expression, cases }))
}

pub fn block(components: Vec<Statement>) -> Rc<BlockStatement> {
    Rc::new(BlockStatement {
        components: components.into(),
    })
}

pub fn block_statement(components: Vec<Statement>) -> Statement {
    Statement::Block(block(components))
}

pub fn variable(name: &str, type_name: &str, initializer: Option<Expression>) -> Rc<VariableDeclaration> {
    Rc::new(VariableDeclaration {
        name: name.to_string(),
        type_name: type_name.to_string(),
        initializer,
    })
}

pub fn declare(name: &str, type_name: &str, initializer: Option<Expression>) -> Statement {
    Statement::Declaration(variable(name, type_name, initializer))
}

pub fn ret(expression: Option<Expression>) -> Statement {
    Statement::Return(Rc::new(ReturnStatement { expression }))
}

pub fn exit() -> Statement {
    Statement::Exit(Rc::new(ExitStatement {}))
}

pub fn action(name: &str, parameters: Vec<Parameter>, body: Rc<BlockStatement>) -> Declaration {
    Declaration::Action(Rc::new(Action {
        name: name.to_string(),
        parameters,
        body,
    }))
}

pub fn control(
    name: &str,
    parameters: Vec<Parameter>,
    locals: Vec<Declaration>,
    body: Rc<BlockStatement>,
) -> Declaration {
    Declaration::Control(Rc::new(Control {
        name: name.to_string(),
        parameters,
        locals: locals.into(),
        body,
    }))
}

pub fn program(declarations: Vec<Declaration>) -> Rc<Program> {
    Rc::new(Program {
        declarations: declarations.into(),
    })
}
