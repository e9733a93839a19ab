//! P4-flavoured text rendering of the IR, used by trace logging and `dump`

use super::*;
use std::fmt::{self, Write};

const INDENT: &str = "    ";

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn comma_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: impl IntoIterator<Item = T>) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Operands that need parentheses when nested inside another operator
fn operand(f: &mut fmt::Formatter<'_>, expr: &Expression) -> fmt::Result {
    match expr {
        Expression::Binary(_) | Expression::Mux(_) => write!(f, "({})", expr),
        _ => write!(f, "{}", expr),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(c) => match c.width {
                Some(width) => write!(f, "{}w{}", width, c.value),
                None => write!(f, "{}", c.value),
            },
            Expression::Bool(b) => write!(f, "{}", b.value),
            Expression::Path(p) => f.write_str(&p.name),
            Expression::Member(m) => {
                operand(f, &m.expr)?;
                write!(f, ".{}", m.member)
            }
            Expression::ArrayIndex(a) => {
                operand(f, &a.base)?;
                write!(f, "[{}]", a.index)
            }
            Expression::Slice(s) => {
                operand(f, &s.expr)?;
                write!(f, "[{}:{}]", s.hi, s.lo)
            }
            Expression::Unary(u) => {
                let op = match u.op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                    UnaryOp::Complement => "~",
                };
                f.write_str(op)?;
                operand(f, &u.expr)
            }
            Expression::Binary(b) => {
                operand(f, &b.left)?;
                write!(f, " {} ", b.op.symbol())?;
                operand(f, &b.right)
            }
            Expression::Mux(m) => {
                operand(f, &m.condition)?;
                f.write_str(" ? ")?;
                operand(f, &m.if_true)?;
                f.write_str(" : ")?;
                operand(f, &m.if_false)
            }
            Expression::List(l) => {
                f.write_str("{ ")?;
                comma_separated(f, l.components.iter())?;
                f.write_str(" }")
            }
            Expression::MethodCall(c) => {
                operand(f, &c.method)?;
                f.write_char('(')?;
                comma_separated(f, c.arguments.iter())?;
                f.write_char(')')
            }
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.direction.keyword() {
            write!(f, "{} ", keyword)?;
        }
        if !self.type_name.is_empty() {
            write!(f, "{} ", self.type_name)?;
        }
        f.write_str(&self.name)
    }
}

fn statement(f: &mut fmt::Formatter<'_>, stmt: &Statement, depth: usize) -> fmt::Result {
    match stmt {
        Statement::Assignment(a) => write!(f, "{} = {};", a.left, a.right),
        Statement::MethodCall(m) => write!(f, "{};", Expression::MethodCall(m.call.clone())),
        Statement::Primitive(p) => {
            write!(f, "{}(", p.name)?;
            comma_separated(f, p.operands.iter())?;
            f.write_str(");")
        }
        Statement::If(s) => {
            write!(f, "if ({}) ", s.condition)?;
            statement(f, &s.if_true, depth)?;
            if let Some(if_false) = &s.if_false {
                f.write_str(" else ")?;
                statement(f, if_false, depth)?;
            }
            Ok(())
        }
        Statement::Switch(s) => {
            writeln!(f, "switch ({}) {{", s.expression)?;
            for case in &s.cases {
                indent(f, depth + 1)?;
                match &case.label {
                    Some(label) => write!(f, "{}:", label)?,
                    None => f.write_str("default:")?,
                }
                if let Some(body) = &case.body {
                    f.write_char(' ')?;
                    block(f, body, depth + 1)?;
                }
                f.write_char('\n')?;
            }
            indent(f, depth)?;
            f.write_char('}')
        }
        Statement::Block(b) => block(f, b, depth),
        Statement::Declaration(d) => variable(f, d),
        Statement::Return(r) => match &r.expression {
            Some(expr) => write!(f, "return {};", expr),
            None => f.write_str("return;"),
        },
        Statement::Exit(_) => f.write_str("exit;"),
        Statement::Empty(_) => f.write_char(';'),
    }
}

fn block(f: &mut fmt::Formatter<'_>, b: &BlockStatement, depth: usize) -> fmt::Result {
    if b.components.is_empty() {
        return f.write_str("{ }");
    }
    f.write_str("{\n")?;
    for component in &b.components {
        indent(f, depth + 1)?;
        statement(f, component, depth + 1)?;
        f.write_char('\n')?;
    }
    indent(f, depth)?;
    f.write_char('}')
}

fn variable(f: &mut fmt::Formatter<'_>, v: &VariableDeclaration) -> fmt::Result {
    write!(f, "{} {}", v.type_name, v.name)?;
    if let Some(init) = &v.initializer {
        write!(f, " = {}", init)?;
    }
    f.write_char(';')
}

fn action(f: &mut fmt::Formatter<'_>, a: &Action, depth: usize) -> fmt::Result {
    write!(f, "action {}(", a.name)?;
    comma_separated(f, a.parameters.iter())?;
    f.write_str(") ")?;
    block(f, &a.body, depth)
}

fn declaration(f: &mut fmt::Formatter<'_>, decl: &Declaration, depth: usize) -> fmt::Result {
    match decl {
        Declaration::Variable(v) => variable(f, v),
        Declaration::Action(a) => action(f, a, depth),
        Declaration::Control(c) => {
            write!(f, "control {}(", c.name)?;
            comma_separated(f, c.parameters.iter())?;
            f.write_str(") {\n")?;
            for local in &c.locals {
                indent(f, depth + 1)?;
                declaration(f, local, depth + 1)?;
                f.write_char('\n')?;
            }
            indent(f, depth + 1)?;
            f.write_str("apply ")?;
            block(f, &c.body, depth + 1)?;
            f.write_char('\n')?;
            indent(f, depth)?;
            f.write_char('}')
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        statement(f, self, 0)
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        block(f, self, 0)
    }
}

impl fmt::Display for VariableDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        variable(f, self)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        action(f, self, 0)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        declaration(f, self, 0)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for decl in &self.declarations {
            declaration(f, decl, 0)?;
            f.write_char('\n')?;
        }
        Ok(())
    }
}
