//! Intermediate representation consumed by the midend passes
//!
//! The IR is a tree whose payloads live behind `Rc`, so a subtree may be
//! reachable from more than one parent. Passes never mutate a payload; they
//! build a new one and hand it back to the parent. Node identity is the
//! payload address, see [`NodeId`].
//!
//! - `expression`: expression kinds and the method signature types
//! - `statement`: statement kinds, blocks and variable declarations
//! - `declaration`: top-level and control-local declarations, `Program`
//! - `vector`: the ordered child container [`IrVector`]
//! - `primitive`: operand classification for primitive operations
//! - `builder`: terse constructors for tests and tools

pub mod builder;
mod declaration;
mod display;
mod expression;
mod primitive;
mod statement;
mod vector;

pub use declaration::{Action, Control, Declaration, Program};
pub use expression::{
    ArrayIndex, BinaryExpression, BinaryOp, BoolLiteral, Constant, Direction, Expression,
    ListExpression, Member, MethodCallExpression, MethodType, Mux, Parameter, PathExpression,
    Slice, UnaryExpression, UnaryOp,
};
pub use primitive::{operand_access, Access};
pub use statement::{
    AssignmentStatement, BlockStatement, EmptyStatement, ExitStatement, IfStatement,
    MethodCallStatement, Primitive, ReturnStatement, Statement, SwitchCase, SwitchStatement,
    VariableDeclaration,
};
pub use vector::IrVector;

use std::fmt;
use std::rc::Rc;

/// Identity of a node: the address of its shared payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn of<T>(payload: &Rc<T>) -> Self {
        NodeId(Rc::as_ptr(payload) as *const () as usize)
    }
}

/// Runtime type tag of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Control,
    Action,
    VariableDeclaration,
    Block,
    Assignment,
    MethodCallStatement,
    Primitive,
    If,
    Switch,
    Return,
    Exit,
    Empty,
    Constant,
    Bool,
    Path,
    Member,
    ArrayIndex,
    Slice,
    Unary,
    Binary,
    Mux,
    List,
    MethodCall,
}

impl NodeKind {
    /// Whether nodes of this kind are expressions
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            NodeKind::Constant
                | NodeKind::Bool
                | NodeKind::Path
                | NodeKind::Member
                | NodeKind::ArrayIndex
                | NodeKind::Slice
                | NodeKind::Unary
                | NodeKind::Binary
                | NodeKind::Mux
                | NodeKind::List
                | NodeKind::MethodCall
        )
    }
}

/// Common behaviour of the IR node categories
pub trait IrNode: Clone {
    fn node_id(&self) -> NodeId;

    fn kind(&self) -> NodeKind;

    /// Same node, not merely an equal one
    fn same_node(&self, other: &Self) -> bool {
        self.node_id() == other.node_id()
    }

    /// Check if this node is of the given kind
    fn is(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }
}

/// Any node of the IR, used where the category is not known statically
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Program(Rc<Program>),
    Declaration(Declaration),
    Statement(Statement),
    Expression(Expression),
}

impl Node {
    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            Node::Statement(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Node::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_declaration(&self) -> Option<&Declaration> {
        match self {
            Node::Declaration(decl) => Some(decl),
            _ => None,
        }
    }
}

impl IrNode for Node {
    fn node_id(&self) -> NodeId {
        match self {
            Node::Program(program) => NodeId::of(program),
            Node::Declaration(decl) => decl.node_id(),
            Node::Statement(stmt) => stmt.node_id(),
            Node::Expression(expr) => expr.node_id(),
        }
    }

    fn kind(&self) -> NodeKind {
        match self {
            Node::Program(_) => NodeKind::Program,
            Node::Declaration(decl) => decl.kind(),
            Node::Statement(stmt) => stmt.kind(),
            Node::Expression(expr) => expr.kind(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Program(program) => write!(f, "{}", program),
            Node::Declaration(decl) => write!(f, "{}", decl),
            Node::Statement(stmt) => write!(f, "{}", stmt),
            Node::Expression(expr) => write!(f, "{}", expr),
        }
    }
}
