use super::primitive::{operand_access, Access};
use super::{Expression, IrNode, IrVector, MethodCallExpression, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A statement node; blocks may also hold variable declarations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Statement {
    Assignment(Rc<AssignmentStatement>),
    MethodCall(Rc<MethodCallStatement>),
    Primitive(Rc<Primitive>),
    If(Rc<IfStatement>),
    Switch(Rc<SwitchStatement>),
    Block(Rc<BlockStatement>),
    Declaration(Rc<VariableDeclaration>),
    Return(Rc<ReturnStatement>),
    Exit(Rc<ExitStatement>),
    Empty(Rc<EmptyStatement>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentStatement {
    pub left: Expression,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCallStatement {
    pub call: Rc<MethodCallExpression>,
}

/// Target-level primitive operation such as `modify_field(dst, src)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primitive {
    pub name: String,
    pub operands: IrVector<Expression>,
}

impl Primitive {
    /// How the operation accesses the operand at `index`
    pub fn operand_access(&self, index: usize) -> Access {
        operand_access(&self.name, index)
    }

    /// Whether the operand at `index` is written by the operation
    pub fn is_output(&self, index: usize) -> bool {
        self.operand_access(index).is_write()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: Expression,
    pub if_true: Statement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_false: Option<Statement>,
}

/// One arm of a switch. A missing label is `default`; a missing body falls
/// through to the next arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Rc<BlockStatement>>,
}

impl SwitchCase {
    pub fn is_default(&self) -> bool {
        self.label.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchStatement {
    pub expression: Expression,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStatement {
    #[serde(default)]
    pub components: IrVector<Statement>,
}

impl BlockStatement {
    pub fn empty() -> Rc<BlockStatement> {
        Rc::new(BlockStatement::default())
    }
}

/// Local variable declaration `bit<8> x = init;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<Expression>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatement {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyStatement {}

impl Statement {
    /// A fresh empty statement `;`
    pub fn empty() -> Statement {
        Statement::Empty(Rc::new(EmptyStatement {}))
    }

    pub fn as_assignment(&self) -> Option<&Rc<AssignmentStatement>> {
        match self {
            Statement::Assignment(assignment) => Some(assignment),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Rc<BlockStatement>> {
        match self {
            Statement::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_declaration(&self) -> Option<&Rc<VariableDeclaration>> {
        match self {
            Statement::Declaration(decl) => Some(decl),
            _ => None,
        }
    }
}

impl IrNode for Statement {
    fn node_id(&self) -> NodeId {
        match self {
            Statement::Assignment(s) => NodeId::of(s),
            Statement::MethodCall(s) => NodeId::of(s),
            Statement::Primitive(s) => NodeId::of(s),
            Statement::If(s) => NodeId::of(s),
            Statement::Switch(s) => NodeId::of(s),
            Statement::Block(s) => NodeId::of(s),
            Statement::Declaration(s) => NodeId::of(s),
            Statement::Return(s) => NodeId::of(s),
            Statement::Exit(s) => NodeId::of(s),
            Statement::Empty(s) => NodeId::of(s),
        }
    }

    fn kind(&self) -> NodeKind {
        match self {
            Statement::Assignment(_) => NodeKind::Assignment,
            Statement::MethodCall(_) => NodeKind::MethodCallStatement,
            Statement::Primitive(_) => NodeKind::Primitive,
            Statement::If(_) => NodeKind::If,
            Statement::Switch(_) => NodeKind::Switch,
            Statement::Block(_) => NodeKind::Block,
            Statement::Declaration(_) => NodeKind::VariableDeclaration,
            Statement::Return(_) => NodeKind::Return,
            Statement::Exit(_) => NodeKind::Exit,
            Statement::Empty(_) => NodeKind::Empty,
        }
    }
}
