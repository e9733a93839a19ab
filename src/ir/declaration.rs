use super::{BlockStatement, IrNode, IrVector, NodeId, NodeKind, Parameter, VariableDeclaration};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Declaration at program or control scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Declaration {
    Variable(Rc<VariableDeclaration>),
    Action(Rc<Action>),
    Control(Rc<Control>),
}

/// A named unit of imperative statements; the scope of local copy propagation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub body: Rc<BlockStatement>,
}

/// A control block: local declarations (actions among them) plus an apply body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub locals: IrVector<Declaration>,
    pub body: Rc<BlockStatement>,
}

/// Root of a compilation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub declarations: IrVector<Declaration>,
}

impl Program {
    /// Load a program from its JSON form
    pub fn from_json(text: &str) -> Result<Rc<Program>> {
        Ok(Rc::new(serde_json::from_str(text)?))
    }

    /// Render the program as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Find a top-level or control-local action by name
    pub fn find_action(&self, name: &str) -> Option<&Rc<Action>> {
        fn search<'a>(decls: &'a IrVector<Declaration>, name: &str) -> Option<&'a Rc<Action>> {
            decls.iter().find_map(|decl| match decl {
                Declaration::Action(action) if action.name == name => Some(action),
                Declaration::Control(control) => search(&control.locals, name),
                _ => None,
            })
        }
        search(&self.declarations, name)
    }
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Variable(var) => &var.name,
            Declaration::Action(action) => &action.name,
            Declaration::Control(control) => &control.name,
        }
    }
}

impl IrNode for Declaration {
    fn node_id(&self) -> NodeId {
        match self {
            Declaration::Variable(d) => NodeId::of(d),
            Declaration::Action(d) => NodeId::of(d),
            Declaration::Control(d) => NodeId::of(d),
        }
    }

    fn kind(&self) -> NodeKind {
        match self {
            Declaration::Variable(_) => NodeKind::VariableDeclaration,
            Declaration::Action(_) => NodeKind::Action,
            Declaration::Control(_) => NodeKind::Control,
        }
    }
}
