use super::{IrNode, IrVector, NodeId, NodeKind};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// An expression node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expression {
    Constant(Rc<Constant>),
    Bool(Rc<BoolLiteral>),
    Path(Rc<PathExpression>),
    Member(Rc<Member>),
    ArrayIndex(Rc<ArrayIndex>),
    Slice(Rc<Slice>),
    Unary(Rc<UnaryExpression>),
    Binary(Rc<BinaryExpression>),
    Mux(Rc<Mux>),
    List(Rc<ListExpression>),
    MethodCall(Rc<MethodCallExpression>),
}

/// Integer literal, optionally sized (`8w3`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    #[serde(with = "decimal")]
    pub value: BigInt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolLiteral {
    pub value: bool,
}

/// Reference to a named variable, parameter or object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathExpression {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub expr: Expression,
    pub member: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayIndex {
    pub base: Expression,
    pub index: Expression,
}

/// Bit slice `expr[hi:lo]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub expr: Expression,
    pub hi: u32,
    pub lo: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
    Complement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub op: UnaryOp,
    pub expr: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Concat => "++",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub op: BinaryOp,
    pub left: Expression,
    pub right: Expression,
}

/// Conditional expression `condition ? if_true : if_false`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mux {
    pub condition: Expression,
    pub if_true: Expression,
    pub if_false: Expression,
}

/// Aggregate constructor `{ a, b, ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListExpression {
    pub components: IrVector<Expression>,
}

/// Direction of a method or action parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    None,
    In,
    Out,
    InOut,
}

impl Direction {
    /// Whether the callee may write through an argument bound to this direction
    pub fn is_output(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }

    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Direction::None => None,
            Direction::In => Some("in"),
            Direction::Out => Some("out"),
            Direction::InOut => Some("inout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(rename = "type", default)]
    pub type_name: String,
}

/// Signature of the callee of a method call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodType {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCallExpression {
    pub method: Expression,
    #[serde(rename = "type")]
    pub method_type: MethodType,
    pub arguments: IrVector<Expression>,
}

impl Expression {
    pub fn as_path(&self) -> Option<&PathExpression> {
        match self {
            Expression::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_method_call(&self) -> Option<&Rc<MethodCallExpression>> {
        match self {
            Expression::MethodCall(call) => Some(call),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Expression::List(_))
    }

    /// Name of the variable written by this expression used as an lvalue,
    /// looking through member, index and slice accesses
    pub fn lvalue_root(&self) -> Option<&str> {
        match self {
            Expression::Path(path) => Some(&path.name),
            Expression::Member(member) => member.expr.lvalue_root(),
            Expression::ArrayIndex(index) => index.base.lvalue_root(),
            Expression::Slice(slice) => slice.expr.lvalue_root(),
            _ => None,
        }
    }

    /// Dotted components of a path or member chain (`hdr.ipv4.ttl`)
    pub fn lvalue_components(&self) -> Option<Vec<&str>> {
        match self {
            Expression::Path(path) => Some(vec![path.name.as_str()]),
            Expression::Member(member) => {
                let mut components = member.expr.lvalue_components()?;
                components.push(&member.member);
                Some(components)
            }
            _ => None,
        }
    }

    /// Direct subexpressions, in evaluation order
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Constant(_) | Expression::Bool(_) | Expression::Path(_) => Vec::new(),
            Expression::Member(member) => vec![&member.expr],
            Expression::ArrayIndex(index) => vec![&index.base, &index.index],
            Expression::Slice(slice) => vec![&slice.expr],
            Expression::Unary(unary) => vec![&unary.expr],
            Expression::Binary(binary) => vec![&binary.left, &binary.right],
            Expression::Mux(mux) => vec![&mux.condition, &mux.if_true, &mux.if_false],
            Expression::List(list) => list.components.iter().collect(),
            Expression::MethodCall(call) => std::iter::once(&call.method)
                .chain(call.arguments.iter())
                .collect(),
        }
    }

    /// Pre-order search over this expression and its subexpressions
    pub fn any<F>(&self, predicate: &mut F) -> bool
    where
        F: FnMut(&Expression) -> bool,
    {
        predicate(self) || self.children().into_iter().any(|child| child.any(predicate))
    }
}

impl IrNode for Expression {
    fn node_id(&self) -> NodeId {
        match self {
            Expression::Constant(e) => NodeId::of(e),
            Expression::Bool(e) => NodeId::of(e),
            Expression::Path(e) => NodeId::of(e),
            Expression::Member(e) => NodeId::of(e),
            Expression::ArrayIndex(e) => NodeId::of(e),
            Expression::Slice(e) => NodeId::of(e),
            Expression::Unary(e) => NodeId::of(e),
            Expression::Binary(e) => NodeId::of(e),
            Expression::Mux(e) => NodeId::of(e),
            Expression::List(e) => NodeId::of(e),
            Expression::MethodCall(e) => NodeId::of(e),
        }
    }

    fn kind(&self) -> NodeKind {
        match self {
            Expression::Constant(_) => NodeKind::Constant,
            Expression::Bool(_) => NodeKind::Bool,
            Expression::Path(_) => NodeKind::Path,
            Expression::Member(_) => NodeKind::Member,
            Expression::ArrayIndex(_) => NodeKind::ArrayIndex,
            Expression::Slice(_) => NodeKind::Slice,
            Expression::Unary(_) => NodeKind::Unary,
            Expression::Binary(_) => NodeKind::Binary,
            Expression::Mux(_) => NodeKind::Mux,
            Expression::List(_) => NodeKind::List,
            Expression::MethodCall(_) => NodeKind::MethodCall,
        }
    }
}

/// Constants travel as decimal strings so arbitrary widths survive JSON.
/// Integers and `0x` hex strings are accepted on input.
mod decimal {
    use num_bigint::BigInt;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        deserializer.deserialize_any(BigIntVisitor)
    }

    struct BigIntVisitor;

    impl<'de> Visitor<'de> for BigIntVisitor {
        type Value = BigInt;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or an integer string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<BigInt, E> {
            let (negative, digits) = match v.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, v),
            };
            let parsed = match digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
            {
                Some(hex) => BigInt::parse_bytes(hex.as_bytes(), 16),
                None => BigInt::parse_bytes(digits.as_bytes(), 10),
            };
            let value = parsed.ok_or_else(|| E::custom(format!("invalid integer literal `{}`", v)))?;
            Ok(if negative { -value } else { value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::*;

    #[test]
    fn test_lvalue_root_looks_through_accesses() {
        let target = slice(index(member(path("hdr"), "stack"), constant(1)), 7, 0);
        assert_eq!(target.lvalue_root(), Some("hdr"));
        assert_eq!(add(path("a"), constant(1)).lvalue_root(), None);
    }

    #[test]
    fn test_lvalue_components() {
        let target = member(member(path("hdr"), "ipv4"), "ttl");
        assert_eq!(target.lvalue_components(), Some(vec!["hdr", "ipv4", "ttl"]));
    }

    #[test]
    fn test_constant_json_accepts_numbers_and_hex() {
        let from_number: Expression =
            serde_json::from_str(r#"{"kind":"Constant","value":42,"width":8}"#).unwrap();
        let from_hex: Expression =
            serde_json::from_str(r#"{"kind":"Constant","value":"0x2a","width":8}"#).unwrap();
        assert_eq!(from_number, from_hex);
        assert_eq!(
            serde_json::to_string(&from_number).unwrap(),
            r#"{"kind":"Constant","value":"42","width":8}"#
        );
    }

    #[test]
    fn test_structural_equality_ignores_identity() {
        let a = add(path("x"), constant(1));
        let b = add(path("x"), constant(1));
        assert_eq!(a, b);
        assert!(!a.same_node(&b));
        assert!(a.same_node(&a.clone()));
    }
}
