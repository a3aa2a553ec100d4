//! Syntax tree nodes

use crate::{
    AggregationType, BinaryOp, DataItem, DataItemModifier, NamedFunction, NamedValue, QueryMods,
    UnaryOp, ValueType, VariableRef,
};
use chrono::NaiveDate;
use hisexpr_diagnostics::Span;
use serde::{Deserialize, Serialize};

/// Tallest tree the parser builds, counting the root. The evaluator accepts
/// any tree up to this height.
pub const MAX_DEPTH: usize = 1000;

/// Node kind taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // Complex kinds
    /// Parenthesis group; the tree root is an implicit one
    Par,
    /// Single operand of a function or modifier call
    Argument,
    Function,
    /// Dot-modifier such as `.periodOffset(1)`
    Modifier,
    DataItem,
    Variable,
    BinaryOperator,
    UnaryOperator,

    // Literals
    Number,
    Integer,
    String,
    Date,
    Uid,
    Identifier,
    NamedValue,
    Null,
    Boolean,
}

impl NodeKind {
    pub const ALL: &'static [NodeKind] = &[
        Self::Par,
        Self::Argument,
        Self::Function,
        Self::Modifier,
        Self::DataItem,
        Self::Variable,
        Self::BinaryOperator,
        Self::UnaryOperator,
        Self::Number,
        Self::Integer,
        Self::String,
        Self::Date,
        Self::Uid,
        Self::Identifier,
        Self::NamedValue,
        Self::Null,
        Self::Boolean,
    ];

    /// Complex kinds may own children, simple kinds are leaf literals
    pub const fn is_complex(&self) -> bool {
        matches!(
            self,
            Self::Par
                | Self::Argument
                | Self::Function
                | Self::Modifier
                | Self::DataItem
                | Self::Variable
                | Self::BinaryOperator
                | Self::UnaryOperator
        )
    }

    pub const fn is_literal(&self) -> bool {
        !self.is_complex()
    }
}

/// Kind-specific decoded value, set once at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeValue {
    /// Groups and `null` carry no value
    None,
    Number(f64),
    Integer(i64),
    String(String),
    Date(NaiveDate),
    Boolean(bool),
    Uid(String),
    Identifier(String),
    AggregationType(AggregationType),
    NamedValue(NamedValue),
    Function(NamedFunction),
    Modifier(DataItemModifier),
    DataItem(DataItem),
    Variable(VariableRef),
    Binary(BinaryOp),
    Unary(UnaryOp),
}

/// Original whitespace and comments around a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitespace {
    pub before: String,
    pub after: String,
}

/// A syntax tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Verbatim source text identifying the node (literal text, function
    /// name, operator symbol)
    pub raw: String,
    pub value: NodeValue,
    pub children: Vec<Node>,
    /// Modifiers attached after parsing; not children
    pub modifiers: Vec<Node>,
    /// Source range in characters
    pub span: Option<Span>,
    /// Range of whitespace-token indices spanned, recorded in annotate mode
    pub tokens: Option<Span>,
    pub whitespace: Option<Whitespace>,
    /// Synthesised rather than written; skipped when printing
    pub implicit: bool,
    /// Concrete type of a variable, stamped by the type checker
    pub actual_value_type: Option<ValueType>,
}

impl Node {
    pub fn new(kind: NodeKind, raw: impl Into<String>, value: NodeValue) -> Self {
        Self {
            kind,
            raw: raw.into(),
            value,
            children: Vec::new(),
            modifiers: Vec::new(),
            span: None,
            tokens: None,
            whitespace: None,
            implicit: false,
            actual_value_type: None,
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// The only child of a group, if there is exactly one
    pub fn single_child(&self) -> Option<&Node> {
        match self.children.as_slice() {
            [child] => Some(child),
            _ => None,
        }
    }

    /// Skip through parenthesis and argument wrappers
    pub fn unwrap_groups(&self) -> &Node {
        match self.kind {
            NodeKind::Par | NodeKind::Argument => {
                self.single_child().map_or(self, Node::unwrap_groups)
            }
            _ => self,
        }
    }

    pub fn function(&self) -> Option<NamedFunction> {
        match self.value {
            NodeValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self.value {
            NodeValue::Binary(op) => Some(op),
            _ => None,
        }
    }

    pub fn unary_op(&self) -> Option<UnaryOp> {
        match self.value {
            NodeValue::Unary(op) => Some(op),
            _ => None,
        }
    }

    pub fn variable(&self) -> Option<&VariableRef> {
        match &self.value {
            NodeValue::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// An operator produced by the parser that has not been grouped yet
    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, NodeKind::BinaryOperator | NodeKind::UnaryOperator)
            && self.children.is_empty()
    }

    /// Data items and program variables accept modifiers
    pub fn accepts_modifiers(&self) -> bool {
        match self.kind {
            NodeKind::DataItem => true,
            NodeKind::Variable => matches!(self.variable(), Some(VariableRef::Program(_))),
            _ => false,
        }
    }

    /// The data item with its modifiers resolved
    pub fn data_item(&self) -> Option<DataItem> {
        match &self.value {
            NodeValue::DataItem(item) => Some(item.clone().with_query_mods(self.query_mods())),
            _ => None,
        }
    }

    /// Resolve the attached modifiers.
    ///
    /// Integer offsets add up across occurrences, everything else is
    /// last-write-wins.
    pub fn query_mods(&self) -> Option<QueryMods> {
        if self.modifiers.is_empty() {
            return None;
        }
        let mut mods = QueryMods::default();
        for modifier in &self.modifiers {
            let NodeValue::Modifier(kind) = modifier.value else {
                continue;
            };
            let arg = modifier.children.first().map(Node::unwrap_groups);
            match (kind, arg.map(|a| &a.value)) {
                (DataItemModifier::AggregationType, Some(NodeValue::AggregationType(t))) => {
                    mods.aggregation_type = Some(*t);
                }
                (DataItemModifier::MaxDate, Some(NodeValue::Date(d))) => mods.max_date = Some(*d),
                (DataItemModifier::MinDate, Some(NodeValue::Date(d))) => mods.min_date = Some(*d),
                (DataItemModifier::PeriodOffset, Some(NodeValue::Integer(n))) => {
                    mods.period_offset += n;
                }
                (DataItemModifier::StageOffset, Some(NodeValue::Integer(n))) => {
                    mods.stage_offset += n;
                }
                (DataItemModifier::YearToDate, _) => mods.year_to_date = true,
                (DataItemModifier::PeriodAggregation, _) => mods.period_aggregation = true,
                _ => {}
            }
        }
        Some(mods)
    }

    /// The declared value type, derived structurally
    pub fn value_type(&self) -> ValueType {
        match (&self.kind, &self.value) {
            (NodeKind::Par | NodeKind::Argument, _) => self
                .single_child()
                .map_or(ValueType::Mixed, Node::value_type),
            (NodeKind::Function, NodeValue::Function(f)) => {
                let sig = f.signature();
                if sig.returns != ValueType::Same {
                    return sig.returns;
                }
                self.children
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| sig.param_type(*i) == ValueType::Same)
                    .map(|(_, arg)| arg.value_type())
                    .find(|t| !t.is_unresolved())
                    .unwrap_or(ValueType::Mixed)
            }
            (NodeKind::DataItem, NodeValue::DataItem(item)) => item.item_type.value_type(),
            (NodeKind::Variable, NodeValue::Variable(v)) => match v {
                VariableRef::Program(p) => p.value_type(),
                VariableRef::Rule(_) => self.actual_value_type.unwrap_or(ValueType::Mixed),
            },
            (NodeKind::BinaryOperator, NodeValue::Binary(op)) => op.return_type(),
            (NodeKind::UnaryOperator, NodeValue::Unary(op)) => match op.return_type() {
                ValueType::Same => self
                    .children
                    .first()
                    .map_or(ValueType::Mixed, Node::value_type),
                t => t,
            },
            (NodeKind::Number | NodeKind::Integer | NodeKind::NamedValue, _) => ValueType::Number,
            (NodeKind::String | NodeKind::Uid | NodeKind::Identifier, _) => ValueType::String,
            (NodeKind::Date, _) => ValueType::Date,
            (NodeKind::Boolean, _) => ValueType::Boolean,
            _ => ValueType::Mixed,
        }
    }

    /// Composed solely of literals and operators or groups over literals
    pub fn is_statically_defined(&self) -> bool {
        match self.kind {
            NodeKind::Par | NodeKind::Argument | NodeKind::UnaryOperator => self
                .single_child()
                .is_some_and(Node::is_statically_defined),
            NodeKind::BinaryOperator => {
                self.children.len() == 2 && self.children.iter().all(Node::is_statically_defined)
            }
            NodeKind::NamedValue => false,
            kind => kind.is_literal(),
        }
    }

    /// Visit this node and every descendant in source order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
