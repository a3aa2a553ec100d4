//! Regenerate expression text from a tree
//!
//! One visitor serves three outputs: plain normalisation, regeneration with
//! data items replaced by known values, and descriptions with identifiers
//! replaced by display names. Recorded whitespace is reproduced verbatim;
//! without it binary operators and word-form unary operators get one space
//! on each side.

use crate::{DataItem, Node, NodeKind, NodeValue, VariableRef, is_word_operator};
use std::collections::HashMap;

/// What to substitute while printing
#[derive(Debug, Clone, Copy)]
pub enum DescribeMode<'a> {
    Normalise,
    /// Replace data items by their value
    Regenerate(&'a HashMap<DataItem, f64>),
    /// Replace identifiers and rule variable names by display names
    Describe(&'a HashMap<String, String>),
}

/// Print the tree as written, with no substitution
pub fn normalise(root: &Node) -> String {
    print(root, DescribeMode::Normalise)
}

/// Print the tree with known data item values substituted
pub fn regenerate(root: &Node, values: &HashMap<DataItem, f64>) -> String {
    print(root, DescribeMode::Regenerate(values))
}

/// Print the tree with display names substituted
pub fn describe(root: &Node, names: &HashMap<String, String>) -> String {
    print(root, DescribeMode::Describe(names))
}

pub fn print(root: &Node, mode: DescribeMode<'_>) -> String {
    let mut describer = Describer {
        mode,
        out: String::new(),
    };
    if root.kind == NodeKind::Par {
        describer.before(root);
        for child in &root.children {
            describer.node(child);
        }
        describer.after(root);
    } else {
        describer.node(root);
    }
    describer.out
}

struct Describer<'a> {
    mode: DescribeMode<'a>,
    out: String,
}

impl Describer<'_> {
    fn before(&mut self, node: &Node) {
        if let Some(ws) = &node.whitespace {
            self.out.push_str(&ws.before);
        }
    }

    fn after(&mut self, node: &Node) {
        if let Some(ws) = &node.whitespace {
            self.out.push_str(&ws.after);
        }
    }

    fn node(&mut self, node: &Node) {
        match node.kind {
            NodeKind::BinaryOperator => {
                if let Some(left) = node.children.first() {
                    self.node(left);
                }
                match &node.whitespace {
                    Some(ws) => {
                        self.out.push_str(&ws.before);
                        self.out.push_str(&node.raw);
                        self.out.push_str(&ws.after);
                    }
                    None => {
                        self.out.push(' ');
                        self.out.push_str(&node.raw);
                        self.out.push(' ');
                    }
                }
                if let Some(right) = node.children.get(1) {
                    self.node(right);
                }
                return;
            }
            NodeKind::UnaryOperator => {
                match &node.whitespace {
                    Some(ws) => {
                        self.out.push_str(&ws.before);
                        self.out.push_str(&node.raw);
                        self.out.push_str(&ws.after);
                    }
                    None => {
                        self.out.push_str(&node.raw);
                        if is_word_operator(&node.raw) {
                            self.out.push(' ');
                        }
                    }
                }
                for child in &node.children {
                    self.node(child);
                }
                return;
            }
            _ => {}
        }

        self.before(node);
        match node.kind {
            NodeKind::Par => {
                self.out.push('(');
                self.children(node);
                self.out.push(')');
            }
            NodeKind::Argument => {
                self.out.push_str(&node.raw);
                self.children(node);
                self.out.push_str(&node.raw);
            }
            NodeKind::Function => {
                self.out.push_str(&node.raw);
                self.out.push('(');
                self.arguments(node);
                self.out.push(')');
            }
            NodeKind::Modifier => {
                self.out.push('.');
                self.out.push_str(&node.raw);
                self.out.push('(');
                self.arguments(node);
                self.out.push(')');
            }
            NodeKind::DataItem => self.data_item(node),
            NodeKind::Variable => self.variable(node),
            NodeKind::Uid => self.uid(node),
            _ => self.out.push_str(&node.raw),
        }
        self.after(node);

        for modifier in node.modifiers.iter().filter(|m| !m.implicit) {
            self.node(modifier);
        }
    }

    fn children(&mut self, node: &Node) {
        for child in &node.children {
            self.node(child);
        }
    }

    fn arguments(&mut self, node: &Node) {
        for (i, arg) in node.children.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.node(arg);
        }
    }

    fn data_item(&mut self, node: &Node) {
        let NodeValue::DataItem(item) = &node.value else {
            self.out.push_str(&node.raw);
            return;
        };
        match self.mode {
            DescribeMode::Normalise => self.out.push_str(&node.raw),
            DescribeMode::Regenerate(values) => {
                let value = node
                    .data_item()
                    .and_then(|keyed| values.get(&keyed).or_else(|| values.get(&keyed.base())));
                match value {
                    Some(v) => self.out.push_str(&v.to_string()),
                    None => self.out.push_str(&node.raw),
                }
            }
            DescribeMode::Describe(names) => {
                let mut described = item.clone();
                for group in &mut described.groups {
                    for id in &mut group.ids {
                        if let Some(name) = names.get(id.as_str()) {
                            id.clone_from(name);
                        }
                    }
                }
                self.out.push_str(&described.to_string());
            }
        }
    }

    fn variable(&mut self, node: &Node) {
        match (self.mode, node.variable()) {
            (DescribeMode::Describe(names), Some(VariableRef::Rule(name))) => {
                match names.get(name) {
                    Some(display) => self.out.push_str(&node.raw.replacen(name, display, 1)),
                    None => self.out.push_str(&node.raw),
                }
            }
            _ => self.out.push_str(&node.raw),
        }
    }

    fn uid(&mut self, node: &Node) {
        match (self.mode, &node.value) {
            (DescribeMode::Describe(names), NodeValue::Uid(uid)) => match names.get(uid) {
                Some(display) => self.out.push_str(&node.raw.replacen(uid, display, 1)),
                None => self.out.push_str(&node.raw),
            },
            _ => self.out.push_str(&node.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryOp, DataItemType, UnaryOp, Whitespace};
    use pretty_assertions::assert_eq;

    fn item(uid: &str) -> Node {
        let item = DataItem::of(DataItemType::DataElementOperand, &[uid]);
        Node::new(NodeKind::DataItem, item.to_string(), NodeValue::DataItem(item))
    }

    fn binary(symbol: &str, left: Node, right: Node) -> Node {
        let op = BinaryOp::from_symbol(symbol).unwrap();
        Node::new(NodeKind::BinaryOperator, symbol, NodeValue::Binary(op))
            .with_children(vec![left, right])
    }

    fn root(child: Node) -> Node {
        Node::new(NodeKind::Par, "", NodeValue::None).with_children(vec![child])
    }

    #[test]
    fn test_default_spacing() {
        let not = Node::new(NodeKind::UnaryOperator, "not", NodeValue::Unary(UnaryOp::Not))
            .with_children(vec![Node::new(NodeKind::Boolean, "true", NodeValue::Boolean(true))]);
        let minus = Node::new(NodeKind::UnaryOperator, "-", NodeValue::Unary(UnaryOp::Minus))
            .with_children(vec![Node::new(NodeKind::Number, "2", NodeValue::Number(2.0))]);
        let tree = root(binary("and", not, binary("<", minus, item("FTRrcoaog83"))));
        assert_eq!(normalise(&tree), "not true and -2 < #{FTRrcoaog83}");
    }

    #[test]
    fn test_recorded_whitespace_is_reproduced() {
        let mut op = binary("+", item("FTRrcoaog83"), item("HllvX50cXC0"));
        op.whitespace = Some(Whitespace {
            before: "  ".into(),
            after: " /* c */ ".into(),
        });
        let mut tree = root(op);
        tree.whitespace = Some(Whitespace {
            before: "\n".into(),
            after: String::new(),
        });
        assert_eq!(
            normalise(&tree),
            "\n#{FTRrcoaog83}  + /* c */ #{HllvX50cXC0}"
        );
    }

    #[test]
    fn test_regenerate_substitutes_known_items() {
        let tree = root(binary("*", item("FTRrcoaog83"), item("HllvX50cXC0")));
        let values = HashMap::from([(
            DataItem::of(DataItemType::DataElementOperand, &["FTRrcoaog83"]),
            2.5,
        )]);
        assert_eq!(regenerate(&tree, &values), "2.5 * #{HllvX50cXC0}");
    }

    #[test]
    fn test_describe_substitutes_names() {
        let tree = root(binary("-", item("FTRrcoaog83"), item("HllvX50cXC0")));
        let names = HashMap::from([("FTRrcoaog83".to_string(), "ANC 1st visit".to_string())]);
        assert_eq!(describe(&tree, &names), "#{ANC 1st visit} - #{HllvX50cXC0}");
    }

    #[test]
    fn test_nested_parenthesis_is_printed() {
        let inner = Node::new(NodeKind::Par, "", NodeValue::None)
            .with_children(vec![binary("+", item("FTRrcoaog83"), item("HllvX50cXC0"))]);
        let tree = root(binary(
            "*",
            inner,
            Node::new(NodeKind::Number, "2", NodeValue::Number(2.0)),
        ));
        assert_eq!(normalise(&tree), "(#{FTRrcoaog83} + #{HllvX50cXC0}) * 2");
    }
}
