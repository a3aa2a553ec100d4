//! Post-parse tree rewrites
//!
//! The parser produces flat operand/operator/operand child lists with
//! dot-modifiers as ordinary siblings. [`attach_modifiers`] moves modifiers
//! onto the nodes they modify, then [`group_operators`] nests operators by
//! precedence.

use crate::{BinaryOp, DataItemModifier, Node, NodeKind, NodeValue, UnaryOp};
use log::trace;

/// Rebuild a node's children with `update`, then recurse into the new children
pub fn transform_children(mut node: Node, update: &impl Fn(Vec<Node>) -> Vec<Node>) -> Node {
    transform_in_place(&mut node, update);
    node
}

fn transform_in_place(node: &mut Node, update: &impl Fn(Vec<Node>) -> Vec<Node>) {
    node.children = update(std::mem::take(&mut node.children));
    for child in &mut node.children {
        transform_in_place(child, update);
    }
}

/// Nest the flat operator lists, highest precedence first
pub fn group_operators(root: Node) -> Node {
    trace!("grouping `^`");
    let mut root = transform_children(root, &group_power);
    trace!("grouping unary operators");
    root = transform_children(root, &group_unary);
    for family in &BinaryOp::GROUPS[1..] {
        trace!("grouping {family:?}");
        root = transform_children(root, &|children| group_left_assoc(children, family));
    }
    root
}

fn is_placeholder_of(node: &Node, family: &[BinaryOp]) -> bool {
    node.is_placeholder() && node.binary_op().is_some_and(|op| family.contains(&op))
}

fn is_unary_placeholder(node: &Node) -> bool {
    node.is_placeholder() && node.unary_op().is_some()
}

fn is_sign_placeholder(node: &Node) -> bool {
    node.is_placeholder() && node.unary_op().is_some_and(|op| op.is_sign())
}

/// Pop the nearest operand, absorbing any sign operators in front of it
fn take_signed_operand(stack: &mut Vec<Node>) -> Option<Node> {
    let mut node = stack.pop()?;
    if is_sign_placeholder(&node) {
        let operand = take_signed_operand(stack)?;
        node.children.push(operand);
    }
    Some(node)
}

/// `^` is right-associative, so scan right to left. `stack` holds the
/// already seen nodes with the nearest one on top.
fn group_power(children: Vec<Node>) -> Vec<Node> {
    if !children.iter().any(|c| is_placeholder_of(c, &[BinaryOp::Pow])) {
        return children;
    }
    let mut stack: Vec<Node> = Vec::with_capacity(children.len());
    let mut pending: Option<(Node, Node)> = None;
    for node in children.into_iter().rev() {
        if is_placeholder_of(&node, &[BinaryOp::Pow]) {
            match take_signed_operand(&mut stack) {
                Some(right) => pending = Some((node, right)),
                None => stack.push(node),
            }
            continue;
        }
        match pending.take() {
            Some((mut op, right)) => {
                op.children = vec![node, right];
                stack.push(op);
            }
            None => stack.push(node),
        }
    }
    if let Some((op, right)) = pending {
        stack.push(right);
        stack.push(op);
    }
    stack.reverse();
    stack
}

/// Each unary operator takes the node right after it; scanning right to left
/// nests chains such as `--10`
fn group_unary(children: Vec<Node>) -> Vec<Node> {
    if !children.iter().any(is_unary_placeholder) {
        return children;
    }
    let mut stack: Vec<Node> = Vec::with_capacity(children.len());
    for mut node in children.into_iter().rev() {
        if is_unary_placeholder(&node) {
            if let Some(operand) = stack.pop() {
                node.children.push(operand);
            }
        }
        stack.push(node);
    }
    stack.reverse();
    stack
}

fn group_left_assoc(children: Vec<Node>, family: &[BinaryOp]) -> Vec<Node> {
    if !children.iter().any(|c| is_placeholder_of(c, family)) {
        return children;
    }
    let mut grouped: Vec<Node> = Vec::with_capacity(children.len());
    let mut rest = children.into_iter();
    while let Some(mut node) = rest.next() {
        if is_placeholder_of(&node, family) {
            if let (Some(left), Some(right)) = (grouped.pop(), rest.next()) {
                node.children = vec![left, right];
            }
        }
        grouped.push(node);
    }
    grouped
}

/// Move dot-modifier siblings onto the node they follow, bottom-up.
///
/// A modifier following anything other than a data item or program variable
/// stays on that node for printing and is copied, marked implicit, onto
/// every data item and program variable inside it. Data items inside the
/// aggregated argument of an aggregating function get an implicit
/// `periodAggregation` modifier.
pub fn attach_modifiers(mut node: Node) -> Node {
    let children = std::mem::take(&mut node.children);
    let mut attached: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        let child = attach_modifiers(child);
        if child.kind != NodeKind::Modifier {
            attached.push(child);
            continue;
        }
        match attached.last_mut() {
            Some(target) => {
                if !target.accepts_modifiers() {
                    let mut copy = child.clone();
                    copy.implicit = true;
                    copy.whitespace = None;
                    add_to_items(target, &copy, &|n: &Node| n.accepts_modifiers());
                }
                trace!("attaching .{} to {}", child.raw, target.raw);
                target.modifiers.push(child);
            }
            None => attached.push(child),
        }
    }
    node.children = attached;

    if let NodeValue::Function(f) = node.value {
        if f.is_aggregating() {
            let marker = Node::new(
                NodeKind::Modifier,
                DataItemModifier::PeriodAggregation.name(),
                NodeValue::Modifier(DataItemModifier::PeriodAggregation),
            );
            let marker = Node {
                implicit: true,
                ..marker
            };
            if let Some(arg) = node.children.get_mut(f.aggregated_arg()) {
                add_to_items(arg, &marker, &|n: &Node| n.kind == NodeKind::DataItem);
            }
        }
    }
    node
}

fn add_to_items(node: &mut Node, modifier: &Node, accepts: &impl Fn(&Node) -> bool) {
    if accepts(node) {
        let already = modifier.value == NodeValue::Modifier(DataItemModifier::PeriodAggregation)
            && node.modifiers.iter().any(|m| m.value == modifier.value);
        if !already {
            node.modifiers.push(modifier.clone());
        }
    }
    for child in &mut node.children {
        add_to_items(child, modifier, accepts);
    }
}

/// Whether `node` is `distinct <expr>` once groups are unwrapped
pub fn strip_distinct(node: &Node) -> Option<&Node> {
    let inner = node.unwrap_groups();
    match inner.unary_op() {
        Some(UnaryOp::Distinct) => inner.children.first(),
        _ => None,
    }
}
