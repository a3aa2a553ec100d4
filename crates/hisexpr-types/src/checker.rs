//! Static type checking
//!
//! The checker walks the tree once and compares every operand of an
//! operator, function or modifier against the declared parameter type.
//! Mismatching operands that are statically defined are converted for real,
//! so `if(1, 2, 3)` passes while `!45.6` fails.

use crate::{TypeCoercer, Value, VariableValue, coerce};
use hisexpr_ast::{Node, NodeKind, NodeValue, Signature, ValueType, VariableRef, normalise};
use hisexpr_diagnostics::{E0100, E0101, E0102, E0103, Issue};
use log::trace;
use std::collections::HashMap;

/// Evaluates statically defined sub-expressions for the literal fallback
pub trait LiteralEvaluator {
    fn evaluate_literal(&self, node: &Node) -> Result<Value, String>;
}

/// Accumulated validation findings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl Validation {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn error(&mut self, issue: Issue) {
        self.errors.push(issue);
    }

    pub fn warning(&mut self, issue: Issue) {
        self.warnings.push(issue);
    }
}

/// Stamp every rule variable node with the type of its supplied value.
///
/// Works on a copy so the parsed tree stays untouched.
pub fn annotate_variables(root: &Node, variables: &HashMap<String, VariableValue>) -> Node {
    let mut root = root.clone();
    stamp(&mut root, variables);
    root
}

fn stamp(node: &mut Node, variables: &HashMap<String, VariableValue>) {
    if let NodeValue::Variable(VariableRef::Rule(name)) = &node.value {
        if let Some(var) = variables.get(name) {
            node.actual_value_type = Some(var.value_type);
        }
    }
    for child in &mut node.children {
        stamp(child, variables);
    }
}

fn text_of(node: &Node) -> String {
    normalise(node).trim().to_string()
}

pub struct TypeChecker<'a> {
    coercer: TypeCoercer,
    literals: &'a dyn LiteralEvaluator,
    report: Validation,
}

impl<'a> TypeChecker<'a> {
    pub fn new(literals: &'a dyn LiteralEvaluator) -> Self {
        Self {
            coercer: TypeCoercer::new(),
            literals,
            report: Validation::default(),
        }
    }

    /// Check operand types across the whole tree
    pub fn check(mut self, root: &Node) -> Validation {
        self.visit(root);
        self.report
    }

    /// Check operand types and the top-level result type
    pub fn check_with_result(mut self, root: &Node, accepted: &[ValueType]) -> Validation {
        self.visit(root);
        self.check_result_type(root, accepted);
        self.report
    }

    fn visit(&mut self, node: &Node) {
        for child in &node.children {
            self.visit(child);
        }
        for modifier in node.modifiers.iter().filter(|m| !m.implicit) {
            self.visit(modifier);
        }

        match &node.value {
            NodeValue::Binary(op) if node.kind == NodeKind::BinaryOperator => {
                let t = op.operand_type();
                self.check_operands(&node.children, |_| t, t == ValueType::Same);
            }
            NodeValue::Unary(op) if node.kind == NodeKind::UnaryOperator => {
                let t = op.operand_type();
                self.check_operands(&node.children, |_| t, false);
            }
            NodeValue::Function(f) => self.check_call(&node.children, f.signature()),
            NodeValue::Modifier(m) => self.check_call(&node.children, m.signature()),
            _ => {}
        }
    }

    fn check_call(&mut self, args: &[Node], sig: Signature) {
        self.check_operands(args, |i| sig.param_type(i), sig.has_same_group());
    }

    fn check_operands(
        &mut self,
        operands: &[Node],
        expected: impl Fn(usize) -> ValueType,
        same_group: bool,
    ) {
        let mut fixed: Option<ValueType> = None;
        for (i, operand) in operands.iter().enumerate() {
            let expected = expected(i);
            if expected == ValueType::Same {
                if same_group {
                    self.check_same(operand, &mut fixed);
                }
                continue;
            }
            self.check_operand(operand, expected);
        }
    }

    /// The first resolved `Same` operand fixes the type the others must match
    fn check_same(&mut self, operand: &Node, fixed: &mut Option<ValueType>) {
        let actual = operand.value_type();
        if actual.is_unresolved() {
            return;
        }
        let Some(expected) = *fixed else {
            *fixed = Some(actual);
            return;
        };
        if self.coercer.is_assignable(actual, expected) {
            return;
        }
        let issue = |code| {
            Issue::error(
                code,
                format!(
                    "Expression `{}` of type {actual} does not match type {expected}",
                    text_of(operand)
                ),
            )
            .with_span(operand.span)
        };
        if self.coercer.is_maybe_assignable(actual, expected) {
            self.report.warning(issue(E0102));
        } else {
            self.report.error(issue(E0102));
        }
    }

    fn check_operand(&mut self, operand: &Node, expected: ValueType) {
        let actual = operand.value_type();
        if self.coercer.is_assignable(actual, expected) {
            return;
        }
        trace!("operand of type {actual} where {expected} is expected");

        if operand.is_statically_defined() {
            let converted = self
                .literals
                .evaluate_literal(operand)
                .and_then(|value| coerce(value, expected).map_err(|e| e.to_string()));
            if converted.is_err() {
                self.report.error(
                    Issue::error(
                        E0101,
                        format!(
                            "Literal `{}` cannot be converted to type {expected}",
                            text_of(operand)
                        ),
                    )
                    .with_span(operand.span),
                );
            }
            return;
        }

        let message = format!(
            "Expression `{}` of type {actual} is used where {expected} is expected",
            text_of(operand)
        );
        if self.coercer.is_maybe_assignable(actual, expected) {
            self.report
                .warning(Issue::warning(E0100, message).with_span(operand.span));
        } else {
            self.report
                .error(Issue::error(E0100, message).with_span(operand.span));
        }
    }

    fn check_result_type(&mut self, root: &Node, accepted: &[ValueType]) {
        let actual = root.value_type();
        if actual.is_unresolved() || accepted.is_empty() {
            return;
        }
        if accepted.iter().any(|t| self.coercer.is_assignable(actual, *t)) {
            return;
        }
        let expected = accepted
            .iter()
            .map(ValueType::name)
            .collect::<Vec<_>>()
            .join(" or ");
        self.report.error(
            Issue::error(
                E0103,
                format!("Expression must be of type {expected} but is of type {actual}"),
            )
            .with_span(root.span),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hisexpr_ast::{BinaryOp, NamedFunction, UnaryOp};
    use hisexpr_diagnostics::Span;

    struct Literals;

    impl LiteralEvaluator for Literals {
        fn evaluate_literal(&self, node: &Node) -> Result<Value, String> {
            match &node.unwrap_groups().value {
                NodeValue::Number(n) => Ok(Value::Number(*n)),
                NodeValue::String(s) => Ok(Value::string(s.clone())),
                NodeValue::Boolean(b) => Ok(Value::Boolean(*b)),
                NodeValue::None => Ok(Value::Null),
                other => Err(format!("not a literal: {other:?}")),
            }
        }
    }

    fn number(n: f64) -> Node {
        Node::new(NodeKind::Number, n.to_string(), NodeValue::Number(n)).with_span(Span::new(1, 5))
    }

    fn arg(node: Node) -> Node {
        Node::new(NodeKind::Argument, "", NodeValue::None).with_children(vec![node])
    }

    fn rule_var(name: &str) -> Node {
        Node::new(
            NodeKind::Variable,
            format!("#{{{name}}}"),
            NodeValue::Variable(VariableRef::Rule(name.to_string())),
        )
    }

    #[test]
    fn test_non_integral_literal_cannot_be_boolean() {
        let not = Node::new(NodeKind::UnaryOperator, "!", NodeValue::Unary(UnaryOp::Not))
            .with_children(vec![number(45.6)]);
        let report = TypeChecker::new(&Literals).check(&not);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].message,
            "Literal `45.6` cannot be converted to type BOOLEAN"
        );
        assert_eq!(report.errors[0].span, Some(Span::new(1, 5)));
    }

    #[test]
    fn test_integral_literal_passes_as_boolean() {
        let call = Node::new(NodeKind::Function, "if", NodeValue::Function(NamedFunction::If))
            .with_children(vec![
                arg(number(1.0)),
                arg(Node::new(NodeKind::Null, "null", NodeValue::None)),
                arg(number(42.0)),
            ]);
        assert!(TypeChecker::new(&Literals).check(&call).is_empty());
    }

    #[test]
    fn test_mixed_variable_is_accepted_and_annotated_variable_is_checked() {
        let not = Node::new(NodeKind::UnaryOperator, "!", NodeValue::Unary(UnaryOp::Not))
            .with_children(vec![rule_var("name")]);
        assert!(TypeChecker::new(&Literals).check(&not).is_empty());

        let variables = HashMap::from([(
            "name".to_string(),
            VariableValue::new(ValueType::Date, Value::Null),
        )]);
        let annotated = annotate_variables(&not, &variables);
        let report = TypeChecker::new(&Literals).check(&annotated);
        assert_eq!(report.errors.len(), 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_maybe_assignable_is_a_warning() {
        let variables = HashMap::from([(
            "flag".to_string(),
            VariableValue::new(ValueType::String, "true"),
        )]);
        let not = Node::new(NodeKind::UnaryOperator, "!", NodeValue::Unary(UnaryOp::Not))
            .with_children(vec![rule_var("flag")]);
        let report = TypeChecker::new(&Literals).check(&annotate_variables(&not, &variables));
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_same_arguments_must_agree() {
        let text = Node::new(NodeKind::String, "'a'", NodeValue::String("a".into()));
        let date = Node::new(NodeKind::Date, "2020-01-01", NodeValue::None);
        let call = Node::new(
            NodeKind::Function,
            "firstNonNull",
            NodeValue::Function(NamedFunction::FirstNonNull),
        )
        .with_children(vec![arg(date), arg(number(1.0)), arg(text)]);
        let report = TypeChecker::new(&Literals).check(&call);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 0);
    }

    #[test]
    fn test_result_type() {
        let lt = Node::new(NodeKind::BinaryOperator, "<", NodeValue::Binary(BinaryOp::Lt))
            .with_children(vec![number(1.0), number(2.0)]);
        let report =
            TypeChecker::new(&Literals).check_with_result(&lt, &[ValueType::Number]);
        assert_eq!(
            report.errors[0].message,
            "Expression must be of type NUMBER but is of type BOOLEAN"
        );
        assert!(
            TypeChecker::new(&Literals)
                .check_with_result(&lt, &[ValueType::Number, ValueType::Boolean])
                .is_empty()
        );
    }
}
