//! Expression evaluator
//!
//! This module provides the [`Evaluator`], a tree-walking interpreter with
//! one case per node kind. Operator and aggregate implementations live in
//! [`crate::operators`]; function calls go through a [`FunctionProvider`].

use crate::context::ExpressionData;
use crate::error::{EvalError, EvalResult};
use crate::provider::{DefaultFunctions, FunctionProvider, call_function};
use hisexpr_ast::{
    BinaryOp, MAX_DEPTH, NamedFunction, Node, NodeKind, NodeValue, ValueType, VariableRef,
    normalise,
};
use hisexpr_types::{LiteralEvaluator, Value, coerce};
use log::trace;

/// Per-call evaluation state
///
/// Holds the data snapshot, the function provider and the series cursor
/// used while an aggregate re-evaluates its argument. A parsed tree can be
/// evaluated by any number of evaluators.
pub struct Evaluator<'a> {
    pub(crate) data: &'a ExpressionData,
    pub(crate) provider: &'a dyn FunctionProvider,
    /// Series index while inside an aggregate function
    pub(crate) cursor: Option<usize>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(data: &'a ExpressionData, provider: &'a dyn FunctionProvider) -> Self {
        Self {
            data,
            provider,
            cursor: None,
            depth: 0,
            max_depth: MAX_DEPTH,
        }
    }

    /// Give up with [`EvalError::RecursionLimit`] below `max_depth` nested
    /// evaluations instead of the default [`MAX_DEPTH`]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate a tree to a plain value; rule variables are unwrapped to
    /// their value or the default of their type
    pub fn evaluate(&mut self, root: &Node) -> EvalResult<Value> {
        Ok(self.eval(root)?.unwrap_variable())
    }

    /// Evaluate one node. Failures are described with the text of the
    /// innermost node they occurred in.
    pub fn eval(&mut self, node: &Node) -> EvalResult<Value> {
        let result = if self.depth >= self.max_depth {
            Err(EvalError::RecursionLimit)
        } else {
            self.depth += 1;
            trace!("Evaluating {:?} `{}`", node.kind, node.raw);
            let result = self.eval_node(node);
            self.depth -= 1;
            result
        };
        result.map_err(|err| err.within(|| normalise(node).trim().to_string()))
    }

    /// Evaluate a node and convert the result to `value_type`
    pub fn eval_as(&mut self, node: &Node, value_type: ValueType) -> EvalResult<Value> {
        let value = self.eval(node)?;
        Ok(coerce(value, value_type)?)
    }

    fn eval_node(&mut self, node: &Node) -> EvalResult<Value> {
        match (&node.kind, &node.value) {
            (NodeKind::Par | NodeKind::Argument, _) => match node.single_child() {
                Some(child) => self.eval(child),
                None => Ok(Value::Null),
            },
            (_, NodeValue::Number(n)) => Ok(Value::Number(*n)),
            (_, NodeValue::Integer(n)) => Ok(Value::Number(*n as f64)),
            (_, NodeValue::String(s) | NodeValue::Uid(s) | NodeValue::Identifier(s)) => {
                Ok(Value::String(s.clone()))
            }
            (_, NodeValue::Date(d)) => Ok(Value::Date(*d)),
            (_, NodeValue::Boolean(b)) => Ok(Value::Boolean(*b)),
            (_, NodeValue::NamedValue(name)) => {
                Ok(self.data.named_value(*name).cloned().unwrap_or(Value::Null))
            }
            (_, NodeValue::DataItem(_)) => Ok(self.eval_data_item(node)),
            (_, NodeValue::Variable(variable)) => self.eval_variable(variable),
            (_, NodeValue::Binary(_)) => self.eval_binary(node),
            (_, NodeValue::Unary(op)) => self.eval_unary(*op, &node.children),
            (_, NodeValue::Function(function)) => self.eval_function(*function, &node.children),
            (_, NodeValue::AggregationType(_) | NodeValue::Modifier(_) | NodeValue::None) => {
                Ok(Value::Null)
            }
        }
    }

    /// Missing items are null. Inside an aggregate the value at the cursor
    /// of a bound series takes precedence.
    fn eval_data_item(&self, node: &Node) -> Value {
        let Some(item) = node.data_item() else {
            return Value::Null;
        };
        if let Some(index) = self.cursor {
            if let Some(series) = self.data.series(&item) {
                return series.get(index).cloned().unwrap_or(Value::Null);
            }
        }
        match self.data.item(&item) {
            Some(value) => value.clone(),
            None => {
                trace!("No value for {item}");
                Value::Null
            }
        }
    }

    fn eval_variable(&self, variable: &VariableRef) -> EvalResult<Value> {
        match variable {
            VariableRef::Program(var) => Ok(self
                .data
                .program_variable(*var)
                .cloned()
                .unwrap_or(Value::Null)),
            VariableRef::Rule(name) => self
                .data
                .variable(name)
                .map(|value| Value::Variable(Box::new(value.clone())))
                .ok_or_else(|| EvalError::unknown_variable(name.as_str())),
        }
    }

    /// Operator chains nest to the left, so `a + b + c` is `(a + b) + c`.
    /// The left spine is walked with a loop and each operator applied to the
    /// running value, so the call stack does not grow with the chain.
    fn eval_binary(&mut self, node: &Node) -> EvalResult<Value> {
        let mut spine = Vec::new();
        let mut leftmost = node;
        while let Some((op, left, right)) = binary_operands(leftmost) {
            spine.push((leftmost, op, right));
            leftmost = left;
        }
        if spine.is_empty() {
            let symbol = node.binary_op().map_or("?", |op| op.symbol());
            return Err(EvalError::illegal_operation(format!(
                "`{symbol}` needs two operands"
            )));
        }

        let mut value = self.eval(leftmost)?;
        for (chain, op, right) in spine.into_iter().rev() {
            value = self
                .apply_binary(op, value, right)
                .map_err(|err| err.within(|| normalise(chain).trim().to_string()))?;
        }
        Ok(value)
    }

    fn apply_binary(&mut self, op: BinaryOp, left: Value, right: &Node) -> EvalResult<Value> {
        match op {
            BinaryOp::Pow
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Add
            | BinaryOp::Sub => self.eval_arithmetic(op, left, right),
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                self.eval_relational(op, left, right)
            }
            BinaryOp::Eq | BinaryOp::Ne => self.eval_equality(op, left, right),
            BinaryOp::And => self.eval_and(left, right),
            BinaryOp::Or => self.eval_or(left, right),
        }
    }

    fn eval_function(&mut self, function: NamedFunction, args: &[Node]) -> EvalResult<Value> {
        if function.is_lazy() {
            return self.eval_conditional(function, args);
        }
        if function.is_aggregating() {
            return self.eval_aggregate(function, args);
        }

        let signature = function.signature();
        let values = args
            .iter()
            .enumerate()
            .map(|(i, arg)| self.eval_as(arg, signature.param_type(i)))
            .collect::<EvalResult<Vec<_>>>()?;
        call_function(self.provider, function, &values, self.data)
    }

    /// Functions that evaluate only the arguments they need
    fn eval_conditional(&mut self, function: NamedFunction, args: &[Node]) -> EvalResult<Value> {
        match function {
            NamedFunction::If | NamedFunction::D2Condition => {
                let [condition, then, otherwise] = args else {
                    return Err(EvalError::invalid_argument(function.name(), "expected three arguments"));
                };
                // A null condition takes the else branch
                match self.eval_as(condition, ValueType::Boolean)? {
                    Value::Boolean(true) => self.eval(then),
                    _ => self.eval(otherwise),
                }
            }
            NamedFunction::IsNull | NamedFunction::IsNotNull => {
                let is_null = match args.first() {
                    Some(arg) => self.eval(arg)?.is_null(),
                    None => true,
                };
                Ok(Value::Boolean(is_null == (function == NamedFunction::IsNull)))
            }
            NamedFunction::FirstNonNull => {
                for arg in args {
                    let value = self.eval(arg)?;
                    if !value.is_null() {
                        return Ok(value);
                    }
                }
                Ok(Value::Null)
            }
            other => self.provider.unsupported(other),
        }
    }
}

fn binary_operands(node: &Node) -> Option<(BinaryOp, &Node, &Node)> {
    match (node.binary_op(), node.children.as_slice()) {
        (Some(op), [left, right]) => Some((op, left, right)),
        _ => None,
    }
}

/// Evaluates statically defined sub-expressions for the type checker
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticEvaluator;

impl LiteralEvaluator for StaticEvaluator {
    fn evaluate_literal(&self, node: &Node) -> Result<Value, String> {
        let data = ExpressionData::default();
        Evaluator::new(&data, &DefaultFunctions)
            .evaluate(node)
            .map_err(|err| err.root_cause().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hisexpr_ast::{DataItem, DataItemType};
    use hisexpr_types::VariableValue;

    fn number(n: f64) -> Node {
        Node::new(NodeKind::Number, n.to_string(), NodeValue::Number(n))
    }

    fn rule_variable(name: &str) -> Node {
        Node::new(
            NodeKind::Variable,
            format!("#{{{name}}}"),
            NodeValue::Variable(VariableRef::Rule(name.into())),
        )
    }

    fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        Node::new(NodeKind::BinaryOperator, op.symbol(), NodeValue::Binary(op))
            .with_children(vec![left, right])
    }

    fn evaluate(node: &Node, data: &ExpressionData) -> EvalResult<Value> {
        Evaluator::new(data, &DefaultFunctions).evaluate(node)
    }

    #[test]
    fn test_operator_nodes() {
        let node = binary(BinaryOp::Add, number(1.5), binary(BinaryOp::Mul, number(2.0), number(3.0)));
        assert_eq!(evaluate(&node, &ExpressionData::default()), Ok(Value::Number(7.5)));
    }

    #[test]
    fn test_rule_variables_unwrap_at_the_end() {
        let data = ExpressionData::new()
            .with_variable("age", VariableValue::new(ValueType::Number, 12.0))
            .with_variable("name", VariableValue::empty(ValueType::String));
        assert_eq!(evaluate(&rule_variable("age"), &data), Ok(Value::Number(12.0)));
        assert_eq!(evaluate(&rule_variable("name"), &data), Ok(Value::string("")));
    }

    #[test]
    fn test_unknown_rule_variable() {
        let err = evaluate(&rule_variable("missing"), &ExpressionData::default()).unwrap_err();
        assert_eq!(err.root_cause(), &EvalError::unknown_variable("missing"));
        assert_eq!(err.to_string(), "Unknown variable: 'missing' in `#{missing}`");
    }

    #[test]
    fn test_missing_data_item_is_null() {
        let item = DataItem::of(DataItemType::Constant, &["bWEgzTHB7Uv"]);
        let node = Node::new(NodeKind::DataItem, "C{bWEgzTHB7Uv}", NodeValue::DataItem(item.clone()));
        assert_eq!(evaluate(&node, &ExpressionData::default()), Ok(Value::Null));

        let data = ExpressionData::new().with_item(item, 2.5);
        assert_eq!(evaluate(&node, &data), Ok(Value::Number(2.5)));
    }

    #[test]
    fn test_recursion_limit_names_the_sub_expression() {
        let mut node = number(1.0);
        for _ in 0..4 {
            node = Node::new(NodeKind::Par, "", NodeValue::None).with_children(vec![node]);
        }
        let data = ExpressionData::default();
        let err = Evaluator::new(&data, &DefaultFunctions)
            .with_max_depth(3)
            .evaluate(&node)
            .unwrap_err();
        assert_eq!(err.root_cause(), &EvalError::RecursionLimit);
        assert!(matches!(err, EvalError::InExpression { .. }), "{err:?}");
        assert_eq!(err.code(), hisexpr_diagnostics::E0200);
    }

    #[test]
    fn test_long_chains_evaluate_past_the_depth_limit() {
        let mut node = number(1.0);
        for _ in 1..MAX_DEPTH * 2 {
            node = binary(BinaryOp::Add, node, number(1.0));
        }
        let expected = (MAX_DEPTH * 2) as f64;
        assert_eq!(evaluate(&node, &ExpressionData::default()), Ok(Value::Number(expected)));
    }

    #[test]
    fn test_chain_failures_name_the_failing_operator() {
        let node = binary(
            BinaryOp::Add,
            binary(BinaryOp::Add, number(1.0), rule_variable("missing")),
            number(2.0),
        );
        let err = evaluate(&node, &ExpressionData::default()).unwrap_err();
        assert_eq!(err.root_cause(), &EvalError::unknown_variable("missing"));
        assert_eq!(err.to_string(), "Unknown variable: 'missing' in `#{missing}`");
    }

    #[test]
    fn test_static_evaluator_reports_the_cause() {
        let not = Node::new(
            NodeKind::UnaryOperator,
            "!",
            NodeValue::Unary(hisexpr_ast::UnaryOp::Not),
        )
        .with_children(vec![number(45.6)]);
        let err = StaticEvaluator.evaluate_literal(&not).unwrap_err();
        assert_eq!(err, "Cannot convert `45.6` to type BOOLEAN");
        assert_eq!(StaticEvaluator.evaluate_literal(&number(2.0)), Ok(Value::Number(2.0)));
    }
}
