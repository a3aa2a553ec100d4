//! Collect referenced items from a tree

use crate::{DataItem, NamedFunction, Node, NodeKind, NodeValue, ProgramVariable, VariableRef};
use indexmap::IndexSet;

/// Data items with their resolved modifiers, first occurrence order
pub fn collect_data_items(root: &Node) -> Vec<DataItem> {
    let mut items = IndexSet::new();
    root.walk(&mut |node| {
        if let Some(item) = node.data_item() {
            items.insert(item);
        }
    });
    items.into_iter().collect()
}

/// Names of referenced rule variables
pub fn collect_variable_names(root: &Node) -> Vec<String> {
    let mut names = IndexSet::new();
    root.walk(&mut |node| {
        if let Some(VariableRef::Rule(name)) = node.variable() {
            names.insert(name.clone());
        }
    });
    names.into_iter().collect()
}

pub fn collect_program_variables(root: &Node) -> Vec<ProgramVariable> {
    let mut variables = IndexSet::new();
    root.walk(&mut |node| {
        if let Some(VariableRef::Program(var)) = node.variable() {
            variables.insert(*var);
        }
    });
    variables.into_iter().collect()
}

/// Identifiers passed to organisation unit functions
pub fn collect_uids(root: &Node) -> Vec<String> {
    let mut uids = IndexSet::new();
    root.walk(&mut |node| {
        if !node.function().is_some_and(|f| f.takes_org_unit_uids()) {
            return;
        }
        for arg in &node.children {
            if let NodeValue::Uid(uid) = &arg.unwrap_groups().value {
                uids.insert(uid.clone());
            }
        }
    });
    uids.into_iter().collect()
}

pub fn collect_functions(root: &Node) -> Vec<NamedFunction> {
    let mut functions = IndexSet::new();
    root.walk(&mut |node| {
        if node.kind == NodeKind::Function {
            if let Some(f) = node.function() {
                functions.insert(f);
            }
        }
    });
    functions.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataItemType;

    fn call(function: NamedFunction, args: Vec<Node>) -> Node {
        let args = args
            .into_iter()
            .map(|a| Node::new(NodeKind::Argument, "", NodeValue::None).with_children(vec![a]))
            .collect();
        Node::new(NodeKind::Function, function.name(), NodeValue::Function(function))
            .with_children(args)
    }

    #[test]
    fn test_collects_unique_in_order() {
        let uid = |id: &str| Node::new(NodeKind::Uid, id, NodeValue::Uid(id.to_string()));
        let item = |id: &str| {
            let item = DataItem::of(DataItemType::Constant, &[id]);
            Node::new(NodeKind::DataItem, item.to_string(), NodeValue::DataItem(item))
        };
        let rule = |name: &str| {
            Node::new(
                NodeKind::Variable,
                format!("#{{{name}}}"),
                NodeValue::Variable(VariableRef::Rule(name.to_string())),
            )
        };
        let tree = Node::new(NodeKind::Par, "", NodeValue::None).with_children(vec![call(
            NamedFunction::If,
            vec![
                call(NamedFunction::OrgUnitGroup, vec![uid("CXw2yu5fodb"), uid("CXw2yu5fodb")]),
                item("bWEgzTHB7Uv"),
                call(NamedFunction::Greatest, vec![rule("age"), rule("age"), item("bWEgzTHB7Uv")]),
            ],
        )]);

        assert_eq!(collect_uids(&tree), vec!["CXw2yu5fodb"]);
        assert_eq!(collect_variable_names(&tree), vec!["age"]);
        assert_eq!(collect_data_items(&tree).len(), 1);
        assert_eq!(
            collect_functions(&tree),
            vec![NamedFunction::If, NamedFunction::OrgUnitGroup, NamedFunction::Greatest]
        );
        assert!(collect_program_variables(&tree).is_empty());
    }
}
