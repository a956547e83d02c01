//! Evaluation of parsed path expressions against an arena document.

use std::collections::HashSet;

use super::parser::{Axis, Condition, LocationPath, NodeTest, Operand, Predicate, Union};
use crate::xml::{Document, NodeId, NodeKind};

/// Evaluates a union, returning de-duplicated nodes in document order.
pub(crate) fn select(document: &Document, union: &Union, context: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    for path in &union.paths {
        result.extend(evaluate_path(document, path, context));
    }

    if union.paths.len() > 1 {
        document.sort_in_document_order(&mut result);
    }
    result
}

fn evaluate_path(document: &Document, path: &LocationPath, context: NodeId) -> Vec<NodeId> {
    let mut current = vec![if path.absolute {
        document.root()
    } else {
        context
    }];

    for step in &path.steps {
        let mut next = Vec::new();
        let mut seen = HashSet::new();

        for node in &current {
            let candidates: Vec<NodeId> = axis_nodes(document, step.axis, *node)
                .into_iter()
                .filter(|candidate| matches_test(document, step.axis, &step.test, *candidate))
                .collect();

            for selected in apply_predicates(document, &step.predicates, candidates) {
                if seen.insert(selected) {
                    next.push(selected);
                }
            }
        }

        document.sort_in_document_order(&mut next);
        if next.is_empty() {
            return next;
        }
        current = next;
    }

    current
}

/// Candidate nodes along an axis; reverse axes yield nearest first so that
/// positional predicates count by proximity.
fn axis_nodes(document: &Document, axis: Axis, node: NodeId) -> Vec<NodeId> {
    match axis {
        Axis::Child => document.children(node).to_vec(),
        Axis::Descendant => document.descendants(node),
        Axis::DescendantOrSelf => {
            let mut nodes = vec![node];
            nodes.extend(document.descendants(node));
            nodes
        }
        Axis::Parent => document.parent(node).into_iter().collect(),
        Axis::Ancestor => document.ancestors(node),
        Axis::AncestorOrSelf => {
            let mut nodes = vec![node];
            nodes.extend(document.ancestors(node));
            nodes
        }
        Axis::SelfNode => vec![node],
        Axis::Attribute => document.attributes(node).to_vec(),
    }
}

/// Name and `*` tests pick attributes on the attribute axis and elements on
/// every other axis.
fn matches_test(document: &Document, axis: Axis, test: &NodeTest, node: NodeId) -> bool {
    match (test, document.kind(node)) {
        (NodeTest::AnyNode, Some(_)) => true,
        (NodeTest::AnyElement, Some(NodeKind::Element(_))) => axis != Axis::Attribute,
        (NodeTest::AnyElement, Some(NodeKind::Attribute { .. })) => axis == Axis::Attribute,
        (NodeTest::Name(expected), Some(NodeKind::Element(name))) => axis != Axis::Attribute && expected == name,
        (NodeTest::Name(expected), Some(NodeKind::Attribute { name, .. })) => {
            axis == Axis::Attribute && expected == name
        }
        (NodeTest::Text, Some(NodeKind::Text(_))) => true,
        _ => false,
    }
}

fn apply_predicates(document: &Document, predicates: &[Predicate], mut candidates: Vec<NodeId>) -> Vec<NodeId> {
    for predicate in predicates {
        candidates = match predicate {
            Predicate::Position(position) => candidates.get(position - 1).copied().into_iter().collect(),
            Predicate::Condition(condition) => candidates
                .into_iter()
                .filter(|candidate| holds(document, condition, *candidate))
                .collect(),
        };
    }
    candidates
}

fn holds(document: &Document, condition: &Condition, node: NodeId) -> bool {
    match condition {
        Condition::Or(left, right) => holds(document, left, node) || holds(document, right, node),
        Condition::And(left, right) => holds(document, left, node) && holds(document, right, node),
        Condition::Not(inner) => !holds(document, inner, node),
        Condition::Exists(path) => !evaluate_path(document, path, node).is_empty(),
        Condition::Compare { left, right, equal } => {
            let left = operand_values(document, left, node);
            let right = operand_values(document, right, node);
            left.iter()
                .any(|l| right.iter().any(|r| (l == r) == *equal))
        }
    }
}

fn operand_values(document: &Document, operand: &Operand, node: NodeId) -> Vec<String> {
    match operand {
        Operand::Literal(text) => vec![text.clone()],
        Operand::Path(path) => evaluate_path(document, path, node)
            .into_iter()
            .map(|found| document.string_value(found).trim().to_string())
            .collect(),
    }
}
