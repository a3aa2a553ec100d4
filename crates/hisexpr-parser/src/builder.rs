//! AST construction from grammar callbacks

use crate::{Decoder, Mark, NodeFactories};
use hisexpr_ast::{Node, NodeKind, Whitespace};
use hisexpr_diagnostics::{E0003, E0005, E0006, E0007, E0008, ErrorCode, ParseError, Span};

/// Error code used when decoding a node of `kind` fails
fn decode_error_code(kind: NodeKind) -> ErrorCode {
    match kind {
        NodeKind::Function => E0005,
        NodeKind::NamedValue => E0006,
        NodeKind::Modifier => E0007,
        NodeKind::DataItem | NodeKind::Variable => E0008,
        _ => E0003,
    }
}

/// Builds the tree with a stack of open nodes.
///
/// The first node opened or added implicitly opens the root `Par`.
pub struct AstBuilder<'a> {
    source: &'a str,
    factories: &'a NodeFactories,
    stack: Vec<Node>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(source: &'a str, factories: &'a NodeFactories) -> Self {
        Self {
            source,
            factories,
            stack: Vec::new(),
        }
    }

    fn ensure_root(&mut self, at: Mark) {
        if self.stack.is_empty() {
            let mut root = Node::new(NodeKind::Par, "", hisexpr_ast::NodeValue::None);
            root.span = Some(Span::point(at.pos));
            root.tokens = Some(Span::point(at.token));
            self.stack.push(root);
        }
    }

    fn create(
        &self,
        kind: NodeKind,
        raw: &str,
        decoder: Option<Decoder>,
        error_span: Span,
    ) -> Result<Node, ParseError> {
        let decode = decoder.unwrap_or_else(|| self.factories.get(kind));
        let value = decode(raw).map_err(|message| {
            ParseError::new(decode_error_code(kind), message, self.source, error_span)
        })?;
        Ok(Node::new(kind, raw, value))
    }

    /// Open a complex node; its children are everything added until the
    /// matching [`end_node`](Self::end_node)
    pub fn begin_node(
        &mut self,
        kind: NodeKind,
        raw: &str,
        at: Mark,
        decoder: Option<Decoder>,
    ) -> Result<(), ParseError> {
        self.ensure_root(at);
        let error_span = Span::new(at.pos, at.pos + raw.chars().count());
        let mut node = self.create(kind, raw, decoder, error_span)?;
        node.span = Some(Span::point(at.pos));
        node.tokens = Some(Span::point(at.token));
        self.stack.push(node);
        Ok(())
    }

    /// Close the innermost open node
    pub fn end_node(&mut self, at: Mark) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(mut node) = self.stack.pop() {
            close(&mut node, at);
            self.push_child(node);
        }
    }

    /// Add a leaf spanning `start..end`. Decoding failures are reported at
    /// the start of the literal.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        raw: &str,
        start: Mark,
        end: Mark,
        decoder: Option<Decoder>,
    ) -> Result<(), ParseError> {
        self.ensure_root(start);
        let mut node = self.create(kind, raw, decoder, Span::point(start.pos))?;
        node.span = Some(Span::new(start.pos, end.pos));
        node.tokens = Some(Span::new(start.token, end.token));
        self.push_child(node);
        Ok(())
    }

    fn push_child(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    /// Close every open node and return the root
    pub fn finish(mut self, at: Mark) -> Node {
        while self.stack.len() > 1 {
            self.end_node(at);
        }
        let mut root = self
            .stack
            .pop()
            .unwrap_or_else(|| Node::new(NodeKind::Par, "", hisexpr_ast::NodeValue::None));
        close(&mut root, at);
        root
    }
}

fn close(node: &mut Node, at: Mark) {
    let start = node.span.map_or(at.pos, |s| s.start);
    node.span = Some(Span::new(start, at.pos));
    let token = node.tokens.map_or(at.token, |t| t.start);
    node.tokens = Some(Span::new(token, at.token));
}

/// Hand the recorded whitespace tokens to the nodes that own them.
///
/// A token between two siblings belongs to the later one as leading
/// whitespace. A parent that starts or ends at the same token as its first
/// or last child keeps that token for itself.
pub fn distribute_whitespace(root: &mut Node, tokens: &[String]) {
    let token = |i: usize| tokens.get(i).cloned().unwrap_or_default();
    if let Some(span) = root.tokens {
        root.whitespace = Some(Whitespace {
            before: token(span.start),
            after: token(span.end),
        });
    }
    distribute_children(root, tokens);
}

fn distribute_children(parent: &mut Node, tokens: &[String]) {
    let Some(outer) = parent.tokens else {
        return;
    };
    let token = |i: usize| tokens.get(i).cloned().unwrap_or_default();
    let starts: Vec<Option<usize>> = parent
        .children
        .iter()
        .map(|c| c.tokens.map(|t| t.start))
        .collect();
    let last = parent.children.len().saturating_sub(1);

    for (i, child) in parent.children.iter_mut().enumerate() {
        let Some(span) = child.tokens else {
            continue;
        };
        let shares_start = i == 0 && span.start == outer.start;
        let shares_end = if i < last {
            starts[i + 1] == Some(span.end)
        } else {
            span.end == outer.end
        };
        child.whitespace = Some(Whitespace {
            before: if shares_start { String::new() } else { token(span.start) },
            after: if shares_end { String::new() } else { token(span.end) },
        });
        distribute_children(child, tokens);
    }
}
