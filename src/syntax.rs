//! Shape discovery: locate `label = value ;` in a token stream and parse the
//! value into a small tree.
//!
//! The grammar is
//!
//! ```text
//! assignment := LABEL '=' value ';'
//! value      := ITEM | group
//! group      := '{' [ child { ',' child } [ ',' ] ] '}'
//! child      := [ NAME '=' ] ITEM | group
//! ```
//!
//! A [`Node`] says nothing about types. The projections ([`Node::scalar`],
//! [`Node::elements`], [`Node::rows`], [`Node::instances`]) check that the tree
//! has the nesting a schema shape needs and hand back flat leaf lists for the
//! decoders. Every call builds fresh vectors; no state is shared between
//! nested loads.

use crate::error::TdrpError;
use crate::token::{Location, Token};

/// A value token together with its index in the stream.
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    pub token: &'a Token,
    pub index: usize,
}

impl<'a> Leaf<'a> {
    pub fn location(&self) -> Location {
        Location::new(self.token.line, self.index)
    }

    pub fn text(&self) -> &'a str {
        &self.token.text
    }
}

/// A parsed value.
#[derive(Debug, Clone)]
pub enum Node<'a> {
    Item {
        /// Set for `name = value` children inside a group.
        name: Option<Leaf<'a>>,
        value: Leaf<'a>,
    },
    Group {
        /// The opening brace.
        open: Leaf<'a>,
        children: Vec<Node<'a>>,
    },
}

/// One record field value, optionally labelled with its field name.
#[derive(Debug, Clone, Copy)]
pub struct FieldItem<'a> {
    pub name: Option<Leaf<'a>>,
    pub value: Leaf<'a>,
}

/// One group of leaves (a 2-D row or a record instance) and where it opened.
#[derive(Debug, Clone)]
pub struct LeafGroup<T> {
    pub open: Location,
    pub items: Vec<T>,
}

impl<'a> Node<'a> {
    pub fn location(&self) -> Location {
        match self {
            Node::Item { value, .. } => value.location(),
            Node::Group { open, .. } => open.location(),
        }
    }

    /// A single unbraced value.
    pub fn scalar(&self, label: &str) -> Result<Leaf<'a>, TdrpError> {
        match self {
            Node::Item { name: None, value } => Ok(*value),
            Node::Item { name: Some(n), .. } => Err(unexpected_name(label, n)),
            Node::Group { open, .. } => Err(TdrpError::syntax(
                label,
                "expected a single value, found '{'",
                open.location(),
            )),
        }
    }

    /// The elements of a 1-D array: a single unbraced value or a flat braced
    /// list.
    pub fn elements(&self, label: &str) -> Result<Vec<Leaf<'a>>, TdrpError> {
        match self {
            Node::Item { .. } => Ok(vec![self.scalar(label)?]),
            Node::Group { children, .. } => children.iter().map(|c| flat_item(c, label)).collect(),
        }
    }

    /// The rows of a 2-D array. Each inner brace pair is one row; row lengths
    /// are not compared here.
    pub fn rows(&self, label: &str) -> Result<Vec<LeafGroup<Leaf<'a>>>, TdrpError> {
        let children = outer_group(self, label, "2-D array")?;
        children
            .iter()
            .map(|child| match child {
                Node::Group { open, children } => Ok(LeafGroup {
                    open: open.location(),
                    items: children
                        .iter()
                        .map(|c| flat_item(c, label))
                        .collect::<Result<_, _>>()?,
                }),
                Node::Item { value, .. } => Err(TdrpError::syntax(
                    label,
                    format!("expected '{{' to open a 2-D array row, found '{}'", value.text()),
                    value.location(),
                )),
            })
            .collect()
    }

    /// Record instances. A single record is one brace group of fields; a
    /// record array is a brace group of such groups.
    pub fn instances(
        &self,
        label: &str,
        array: bool,
    ) -> Result<Vec<LeafGroup<FieldItem<'a>>>, TdrpError> {
        if !array {
            return Ok(vec![instance(self, label)?]);
        }
        outer_group(self, label, "record array")?
            .iter()
            .map(|child| instance(child, label))
            .collect()
    }
}

fn unexpected_name(label: &str, name: &Leaf<'_>) -> TdrpError {
    TdrpError::syntax(
        label,
        format!("unexpected field name '{}'", name.text()),
        name.location(),
    )
}

fn flat_item<'a>(node: &Node<'a>, label: &str) -> Result<Leaf<'a>, TdrpError> {
    match node {
        Node::Item { name: None, value } => Ok(*value),
        Node::Item { name: Some(n), .. } => Err(unexpected_name(label, n)),
        Node::Group { open, .. } => Err(TdrpError::syntax(
            label,
            "unexpected nested '{'",
            open.location(),
        )),
    }
}

fn outer_group<'n, 'a>(
    node: &'n Node<'a>,
    label: &str,
    what: &str,
) -> Result<&'n [Node<'a>], TdrpError> {
    match node {
        Node::Group { children, .. } => Ok(children),
        Node::Item { value, .. } => Err(TdrpError::syntax(
            label,
            format!("expected '{{' to open {what}, found '{}'", value.text()),
            value.location(),
        )),
    }
}

fn instance<'a>(node: &Node<'a>, label: &str) -> Result<LeafGroup<FieldItem<'a>>, TdrpError> {
    let Node::Group { open, children } = node else {
        return Err(TdrpError::syntax(
            label,
            "expected '{' to open a record",
            node.location(),
        ));
    };
    let items = children
        .iter()
        .map(|child| match child {
            Node::Item { name, value } => Ok(FieldItem {
                name: *name,
                value: *value,
            }),
            Node::Group { open, .. } => Err(TdrpError::syntax(
                label,
                "unexpected nested '{' inside a record",
                open.location(),
            )),
        })
        .collect::<Result<_, _>>()?;
    Ok(LeafGroup {
        open: open.location(),
        items,
    })
}

/// Indices of statement-start tokens at brace depth 0 (the first token and
/// every token following a top-level `;`).
fn statement_starts(tokens: &[Token]) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut depth = 0usize;
    let mut at_start = true;
    for (i, tok) in tokens.iter().enumerate() {
        if at_start && depth == 0 && !tok.is_punct(";") {
            starts.push(i);
        }
        at_start = false;
        if tok.is_punct("{") {
            depth += 1;
        } else if tok.is_punct("}") {
            depth = depth.saturating_sub(1);
        } else if tok.is_punct(";") && depth == 0 {
            at_start = true;
        }
    }
    starts
}

/// Index of the last top-level statement beginning with `label`.
///
/// Later statements override earlier ones, so the last one wins.
pub fn find_label(tokens: &[Token], label: &str) -> Option<usize> {
    statement_starts(tokens)
        .into_iter()
        .rev()
        .find(|&i| !tokens[i].is_string && tokens[i].text == label)
}

/// Labels of every top-level `name = ...` statement, in stream order.
pub fn assignment_labels(tokens: &[Token]) -> Vec<Leaf<'_>> {
    statement_starts(tokens)
        .into_iter()
        .filter(|&i| !tokens[i].is_delimiter() && tokens.get(i + 1).is_some_and(|t| t.is_punct("=")))
        .map(|i| Leaf {
            token: &tokens[i],
            index: i,
        })
        .collect()
}

/// Find `label = value ;` (last occurrence) and parse its value.
pub fn parse_assignment<'a>(tokens: &'a [Token], label: &str) -> Result<Node<'a>, TdrpError> {
    let start = find_label(tokens, label).ok_or_else(|| {
        TdrpError::syntax(label, "label not found", Location::at(tokens, tokens.len()))
    })?;
    let mut parser = Parser {
        tokens,
        pos: start + 1,
        label,
    };
    parser.expect("=", "after label")?;
    let node = parser.value()?;
    parser.expect(";", "after value")?;
    Ok(node)
}

struct Parser<'a, 'l> {
    tokens: &'a [Token],
    pos: usize,
    label: &'l str,
}

impl<'a> Parser<'a, '_> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn leaf(&self) -> Leaf<'a> {
        let tokens = self.tokens;
        Leaf {
            token: &tokens[self.pos],
            index: self.pos,
        }
    }

    fn error(&self, message: String) -> TdrpError {
        TdrpError::syntax(self.label, message, Location::at(self.tokens, self.pos))
    }

    fn found(&self) -> String {
        let assignment = self.tokens.get(self.pos + 1).is_some_and(|t| t.is_punct("="));
        match self.peek() {
            Some(tok) if assignment && !tok.is_delimiter() => {
                format!("found the start of '{} = ...'", tok.text)
            }
            Some(tok) => format!("found '{}'", tok.text),
            None => "found end of input".to_string(),
        }
    }

    fn expect(&mut self, punct: &str, context: &str) -> Result<(), TdrpError> {
        match self.peek() {
            Some(tok) if tok.is_punct(punct) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(format!("missing '{punct}' {context}, {}", self.found()))),
        }
    }

    fn value(&mut self) -> Result<Node<'a>, TdrpError> {
        match self.peek() {
            Some(tok) if tok.is_punct("{") => self.group(),
            Some(tok) if !tok.is_delimiter() => {
                let value = self.leaf();
                self.pos += 1;
                Ok(Node::Item { name: None, value })
            }
            _ => Err(self.error(format!("expected a value, {}", self.found()))),
        }
    }

    fn child(&mut self) -> Result<Node<'a>, TdrpError> {
        let named = self.peek().is_some_and(|t| !t.is_delimiter())
            && self.tokens.get(self.pos + 1).is_some_and(|t| t.is_punct("="));
        if !named {
            return self.value();
        }
        let name = self.leaf();
        self.pos += 2;
        match self.value()? {
            Node::Item { value, .. } => Ok(Node::Item {
                name: Some(name),
                value,
            }),
            Node::Group { open, .. } => Err(TdrpError::syntax(
                self.label,
                format!("field '{}' must hold a single value", name.text()),
                open.location(),
            )),
        }
    }

    fn group(&mut self) -> Result<Node<'a>, TdrpError> {
        let open = self.leaf();
        self.pos += 1;
        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(TdrpError::syntax(
                        self.label,
                        "unmatched '{'",
                        open.location(),
                    ));
                }
                Some(tok) if tok.is_punct("}") => {
                    self.pos += 1;
                    return Ok(Node::Group { open, children });
                }
                Some(_) => {}
            }
            children.push(self.child()?);
            match self.peek() {
                Some(tok) if tok.is_punct(",") => self.pos += 1,
                Some(tok) if tok.is_punct("}") => {}
                None => {
                    return Err(TdrpError::syntax(
                        self.label,
                        "unmatched '{'",
                        open.location(),
                    ));
                }
                _ => {
                    return Err(self.error(format!("expected ',' or '}}', {}", self.found())));
                }
            }
        }
    }
}
