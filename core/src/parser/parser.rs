use core::cell::{Cell, RefCell};
use core::iter::Peekable;
use core::str::CharIndices;

use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use super::error::{SyntaxError, SyntaxErrorKind, convert_pest_error};
use crate::syntax::{NodeId, NodeKind, Span, SyntaxTree};

/// Nesting depth accepted by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                               // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left)
        )                                               // `*`, `/`
        .op(Op::prefix(Rule::neg))                       // `-`
        .op(Op::infix(Rule::pow, Assoc::Right));         // `^` (right-assoc)
}

#[derive(Parser)]
#[grammar = "parser/formula.pest"]
pub struct FormulaParser;

/// Parse `source` into a syntax tree with one root per statement.
///
/// `source_name` only identifies the source in errors.
pub fn parse(source_name: &str, source: &str) -> Result<SyntaxTree, SyntaxError> {
    parse_with_max_depth(source_name, source, DEFAULT_MAX_DEPTH)
}

/// Like [`parse`], rejecting sources nested deeper than `max_depth`.
pub fn parse_with_max_depth(
    source_name: &str,
    source: &str,
    max_depth: usize,
) -> Result<SyntaxTree, SyntaxError> {
    // Reject runaway nesting before pest recurses into it.
    check_nesting(source_name, source, max_depth)?;

    let mut pairs = FormulaParser::parse(Rule::main, source)
        .map_err(|err| convert_pest_error(err, source_name, source))?;
    let main = pairs.next().ok_or_else(|| {
        SyntaxError::new(
            SyntaxErrorKind::Other {
                message: "missing expected pair in rule".to_string(),
            },
            source_name,
            Span::new(0, source.len()),
        )
    })?;

    let builder = TreeBuilder::new(source_name, max_depth);
    for pair in main.into_inner() {
        if pair.as_rule() == Rule::EOI {
            break;
        }
        let root = builder.statement(pair)?;
        builder.tree.borrow_mut().add_root(root);
    }

    let tree = builder.tree.into_inner();
    tracing::debug!(
        source = source_name,
        statements = tree.roots().len(),
        nodes = tree.len(),
        "Parsed formula"
    );
    Ok(tree)
}

/// Reject sources that would make the parser recurse past `max_depth`.
///
/// Every open parenthesis nests one level. Within a group, each prefix `-`
/// and each `^` also nests one level until a looser operator (`+ - * /`)
/// or a separator closes the run, matching how the Pratt parser recurses.
fn check_nesting(source_name: &str, source: &str, max_depth: usize) -> Result<(), SyntaxError> {
    // Operator runs still open in each enclosing group.
    let mut enclosing: Vec<usize> = Vec::new();
    let mut enclosing_total = 0usize;
    let mut run = 0usize;
    let mut expect_operand = true;

    let mut chars = source.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        let opens_level = match c {
            '#' => {
                while chars.next_if(|&(_, c)| c != '\n').is_some() {}
                false
            }
            c if c.is_whitespace() => false,
            '(' => {
                enclosing.push(run);
                enclosing_total += run;
                run = 0;
                expect_operand = true;
                true
            }
            ')' => {
                run = enclosing.pop().unwrap_or(0);
                enclosing_total = enclosing_total.saturating_sub(run);
                expect_operand = false;
                false
            }
            '-' if expect_operand => {
                run += 1;
                true
            }
            '^' => {
                run += 1;
                expect_operand = true;
                true
            }
            '+' | '-' | '*' | '/' | ',' | ';' | '=' => {
                run = 0;
                expect_operand = true;
                false
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while chars
                    .next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_')
                    .is_some()
                {}
                expect_operand = false;
                false
            }
            c if c.is_ascii_digit() || c == '.' => {
                skip_number(&mut chars);
                expect_operand = false;
                false
            }
            _ => {
                expect_operand = false;
                false
            }
        };

        let depth = enclosing.len() + enclosing_total + run + 1;
        if opens_level && depth > max_depth {
            return Err(SyntaxError::new(
                SyntaxErrorKind::MaxDepthExceeded { depth, max_depth },
                source_name,
                Span::new(pos, pos + c.len_utf8()),
            ));
        }
    }
    Ok(())
}

/// Consume the rest of a number literal, including a signed exponent, so
/// the exponent sign is not mistaken for an operator.
fn skip_number(chars: &mut Peekable<CharIndices<'_>>) {
    while chars
        .next_if(|&(_, c)| c.is_ascii_digit() || c == '.')
        .is_some()
    {}
    if chars.next_if(|&(_, c)| c == 'e' || c == 'E').is_some() {
        chars.next_if(|&(_, c)| c == '+' || c == '-');
        while chars.next_if(|&(_, c)| c.is_ascii_digit()).is_some() {}
    }
}

/// Lowers pest pairs into arena nodes.
///
/// The Pratt parser takes one closure per operator position, all of which
/// need to add nodes, so the tree sits behind a `RefCell`.
struct TreeBuilder<'s> {
    source_name: &'s str,
    tree: RefCell<SyntaxTree>,
    depth: Cell<usize>,
    max_depth: usize,
}

impl<'s> TreeBuilder<'s> {
    fn new(source_name: &'s str, max_depth: usize) -> Self {
        Self {
            source_name,
            tree: RefCell::new(SyntaxTree::new()),
            depth: Cell::new(0),
            max_depth,
        }
    }

    fn statement(&self, pair: Pair<Rule>) -> Result<NodeId, SyntaxError> {
        match pair.as_rule() {
            Rule::assignment => self.assignment(pair),
            Rule::expression => self.expression(pair),
            rule => Err(self.unhandled(rule, pair.as_span().into())),
        }
    }

    /// `x = e` becomes `=` with the target variable as first argument.
    fn assignment(&self, pair: Pair<Rule>) -> Result<NodeId, SyntaxError> {
        let span = Span::from(pair.as_span());
        let mut inner = pair.into_inner();
        let target = self.expect_pair(&mut inner, &span, "assignment target")?;
        let value = self.expect_pair(&mut inner, &span, "assignment value")?;

        let target = self.leaf(target.as_str(), NodeKind::Variable, target.as_span().into());
        let value = self.expression(value)?;
        self.node("=", NodeKind::Operator, span, vec![target, value])
    }

    fn expression(&self, pair: Pair<Rule>) -> Result<NodeId, SyntaxError> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(self.error(
                SyntaxErrorKind::MaxDepthExceeded {
                    depth,
                    max_depth: self.max_depth,
                },
                pair.as_span().into(),
            ));
        }
        self.depth.set(depth);

        let result = PRATT_PARSER
            .map_primary(|primary| self.primary(primary))
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                let span = Span::new(op.as_span().start(), self.span_of(rhs).end());
                match op.as_rule() {
                    Rule::neg => self.node("-", NodeKind::Operator, span, vec![rhs]),
                    rule => Err(self.unhandled(rule, op.as_span().into())),
                }
            })
            .map_infix(|lhs, op, rhs| {
                let (lhs, rhs) = (lhs?, rhs?);
                let name = match op.as_rule() {
                    Rule::add => "+",
                    Rule::sub => "-",
                    Rule::mul => "*",
                    Rule::div => "/",
                    Rule::pow => "^",
                    rule => return Err(self.unhandled(rule, op.as_span().into())),
                };
                let span = Span::combine(&self.span_of(lhs), &self.span_of(rhs));
                self.node(name, NodeKind::Operator, span, vec![lhs, rhs])
            })
            .parse(pair.into_inner());

        self.depth.set(depth - 1);
        result
    }

    fn primary(&self, pair: Pair<Rule>) -> Result<NodeId, SyntaxError> {
        let span = Span::from(pair.as_span());
        match pair.as_rule() {
            Rule::number => {
                let text = pair.as_str();
                if text.parse::<f64>().is_err() {
                    return Err(self.error(
                        SyntaxErrorKind::InvalidNumber {
                            text: text.to_string(),
                        },
                        span,
                    ));
                }
                Ok(self.leaf(text, NodeKind::Constant, span))
            }

            Rule::ident => Ok(self.leaf(pair.as_str(), NodeKind::Variable, span)),

            Rule::grouped => {
                let mut inner = pair.into_inner();
                let body = self.expect_pair(&mut inner, &span, "grouped expression")?;
                self.statement(body)
            }

            Rule::call => {
                let mut inner = pair.into_inner();
                let name = self.expect_pair(&mut inner, &span, "function name")?;
                let args = inner
                    .map(|arg| self.expression(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.node(name.as_str(), NodeKind::Keyword, span, args)
            }

            rule => Err(self.unhandled(rule, span)),
        }
    }

    fn leaf(&self, name: &str, kind: NodeKind, span: Span) -> NodeId {
        self.tree.borrow_mut().leaf(name, kind, span)
    }

    /// Add an inner node, rejecting it if the tree grows taller than
    /// `max_depth`. Long operator chains like `1 + 1 + ... + 1` nest here
    /// even though the source has no parentheses.
    fn node(
        &self,
        name: &str,
        kind: NodeKind,
        span: Span,
        args: Vec<NodeId>,
    ) -> Result<NodeId, SyntaxError> {
        let mut tree = self.tree.borrow_mut();
        let id = tree.node(name, kind, span, args);
        let node = &tree[id];
        if node.height() > self.max_depth {
            return Err(self.error(
                SyntaxErrorKind::MaxDepthExceeded {
                    depth: node.height(),
                    max_depth: self.max_depth,
                },
                node.span().clone(),
            ));
        }
        Ok(id)
    }

    fn span_of(&self, id: NodeId) -> Span {
        self.tree.borrow()[id].span().clone()
    }

    fn expect_pair<'i>(
        &self,
        pairs: &mut Pairs<'i, Rule>,
        span: &Span,
        what: &str,
    ) -> Result<Pair<'i, Rule>, SyntaxError> {
        pairs.next().ok_or_else(|| {
            self.error(
                SyntaxErrorKind::Other {
                    message: format!("missing {}", what),
                },
                span.clone(),
            )
        })
    }

    fn unhandled(&self, rule: Rule, span: Span) -> SyntaxError {
        self.error(
            SyntaxErrorKind::Other {
                message: format!("Unhandled rule: {:?}", rule),
            },
            span,
        )
    }

    fn error(&self, kind: SyntaxErrorKind, span: Span) -> SyntaxError {
        SyntaxError::new(kind, self.source_name, span)
    }
}
