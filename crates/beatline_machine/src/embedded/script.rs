//! Parser and evaluator for the embedded s-expression grammar.
//!
//! ```text
//! expr := literal | $name | $$name | "(" op expr* ")"
//! ```
//!
//! The operator set is closed; there is no way to call host code from an
//! embedded expression.

use std::fmt;

use beatline_foundation::{Error, ErrorKind, Result, Value};

use super::lexer::{Lexer, Token, TokenKind};
use crate::prelude::ops;
use crate::variables::VariableScope;

// =============================================================================
// Syntax Tree
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Abs,
    BitAnd,
    BitOr,
    BitXor,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Not,
    Get,
}

impl Op {
    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "ABS" => Self::Abs,
            "&" => Self::BitAnd,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "." => Self::Get,
            _ => return None,
        })
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Abs => "ABS",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Get => ".",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed embedded expression.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Literal(Value),
    Reactive(String),
    Static(String),
    Call { op: Op, args: Vec<Node> },
}

// =============================================================================
// Parser
// =============================================================================

/// Deepest call nesting accepted. Parsing and evaluation both recurse once
/// per level, so this bounds their stack use.
pub(crate) const MAX_NESTING: usize = 128;

/// Parses a complete expression; trailing input is an error.
pub(crate) fn parse(source: &str) -> Result<Node> {
    let mut parser = Parser {
        source,
        tokens: Lexer::tokenize(source),
        index: 0,
        depth: 0,
    };
    let node = parser.parse_expr()?;
    let trailing = parser.next();
    if trailing.kind == TokenKind::Eof {
        Ok(node)
    } else {
        Err(parser.error("unexpected trailing input", trailing.column))
    }
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
}

impl Parser<'_> {
    fn next(&mut self) -> Token {
        let token = self.tokens.get(self.index).cloned().unwrap_or(Token {
            kind: TokenKind::Eof,
            column: self.source.chars().count() + 1,
        });
        self.index += 1;
        token
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.index).map(|t| &t.kind)
    }

    fn error(&self, message: impl Into<String>, column: usize) -> Error {
        Error::new(ErrorKind::ParseError {
            message: message.into(),
            column,
            source_text: self.source.to_string(),
        })
    }

    fn parse_expr(&mut self) -> Result<Node> {
        let token = self.next();
        let node = match token.kind {
            TokenKind::Nil => Node::Literal(Value::Nil),
            TokenKind::True => Node::Literal(Value::Bool(true)),
            TokenKind::False => Node::Literal(Value::Bool(false)),
            TokenKind::Int(n) => Node::Literal(Value::Int(n)),
            TokenKind::Float(n) => Node::Literal(Value::Float(n)),
            TokenKind::String(s) => Node::Literal(Value::from(s)),
            TokenKind::Reactive(name) => Node::Reactive(name),
            TokenKind::Static(name) => Node::Static(name),
            TokenKind::LParen => {
                if self.depth == MAX_NESTING {
                    return Err(self.error(
                        format!("expression nests deeper than {MAX_NESTING} calls"),
                        token.column,
                    ));
                }
                self.depth += 1;
                let call = self.parse_call(token.column);
                self.depth -= 1;
                call?
            }
            TokenKind::RParen => return Err(self.error("unexpected ')'", token.column)),
            TokenKind::Symbol(word) => {
                return Err(self.error(format!("unexpected symbol {word} outside a call"), token.column));
            }
            TokenKind::Error(message) => return Err(self.error(message, token.column)),
            TokenKind::Eof => return Err(self.error("unexpected end of expression", token.column)),
        };
        Ok(node)
    }

    fn parse_call(&mut self, open_column: usize) -> Result<Node> {
        let head = self.next();
        let op = match &head.kind {
            TokenKind::Symbol(word) => Op::from_symbol(word)
                .ok_or_else(|| self.error(format!("unknown operator {word}"), head.column))?,
            TokenKind::Eof => return Err(self.error("unclosed '('", open_column)),
            _ => return Err(self.error("expected an operator", head.column)),
        };

        let mut args = Vec::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::RParen) => {
                    self.index += 1;
                    return Ok(Node::Call { op, args });
                }
                Some(TokenKind::Eof) | None => return Err(self.error("unclosed '('", open_column)),
                Some(_) => args.push(self.parse_expr()?),
            }
        }
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Evaluates a parsed expression against read-only variable bindings.
///
/// Unset variables read as `Nil`.
pub(crate) fn evaluate(node: &Node, scope: VariableScope<'_>) -> Result<Value> {
    match node {
        Node::Literal(value) => Ok(value.clone()),
        Node::Reactive(name) => Ok(scope.reactive_value(name).unwrap_or_default()),
        Node::Static(name) => Ok(scope.static_value(name).unwrap_or_default()),
        Node::Call { op, args } => apply(*op, args, scope),
    }
}

fn apply(op: Op, args: &[Node], scope: VariableScope<'_>) -> Result<Value> {
    let name = op.symbol();
    let strict = || {
        args.iter()
            .map(|arg| evaluate(arg, scope))
            .collect::<Result<Vec<_>>>()
    };
    match op {
        Op::And => short_circuit(name, args, scope, false),
        Op::Or => short_circuit(name, args, scope, true),
        Op::Add => ops::reduce(name, strict()?, ops::add_values),
        Op::Sub => ops::reduce(name, strict()?, ops::sub_values),
        Op::Mul => ops::reduce(name, strict()?, ops::mul_values),
        Op::Div => ops::reduce(name, strict()?, ops::div_values),
        Op::Rem => ops::reduce(name, strict()?, ops::mod_values),
        Op::BitAnd => ops::reduce(name, strict()?, ops::bit_and),
        Op::BitOr => ops::reduce(name, strict()?, ops::bit_or),
        Op::BitXor => ops::reduce(name, strict()?, ops::bit_xor),
        Op::Abs => {
            let [value] = exact::<1>(name, strict()?)?;
            ops::abs_value(value)
        }
        Op::Not => {
            let [value] = exact::<1>(name, strict()?)?;
            Ok(Value::Bool(!value.is_truthy()))
        }
        Op::Eq | Op::Ne => {
            let [a, b] = exact::<2>(name, strict()?)?;
            Ok(Value::Bool(ops::values_equal(&a, &b) == (op == Op::Eq)))
        }
        Op::Lt | Op::Gt | Op::Le | Op::Ge => {
            let [a, b] = exact::<2>(name, strict()?)?;
            let ordering = ops::compare_values(&a, &b)?;
            Ok(Value::Bool(match op {
                Op::Lt => ordering.is_lt(),
                Op::Gt => ordering.is_gt(),
                Op::Le => ordering.is_le(),
                _ => ordering.is_ge(),
            }))
        }
        Op::Get => {
            let mut values = strict()?.into_iter();
            let Some(mut current) = values.next() else {
                return Err(Error::arity_mismatch("at least 1 for .", 0));
            };
            for key in values {
                current = ops::property(&current, &key)?;
            }
            Ok(current)
        }
    }
}

fn exact<const N: usize>(name: &str, values: Vec<Value>) -> Result<[Value; N]> {
    let actual = values.len();
    <[Value; N]>::try_from(values).map_err(|_| Error::arity_mismatch(format!("{N} for {name}"), actual))
}

fn short_circuit(
    name: &str,
    args: &[Node],
    scope: VariableScope<'_>,
    stop_on: bool,
) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::arity_mismatch(format!("at least 1 for {name}"), 0));
    }
    let mut last = Value::Nil;
    for arg in args {
        last = evaluate(arg, scope)?;
        if last.is_truthy() == stop_on {
            break;
        }
    }
    Ok(last)
}
