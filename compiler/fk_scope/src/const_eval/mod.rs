//! Parameter substitution and arithmetic folding of declaration text.
//!
//! Declaration fields such as bounds and kinds are Fortran expression text.
//! Folding happens in two steps:
//!
//! 1. [`substitute_parameters`] replaces whole-token occurrences of
//!    `parameter` names with their parenthesized values.
//! 2. [`evaluate`] tries to reduce the result to a single literal.
//!
//! The evaluator accepts integer and real literals, `+ - * /`, unary signs
//! and parentheses. Anything else (names, function calls, `**`, array
//! syntax) makes evaluation fail and the caller keeps the text as-is.
//!
//! # Semantics
//!
//! - Integer arithmetic is checked `i64`; `/` truncates toward zero.
//! - A real operand makes the operation real (`f64`).
//! - Real exponents may use `e` or `d`; kind suffixes (`_8`, `_dp`) are
//!   dropped.
//! - Overflow and division by zero fail the evaluation.

mod lexer;

use lexer::{tokenize, TokenKind};

/// Replace every identifier token naming a parameter with `(value)`.
///
/// Names compare case-insensitively. Text inside numeric literals, such as a
/// kind suffix, is never touched.
pub fn substitute_parameters(text: &str, parameters: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    for token in tokenize(text) {
        let replacement = (token.kind == TokenKind::Ident)
            .then(|| {
                parameters
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(token.text))
            })
            .flatten();
        match replacement {
            Some((_, value)) => {
                out.push('(');
                out.push_str(value);
                out.push(')');
            }
            None => out.push_str(token.text),
        }
    }
    out
}

/// Evaluate a pure arithmetic expression to literal text.
///
/// Returns `None` when `text` is not a closed arithmetic expression.
pub fn evaluate(text: &str) -> Option<String> {
    let tokens: Vec<_> = tokenize(text)
        .into_iter()
        .filter(|t| t.kind != TokenKind::Whitespace)
        .collect();
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return None;
    }
    Some(value.to_literal())
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Value {
    Int(i64),
    Real(f64),
}

impl Value {
    #[allow(
        clippy::cast_precision_loss,
        reason = "mixed integer/real arithmetic promotes like Fortran"
    )]
    fn as_real(self) -> f64 {
        match self {
            Value::Int(i) => i as f64,
            Value::Real(r) => r,
        }
    }

    fn to_literal(self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Real(r) => format!("{r:?}"),
        }
    }

    fn parse(text: &str) -> Option<Value> {
        // Drop a kind suffix: `4_8`, `1.0_dp`.
        let digits = text.split('_').next()?;
        let is_real = digits.contains(['.', 'e', 'E', 'd', 'D']);
        if is_real {
            let normalized = digits.replace(['d', 'D'], "e");
            normalized.parse::<f64>().ok().map(Value::Real)
        } else {
            digits.parse::<i64>().ok().map(Value::Int)
        }
    }

    fn negate(self) -> Option<Value> {
        match self {
            Value::Int(i) => i.checked_neg().map(Value::Int),
            Value::Real(r) => Some(Value::Real(-r)),
        }
    }

    fn apply(self, op: char, rhs: Value) -> Option<Value> {
        if let (Value::Int(a), Value::Int(b)) = (self, rhs) {
            let result = match op {
                '+' => a.checked_add(b),
                '-' => a.checked_sub(b),
                '*' => a.checked_mul(b),
                '/' => a.checked_div(b),
                _ => None,
            };
            return result.map(Value::Int);
        }
        let (a, b) = (self.as_real(), rhs.as_real());
        let result = match op {
            '+' => a + b,
            '-' => a - b,
            '*' => a * b,
            '/' if b != 0.0 => a / b,
            _ => return None,
        };
        result.is_finite().then_some(Value::Real(result))
    }
}

/// Recursive descent over the token list.
///
/// ```text
/// expr  := term (('+' | '-') term)*
/// term  := unary (('*' | '/') unary)*
/// unary := ('+' | '-') unary | atom
/// atom  := number | '(' expr ')'
/// ```
struct Parser<'a> {
    tokens: Vec<lexer::Token<'a>>,
    pos: usize,
}

impl Parser<'_> {
    fn peek_op(&self) -> Option<char> {
        let token = self.tokens.get(self.pos)?;
        match token.kind {
            TokenKind::Punct => token.text.chars().next(),
            _ => None,
        }
    }

    fn expr(&mut self) -> Option<Value> {
        let mut lhs = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek_op() {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = lhs.apply(op, rhs)?;
        }
        Some(lhs)
    }

    fn term(&mut self) -> Option<Value> {
        let mut lhs = self.unary()?;
        while let Some(op @ ('*' | '/')) = self.peek_op() {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = lhs.apply(op, rhs)?;
        }
        Some(lhs)
    }

    fn unary(&mut self) -> Option<Value> {
        match self.peek_op() {
            Some('+') => {
                self.pos += 1;
                self.unary()
            }
            Some('-') => {
                self.pos += 1;
                self.unary()?.negate()
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Option<Value> {
        let token = *self.tokens.get(self.pos)?;
        self.pos += 1;
        match token.kind {
            TokenKind::Number => Value::parse(token.text),
            TokenKind::Punct if token.text == "(" => {
                let value = self.expr()?;
                if self.peek_op() != Some(')') {
                    return None;
                }
                self.pos += 1;
                Some(value)
            }
            _ => None,
        }
    }
}
