//! Rational and algebraic evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

pub(super) fn rational(p: &[f64; 6], x: f64) -> f64 {
    let num = p[0] * x * x + p[1] * x + p[2];
    let den = p[3] * x * x + p[4] * x + p[5];
    if den.abs() > f64::EPSILON { num / den } else { x }
}

/// A parsed arithmetic expression in the variable `X`.
///
/// Supports `+ - * / ^` (and `**`), parentheses, unary minus and
/// scientific-notation numbers. The source text is kept so the formula
/// serializes back to what the file contained.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Formula {
    source: String,
    expr: Expr,
}

#[derive(Debug, Clone)]
enum Expr {
    Number(f64),
    X,
    Neg(Box<Expr>),
    Binary(Op, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, String> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens: &tokens, pos: 0 };
        let expr = parser.expr()?;
        if parser.pos != tokens.len() {
            return Err(format!("trailing input in formula {source:?}"));
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// `None` on division by zero.
    pub fn eval(&self, x: f64) -> Option<f64> {
        eval(&self.expr, x)
    }
}

fn eval(expr: &Expr, x: f64) -> Option<f64> {
    Some(match expr {
        Expr::Number(n) => *n,
        Expr::X => x,
        Expr::Neg(inner) => -eval(inner, x)?,
        Expr::Binary(op, l, r) => {
            let (l, r) = (eval(l, x)?, eval(r, x)?);
            match op {
                Op::Add => l + r,
                Op::Sub => l - r,
                Op::Mul => l * r,
                Op::Div if r.abs() < f64::EPSILON => return None,
                Op::Div => l / r,
                Op::Pow if r.fract() == 0.0 && r.abs() <= i32::MAX as f64 => l.powi(r as i32),
                Op::Pow => l.powf(r),
            }
        }
    })
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Formula({:?})", self.source)
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl TryFrom<String> for Formula {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Formula::parse(&value)
    }
}

impl From<Formula> for String {
    fn from(value: Formula) -> Self {
        value.source
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Variable,
    Op(Op),
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '/' | '^' | '(' | ')' => {
                chars.next();
                tokens.push(match c {
                    '+' => Token::Op(Op::Add),
                    '-' => Token::Op(Op::Sub),
                    '/' => Token::Op(Op::Div),
                    '^' => Token::Op(Op::Pow),
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Op(Op::Pow));
                } else {
                    tokens.push(Token::Op(Op::Mul));
                }
            }
            'X' | 'x' => {
                chars.next();
                tokens.push(Token::Variable);
            }
            '0'..='9' | '.' => {
                let mut num = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_digit() || ch == '.' {
                        num.push(ch);
                        chars.next();
                    } else if ch == 'e' || ch == 'E' {
                        num.push(ch);
                        chars.next();
                        if let Some(&sign) = chars.peek().filter(|s| **s == '-' || **s == '+') {
                            num.push(sign);
                            chars.next();
                        }
                    } else {
                        break;
                    }
                }
                let n = num
                    .parse()
                    .map_err(|_| format!("invalid number {num:?} in formula"))?;
                tokens.push(Token::Number(n));
            }
            other => return Err(format!("unexpected character {other:?} in formula")),
        }
    }
    Ok(tokens)
}

// expr    = term (('+' | '-') term)*
// term    = power (('*' | '/') power)*
// power   = unary ('^' power)?
// unary   = '-' unary | primary
// primary = NUMBER | X | '(' expr ')'
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek_op(&self) -> Option<Op> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<Expr, String> {
        let mut left = self.term()?;
        while let Some(op @ (Op::Add | Op::Sub)) = self.peek_op() {
            self.pos += 1;
            left = Expr::Binary(op, Box::new(left), Box::new(self.term()?));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut left = self.power()?;
        while let Some(op @ (Op::Mul | Op::Div)) = self.peek_op() {
            self.pos += 1;
            left = Expr::Binary(op, Box::new(left), Box::new(self.power()?));
        }
        Ok(left)
    }

    fn power(&mut self) -> Result<Expr, String> {
        let base = self.unary()?;
        if self.peek_op() == Some(Op::Pow) {
            self.pos += 1;
            // right associative
            let exp = self.power()?;
            return Ok(Expr::Binary(Op::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.peek_op() == Some(Op::Sub) {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, String> {
        let token = self
            .tokens
            .get(self.pos)
            .ok_or_else(|| "unexpected end of formula".to_string())?;
        self.pos += 1;
        match token {
            Token::Number(n) => Ok(Expr::Number(*n)),
            Token::Variable => Ok(Expr::X),
            Token::LParen => {
                let inner = self.expr()?;
                if self.tokens.get(self.pos) != Some(&Token::RParen) {
                    return Err("expected closing parenthesis".to_string());
                }
                self.pos += 1;
                Ok(inner)
            }
            other => Err(format!("unexpected token {other:?} in formula")),
        }
    }
}
