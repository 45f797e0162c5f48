//! Recursive-descent parser for unit expressions.
//!
//! Grammar:
//!
//! ```text
//! expr   := term (('*' | '/') term)*
//! term   := factor (('**' | '^') int)?
//! factor := symbol | number | '(' expr ')'
//! ```

use crate::dims::Dimensions;
use crate::error::UnitError;
use crate::unit::Unit;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Symbol(String),
    Number(f64),
    Star,
    Slash,
    /// `**n` or `^n`, exponent already read.
    Power(i8),
    Open,
    Close,
}

/// Parse `expr`, resolving symbols through `lookup`.
pub(crate) fn parse_expr(
    expr: &str,
    lookup: impl Fn(&str) -> Option<Unit>,
) -> Result<Unit, UnitError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Ok(Unit::dimensionless());
    }
    let mut parser = Parser {
        expr,
        tokens,
        pos: 0,
        lookup,
    };
    let unit = parser.expr()?;
    if let Some(&(at, _)) = parser.tokens.get(parser.pos) {
        return Err(parser.error(at, "unexpected trailing input"));
    }
    Ok(unit)
}

fn syntax(expr: &str, position: usize, reason: &str) -> UnitError {
    UnitError::Syntax {
        expr: expr.to_string(),
        position,
        reason: reason.to_string(),
    }
}

fn tokenize(expr: &str) -> Result<Vec<(usize, Token)>, UnitError> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        match c {
            b' ' | b'\t' => {
                i += 1;
            }
            b'(' => {
                tokens.push((start, Token::Open));
                i += 1;
            }
            b')' => {
                tokens.push((start, Token::Close));
                i += 1;
            }
            b'/' => {
                tokens.push((start, Token::Slash));
                i += 1;
            }
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                let (n, next) = exponent(expr, i)?;
                tokens.push((start, Token::Power(n)));
                i = next;
            }
            b'^' => {
                i += 1;
                let (n, next) = exponent(expr, i)?;
                tokens.push((start, Token::Power(n)));
                i = next;
            }
            b'*' => {
                tokens.push((start, Token::Star));
                i += 1;
            }
            b'0'..=b'9' | b'.' => {
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'0'..=b'9' | b'.' => i += 1,
                        b'e' | b'E' => {
                            i += 1;
                            if matches!(bytes.get(i), Some(b'+' | b'-')) {
                                i += 1;
                            }
                        }
                        _ => break,
                    }
                }
                let text = &expr[start..i];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| syntax(expr, start, "malformed number"))?;
                tokens.push((start, Token::Number(value)));
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push((start, Token::Symbol(expr[start..i].to_string())));
            }
            _ => return Err(syntax(expr, start, "unexpected character")),
        }
    }
    Ok(tokens)
}

/// Read a signed integer exponent starting at `i`, optionally parenthesized.
fn exponent(expr: &str, mut i: usize) -> Result<(i8, usize), UnitError> {
    let bytes = expr.as_bytes();
    let skip_ws = |mut i: usize| {
        while matches!(bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        i
    };
    i = skip_ws(i);
    let parenthesized = bytes.get(i) == Some(&b'(');
    if parenthesized {
        i = skip_ws(i + 1);
    }
    let start = i;
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    while matches!(bytes.get(i), Some(b'0'..=b'9')) {
        i += 1;
    }
    let n = expr[start..i]
        .parse::<i8>()
        .map_err(|_| syntax(expr, start, "expected integer exponent"))?;
    if parenthesized {
        i = skip_ws(i);
        if bytes.get(i) != Some(&b')') {
            return Err(syntax(expr, i, "expected ')' after exponent"));
        }
        i += 1;
    }
    Ok((n, i))
}

struct Parser<'a, F> {
    expr: &'a str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
    lookup: F,
}

impl<F: Fn(&str) -> Option<Unit>> Parser<'_, F> {
    fn error(&self, position: usize, reason: &str) -> UnitError {
        syntax(self.expr, position, reason)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|&(at, _)| at)
            .unwrap_or(self.expr.len())
    }

    fn expr(&mut self) -> Result<Unit, UnitError> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = acc.mul(&rhs)?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = acc.div(&rhs)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<Unit, UnitError> {
        let base = self.factor()?;
        if let Some(&Token::Power(n)) = self.peek() {
            self.pos += 1;
            return base.powi(n);
        }
        Ok(base)
    }

    fn factor(&mut self) -> Result<Unit, UnitError> {
        let at = self.position();
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        match token {
            Some(Token::Symbol(name)) => {
                (self.lookup)(&name).ok_or(UnitError::UnknownSymbol { symbol: name })
            }
            Some(Token::Number(v)) => Ok(Unit::new("", v, Dimensions::DIMENSIONLESS)),
            Some(Token::Open) => {
                let inner = self.expr()?;
                match self.peek() {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(self.error(self.position(), "expected ')'")),
                }
            }
            _ => Err(self.error(at, "expected a unit symbol, number or '('")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<Unit> {
        match name {
            "cm" => Some(Unit::new("cm", 0.01, Dimensions::LENGTH)),
            "g" => Some(Unit::new("g", 1e-3, Dimensions::MASS)),
            "s" => Some(Unit::new("s", 1.0, Dimensions::TIME)),
            _ => None,
        }
    }

    #[test]
    fn empty_is_dimensionless() {
        assert_eq!(parse_expr("  ", lookup).unwrap(), Unit::dimensionless());
    }

    #[test]
    fn density_expression() {
        let u = parse_expr("g / cm**3", lookup).unwrap();
        assert_eq!(u.dims(), Dimensions::new(-3, 1, 0, 0, 0));
        assert!((u.scale() - 1e3).abs() < 1e-9);
    }

    #[test]
    fn caret_and_negative_exponents() {
        let a = parse_expr("cm s^-1", lookup);
        assert!(a.is_err(), "juxtaposition is not multiplication");
        let b = parse_expr("cm * s^-1", lookup).unwrap();
        let c = parse_expr("cm / s", lookup).unwrap();
        assert_eq!(b, c);
        let d = parse_expr("cm * s**(-1)", lookup).unwrap();
        assert_eq!(d, c);
    }

    #[test]
    fn grouping_and_numbers() {
        let u = parse_expr("(cm / s)**2", lookup).unwrap();
        assert_eq!(u.dims(), Dimensions::new(2, 0, -2, 0, 0));
        let k = parse_expr("1e5 * cm", lookup).unwrap();
        assert!((k.scale() - 1e3).abs() < 1e-9);
    }

    #[test]
    fn unknown_symbol_reported() {
        let err = parse_expr("furlong / s", lookup).unwrap_err();
        assert_eq!(
            err,
            UnitError::UnknownSymbol {
                symbol: "furlong".into()
            }
        );
    }

    #[test]
    fn exponent_overflow_rejected() {
        let err = parse_expr("cm**100 * cm**100", lookup).unwrap_err();
        assert!(matches!(err, UnitError::ExponentOverflow { .. }));
        assert!(parse_expr("g / s**(-128)", lookup).is_err());
        assert!(parse_expr("cm**100 / cm**100", lookup).unwrap().is_dimensionless());
    }

    #[test]
    fn malformed_expressions_rejected() {
        for bad in ["cm /", "(cm", "cm)", "cm ** x", "cm $ s", "* cm"] {
            assert!(
                matches!(parse_expr(bad, lookup), Err(UnitError::Syntax { .. })),
                "{bad} should be a syntax error"
            );
        }
    }
}
