//! Pratt parser over the token stream produced by [`crate::lexer`].
//!
//! Binding powers, loosest first: `+ -`, `* /`, unary minus, `^`.
//! Exponentiation is right-associative and binds tighter than unary minus,
//! so `-x^2` parses as `-(x^2)` and `2^3^2` as `2^(3^2)`.

use crate::error::ParseError;
use crate::expr::{Constant, Expr, Function};
use crate::lexer::{lex, Spanned, Token};

const PREFIX_MINUS_BP: u8 = 25;

/// Bound on both parser recursion and the height of the resulting tree.
/// Every later pass walks the tree recursively.
pub const MAX_DEPTH: usize = 256;

/// Parse normalized expression text into an unevaluated tree.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    if let Some(relation) = tokens.iter().find_map(|s| match &s.token {
        Token::Relation(op) => Some(op.clone()),
        _ => None,
    }) {
        return Err(ParseError::Relation(relation));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let (expr, _) = parser.expression(0)?;
    match parser.peek() {
        None => Ok(expr),
        Some(Spanned {
            token: Token::RParen,
            offset,
        }) => Err(ParseError::UnexpectedToken {
            token: ")".into(),
            offset: *offset,
        }),
        Some(other) => Err(unexpected(other)),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Current recursion depth of `expression`.
    depth: usize,
}

fn unexpected(spanned: &Spanned) -> ParseError {
    ParseError::UnexpectedToken {
        token: spanned.token.describe(),
        offset: spanned.offset,
    }
}

#[derive(Clone, Copy)]
enum Infix {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Infix {
    fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Plus => Some(Infix::Add),
            Token::Minus => Some(Infix::Sub),
            Token::Star => Some(Infix::Mul),
            Token::Slash => Some(Infix::Div),
            Token::Caret => Some(Infix::Pow),
            _ => None,
        }
    }

    /// Left and right binding power.
    fn binding_power(self) -> (u8, u8) {
        match self {
            Infix::Add | Infix::Sub => (10, 11),
            Infix::Mul | Infix::Div => (20, 21),
            Infix::Pow => (31, 30),
        }
    }

    fn apply(self, lhs: Expr, rhs: Expr) -> Expr {
        match self {
            Infix::Add => lhs + rhs,
            Infix::Sub => lhs - rhs,
            Infix::Mul => lhs * rhs,
            Infix::Div => lhs / rhs,
            Infix::Pow => lhs.pow(rhs),
        }
    }
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    /// Parse an expression, returning it with its tree height.
    fn expression(&mut self, min_bp: u8) -> Result<(Expr, usize), ParseError> {
        self.depth += 1;
        let result = if self.depth > MAX_DEPTH {
            Err(ParseError::TooDeep(MAX_DEPTH))
        } else {
            self.expression_at_depth(min_bp)
        };
        self.depth -= 1;
        result
    }

    fn expression_at_depth(&mut self, min_bp: u8) -> Result<(Expr, usize), ParseError> {
        let (mut lhs, mut height) = self.prefix()?;

        loop {
            let Some(op) = self.peek().and_then(|next| Infix::from_token(&next.token)) else {
                break;
            };
            let (left_bp, right_bp) = op.binding_power();
            if left_bp < min_bp {
                break;
            }
            self.advance();
            let (rhs, rhs_height) = self.expression(right_bp)?;
            height = checked_height(height.max(rhs_height) + 1)?;
            lhs = op.apply(lhs, rhs);
        }

        Ok((lhs, height))
    }

    fn prefix(&mut self) -> Result<(Expr, usize), ParseError> {
        let spanned = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        match spanned.token {
            Token::Number(value) => Ok((Expr::Number(value), 1)),
            Token::Minus => {
                let (inner, height) = self.expression(PREFIX_MINUS_BP)?;
                Ok((-inner, checked_height(height + 1)?))
            }
            Token::Plus => self.expression(PREFIX_MINUS_BP),
            Token::LParen => {
                let inner = self.expression(0)?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(unexpected(&other)),
                    None => Err(ParseError::UnclosedParen(spanned.offset)),
                }
            }
            Token::Ident(name) => {
                if let Some(func) = Function::from_name(&name) {
                    self.function_argument(func, &name)
                } else if let Some(constant) = Constant::from_name(&name) {
                    Ok((Expr::Constant(constant), 1))
                } else {
                    Ok((Expr::Symbol(name), 1))
                }
            }
            _ => Err(unexpected(&spanned)),
        }
    }

    /// `sin(x)` takes the parenthesised group only, so `sin(x)^2` is
    /// `(sin(x))^2`. Without parentheses the argument extends over a power:
    /// `sqrt x^2` is `sqrt(x^2)`.
    fn function_argument(&mut self, func: Function, name: &str) -> Result<(Expr, usize), ParseError> {
        let (arg, height) = match self.peek().map(|s| &s.token) {
            None | Some(Token::RParen) => return Err(ParseError::MissingArgument(name.to_string())),
            Some(Token::LParen) => self.prefix()?,
            Some(token) if Infix::from_token(token).is_some() && *token != Token::Minus => {
                return Err(ParseError::MissingArgument(name.to_string()));
            }
            Some(_) => self.expression(PREFIX_MINUS_BP)?,
        };
        Ok((Expr::call(func, arg), checked_height(height + 1)?))
    }
}

fn checked_height(height: usize) -> Result<usize, ParseError> {
    if height > MAX_DEPTH {
        Err(ParseError::TooDeep(MAX_DEPTH))
    } else {
        Ok(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[test]
    fn respects_precedence() {
        assert_eq!(printed("2*x+1"), "2*x + 1");
        assert_eq!(printed("2*(x+1)"), "2*(x + 1)");
        assert_eq!(printed("1 - (2 - 3)"), "1 - (2 - 3)");
        assert_eq!(printed("1-2-3"), "1 - 2 - 3");
        assert_eq!(printed("8/4/2"), "8/4/2");
    }

    #[test]
    fn power_is_right_associative_and_binds_tighter_than_minus() {
        assert_eq!(
            parse("2^3^2").unwrap(),
            Expr::integer(2).pow(Expr::integer(3).pow(Expr::integer(2)))
        );
        assert_eq!(
            parse("-x^2").unwrap(),
            -(Expr::symbol("x").pow(Expr::integer(2)))
        );
        assert_eq!(printed("x**2"), "x^2");
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(printed("2x"), "2*x");
        assert_eq!(printed("3(x+1)"), "3*(x + 1)");
        assert_eq!(printed("(x+1)(x-1)"), "(x + 1)*(x - 1)");
    }

    #[test]
    fn functions_and_constants() {
        assert_eq!(printed("sqrt(16)"), "sqrt(16)");
        assert_eq!(printed("sqrt16"), "sqrt(16)");
        assert_eq!(printed("sinx"), "sin(x)");
        assert_eq!(printed("2pi"), "2*pi");
        assert_eq!(printed("ln(x)"), "log(x)");
        assert_eq!(printed("sqrt(x)^2"), "sqrt(x)^2");
    }

    #[test]
    fn decimals_are_exact() {
        assert_eq!(parse("0.5").unwrap(), Expr::rational(1, 2));
        assert_eq!(parse("8.50").unwrap(), Expr::rational(17, 2));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("x+"), Err(ParseError::UnexpectedEnd));
        assert_eq!(parse("(x+1"), Err(ParseError::UnclosedParen(0)));
        assert!(matches!(parse("x+1)"), Err(ParseError::UnexpectedToken { .. })));
        assert!(matches!(parse("2 3"), Err(ParseError::UnexpectedToken { .. })));
        assert!(matches!(parse("*2"), Err(ParseError::UnexpectedToken { .. })));
        assert_eq!(parse("sqrt"), Err(ParseError::MissingArgument("sqrt".into())));
        assert_eq!(parse("x = 3"), Err(ParseError::Relation("=".into())));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let nested = format!("{}x{}", "(".repeat(5000), ")".repeat(5000));
        assert_eq!(parse(&nested), Err(ParseError::TooDeep(MAX_DEPTH)));

        let minus_chain = format!("{}x", "-".repeat(200_000));
        assert_eq!(parse(&minus_chain), Err(ParseError::TooDeep(MAX_DEPTH)));

        let power_tower = vec!["2"; 1000].join("^");
        assert_eq!(parse(&power_tower), Err(ParseError::TooDeep(MAX_DEPTH)));

        let long_sum = vec!["x"; 10_000].join(" + ");
        assert_eq!(parse(&long_sum), Err(ParseError::TooDeep(MAX_DEPTH)));

        let sqrt_chain = format!("{}x{}", "sqrt(".repeat(1000), ")".repeat(1000));
        assert_eq!(parse(&sqrt_chain), Err(ParseError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn moderate_nesting_is_accepted() {
        let nested = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&nested), Ok(Expr::symbol("x")));
        assert!(parse(&vec!["x"; 200].join(" + ")).is_ok());
        assert!(parse(&format!("{}x", "-".repeat(100))).is_ok());
    }
}
