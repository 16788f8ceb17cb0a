//! Tokenizer for normalized expression text.
//!
//! Identifiers are runs of alphabetic characters. A run that starts with a
//! known function name is split (`sinx` lexes as `sin`, `x`), so that text
//! such as `sqrtx` produced from `√x` still reads as a function application.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::error::ParseError;
use crate::expr::{Constant, Function};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(BigRational),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Relation(String),
}

impl Token {
    /// Whether this token can end an operand (used for implicit multiplication).
    fn ends_operand(&self) -> bool {
        match self {
            Token::Number(_) | Token::RParen => true,
            Token::Ident(name) => Function::from_name(name).is_none(),
            _ => false,
        }
    }

    /// Whether this token can start an operand.
    fn starts_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Ident(_) | Token::LParen)
    }

    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Ident(name) => name.clone(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::Caret => "^".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Relation(op) => op.clone(),
        }
    }
}

/// A token with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Split `input` into tokens.
pub fn lex(input: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::with_capacity(input.len() / 2 + 1);
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch.is_ascii_digit() || ch == '.' {
            let mut literal = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() || c == '.' {
                    literal.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Spanned {
                token: Token::Number(parse_decimal(&literal)?),
                offset,
            });
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let mut run = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_alphabetic() || c == '_' {
                    run.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            split_identifier(&run, offset, &mut tokens);
            continue;
        }

        chars.next();
        let next = chars.peek().map(|&(_, c)| c);
        let token = match (ch, next) {
            ('*', Some('*')) => {
                chars.next();
                Token::Caret
            }
            ('+', _) => Token::Plus,
            ('-', _) => Token::Minus,
            ('*', _) => Token::Star,
            ('/', _) => Token::Slash,
            ('^', _) => Token::Caret,
            ('(' | '[' | '{', _) => Token::LParen,
            (')' | ']' | '}', _) => Token::RParen,
            ('<' | '>' | '!' | '~' | '=', Some('=')) => {
                chars.next();
                Token::Relation(format!("{ch}="))
            }
            ('<' | '>' | '=', _) => Token::Relation(ch.to_string()),
            _ => return Err(ParseError::UnexpectedChar { ch, offset }),
        };
        tokens.push(Spanned { token, offset });
    }

    Ok(insert_implicit_multiplication(tokens))
}

/// Parse a decimal literal (`12`, `3.5`, `.5`, `8.`) into an exact rational.
fn parse_decimal(literal: &str) -> Result<BigRational, ParseError> {
    let invalid = || ParseError::InvalidNumber(literal.to_string());
    let (integer_part, fractional_part) = match literal.split_once('.') {
        Some((_, frac)) if frac.contains('.') => return Err(invalid()),
        Some((int, frac)) => (int, frac),
        None => (literal, ""),
    };
    if integer_part.is_empty() && fractional_part.is_empty() {
        return Err(invalid());
    }

    let digits = format!("{integer_part}{fractional_part}");
    let numerator: BigInt = digits.parse().map_err(|_| invalid())?;
    let mut denominator = BigInt::one();
    for _ in 0..fractional_part.len() {
        denominator *= 10;
    }
    if denominator.is_zero() {
        return Err(invalid());
    }
    Ok(BigRational::new(numerator, denominator))
}

fn split_identifier(run: &str, offset: usize, out: &mut Vec<Spanned>) {
    let mut rest = run;
    let mut at = offset;
    while !rest.is_empty() {
        if Function::from_name(rest).is_some() || Constant::from_name(rest).is_some() {
            out.push(Spanned {
                token: Token::Ident(rest.to_string()),
                offset: at,
            });
            return;
        }
        let prefix = Function::NAMES
            .iter()
            .map(|(name, _)| *name)
            .find(|name| rest.starts_with(name));
        match prefix {
            Some(name) => {
                out.push(Spanned {
                    token: Token::Ident(name.to_string()),
                    offset: at,
                });
                rest = &rest[name.len()..];
                at += name.len();
            }
            None => {
                out.push(Spanned {
                    token: Token::Ident(rest.to_string()),
                    offset: at,
                });
                return;
            }
        }
    }
}

/// Insert `*` between adjacent operands: `2x`, `2(x+1)`, `(a)(b)`, `x y`.
/// Two adjacent numbers are left alone so that `2 3` stays a syntax error.
fn insert_implicit_multiplication(tokens: Vec<Spanned>) -> Vec<Spanned> {
    let mut out: Vec<Spanned> = Vec::with_capacity(tokens.len() * 2);
    for spanned in tokens {
        if let Some(prev) = out.last() {
            let both_numbers = matches!(prev.token, Token::Number(_))
                && matches!(spanned.token, Token::Number(_));
            if prev.token.ends_operand() && spanned.token.starts_operand() && !both_numbers {
                out.push(Spanned {
                    token: Token::Star,
                    offset: spanned.offset,
                });
            }
        }
        out.push(spanned);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        lex(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    fn num(n: i64) -> Token {
        Token::Number(BigRational::from_integer(BigInt::from(n)))
    }

    #[test]
    fn lexes_operators_and_numbers() {
        assert_eq!(
            kinds("2 + 3.5**x"),
            vec![
                num(2),
                Token::Plus,
                Token::Number(BigRational::new(BigInt::from(7), BigInt::from(2))),
                Token::Caret,
                Token::Ident("x".into()),
            ]
        );
    }

    #[test]
    fn inserts_implicit_multiplication() {
        assert_eq!(
            kinds("2x(y)"),
            vec![
                num(2),
                Token::Star,
                Token::Ident("x".into()),
                Token::Star,
                Token::LParen,
                Token::Ident("y".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn no_implicit_multiplication_after_function_name() {
        assert_eq!(
            kinds("sin(x)"),
            vec![
                Token::Ident("sin".into()),
                Token::LParen,
                Token::Ident("x".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn splits_function_prefix() {
        assert_eq!(
            kinds("sqrtx"),
            vec![Token::Ident("sqrt".into()), Token::Ident("x".into())]
        );
        assert_eq!(kinds("xy"), vec![Token::Ident("xy".into())]);
    }

    #[test]
    fn recognises_relations() {
        assert_eq!(
            kinds("x<=5"),
            vec![Token::Ident("x".into()), Token::Relation("<=".into()), num(5)]
        );
    }

    #[test]
    fn rejects_unknown_characters() {
        assert_eq!(
            lex("%%%"),
            Err(ParseError::UnexpectedChar { ch: '%', offset: 0 })
        );
        assert!(matches!(lex("1.2.3"), Err(ParseError::InvalidNumber(_))));
        assert!(matches!(lex("."), Err(ParseError::InvalidNumber(_))));
    }
}
