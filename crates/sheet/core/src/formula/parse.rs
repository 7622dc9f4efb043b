//! Tokenizer and recursive-descent parser for formula strings.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or      := and ( "||" and )*
//! and     := compare ( "&&" compare )*
//! compare := sum ( ("==" | "!=" | "<" | "<=" | ">" | ">=") sum )?
//! sum     := product ( ("+" | "-") product )*
//! product := power ( ("*" | "/" | "%") power )*
//! power   := unary ( "^" power )?
//! unary   := ("-" | "+" | "!") unary | primary
//! primary := number | "$" name | ident "(" args ")" | "(" or ")"
//! ```

use crate::error::FormulaError;
use crate::fixed::Fixed;

/// Parsed expressions nest no deeper than this.
pub const MAX_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(Fixed),
    Variable(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(Fixed),
    Variable(String),
    Ident(String),
    Op(&'static str),
    LeftParen,
    RightParen,
    Comma,
}

const OPERATORS: [&str; 16] = [
    "||", "&&", "==", "!=", "<=", ">=", "<", ">", "+", "-", "*", "/", "%", "^", "!", "=",
];

fn tokenize(input: &str) -> Result<Vec<Token>, FormulaError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() || (c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            let text = &input[start..i];
            let value = text
                .parse::<Fixed>()
                .map_err(|_| FormulaError::UnexpectedToken(text.to_owned()))?;
            tokens.push(Token::Number(value));
            continue;
        }
        if c == b'$' || c.is_ascii_alphabetic() || c == b'_' {
            let is_variable = c == b'$';
            let start = if is_variable { i + 1 } else { i };
            i = start;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
            {
                i += 1;
            }
            let name = &input[start..i];
            if name.is_empty() {
                return Err(FormulaError::UnexpectedCharacter {
                    found: '$',
                    offset: start - 1,
                });
            }
            tokens.push(if is_variable {
                Token::Variable(name.to_owned())
            } else {
                Token::Ident(name.to_ascii_lowercase())
            });
            continue;
        }
        match c {
            b'(' => tokens.push(Token::LeftParen),
            b')' => tokens.push(Token::RightParen),
            b',' => tokens.push(Token::Comma),
            _ => {
                let rest = &input[i..];
                let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
                    let found = rest.chars().next().unwrap_or('?');
                    return Err(FormulaError::UnexpectedCharacter { found, offset: i });
                };
                // A lone "=" is accepted as equality.
                tokens.push(Token::Op(if *op == "=" { "==" } else { op }));
                i += op.len();
                continue;
            }
        }
        i += 1;
    }
    Ok(tokens)
}

/// Parses a formula string into an expression tree.
pub fn parse(input: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(FormulaError::UnexpectedToken(format!("{token:?}"))),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_op(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn descend(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::TooDeep);
        }
        Ok(())
    }

    fn or(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.and()?;
        while self.eat_op(&["||"]).is_some() {
            let right = self.and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.compare()?;
        while self.eat_op(&["&&"]).is_some() {
            let right = self.compare()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn compare(&mut self) -> Result<Expr, FormulaError> {
        let left = self.sum()?;
        let Some(op) = self.eat_op(&["==", "!=", "<=", ">=", "<", ">"]) else {
            return Ok(left);
        };
        let op = match op {
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            "<=" => BinaryOp::LessEqual,
            ">=" => BinaryOp::GreaterEqual,
            "<" => BinaryOp::Less,
            _ => BinaryOp::Greater,
        };
        let right = self.sum()?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    fn sum(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.product()?;
        while let Some(op) = self.eat_op(&["+", "-"]) {
            let op = if op == "+" {
                BinaryOp::Add
            } else {
                BinaryOp::Subtract
            };
            let right = self.product()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn product(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.power()?;
        while let Some(op) = self.eat_op(&["*", "/", "%"]) {
            let op = match op {
                "*" => BinaryOp::Multiply,
                "/" => BinaryOp::Divide,
                _ => BinaryOp::Remainder,
            };
            let right = self.power()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.unary()?;
        if self.eat_op(&["^"]).is_none() {
            return Ok(base);
        }
        self.descend()?;
        let exponent = self.power()?;
        self.depth -= 1;
        Ok(Expr::Binary(BinaryOp::Power, Box::new(base), Box::new(exponent)))
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        let Some(op) = self.eat_op(&["-", "+", "!"]) else {
            return self.primary();
        };
        self.descend()?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(match op {
            "-" => Expr::Unary(UnaryOp::Negate, Box::new(operand)),
            "!" => Expr::Unary(UnaryOp::Not, Box::new(operand)),
            _ => operand,
        })
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Variable(name)) => Ok(Expr::Variable(name)),
            Some(Token::LeftParen) => {
                self.descend()?;
                let inner = self.or()?;
                self.depth -= 1;
                self.expect_right_paren()?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.next() != Some(Token::LeftParen) {
                    return Err(FormulaError::UnexpectedToken(name));
                }
                self.descend()?;
                let mut args = Vec::new();
                if self.peek() == Some(&Token::RightParen) {
                    self.pos += 1;
                } else {
                    loop {
                        args.push(self.or()?);
                        match self.next() {
                            Some(Token::Comma) => continue,
                            Some(Token::RightParen) => break,
                            Some(other) => {
                                return Err(FormulaError::UnexpectedToken(format!("{other:?}")));
                            }
                            None => return Err(FormulaError::UnexpectedEnd),
                        }
                    }
                }
                self.depth -= 1;
                Ok(Expr::Call(name, args))
            }
            Some(other) => Err(FormulaError::UnexpectedToken(format!("{other:?}"))),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    fn expect_right_paren(&mut self) -> Result<(), FormulaError> {
        match self.next() {
            Some(Token::RightParen) => Ok(()),
            Some(other) => Err(FormulaError::UnexpectedToken(format!("{other:?}"))),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("1 + 2 * 3").unwrap();
        let Expr::Binary(BinaryOp::Add, _, right) = expr else {
            panic!("expected addition at the root");
        };
        assert!(matches!(*right, Expr::Binary(BinaryOp::Multiply, _, _)));
    }

    #[test]
    fn variables_keep_dotted_names() {
        assert_eq!(
            parse("$hp.current").unwrap(),
            Expr::Variable("hp.current".into())
        );
    }

    #[test]
    fn function_names_are_case_insensitive() {
        let expr = parse("FLOOR($basic_speed)").unwrap();
        assert!(matches!(expr, Expr::Call(ref name, ref args) if name == "floor" && args.len() == 1));
    }

    #[test]
    fn malformed_input_is_reported() {
        assert_eq!(parse("(1 + 2"), Err(FormulaError::UnexpectedEnd));
        assert!(matches!(
            parse("2 # 3"),
            Err(FormulaError::UnexpectedCharacter { found: '#', .. })
        ));
        assert_eq!(parse(""), Err(FormulaError::UnexpectedEnd));
    }

    #[test]
    fn runaway_nesting_is_rejected() {
        let formula = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(parse(&formula), Err(FormulaError::TooDeep));
    }
}
