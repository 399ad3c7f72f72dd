use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::tools::{Param, ParamKind, Tool, ToolCategory, ToolError};

/// Arithmetic over `+ - * / % ^` and parentheses
pub struct Calculate;

const PARAMS: &[Param] = &[Param::required(
    "expression",
    ParamKind::String,
    "Arithmetic expression, e.g. (2 + 3) * 4",
)];

const ALIASES: &[(&str, &str)] = &[
    ("expr", "expression"),
    ("input", "expression"),
    ("formula", "expression"),
    ("math", "expression"),
    ("equation", "expression"),
    ("query", "expression"),
];

#[async_trait]
impl Tool for Calculate {
    fn name(&self) -> &'static str {
        "calculate"
    }

    fn description(&self) -> &'static str {
        "Evaluate an arithmetic expression and return the numeric result"
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Safe
    }

    fn params(&self) -> &'static [Param] {
        PARAMS
    }

    fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        ALIASES
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let expression = args.get("expression").and_then(Value::as_str).unwrap_or_default();
        let result = evaluate(expression).map_err(ToolError::Execution)?;

        number(result).ok_or_else(|| ToolError::Execution("result is not a finite number".to_owned()))
    }
}

/// Whole results render as integers, so `2+2` reads `4` rather than `4.0`
#[allow(clippy::cast_possible_truncation)]
fn number(value: f64) -> Option<Value> {
    const EXACT: f64 = 9_007_199_254_740_992.0;

    if value.fract() == 0.0 && value.abs() < EXACT {
        return Some(Value::from(value as i64));
    }
    serde_json::Number::from_f64(value).map(Value::Number)
}

/// Evaluate an expression with the usual precedence; `^` is right-associative
pub fn evaluate(expression: &str) -> Result<f64, String> {
    let mut parser = Parser {
        chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
    };

    if parser.chars.is_empty() {
        return Err("expression is empty".to_owned());
    }

    let value = parser.sum()?;
    match parser.peek() {
        None => Ok(value),
        Some(c) => Err(format!("unexpected '{c}' at position {}", parser.pos)),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn sum(&mut self) -> Result<f64, String> {
        let mut value = self.product()?;
        loop {
            if self.eat('+') {
                value += self.product()?;
            } else if self.eat('-') {
                value -= self.product()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn product(&mut self) -> Result<f64, String> {
        let mut value = self.power()?;
        loop {
            if self.eat('*') {
                value *= self.power()?;
            } else if self.eat('/') {
                let divisor = self.power()?;
                if divisor.abs() < f64::EPSILON {
                    return Err("division by zero".to_owned());
                }
                value /= divisor;
            } else if self.eat('%') {
                let divisor = self.power()?;
                if divisor.abs() < f64::EPSILON {
                    return Err("modulo by zero".to_owned());
                }
                value %= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    fn power(&mut self) -> Result<f64, String> {
        let base = self.unary()?;
        if self.eat('^') {
            let exponent = self.power()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<f64, String> {
        if self.eat('-') {
            return Ok(-self.unary()?);
        }
        if self.eat('+') {
            return self.unary();
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<f64, String> {
        if self.eat('(') {
            let value = self.sum()?;
            if !self.eat(')') {
                return Err("missing closing parenthesis".to_owned());
            }
            return Ok(value);
        }

        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }

        if start == self.pos {
            return match self.peek() {
                Some(c) => Err(format!("unexpected '{c}' at position {start}")),
                None => Err("unexpected end of expression".to_owned()),
            };
        }

        let literal: String = self.chars[start..self.pos].iter().collect();
        literal.parse().map_err(|_| format!("invalid number '{literal}'"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(evaluate("2 + 3 * 4"), Ok(14.0));
        assert_eq!(evaluate("(2 + 3) * 4"), Ok(20.0));
        assert_eq!(evaluate("2 ^ 3 ^ 2"), Ok(512.0));
        assert_eq!(evaluate("-2 ^ 2"), Ok(4.0));
        assert_eq!(evaluate("10 % 4 - 1.5"), Ok(0.5));
    }

    #[test]
    fn malformed_expressions() {
        assert_eq!(evaluate("1 / 0"), Err("division by zero".to_owned()));
        assert_eq!(evaluate("(1 + 2"), Err("missing closing parenthesis".to_owned()));
        assert_eq!(evaluate("2 + x"), Err("unexpected 'x' at position 2".to_owned()));
        assert_eq!(evaluate("1.2.3"), Err("invalid number '1.2.3'".to_owned()));
        assert!(evaluate("  ").is_err());
    }

    #[tokio::test]
    async fn returns_a_number() {
        let mut args = Map::new();
        args.insert("expression".to_owned(), json!("2+2"));

        assert_eq!(Calculate.execute(args).await, Ok(json!(4)));
    }

    #[test]
    fn fractions_stay_floats() {
        assert_eq!(number(2.5), Some(json!(2.5)));
        assert_eq!(number(-3.0), Some(json!(-3)));
        assert_eq!(number(f64::NAN), None);
    }
}
