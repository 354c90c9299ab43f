use crate::{
    lexer::{self, Token},
    station::StationRecord,
};
use itertools::Itertools;
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("unknown token '{token}' at position {position}")]
    UnknownToken { token: String, position: usize },
    #[error("operator '{operator}' at position {position} is missing an operand")]
    StackUnderflow { operator: Token, position: usize },
    #[error("expression leaves {depth} values on the stack instead of one")]
    Unbalanced { depth: usize },
}

/// A validated postfix rule over station attributes.
///
/// The rule is checked once when it is built: every operator has both of its
/// operands and exactly one value remains at the end. Evaluating it against a
/// [`StationRecord`] therefore never fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    tokens: Vec<Token>,
    max_depth: usize,
}

impl Expression {
    pub fn new(tokens: Vec<Token>) -> Result<Self, ExpressionError> {
        let mut depth = 0usize;
        let mut max_depth = 0usize;
        for (position, token) in tokens.iter().enumerate() {
            match token {
                Token::Attribute(_) | Token::Integer(_) => {
                    depth += 1;
                    max_depth = max_depth.max(depth);
                }
                Token::Comparison(_) | Token::Logical(_) => {
                    if depth < 2 {
                        return Err(ExpressionError::StackUnderflow {
                            operator: *token,
                            position,
                        });
                    }
                    depth -= 1;
                }
            }
        }

        if depth != 1 {
            return Err(ExpressionError::Unbalanced { depth });
        }
        Ok(Self { tokens, max_depth })
    }

    /// Parses a whitespace-separated rule such as `slots 1 >= power 50 >= &&`.
    ///
    /// Every word must be a whole token: `slots1` is rejected, not read as
    /// `slots 1`.
    pub fn parse(input: &str) -> Result<Self, ExpressionError> {
        Self::from_words(input.split_whitespace())
    }

    /// Builds a rule from pre-split tokens such as `["slots", "1", ">="]`.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ExpressionError> {
        Self::from_words(tokens.iter().map(AsRef::as_ref))
    }

    fn from_words<'a>(words: impl Iterator<Item = &'a str>) -> Result<Self, ExpressionError> {
        let tokens = words
            .enumerate()
            .map(|(position, word)| {
                lexer::token(word).ok_or_else(|| ExpressionError::UnknownToken {
                    token: word.to_string(),
                    position,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tokens)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn evaluate(&self, record: &StationRecord) -> bool {
        let mut stack: Vec<i64> = Vec::with_capacity(self.max_depth);
        for token in &self.tokens {
            match *token {
                Token::Attribute(attribute) => stack.push(record.get(attribute)),
                Token::Integer(value) => stack.push(value),
                Token::Comparison(operator) => {
                    let (left, right) = pop_operands(&mut stack);
                    stack.push(i64::from(operator.apply(&left, &right)));
                }
                Token::Logical(operator) => {
                    let (left, right) = pop_operands(&mut stack);
                    stack.push(i64::from(operator.apply(left != 0, right != 0)));
                }
            }
        }

        match stack.as_slice() {
            [result] => *result != 0,
            stack => unreachable!(
                "validated expression left {} values on the stack. This is a bug.",
                stack.len()
            ),
        }
    }
}

/// Pops the right operand, then the left one.
#[inline]
fn pop_operands(stack: &mut Vec<i64>) -> (i64, i64) {
    match (stack.pop(), stack.pop()) {
        (Some(right), Some(left)) => (left, right),
        _ => unreachable!("validated expression ran out of operands. This is a bug."),
    }
}

/// Evaluates a postfix rule given as separate tokens against one station.
pub fn evaluate<S: AsRef<str>>(
    tokens: &[S],
    record: &StationRecord,
) -> Result<bool, ExpressionError> {
    Expression::from_tokens(tokens).map(|expression| expression.evaluate(record))
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.iter().join(" "))
    }
}
