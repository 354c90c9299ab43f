use crate::{
    operators::{ComparisonOperator, LogicalOperator},
    station::Attribute,
};
use logos::Logos;
use std::fmt;

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    #[token("power", |_| Attribute::Power)]
    #[token("price", |_| Attribute::Price)]
    #[token("slots", |_| Attribute::Slots)]
    Attribute(Attribute),
    #[regex("-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),
    #[token(">=", |_| ComparisonOperator::GreaterThanEqual)]
    #[token("<=", |_| ComparisonOperator::LessThanEqual)]
    #[token(">", |_| ComparisonOperator::GreaterThan)]
    #[token("<", |_| ComparisonOperator::LessThan)]
    #[token("==", |_| ComparisonOperator::Equal)]
    Comparison(ComparisonOperator),
    #[token("&&", |_| LogicalOperator::And)]
    #[token("||", |_| LogicalOperator::Or)]
    Logical(LogicalOperator),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(attribute) => write!(f, "{attribute}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Comparison(operator) => write!(f, "{operator}"),
            Self::Logical(operator) => write!(f, "{operator}"),
        }
    }
}

/// Reads one whole word of a rule, e.g. an element of `["slots", "1", ">="]`.
///
/// Returns `None` unless the entire word is a single token.
pub fn token(input: &str) -> Option<Token> {
    let mut lexer = Token::lexer(input);
    match (lexer.next(), lexer.next()) {
        (Some(Ok(token)), None) => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn tokens(input: &str) -> Vec<Option<Token>> {
        input.split_whitespace().map(token).collect_vec()
    }

    #[test]
    fn can_tokenize_a_rule() {
        assert_eq!(
            tokens("slots 1 >= power 50 >= &&"),
            vec![
                Some(Token::Attribute(Attribute::Slots)),
                Some(Token::Integer(1)),
                Some(Token::Comparison(ComparisonOperator::GreaterThanEqual)),
                Some(Token::Attribute(Attribute::Power)),
                Some(Token::Integer(50)),
                Some(Token::Comparison(ComparisonOperator::GreaterThanEqual)),
                Some(Token::Logical(LogicalOperator::And)),
            ]
        );
    }

    #[test]
    fn can_tokenize_every_operator() {
        assert_eq!(
            tokens("> < <= == ||"),
            vec![
                Some(Token::Comparison(ComparisonOperator::GreaterThan)),
                Some(Token::Comparison(ComparisonOperator::LessThan)),
                Some(Token::Comparison(ComparisonOperator::LessThanEqual)),
                Some(Token::Comparison(ComparisonOperator::Equal)),
                Some(Token::Logical(LogicalOperator::Or)),
            ]
        );
    }

    #[test]
    fn can_tokenize_negative_integers() {
        assert_eq!(token("-42"), Some(Token::Integer(-42)));
    }

    #[test]
    fn reject_an_integer_that_overflows() {
        assert_eq!(token("99999999999999999999"), None);
    }

    #[test]
    fn reject_words_that_are_not_a_single_token() {
        assert_eq!(token("slots1"), None);
        assert_eq!(token("powerprice"), None);
        assert_eq!(token(">=1"), None);
        assert_eq!(token("slots 1"), None);
        assert_eq!(token(" slots"), None);
    }

    #[test]
    fn can_read_a_standalone_token() {
        assert_eq!(token("price"), Some(Token::Attribute(Attribute::Price)));
        assert_eq!(token("300"), Some(Token::Integer(300)));
        assert_eq!(token("watts"), None);
        assert_eq!(token(""), None);
    }
}
