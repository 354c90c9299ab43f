use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    LessThan,
    LessThanEqual,
    GreaterThanEqual,
    GreaterThan,
    Equal,
}

impl ComparisonOperator {
    #[inline]
    pub fn apply<T: PartialOrd>(&self, a: &T, b: &T) -> bool {
        match self {
            Self::LessThan => *a < *b,
            Self::LessThanEqual => *a <= *b,
            Self::GreaterThan => *a > *b,
            Self::GreaterThanEqual => *a >= *b,
            Self::Equal => *a == *b,
        }
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEqual => ">=",
            Self::Equal => "==",
        }
    }
}

/// Logical connectives; both operands are always evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    #[inline]
    pub fn apply(&self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
        }
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
