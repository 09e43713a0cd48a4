//! Value types shared by the parser, the transpiler and the engine.
//!
//! Everything here is built per call and dropped once the SQL text exists.

use std::fmt;

/// Logical operator applied between filter groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicalOp {
    #[default]
    And,
    Or,
}

impl LogicalOp {
    /// The joiner placed between groups, padded with spaces.
    pub fn joiner(self) -> &'static str {
        match self {
            LogicalOp::And => " AND ",
            LogicalOp::Or => " OR ",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "AND"),
            LogicalOp::Or => write!(f, "OR"),
        }
    }
}

impl std::str::FromStr for LogicalOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("and") {
            Ok(LogicalOp::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(LogicalOp::Or)
        } else {
            Err(format!("Invalid logical operator: '{}'. Expected: and, or", s))
        }
    }
}

/// Comparison operators reachable from the `+`/`-` shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `+n`
    Gte,
    /// `-n`
    Lte,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

/// One resolved SQL boolean condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `key='literal'`
    Equality { key: String, literal: String },
    /// `key >= literal` / `key <= literal`, unquoted
    Comparison {
        key: String,
        op: CompareOp,
        literal: String,
    },
    /// `key BETWEEN 'low' AND 'high'`
    Range {
        key: String,
        low: String,
        high: String,
    },
    /// `key LIKE 'pattern'`
    Like { key: String, pattern: String },
}

impl Predicate {
    /// The column this predicate constrains.
    pub fn key(&self) -> &str {
        match self {
            Predicate::Equality { key, .. }
            | Predicate::Comparison { key, .. }
            | Predicate::Range { key, .. }
            | Predicate::Like { key, .. } => key,
        }
    }
}

/// The OR-combined predicates of one filter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionGroup {
    pub key: String,
    pub predicates: Vec<Predicate>,
}

/// Condition groups joined by a single operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub groups: Vec<ConditionGroup>,
    pub combine_with: LogicalOp,
}

/// Insertion-ordered column -> shorthand value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(Vec<(String, String)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter; an existing key keeps its position and takes the new value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (key, value) in iter {
            filters.insert(key, value);
        }
        filters
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Filters {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// A column in a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// All columns (*)
    Star,
    /// A named column
    Named(String),
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Star => write!(f, "*"),
            Column::Named(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        if name == "*" {
            Column::Star
        } else {
            Column::Named(name.to_string())
        }
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::from(name.as_str())
    }
}

/// What goes after WHERE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Shorthand filters, expanded by the condition builder.
    Filters {
        filters: Filters,
        combine_with: LogicalOp,
    },
    /// Caller-supplied WHERE text, inserted verbatim.
    Raw(String),
}

/// Everything needed to assemble one SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub table: String,
    /// Empty means `*`.
    pub projection: Vec<Column>,
    pub condition: Option<Condition>,
    pub order_by: Option<String>,
    pub limit: Option<u64>,
}

impl QuerySpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: Vec::new(),
            condition: None,
            order_by: None,
            limit: None,
        }
    }

    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.projection = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a shorthand filter. Replaces a raw condition if one was set.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self.condition {
            Some(Condition::Filters { filters, .. }) => filters.insert(key, value),
            _ => {
                self.condition = Some(Condition::Filters {
                    filters: Filters::new().with(key, value),
                    combine_with: LogicalOp::And,
                });
            }
        }
        self
    }

    pub fn filters(mut self, filters: Filters, combine_with: LogicalOp) -> Self {
        self.condition = Some(Condition::Filters {
            filters,
            combine_with,
        });
        self
    }

    /// Set the operator between filter groups. No effect on raw conditions.
    pub fn combine_with(mut self, op: LogicalOp) -> Self {
        if let Some(Condition::Filters { combine_with, .. }) = &mut self.condition {
            *combine_with = op;
        }
        self
    }

    pub fn raw(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(Condition::Raw(condition.into()));
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}
