//! Shorthand filter parser using nom.
//!
//! Turns `column = value` filters into typed predicates.
//!
//! # Syntax Overview
//!
//! ```text
//! city = "Berlin..London or %ville or Paris"
//!         ──────┬─────── ─┬ ──┬──── ─┬ ──┬──
//!               │         │   │      │   └── Equality  city='Paris'
//!               │         │   │      └── Split (case-insensitive, whitespace around)
//!               │         │   └── Wildcard  city LIKE '%ville'
//!               │         └── Split
//!               └── Range  city BETWEEN 'Berlin' AND 'London'
//! ```

use nom::{
    bytes::complete::tag_no_case,
    character::complete::multispace1,
    combinator::{peek, recognize},
    sequence::tuple,
    IResult,
};

use crate::ast::*;
use crate::error::{MashaError, MashaResult};
use crate::lexicon::{self, Conflict, TokenKind};

/// Recognize the alternation separator: whitespace, then `or` followed by whitespace.
///
/// The trailing whitespace is only peeked, so it can open the next separator.
fn or_separator(input: &str) -> IResult<&str, &str> {
    recognize(tuple((multispace1, tag_no_case("or"), peek(multispace1))))(input)
}

/// Split a filter value into its alternatives.
///
/// ```
/// use mashadb::parser::split_alternatives;
///
/// assert_eq!(split_alternatives("Al or Bob OR Vlad"), vec!["Al", "Bob", "Vlad"]);
/// assert_eq!(split_alternatives("Oregon"), vec!["Oregon"]);
/// ```
pub fn split_alternatives(value: &str) -> Vec<&str> {
    let mut alternatives = Vec::new();
    let mut start = 0;
    let mut cursor = 0;

    while let Some(c) = value[cursor..].chars().next() {
        match or_separator(&value[cursor..]) {
            Ok((remaining, _)) => {
                alternatives.push(&value[start..cursor]);
                cursor = value.len() - remaining.len();
                start = cursor;
            }
            Err(_) => cursor += c.len_utf8(),
        }
    }

    alternatives.push(&value[start..]);
    for alternative in alternatives.iter_mut().skip(1) {
        *alternative = alternative.trim_start();
    }
    alternatives
}

/// Expand one shorthand token for `key` into a predicate.
pub fn expand(key: &str, token: &str) -> MashaResult<Predicate> {
    if token.is_empty() {
        return Err(MashaError::malformed(key, token, "empty alternative"));
    }

    let kind = lexicon::classify(token).map_err(|Conflict(first, second)| {
        MashaError::AmbiguousToken {
            key: key.to_string(),
            token: token.to_string(),
            first,
            second,
        }
    })?;

    match kind {
        TokenKind::Range => expand_range(key, token),
        TokenKind::Wildcard => Ok(Predicate::Like {
            key: key.to_string(),
            pattern: token.to_string(),
        }),
        TokenKind::Comparison => expand_comparison(key, token),
        TokenKind::Equality => Ok(Predicate::Equality {
            key: key.to_string(),
            literal: token.to_string(),
        }),
    }
}

fn expand_range(key: &str, token: &str) -> MashaResult<Predicate> {
    let bounds: Vec<&str> = token.split("..").collect();
    match bounds.as_slice() {
        [low, high] if !low.is_empty() && !high.is_empty() => Ok(Predicate::Range {
            key: key.to_string(),
            low: low.to_string(),
            high: high.to_string(),
        }),
        _ => Err(MashaError::malformed(
            key,
            token,
            "range needs exactly two non-empty bounds",
        )),
    }
}

fn expand_comparison(key: &str, token: &str) -> MashaResult<Predicate> {
    let (op, literal) = match token.split_at(1) {
        ("+", rest) => (CompareOp::Gte, rest),
        (_, rest) => (CompareOp::Lte, rest),
    };

    if literal.is_empty() {
        return Err(MashaError::malformed(key, token, "comparison has no operand"));
    }

    Ok(Predicate::Comparison {
        key: key.to_string(),
        op,
        literal: literal.to_string(),
    })
}

/// Parse one filter into its OR-group.
pub fn parse_group(key: &str, value: &str) -> MashaResult<ConditionGroup> {
    let predicates = split_alternatives(value)
        .into_iter()
        .map(|token| expand(key, token))
        .collect::<MashaResult<Vec<_>>>()?;

    Ok(ConditionGroup {
        key: key.to_string(),
        predicates,
    })
}

/// Parse every filter, in insertion order, into a WHERE clause.
pub fn parse_filters(filters: &Filters, combine_with: LogicalOp) -> MashaResult<WhereClause> {
    if filters.is_empty() {
        return Err(MashaError::EmptyCondition);
    }

    let groups = filters
        .iter()
        .map(|(key, value)| parse_group(key, value))
        .collect::<MashaResult<Vec<_>>>()?;

    Ok(WhereClause {
        groups,
        combine_with,
    })
}
