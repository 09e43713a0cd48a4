//! The operator lexicon.
//!
//! A fixed, priority-ordered table of shorthand triggers. Rules are not
//! mutually exclusive, so the first matching rule decides the token kind.
//!
//! | Priority | Trigger         | Kind       | Example     |
//! |----------|-----------------|------------|-------------|
//! | 1        | `..` anywhere   | Range      | `1..1000`   |
//! | 2        | `%` anywhere    | Wildcard   | `%ville`    |
//! | 3        | leading `+`/`-` | Comparison | `+18`       |
//! | -        | none            | Equality   | `Tom`       |

use std::fmt;

/// The kind of predicate a shorthand token expands into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `low..high` -> BETWEEN
    Range,
    /// `%text`, `text%`, `te%xt` -> LIKE
    Wildcard,
    /// `+n` -> `>=`, `-n` -> `<=`
    Comparison,
    /// Plain literal -> `=`
    Equality,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Range => write!(f, "range"),
            TokenKind::Wildcard => write!(f, "wildcard"),
            TokenKind::Comparison => write!(f, "comparison"),
            TokenKind::Equality => write!(f, "equality"),
        }
    }
}

/// One recognition rule of the lexicon.
pub struct Rule {
    pub kind: TokenKind,
    /// The trigger as a user would type it.
    pub trigger: &'static str,
    matches: fn(&str) -> bool,
}

impl Rule {
    /// Does this rule's trigger appear in `token`?
    pub fn matches(&self, token: &str) -> bool {
        (self.matches)(token)
    }
}

/// Recognition rules in priority order. Equality is the fallback and has no rule.
pub static LEXICON: [Rule; 3] = [
    Rule {
        kind: TokenKind::Range,
        trigger: "..",
        matches: is_range,
    },
    Rule {
        kind: TokenKind::Wildcard,
        trigger: "%",
        matches: is_wildcard,
    },
    Rule {
        kind: TokenKind::Comparison,
        trigger: "+ -",
        matches: is_comparison,
    },
];

fn is_range(token: &str) -> bool {
    token.contains("..")
}

fn is_wildcard(token: &str) -> bool {
    token.contains('%')
}

fn is_comparison(token: &str) -> bool {
    token.starts_with(['+', '-'])
}

/// Rule pairs that priority alone must not settle.
const CONFLICTS: [(TokenKind, TokenKind); 1] = [(TokenKind::Range, TokenKind::Wildcard)];

/// Two rules matched a token and neither may win by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict(pub TokenKind, pub TokenKind);

/// Classify a token against the lexicon, first match wins.
pub fn classify(token: &str) -> Result<TokenKind, Conflict> {
    let mut matched = LEXICON.iter().filter(|rule| rule.matches(token));

    let Some(first) = matched.next() else {
        return Ok(TokenKind::Equality);
    };

    for other in matched {
        if CONFLICTS.contains(&(first.kind, other.kind)) {
            return Err(Conflict(first.kind, other.kind));
        }
    }

    Ok(first.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_is_equality() {
        assert_eq!(classify("Tom"), Ok(TokenKind::Equality));
        assert_eq!(classify(""), Ok(TokenKind::Equality));
        assert_eq!(classify("2023.5"), Ok(TokenKind::Equality));
    }

    #[test]
    fn test_range_beats_comparison() {
        assert_eq!(classify("-5..5"), Ok(TokenKind::Range));
        assert_eq!(classify("1.."), Ok(TokenKind::Range));
    }

    #[test]
    fn test_wildcard_positions() {
        assert_eq!(classify("%ville"), Ok(TokenKind::Wildcard));
        assert_eq!(classify("Lon%"), Ok(TokenKind::Wildcard));
        assert_eq!(classify("Lo%on"), Ok(TokenKind::Wildcard));
        assert_eq!(classify("+10%"), Ok(TokenKind::Wildcard));
    }

    #[test]
    fn test_comparison_only_when_leading() {
        assert_eq!(classify("+18"), Ok(TokenKind::Comparison));
        assert_eq!(classify("-65"), Ok(TokenKind::Comparison));
        assert_eq!(classify("Jean-Luc"), Ok(TokenKind::Equality));
    }

    #[test]
    fn test_range_and_wildcard_conflict() {
        assert_eq!(
            classify("%2023..2024%"),
            Err(Conflict(TokenKind::Range, TokenKind::Wildcard))
        );
    }
}
