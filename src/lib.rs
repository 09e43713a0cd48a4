//! # MashaDB
//!
//! > **Shorthand filters in, MySQL out.**
//!
//! MashaDB expands compact filter values into SQL predicates and assembles
//! them, with a projection, ordering and a limit, into one SELECT.
//!
//! ## Quick Example
//!
//! ```rust
//! use mashadb::prelude::*;
//!
//! let spec = QuerySpec::new("subscribers")
//!     .columns(["people", "city"])
//!     .filter("people", "Al or Vlad")
//!     .filter("age", "+18")
//!     .limit(10);
//!
//! assert_eq!(
//!     mashadb::assemble(&spec).unwrap(),
//!     "SELECT people, city FROM subscribers WHERE (people='Al' OR people='Vlad') AND age >= 18 LIMIT 10"
//! );
//! ```
//!
//! ## Shorthand
//!
//! | Shape        | Meaning         | Expands to                 |
//! |--------------|-----------------|----------------------------|
//! | `a..b`       | inclusive range | `BETWEEN 'a' AND 'b'`      |
//! | `%x`, `x%`   | wildcard        | `LIKE '%x'`                |
//! | `+n`         | at least        | `>= n`                     |
//! | `-n`         | at most         | `<= n`                     |
//! | `x or y`     | alternation     | `(k='x' OR k='y')`         |
//! | `x`          | equality        | `k='x'`                    |
//!
//! The output is plain text: literals are neither typed nor escaped. Bind
//! untrusted input through [`engine::MashaQuery::bind`] instead.

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod lexicon;
pub mod parser;
pub mod schema;
pub mod statements;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::Config;
    pub use crate::engine::{MashaDB, MashaQuery, MashaValue, Selector, TableHandle};
    pub use crate::error::*;
    pub use crate::parser::{expand, split_alternatives};
    pub use crate::schema::{ColumnDecl, ColumnPosition, ColumnSpec, PrimaryKeySpec};
    pub use crate::transpiler::ToSql;
}

pub use transpiler::{assemble, build};
pub use schema::build_columns;

/// Expand one shorthand token into its SQL predicate text.
///
/// # Example
///
/// ```
/// assert_eq!(mashadb::expand("id", "1..1000").unwrap(), "id BETWEEN '1' AND '1000'");
/// assert_eq!(mashadb::expand("age", "-65").unwrap(), "age <= 65");
/// ```
pub fn expand(key: &str, token: &str) -> Result<String, error::MashaError> {
    use transpiler::ToSql;
    Ok(parser::expand(key, token)?.to_sql())
}
