//! SQL Transpiler for MashaDB.
//!
//! Converts parsed filters and query specs into SQL strings.

use crate::ast::*;
use crate::error::{MashaError, MashaResult};
use crate::parser;

/// Trait for converting resolved nodes to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self) -> String;
}

impl ToSql for Predicate {
    fn to_sql(&self) -> String {
        match self {
            Predicate::Equality { key, literal } => format!("{}='{}'", key, literal),
            Predicate::Comparison { key, op, literal } => format!("{} {} {}", key, op, literal),
            Predicate::Range { key, low, high } => {
                format!("{} BETWEEN '{}' AND '{}'", key, low, high)
            }
            Predicate::Like { key, pattern } => format!("{} LIKE '{}'", key, pattern),
        }
    }
}

impl ToSql for ConditionGroup {
    fn to_sql(&self) -> String {
        let predicates: Vec<String> = self.predicates.iter().map(|p| p.to_sql()).collect();
        let group = predicates.join(" OR ");
        // Parenthesize alternations so AND binds across keys, not into the OR list
        if self.predicates.len() > 1 {
            format!("({})", group)
        } else {
            group
        }
    }
}

impl ToSql for WhereClause {
    fn to_sql(&self) -> String {
        let groups: Vec<String> = self.groups.iter().map(|g| g.to_sql()).collect();
        groups.join(self.combine_with.joiner())
    }
}

/// Build a WHERE predicate (without the keyword) from shorthand filters.
///
/// # Example
///
/// ```
/// use mashadb::ast::{Filters, LogicalOp};
/// use mashadb::transpiler::build;
///
/// let filters = Filters::new().with("people", "Tom").with("city", "London or Moscow");
/// assert_eq!(
///     build(&filters, LogicalOp::And).unwrap(),
///     "people='Tom' AND (city='London' OR city='Moscow')"
/// );
/// ```
pub fn build(filters: &Filters, combine_with: LogicalOp) -> MashaResult<String> {
    Ok(parser::parse_filters(filters, combine_with)?.to_sql())
}

/// Render the text that follows WHERE.
fn condition_sql(condition: &Condition) -> MashaResult<String> {
    match condition {
        Condition::Filters {
            filters,
            combine_with,
        } => build(filters, *combine_with),
        Condition::Raw(raw) if raw.trim().is_empty() => Err(MashaError::EmptyCondition),
        Condition::Raw(raw) => Ok(raw.clone()),
    }
}

/// Assemble a full SELECT statement.
pub fn assemble(spec: &QuerySpec) -> MashaResult<String> {
    let mut sql = String::from("SELECT ");

    // Columns
    if spec.projection.is_empty() {
        sql.push('*');
    } else {
        let cols: Vec<String> = spec.projection.iter().map(|c| c.to_string()).collect();
        sql.push_str(&cols.join(", "));
    }

    // FROM
    sql.push_str(" FROM ");
    sql.push_str(&spec.table);

    // WHERE
    if let Some(condition) = &spec.condition {
        sql.push_str(" WHERE ");
        sql.push_str(&condition_sql(condition)?);
    }

    // ORDER BY
    if let Some(order) = spec.order_by.as_deref().filter(|o| !o.trim().is_empty()) {
        sql.push_str(" ORDER BY ");
        sql.push_str(order);
    }

    // LIMIT
    if let Some(n) = spec.limit {
        sql.push_str(&format!(" LIMIT {}", n));
    }

    Ok(sql.trim().to_string())
}
