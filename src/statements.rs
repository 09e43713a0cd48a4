//! Table-management statements.
//!
//! Values travel as `?` placeholders and are bound by the engine; only
//! identifiers are spliced into the text.

use crate::error::{MashaError, MashaResult};
use crate::schema::{ColumnPosition, PrimaryKeySpec};

fn require_columns(columns: &[&str], action: &str) -> MashaResult<()> {
    if columns.is_empty() {
        return Err(MashaError::InvalidValue(format!("{} needs at least one column", action)));
    }
    Ok(())
}

/// `INSERT IGNORE INTO <table> (a, b) VALUES (?, ?)`
pub fn insert(table: &str, columns: &[&str]) -> MashaResult<String> {
    require_columns(columns, "INSERT")?;
    let placeholders = vec!["?"; columns.len()].join(", ");
    Ok(format!(
        "INSERT IGNORE INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    ))
}

/// `UPDATE <table> SET a=?, b=? WHERE <key>=?`; the row id binds last.
pub fn update(table: &str, key: &str, columns: &[&str]) -> MashaResult<String> {
    require_columns(columns, "UPDATE")?;
    let sets: Vec<String> = columns.iter().map(|c| format!("{}=?", c)).collect();
    Ok(format!(
        "UPDATE {} SET {} WHERE {}=?",
        table,
        sets.join(", "),
        key
    ))
}

pub fn delete(table: &str, column: &str) -> String {
    format!("DELETE FROM {} WHERE {}=?", table, column)
}

pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", table)
}

pub fn rename_table(table: &str, new_name: &str) -> String {
    format!("ALTER TABLE {} RENAME TO {}", table, new_name)
}

pub fn drop_column(table: &str, column: &str) -> String {
    format!("ALTER TABLE {} DROP COLUMN {}", table, column)
}

pub fn rename_column(table: &str, column: &str, new_name: &str) -> String {
    format!("ALTER TABLE {} RENAME COLUMN {} TO {}", table, column, new_name)
}

/// Rebuild the primary key so rows count up from 1 again.
///
/// With no existing key, an `id` column is created instead.
pub fn renumber(table: &str, primary_key: Option<&str>) -> Vec<String> {
    let key = primary_key.unwrap_or("id");
    let spec = PrimaryKeySpec::new(key);
    let add = format!(
        "ALTER TABLE {} ADD COLUMN {} {} FIRST",
        table,
        key,
        spec.inline_definition()
    );
    match primary_key {
        Some(key) => vec![drop_column(table, key), add],
        None => vec![add],
    }
}

/// `SELECT EXISTS(SELECT 1 FROM <table> WHERE <column>=? LIMIT 1)`
pub fn record_exists(table: &str, column: &str) -> String {
    format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {}=? LIMIT 1)",
        table, column
    )
}

pub fn distinct(table: &str, columns: &[&str]) -> MashaResult<String> {
    require_columns(columns, "DISTINCT")?;
    Ok(format!("SELECT DISTINCT {} FROM {}", columns.join(", "), table))
}

pub fn count_distinct(table: &str, column: &str) -> String {
    format!("SELECT COUNT(DISTINCT {}) FROM {}", column, table)
}

pub fn count_rows(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", table)
}

pub fn describe(table: &str) -> String {
    format!("DESCRIBE {}", table)
}

/// Looks up the primary key column; the table name binds as `?`.
pub fn primary_key_column() -> &'static str {
    "SELECT COLUMN_NAME FROM information_schema.KEY_COLUMN_USAGE \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY'"
}

pub fn show_databases() -> &'static str {
    "SHOW DATABASES"
}

pub fn show_tables() -> &'static str {
    "SHOW TABLES"
}

/// `SHOW TABLES LIKE ?`
pub fn table_exists() -> &'static str {
    "SHOW TABLES LIKE ?"
}

/// Human-readable column position, for log lines.
pub fn position_label(position: &ColumnPosition) -> String {
    match position {
        ColumnPosition::First => "first".to_string(),
        ColumnPosition::Last => "last".to_string(),
        ColumnPosition::After(col) => format!("after {}", col),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert() {
        assert_eq!(
            insert("users", &["name", "email"]).unwrap(),
            "INSERT IGNORE INTO users (name, email) VALUES (?, ?)"
        );
        assert!(insert("users", &[]).is_err());
    }

    #[test]
    fn test_update() {
        assert_eq!(
            update("users", "id", &["name", "email"]).unwrap(),
            "UPDATE users SET name=?, email=? WHERE id=?"
        );
    }

    #[test]
    fn test_renumber_existing_key() {
        assert_eq!(
            renumber("users", Some("user_id")),
            vec![
                "ALTER TABLE users DROP COLUMN user_id".to_string(),
                "ALTER TABLE users ADD COLUMN user_id INT NOT NULL AUTO_INCREMENT PRIMARY KEY FIRST"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_renumber_without_key() {
        assert_eq!(
            renumber("users", None),
            vec!["ALTER TABLE users ADD COLUMN id INT NOT NULL AUTO_INCREMENT PRIMARY KEY FIRST".to_string()]
        );
    }

    #[test]
    fn test_record_exists() {
        assert_eq!(
            record_exists("users", "email"),
            "SELECT EXISTS(SELECT 1 FROM users WHERE email=? LIMIT 1)"
        );
    }

    #[test]
    fn test_distinct() {
        assert_eq!(
            distinct("users", &["lastname", "country"]).unwrap(),
            "SELECT DISTINCT lastname, country FROM users"
        );
        assert_eq!(
            count_distinct("users", "firstname"),
            "SELECT COUNT(DISTINCT firstname) FROM users"
        );
    }
}
