//! Column declarations and the CREATE/ALTER text built from them.
//!
//! ```text
//! id:pk            -> id INT NOT NULL AUTO_INCREMENT, PRIMARY KEY(id)
//! email:VARCHAR(255):unique
//!                  -> email VARCHAR(255) NOT NULL UNIQUE
//! bio:TEXT:null    -> bio TEXT
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{MashaError, MashaResult};

const PRIMARY_KEY: &str = "PRIMARY KEY";

/// A regular column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub datatype: String,
    pub nullable: bool,
    pub unique: bool,
}

impl ColumnSpec {
    /// A NOT NULL, non-unique column.
    pub fn new(name: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datatype: datatype.into(),
            nullable: false,
            unique: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Everything after the column name.
    pub fn definition(&self) -> String {
        let mut def = self.datatype.clone();
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        if self.unique {
            def.push_str(" UNIQUE");
        }
        def
    }
}

/// An auto-increment integer primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeySpec {
    pub name: String,
    /// Zero leaves the start to the server.
    pub initial_value: u64,
}

impl PrimaryKeySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_value: 0,
        }
    }

    pub fn starting_at(mut self, initial_value: u64) -> Self {
        self.initial_value = initial_value;
        self
    }

    fn auto_increment(&self) -> String {
        if self.initial_value > 0 {
            format!("AUTO_INCREMENT={}", self.initial_value)
        } else {
            "AUTO_INCREMENT".to_string()
        }
    }

    /// Table-level form, completed with `(<name>)` when rendered.
    pub fn definition(&self) -> String {
        format!("INT NOT NULL {}, {}", self.auto_increment(), PRIMARY_KEY)
    }

    /// Column-level form, for ALTER TABLE ADD COLUMN.
    pub fn inline_definition(&self) -> String {
        format!("INT NOT NULL {} {}", self.auto_increment(), PRIMARY_KEY)
    }
}

/// Any column declaration the schema builder accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDecl {
    Column(ColumnSpec),
    PrimaryKey(PrimaryKeySpec),
    /// Caller-written definition, e.g. `TIMESTAMP DEFAULT CURRENT_TIMESTAMP`.
    Raw { name: String, definition: String },
}

impl ColumnDecl {
    pub fn raw(name: impl Into<String>, definition: impl Into<String>) -> Self {
        ColumnDecl::Raw {
            name: name.into(),
            definition: definition.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ColumnDecl::Column(spec) => &spec.name,
            ColumnDecl::PrimaryKey(spec) => &spec.name,
            ColumnDecl::Raw { name, .. } => name,
        }
    }

    /// Everything after the column name, as declared.
    pub fn definition(&self) -> String {
        match self {
            ColumnDecl::Column(spec) => spec.definition(),
            ColumnDecl::PrimaryKey(spec) => spec.definition(),
            ColumnDecl::Raw { definition, .. } => definition.trim().to_string(),
        }
    }

    /// Does the definition end in a bare `PRIMARY KEY` clause?
    pub fn is_primary_key(&self) -> bool {
        ends_with_primary_key(&self.definition())
    }

    /// The CREATE TABLE fragment for this column.
    pub fn fragment(&self) -> String {
        let name = self.name();
        let definition = self.definition();
        if ends_with_primary_key(&definition) {
            format!("{} {}({})", name, definition, name)
        } else {
            format!("{} {}", name, definition)
        }
    }

    fn validate(&self) -> MashaResult<()> {
        let name = self.name();
        if !is_identifier(name) {
            return Err(MashaError::column(format!(
                "'{}' is not a valid column name",
                name
            )));
        }
        let empty = match self {
            ColumnDecl::Column(spec) => spec.datatype.trim().is_empty(),
            ColumnDecl::PrimaryKey(_) => false,
            ColumnDecl::Raw { definition, .. } => definition.trim().is_empty(),
        };
        if empty {
            return Err(MashaError::column(format!("column '{}' has no datatype", name)));
        }
        Ok(())
    }
}

impl From<ColumnSpec> for ColumnDecl {
    fn from(spec: ColumnSpec) -> Self {
        ColumnDecl::Column(spec)
    }
}

impl From<PrimaryKeySpec> for ColumnDecl {
    fn from(spec: PrimaryKeySpec) -> Self {
        ColumnDecl::PrimaryKey(spec)
    }
}

impl fmt::Display for ColumnDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fragment())
    }
}

/// Parses `name:TYPE[:null][:unique]` and `name:pk[=seed]`.
impl FromStr for ColumnDecl {
    type Err = MashaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let name = parts.next().unwrap_or_default().trim();
        let datatype = parts
            .next()
            .map(str::trim)
            .ok_or_else(|| MashaError::column(format!("'{}' has no datatype", s)))?;

        let decl = if let Some(seed) = datatype
            .strip_prefix("pk")
            .filter(|rest| rest.is_empty() || rest.starts_with('='))
        {
            let initial_value = match seed.strip_prefix('=') {
                Some(n) => n
                    .parse()
                    .map_err(|_| MashaError::column(format!("bad auto-increment seed in '{}'", s)))?,
                None => 0,
            };
            if let Some(flag) = parts.next() {
                return Err(MashaError::column(format!(
                    "unexpected flag '{}' on primary key '{}'",
                    flag, name
                )));
            }
            ColumnDecl::PrimaryKey(PrimaryKeySpec::new(name).starting_at(initial_value))
        } else {
            let mut spec = ColumnSpec::new(name, datatype);
            for flag in parts {
                match flag.trim().to_ascii_lowercase().as_str() {
                    "null" => spec.nullable = true,
                    "unique" => spec.unique = true,
                    other => {
                        return Err(MashaError::column(format!(
                            "unknown flag '{}' on column '{}'",
                            other, name
                        )));
                    }
                }
            }
            ColumnDecl::Column(spec)
        };

        decl.validate()?;
        Ok(decl)
    }
}

/// Where ALTER TABLE ADD COLUMN places the new column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnPosition {
    First,
    #[default]
    Last,
    After(String),
}

/// The comma-joined column list for `CREATE TABLE <name>(<list>)`.
///
/// ```
/// use mashadb::schema::{build_columns, ColumnSpec, PrimaryKeySpec};
///
/// let sql = build_columns(&[
///     PrimaryKeySpec::new("id").into(),
///     ColumnSpec::new("email", "VARCHAR(255)").unique().into(),
/// ])
/// .unwrap();
/// assert_eq!(
///     sql,
///     "id INT NOT NULL AUTO_INCREMENT, PRIMARY KEY(id), email VARCHAR(255) NOT NULL UNIQUE"
/// );
/// ```
pub fn build_columns(columns: &[ColumnDecl]) -> MashaResult<String> {
    if columns.is_empty() {
        return Err(MashaError::column("a table needs at least one column"));
    }

    let mut seen = HashSet::new();
    let mut primary_keys = 0;
    for column in columns {
        column.validate()?;
        if !seen.insert(column.name().to_ascii_lowercase()) {
            return Err(MashaError::column(format!(
                "column '{}' is declared twice",
                column.name()
            )));
        }
        if column.is_primary_key() {
            primary_keys += 1;
        }
    }
    if primary_keys > 1 {
        return Err(MashaError::column("more than one primary key declared"));
    }

    let fragments: Vec<String> = columns.iter().map(ColumnDecl::fragment).collect();
    Ok(fragments.join(", "))
}

/// `CREATE TABLE IF NOT EXISTS <table>(<columns>)`.
pub fn create_table(table: &str, columns: &[ColumnDecl]) -> MashaResult<String> {
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {}({})",
        table,
        build_columns(columns)?
    ))
}

/// `ALTER TABLE <table> ADD COLUMN <definition> [FIRST | AFTER <col>]`.
pub fn add_column(table: &str, column: &ColumnDecl, position: &ColumnPosition) -> MashaResult<String> {
    column.validate()?;

    let definition = match column {
        ColumnDecl::PrimaryKey(spec) => format!("{} {}", spec.name, spec.inline_definition()),
        other if other.is_primary_key() => {
            return Err(MashaError::column(format!(
                "'{}' needs a column-level primary key to be added",
                other.name()
            )));
        }
        other => other.fragment(),
    };

    let mut sql = format!("ALTER TABLE {} ADD COLUMN {}", table, definition);
    match position {
        ColumnPosition::First => sql.push_str(" FIRST"),
        ColumnPosition::Last => {}
        ColumnPosition::After(col) => {
            sql.push_str(" AFTER ");
            sql.push_str(col);
        }
    }
    Ok(sql)
}

/// The last comma-separated clause is exactly `PRIMARY KEY`.
fn ends_with_primary_key(definition: &str) -> bool {
    let terminal = definition.rsplit(',').next().unwrap_or_default();
    let terminal: Vec<&str> = terminal.split_whitespace().collect();
    terminal.join(" ").eq_ignore_ascii_case(PRIMARY_KEY)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_fragments() {
        assert_eq!(
            ColumnDecl::from(ColumnSpec::new("name", "VARCHAR(100)")).fragment(),
            "name VARCHAR(100) NOT NULL"
        );
        assert_eq!(
            ColumnDecl::from(ColumnSpec::new("bio", "TEXT").nullable()).fragment(),
            "bio TEXT"
        );
        assert_eq!(
            ColumnDecl::from(ColumnSpec::new("email", "VARCHAR(255)").nullable().unique()).fragment(),
            "email VARCHAR(255) UNIQUE"
        );
    }

    #[test]
    fn test_primary_key_seed() {
        let pk = ColumnDecl::from(PrimaryKeySpec::new("id").starting_at(100));
        assert_eq!(
            pk.fragment(),
            "id INT NOT NULL AUTO_INCREMENT=100, PRIMARY KEY(id)"
        );
    }

    #[test]
    fn test_raw_primary_key_gets_reference() {
        let raw = ColumnDecl::raw("user_id", "BIGINT NOT NULL,  primary   key");
        assert_eq!(raw.fragment(), "user_id BIGINT NOT NULL,  primary   key(user_id)");
    }

    #[test]
    fn test_primary_key_phrase_inside_datatype_is_ignored() {
        let raw = ColumnDecl::raw("note", "VARCHAR(40) COMMENT 'PRIMARY KEY backup'");
        assert!(!raw.is_primary_key());
        let inline = ColumnDecl::raw("id", "INT AUTO_INCREMENT PRIMARY KEY");
        assert!(!inline.is_primary_key());
        assert_eq!(inline.fragment(), "id INT AUTO_INCREMENT PRIMARY KEY");
    }

    #[test]
    fn test_build_columns_rejects_duplicates() {
        let err = build_columns(&[
            ColumnSpec::new("email", "TEXT").into(),
            ColumnSpec::new("EMAIL", "TEXT").into(),
        ])
        .unwrap_err();
        assert!(matches!(err, MashaError::UnknownColumnDeclaration(_)));
    }

    #[test]
    fn test_build_columns_rejects_two_primary_keys() {
        let err = build_columns(&[
            PrimaryKeySpec::new("id").into(),
            ColumnDecl::raw("other", "INT, PRIMARY KEY"),
        ])
        .unwrap_err();
        assert!(matches!(err, MashaError::UnknownColumnDeclaration(_)));
    }

    #[test]
    fn test_build_columns_rejects_bad_declarations() {
        assert!(build_columns(&[]).is_err());
        assert!(build_columns(&[ColumnSpec::new("", "TEXT").into()]).is_err());
        assert!(build_columns(&[ColumnSpec::new("first name", "TEXT").into()]).is_err());
        assert!(build_columns(&[ColumnSpec::new("name", " ").into()]).is_err());
    }

    #[test]
    fn test_create_table() {
        let sql = create_table(
            "users",
            &[
                PrimaryKeySpec::new("id").into(),
                ColumnSpec::new("username", "VARCHAR(40)").unique().into(),
            ],
        )
        .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS users(id INT NOT NULL AUTO_INCREMENT, PRIMARY KEY(id), username VARCHAR(40) NOT NULL UNIQUE)"
        );
    }

    #[test]
    fn test_add_column_positions() {
        let col = ColumnDecl::from(ColumnSpec::new("lastname", "VARCHAR(100)").nullable());
        assert_eq!(
            add_column("users", &col, &ColumnPosition::After("firstname".to_string())).unwrap(),
            "ALTER TABLE users ADD COLUMN lastname VARCHAR(100) AFTER firstname"
        );
        assert_eq!(
            add_column("users", &col, &ColumnPosition::Last).unwrap(),
            "ALTER TABLE users ADD COLUMN lastname VARCHAR(100)"
        );
    }

    #[test]
    fn test_add_primary_key_inline() {
        let pk = ColumnDecl::from(PrimaryKeySpec::new("id"));
        assert_eq!(
            add_column("users", &pk, &ColumnPosition::First).unwrap(),
            "ALTER TABLE users ADD COLUMN id INT NOT NULL AUTO_INCREMENT PRIMARY KEY FIRST"
        );
    }

    #[test]
    fn test_parse_declarations() {
        assert_eq!(
            "email:VARCHAR(255):unique".parse::<ColumnDecl>().unwrap(),
            ColumnDecl::from(ColumnSpec::new("email", "VARCHAR(255)").unique())
        );
        assert_eq!(
            "price:DECIMAL(10,2):null".parse::<ColumnDecl>().unwrap(),
            ColumnDecl::from(ColumnSpec::new("price", "DECIMAL(10,2)").nullable())
        );
        assert_eq!(
            "id:pk=1000".parse::<ColumnDecl>().unwrap(),
            ColumnDecl::from(PrimaryKeySpec::new("id").starting_at(1000))
        );
    }

    #[test]
    fn test_parse_declaration_errors() {
        assert!("email".parse::<ColumnDecl>().is_err());
        assert!("email:TEXT:indexed".parse::<ColumnDecl>().is_err());
        assert!("id:pk=abc".parse::<ColumnDecl>().is_err());
        assert!("id:pk:unique".parse::<ColumnDecl>().is_err());
    }
}
