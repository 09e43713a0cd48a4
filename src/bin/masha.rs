//! masha: the MashaDB CLI
//!
//! Builds SQL from shorthand filters and, given a database, runs it.
//!
//! # Usage
//!
//! ```bash
//! # Show the SQL only
//! masha --dry-run select subscribers -c city -w "city=London or Moscow" --limit 10
//!
//! # Run it
//! masha --database-url mysql://root@localhost/shop select subscribers -w id=1..1000
//!
//! # Create a table
//! masha create users id:pk email:VARCHAR(255):unique bio:TEXT:null
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use mashadb::engine::{ColumnInfo, Record};
use mashadb::prelude::*;
use mashadb::schema;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "masha")]
#[command(version)]
#[command(about = "Shorthand filters in, MySQL out", long_about = None)]
#[command(after_help = "EXAMPLES:
    masha --dry-run select subscribers -c people -w 'people=Al or Bob' -w city=%ville
    masha select subscribers -w id=1..1000 -w age=+18 --or --sort 'city desc' --limit 10
    masha create users id:pk=100 email:VARCHAR(255):unique")]
struct Cli {
    /// Don't execute, just show the generated SQL
    #[arg(short, long, global = true)]
    dry_run: bool,

    /// Database connection URL (overrides masha.toml)
    #[arg(long, env = "MASHA_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Config file (defaults to ./masha.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Select rows with shorthand filters
    Select(SelectArgs),
    /// Create a table from column declarations
    Create {
        table: String,
        /// name:TYPE[:null][:unique] or name:pk[=seed]
        #[arg(required = true)]
        columns: Vec<ColumnDecl>,
    },
    /// Add one column to an existing table
    AddColumn {
        table: String,
        column: ColumnDecl,
        /// Put the column first
        #[arg(long, conflicts_with = "after")]
        first: bool,
        /// Put the column after this one
        #[arg(long)]
        after: Option<String>,
    },
    /// Show how a shorthand value expands
    Expand { key: String, value: String },
    /// List the tables in the database
    Tables,
    /// Describe a table's columns
    Describe { table: String },
    /// Show the shorthand reference
    Syntax,
}

#[derive(Args)]
struct SelectArgs {
    table: String,

    /// Columns to project (default: *)
    #[arg(short, long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Filter as column=shorthand, repeatable
    #[arg(short = 'w', long = "where", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Join filters with OR instead of AND
    #[arg(long)]
    or: bool,

    /// Raw WHERE text, used instead of --where
    #[arg(long, conflicts_with = "filters")]
    raw: Option<String>,

    /// ORDER BY text, e.g. 'city desc'
    #[arg(long)]
    sort: Option<String>,

    #[arg(long)]
    limit: Option<u64>,
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected column=value, got '{}'", s))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    init_logging(&config, cli.verbose);

    let url = cli.database_url.clone().or(config.database.url.clone());

    match &cli.command {
        Commands::Select(args) => select(args, &cli, url, &config).await,
        Commands::Create { table, columns } => {
            let sql = schema::create_table(table, columns)?;
            if dry_run(&cli, url.as_deref(), &sql) {
                return Ok(());
            }
            let mut db = connect(url.as_deref(), &config).await?;
            db.create(table, columns).await?;
            println!("{} Created table {}", "✓".green(), table.cyan());
            Ok(())
        }
        Commands::AddColumn {
            table,
            column,
            first,
            after,
        } => {
            let position = match (*first, after) {
                (true, _) => ColumnPosition::First,
                (false, Some(col)) => ColumnPosition::After(col.clone()),
                (false, None) => ColumnPosition::Last,
            };
            let sql = schema::add_column(table, column, &position)?;
            if dry_run(&cli, url.as_deref(), &sql) {
                return Ok(());
            }
            let db = connect(url.as_deref(), &config).await?;
            db.table(table)?.add(column, &position).await?;
            println!("{} Added column {} to {}", "✓".green(), column.name().cyan(), table);
            Ok(())
        }
        Commands::Expand { key, value } => {
            explain_value(key, value);
            Ok(())
        }
        Commands::Tables => {
            let db = connect(url.as_deref(), &config).await?;
            let tables: Vec<&str> = db.tables().collect();
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
                OutputFormat::Table => {
                    for table in &tables {
                        println!("  • {}", table.white());
                    }
                    println!();
                    println!("{} table(s)", tables.len().to_string().cyan());
                }
            }
            Ok(())
        }
        Commands::Describe { table } => {
            let db = connect(url.as_deref(), &config).await?;
            let columns = db.table(table)?.describe().await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&columns)?),
                OutputFormat::Table => Grid::from_columns(&columns).print("column(s)"),
            }
            Ok(())
        }
        Commands::Syntax => {
            show_syntax();
            Ok(())
        }
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("MASHA_LOG").unwrap_or_else(|_| EnvFilter::new(&config.log.filter))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_env_filter(filter)
        .init();
}

async fn connect(url: Option<&str>, config: &Config) -> anyhow::Result<MashaDB> {
    let url = url.context("no database URL. Use --database-url, MASHA_DATABASE_URL or masha.toml")?;
    debug!(max_connections = config.database.max_connections, "connecting");
    let mut database = config.database.clone();
    database.url = Some(url.to_string());
    Ok(MashaDB::from_config(&database).await?)
}

/// Print the SQL and report whether execution should stop here.
fn dry_run(cli: &Cli, url: Option<&str>, sql: &str) -> bool {
    if !cli.dry_run && url.is_some() {
        return false;
    }

    println!("{}", "Generated SQL:".green().bold());
    println!("{}", sql.white());

    if url.is_none() && !cli.dry_run {
        println!();
        println!(
            "{}",
            "⚠ No database URL. Use --database-url or set MASHA_DATABASE_URL".yellow()
        );
    }
    true
}

async fn select(
    args: &SelectArgs,
    cli: &Cli,
    url: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let mut spec = QuerySpec::new(args.table.as_str()).columns(args.columns.iter().map(String::as_str));
    if let Some(raw) = &args.raw {
        spec = spec.raw(raw.as_str());
    } else if !args.filters.is_empty() {
        let combine_with = if args.or { LogicalOp::Or } else { LogicalOp::And };
        spec = spec.filters(args.filters.iter().cloned().collect(), combine_with);
    }
    spec.order_by = args.sort.clone();
    spec.limit = args.limit;

    let sql = mashadb::assemble(&spec)?;
    if cli.verbose {
        println!("{} {}", "Table:".dimmed(), args.table.yellow());
    }
    if dry_run(cli, url.as_deref(), &sql) {
        return Ok(());
    }

    let db = connect(url.as_deref(), config).await?;
    let results = db.query(sql).fetch_all().await?;
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Table if results.is_empty() => println!("{}", "(no results)".dimmed()),
        OutputFormat::Table => Grid::from_records(&results, &args.columns).print("row(s) returned"),
    }
    Ok(())
}

/// Rows laid out under fixed headers for the terminal.
struct Grid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Headers follow the projection when every projected name came back as a
    /// key; otherwise (`*`, aliases, expressions) the record keys, sorted.
    fn from_records(records: &[Record], projection: &[String]) -> Self {
        let first = records.first();
        let projected = !projection.is_empty()
            && first.is_some_and(|record| projection.iter().all(|c| record.contains_key(c)));

        let headers = if projected {
            projection.to_vec()
        } else {
            let mut keys: Vec<String> = first
                .map(|record| record.keys().cloned().collect())
                .unwrap_or_default();
            keys.sort();
            keys
        };

        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).map(cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// One row per column, in `DESCRIBE` order.
    fn from_columns(columns: &[ColumnInfo]) -> Self {
        let headers = ["column", "type", "null", "key", "default", "extra"]
            .map(String::from)
            .to_vec();
        let rows = columns
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.datatype.clone(),
                    if c.nullable { "YES" } else { "NO" }.to_string(),
                    c.key.clone(),
                    c.default.clone().unwrap_or_else(|| "NULL".to_string()),
                    c.extra.clone(),
                ]
            })
            .collect();

        Self { headers, rows }
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .fold(header.chars().count(), usize::max)
            })
            .collect()
    }

    /// Header, rule and body lines, uncolored.
    fn lines(&self) -> Vec<String> {
        let widths = self.widths();
        let pad = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" │ ")
        };
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();

        let mut lines = vec![pad(self.headers.as_slice()), rule.join("─┼─")];
        lines.extend(self.rows.iter().map(|row| pad(row.as_slice())));
        lines
    }

    fn print(&self, noun: &str) {
        let lines = self.lines();
        for (i, line) in lines.iter().enumerate() {
            match i {
                0 => println!("{}", line.white().bold()),
                1 => println!("{}", line.dimmed()),
                _ => println!("{}", line),
            }
        }
        println!();
        println!("{} {}", self.rows.len().to_string().cyan(), noun);
    }
}

fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn explain_value(key: &str, value: &str) {
    println!("{} {} = {}", "Filter:".dimmed(), key.white(), value.yellow());
    println!();

    for (i, token) in split_alternatives(value).into_iter().enumerate() {
        match expand(key, token) {
            Ok(predicate) => {
                let kind = match &predicate {
                    Predicate::Equality { .. } => "equality",
                    Predicate::Comparison { .. } => "comparison",
                    Predicate::Range { .. } => "range",
                    Predicate::Like { .. } => "wildcard",
                };
                println!(
                    "  {} {:12} {}",
                    format!("{}.", i + 1).dimmed(),
                    kind.cyan(),
                    predicate.to_sql().white()
                );
            }
            Err(e) => {
                println!("  {} {}", format!("{}.", i + 1).dimmed(), e.to_string().red());
                return;
            }
        }
    }

    let filters = Filters::new().with(key, value);
    if let Ok(sql) = mashadb::build(&filters, LogicalOp::And) {
        println!();
        println!("{}", "Generated SQL:".green().bold());
        println!("  {}", sql.white());
    }
}

fn show_syntax() {
    println!("{}", "MashaDB Shorthand Reference".cyan().bold());
    println!();

    let shapes = [
        ("a..b", "Range", "1..1000", "BETWEEN '1' AND '1000'"),
        ("%x / x% / x%y", "Wildcard", "%ville", "LIKE '%ville'"),
        ("+n", "At least", "+18", ">= 18"),
        ("-n", "At most", "-65", "<= 65"),
        ("x or y", "Alternation", "Al or Bob", "(k='Al' OR k='Bob')"),
        ("x", "Equality", "Tom", "k='Tom'"),
    ];

    println!(
        "{:16} {:14} {:12} {}",
        "Shape".white().bold(),
        "Meaning".white().bold(),
        "Example".white().bold(),
        "SQL".white().bold()
    );
    println!("{}", "─".repeat(72).dimmed());

    for (shape, meaning, example, sql) in shapes {
        println!(
            "{:16} {:14} {:12} {}",
            shape.cyan().bold(),
            meaning.yellow(),
            example.white(),
            sql.dimmed()
        );
    }

    println!();
    println!(
        "{}",
        "Tokens mixing '..' and '%' are rejected as ambiguous; use --raw for those.".dimmed()
    );
}
