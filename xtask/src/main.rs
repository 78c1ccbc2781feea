// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! `cargo xtask <command>` wraps the lint, build, and test steps CI runs,
//! plus a schema check for the `SQLite` migrations.
//!
//! ### Schema verification
//!
//! `cargo xtask verify-migrations` applies the persistence migrations to an
//! in-memory database and compares the result with the Diesel table
//! declarations in `crates/persistence/src/diesel_schema.rs`:
//! - every declared table and column must exist with a matching type and
//!   nullability, and the database must not carry undeclared ones
//! - every foreign key must point at an existing table and column
//! - reverting all migrations must leave no tables behind
//!
//! Nothing here needs external services; the check runs anywhere `cargo test`
//! does.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::{fmt::Debug, io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Diesel table declarations, relative to the workspace root.
const DIESEL_SCHEMA_PATH: &str = "crates/persistence/src/diesel_schema.rs";

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, schema)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    /// Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Verify the migrations match the Diesel schema
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Coverage => coverage(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, schema)
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, typos, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without warnings for every workspace package
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env("RUSTDOCFLAGS", "-D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all"])
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Run lib and doc tests
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // slowest, so last
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Apply the migrations, compare them with the Diesel schema, then revert.
fn verify_migrations() -> Result<()> {
    tracing::info!("Starting migration verification");

    let workspace_root = MetadataCommand::new()
        .no_deps()
        .exec()
        .wrap_err("failed to get cargo metadata")?
        .workspace_root;
    let schema_path = workspace_root.join(DIESEL_SCHEMA_PATH);
    let declared_source = std::fs::read_to_string(&schema_path)
        .wrap_err_with(|| format!("Failed to read {schema_path}"))?;
    let declared = parse_diesel_schema(&declared_source)?;
    tracing::info!("Parsed {} declared tables", declared.tables.len());

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;
    tracing::info!("Migrations applied");

    let migrated = introspect_sqlite_schema(&mut conn)?;
    compare_schemas(&declared, &migrated)?;
    check_foreign_keys(&migrated)?;

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;
    let leftover = introspect_sqlite_schema(&mut conn)?;
    if !leftover.tables.is_empty() {
        let names: Vec<&String> = leftover.tables.keys().collect();
        return Err(eyre!("Tables left after reverting migrations: {names:?}"));
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

/// Reads the `diesel::table!` blocks of a generated schema file.
///
/// Only the shape Diesel CLI emits is understood: one `name (pk) {` header
/// per table and one `column -> Type,` line per column.
fn parse_diesel_schema(source: &str) -> Result<Schema> {
    let mut schema = Schema::default();
    let mut current: Option<(String, Table)> = None;

    for line in source.lines().map(str::trim) {
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line == "}" {
            if let Some((name, table)) = current.take() {
                schema.tables.insert(name, table);
            }
            continue;
        }
        if let Some((name, table)) = current.as_mut() {
            let Some((column, sql_type)) = line.trim_end_matches(',').split_once("->") else {
                return Err(eyre!("Unexpected line in table {name}: {line}"));
            };
            let sql_type = sql_type.trim();
            let (nullable, inner) = sql_type
                .strip_prefix("Nullable<")
                .and_then(|t| t.strip_suffix('>'))
                .map_or((false, sql_type), |inner| (true, inner));
            table.columns.insert(
                column.trim().to_string(),
                Column {
                    normalized_type: normalize_diesel_type(inner)?,
                    nullable,
                },
            );
            continue;
        }

        // Table header: `audit_events (event_id) {`
        let Some(header) = line.strip_suffix('{').map(str::trim) else {
            continue;
        };
        let Some((name, keys)) = header.split_once('(') else {
            continue;
        };
        let primary_keys: BTreeSet<String> = keys
            .trim_end_matches(')')
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        current = Some((
            name.trim().to_string(),
            Table {
                primary_keys,
                ..Table::default()
            },
        ));
    }

    if let Some((name, _)) = current {
        return Err(eyre!("Unterminated table! block for {name}"));
    }
    Ok(schema)
}

fn normalize_diesel_type(diesel_type: &str) -> Result<String> {
    let normalized = match diesel_type {
        "Integer" | "BigInt" | "SmallInt" | "Bool" => "integer",
        "Text" => "text",
        "Double" | "Float" => "real",
        "Binary" => "blob",
        other => return Err(eyre!("Unsupported Diesel type {other}")),
    };
    Ok(normalized.to_string())
}

fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let upper = sqlite_type.to_uppercase();
    if upper.contains("INT") || upper == "BOOLEAN" {
        String::from("integer")
    } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("CLOB") {
        String::from("text")
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        String::from("real")
    } else if upper.contains("BLOB") || upper.is_empty() {
        String::from("blob")
    } else {
        upper.to_lowercase()
    }
}

fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    let mut schema = Schema::default();

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table::default();

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            // INTEGER PRIMARY KEY aliases the rowid and is never NULL, even
            // though the pragma reports it as nullable.
            let is_pk = col.pk > 0;
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable: col.notnull == 0 && !is_pk,
                },
            );
            if is_pk {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Compares declared tables with migrated ones and reports every mismatch.
fn compare_schemas(declared: &Schema, migrated: &Schema) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    for name in declared.tables.keys() {
        if !migrated.tables.contains_key(name) {
            errors.push(format!("Table '{name}' is declared but not created by migrations"));
        }
    }
    for name in migrated.tables.keys() {
        if !declared.tables.contains_key(name) {
            errors.push(format!("Table '{name}' is created by migrations but not declared"));
        }
    }

    for (name, declared_table) in &declared.tables {
        let Some(migrated_table) = migrated.tables.get(name) else {
            continue;
        };

        if declared_table.primary_keys != migrated_table.primary_keys {
            errors.push(format!(
                "Table '{name}': primary key {:?} declared, {:?} migrated",
                declared_table.primary_keys, migrated_table.primary_keys
            ));
        }

        for (column, declared_column) in &declared_table.columns {
            match migrated_table.columns.get(column) {
                None => errors.push(format!("Column '{name}.{column}' missing from migrations")),
                Some(migrated_column) if migrated_column != declared_column => {
                    errors.push(format!(
                        "Column '{name}.{column}': declared {declared_column:?}, migrated {migrated_column:?}"
                    ));
                }
                Some(_) => {}
            }
        }
        for column in migrated_table.columns.keys() {
            if !declared_table.columns.contains_key(column) {
                errors.push(format!("Column '{name}.{column}' is not declared"));
            }
        }
    }

    if errors.is_empty() {
        tracing::info!("Declared and migrated schemas match");
        return Ok(());
    }
    for error in &errors {
        tracing::error!("{error}");
    }
    Err(eyre!("Schema verification failed with {} error(s)", errors.len()))
}

/// Every foreign key must reference an existing table and column.
fn check_foreign_keys(schema: &Schema) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();
    for (name, table) in &schema.tables {
        for fk in &table.foreign_keys {
            let target_exists = schema
                .tables
                .get(&fk.to_table)
                .is_some_and(|t| t.columns.contains_key(&fk.to_column));
            if !target_exists {
                errors.push(format!(
                    "Foreign key {name}.{} references missing {}.{}",
                    fk.from_column, fk.to_table, fk.to_column
                ));
            }
        }
    }

    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        tracing::error!("{error}");
    }
    Err(eyre!("{} dangling foreign key(s)", errors.len()))
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
