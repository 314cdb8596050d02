// planctl - headless budget plan grid operations

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use planboard_engine::{GridFilter, MonthColumn, PlanError, PlanSession, ScenarioId};
use planboard_store::seed::seed_demo;
use planboard_store::PlanDb;

use exit_codes::{EXIT_ERROR, EXIT_NOTHING_TO_SAVE, EXIT_STORAGE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "planctl")]
#[command(about = "Budget plan grid operations (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The (year, scenario, cost-center) triple every grid command needs.
#[derive(Args)]
struct FilterArgs {
    /// Fiscal year, e.g. 2024
    #[arg(long)]
    year: i32,

    /// Scenario id (1-12; doubles as the as-of month)
    #[arg(long)]
    scenario: i64,

    /// Cost center id
    #[arg(long)]
    cfo: i64,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and seed a demo plan database
    Init {
        /// Path of the database file to create
        db: PathBuf,
    },

    /// List selectable years, scenarios and cost centers
    Dims {
        db: PathBuf,

        /// Output JSON instead of a human listing
        #[arg(long)]
        json: bool,
    },

    /// Load a grid and print it
    #[command(after_help = "\
Examples:
  planctl load plan.db --year 2024 --scenario 5 --cfo 2
  planctl load plan.db --year 2024 --scenario 5 --cfo 2 --json")]
    Load {
        db: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Edit cells of one row and commit it
    #[command(after_help = "\
Examples:
  planctl save-row plan.db --year 2024 --scenario 5 --cfo 2 --row 0 --set y0_m06=150,5")]
    SaveRow {
        db: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Row index in the loaded grid
        #[arg(long)]
        row: usize,

        /// Cell edit as COLUMN=VALUE, e.g. y0_m06=150,5 (repeatable)
        #[arg(long = "set", required = true)]
        sets: Vec<String>,
    },

    /// Edit cells across rows and commit them in one transaction
    #[command(after_help = "\
Examples:
  planctl save-all plan.db --year 2024 --scenario 5 --cfo 2 \\
      --set 0:y0_m06=150,5 --set 1:y1_m01=20")]
    SaveAll {
        db: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Cell edit as ROW:COLUMN=VALUE, e.g. 0:y0_m06=150,5 (repeatable)
        #[arg(long = "set", required = true)]
        sets: Vec<String>,
    },

    /// Add an account row to the loaded triple
    AddAccount {
        db: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Account id to add (see `load --json` for remaining choices)
        #[arg(long)]
        account: i64,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<PlanError> for CliError {
    fn from(err: PlanError) -> Self {
        let code = match err {
            PlanError::NoChanges | PlanError::NothingToSave => EXIT_NOTHING_TO_SAVE,
            PlanError::UnknownRow(_) => EXIT_USAGE,
            PlanError::Storage(_) | PlanError::TransactionAborted { .. } => EXIT_STORAGE,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { db } => cmd_init(&db),
        Commands::Dims { db, json } => cmd_dims(&db, json),
        Commands::Load { db, filter, json } => cmd_load(&db, &filter, json),
        Commands::SaveRow { db, filter, row, sets } => cmd_save_row(&db, &filter, row, &sets),
        Commands::SaveAll { db, filter, sets } => cmd_save_all(&db, &filter, &sets),
        Commands::AddAccount { db, filter, account } => cmd_add_account(&db, &filter, account),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("planctl: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}

fn open_db(path: &Path) -> Result<PlanDb, CliError> {
    PlanDb::open(path).map_err(CliError::from)
}

fn build_filter(args: &FilterArgs) -> Result<GridFilter, CliError> {
    let scenario = ScenarioId::new(args.scenario).ok_or_else(|| {
        CliError::usage(format!("scenario id {} out of range", args.scenario))
            .with_hint("scenario ids run 1-12 and encode the as-of month")
    })?;
    Ok(GridFilter { year: args.year, scenario, cfo_id: args.cfo })
}

fn load_session(db: &mut PlanDb, args: &FilterArgs) -> Result<PlanSession, CliError> {
    let filter = build_filter(args)?;
    PlanSession::load(db, filter).map_err(CliError::from)
}

/// Push one COLUMN=VALUE edit through the keystroke + blur path.
fn apply_edit(
    session: &mut PlanSession,
    row: usize,
    col_name: &str,
    value: &str,
) -> Result<(), CliError> {
    let col = MonthColumn::parse(col_name)
        .ok_or_else(|| CliError::usage(format!("unknown column '{col_name}'")))?;
    if !session.record_edit(row, col, value) {
        return Err(CliError::usage(format!(
            "edit {col}={value} rejected for row {row}"
        ))
        .with_hint("the cell may be locked for this scenario, the row index out of range, or the value not numeric"));
    }
    session.commit_blur(row, col, value);
    Ok(())
}

fn cmd_init(db_path: &Path) -> Result<(), CliError> {
    if db_path.exists() {
        return Err(CliError::usage(format!("{} already exists", db_path.display())));
    }
    let mut db = open_db(db_path)?;
    seed_demo(&mut db)?;
    println!("Seeded demo plan database at {}", db_path.display());
    Ok(())
}

fn cmd_dims(db_path: &Path, json_output: bool) -> Result<(), CliError> {
    let db = open_db(db_path)?;
    let years = db.years()?;
    let scenarios = db.scenarios()?;
    let cost_centers = db.cost_centers()?;

    if json_output {
        let out = json!({
            "years": years,
            "scenarios": scenarios,
            "cost_centers": cost_centers,
        });
        println!("{}", serde_json::to_string_pretty(&out).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: e.to_string(),
            hint: None,
        })?);
        return Ok(());
    }

    println!("Years:");
    for year in years {
        println!("  {year}");
    }
    println!("Scenarios:");
    for sce in scenarios {
        println!("  {:>3}  {}", sce.id, sce.code);
    }
    println!("Cost centers:");
    for cfo in cost_centers {
        println!("  {:>3}  {}", cfo.id, cfo.code);
    }
    Ok(())
}

fn cmd_load(db_path: &Path, args: &FilterArgs, json_output: bool) -> Result<(), CliError> {
    let mut db = open_db(db_path)?;
    let session = load_session(&mut db, args)?;
    let columns = session.visible_columns();

    if json_output {
        let rows: Vec<serde_json::Value> = session
            .rows()
            .iter()
            .map(|row| {
                let mut cells = serde_json::Map::new();
                for col in &columns {
                    cells.insert(col.name(), json!(row.get(*col)));
                }
                json!({ "p_id": row.p_id, "acc_desc": row.acc_desc, "cells": cells })
            })
            .collect();
        let out = json!({
            "rows": rows,
            "account_choices": session.account_choices(),
        });
        println!("{}", serde_json::to_string_pretty(&out).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: e.to_string(),
            hint: None,
        })?);
        return Ok(());
    }

    // Header: locked columns are marked with '*'
    let mut header = format!("{:<24}", "account");
    for col in &columns {
        let marker = if session.is_editable(*col) { "" } else { "*" };
        header.push_str(&format!(" {:>9}", format!("{}{}", col.name(), marker)));
    }
    println!("{header}");

    for (idx, row) in session.rows().iter().enumerate() {
        let mut line = format!("{:<24}", truncate(&row.acc_desc, 24));
        for col in &columns {
            line.push_str(&format!(" {:>9}", session.cell_display(idx, *col)));
        }
        println!("{line}");
    }
    println!("({} rows; * = locked for this scenario)", session.rows().len());
    Ok(())
}

fn cmd_save_row(
    db_path: &Path,
    args: &FilterArgs,
    row: usize,
    sets: &[String],
) -> Result<(), CliError> {
    let mut db = open_db(db_path)?;
    let mut session = load_session(&mut db, args)?;

    for set in sets {
        let (col_name, value) = set
            .split_once('=')
            .ok_or_else(|| CliError::usage(format!("bad --set '{set}', expected COLUMN=VALUE")))?;
        apply_edit(&mut session, row, col_name, value)?;
    }

    session.save_row(&mut db, row)?;
    println!("Saved row {row} (p_id {})", session.rows()[row].p_id);
    Ok(())
}

fn cmd_save_all(db_path: &Path, args: &FilterArgs, sets: &[String]) -> Result<(), CliError> {
    let mut db = open_db(db_path)?;
    let mut session = load_session(&mut db, args)?;

    for set in sets {
        let (target, value) = set
            .split_once('=')
            .ok_or_else(|| CliError::usage(format!("bad --set '{set}', expected ROW:COLUMN=VALUE")))?;
        let (row_str, col_name) = target
            .split_once(':')
            .ok_or_else(|| CliError::usage(format!("bad --set '{set}', expected ROW:COLUMN=VALUE")))?;
        let row: usize = row_str
            .parse()
            .map_err(|_| CliError::usage(format!("bad row index '{row_str}'")))?;
        apply_edit(&mut session, row, col_name, value)?;
    }

    let updated = session.save_all(&mut db)?;
    println!(
        "Updated {} row(s): {}",
        updated.len(),
        updated.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

fn cmd_add_account(db_path: &Path, args: &FilterArgs, account: i64) -> Result<(), CliError> {
    let mut db = open_db(db_path)?;
    let mut session = load_session(&mut db, args)?;

    let known = session.account_choices().iter().any(|c| c.id == account);
    if !known {
        return Err(CliError::usage(format!(
            "account {account} is not available for this triple"
        ))
        .with_hint("run `planctl load --json` to see remaining account choices"));
    }

    session.add_account_row(&mut db, account)?;
    let row = session
        .highlighted_row()
        .unwrap_or_else(|| session.rows().len().saturating_sub(1));
    println!("Added '{}' as row {row}", session.rows()[row].acc_desc);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
