//! Command-line front end: an interactive shell over the sample databases
//! and one-shot checkers that print a verdict.

pub mod output;

use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use dbtutor::config::Config;
use dbtutor::curriculum::Curriculum;
use dbtutor::erd::ErdModel;
use dbtutor::samples::{DatabaseId, SampleDatabases};
use dbtutor::validate::{erd::validate_erd, sql::validate_sql};

type CliResult = Result<(), Box<dyn StdError>>;

#[derive(Parser)]
#[command(name = "dbtutor", version, about = "Practice SQL and ER modelling against the course databases")]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive SQL shell over a sample database
    Repl {
        #[arg(short, long)]
        database: Option<DatabaseId>,
    },
    /// Run SQL once and print the result
    Run {
        #[arg(short, long)]
        database: Option<DatabaseId>,
        sql: String,
    },
    /// Check a query against a reference query or a curriculum part
    CheckSql {
        /// Database to run both queries on; a curriculum part names its own
        #[arg(short, long, conflicts_with = "problem")]
        database: Option<DatabaseId>,
        #[arg(short, long)]
        query: String,
        #[arg(long, conflicts_with = "problem", required_unless_present = "problem")]
        reference: Option<String>,
        /// Curriculum part id, e.g. sql-q1-2
        #[arg(long)]
        problem: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Check an ER diagram (JSON) against a reference diagram or a curriculum problem
    CheckErd {
        #[arg(short, long)]
        submission: PathBuf,
        #[arg(long, conflicts_with = "problem", required_unless_present = "problem")]
        reference: Option<PathBuf>,
        /// Curriculum problem id, e.g. erd-1
        #[arg(long)]
        problem: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List the bundled problems
    Problems,
}

pub fn handle_repl(config: &Config, database: DatabaseId) -> CliResult {
    let mut databases = SampleDatabases::new(config.max_result_rows);
    let mut current = database;
    let mut rl = DefaultEditor::new()?;

    println!(
        "{} connected to {}. Type {} for commands.",
        "dbtutor".bold().green(),
        current.to_string().bold(),
        ".help".cyan()
    );

    loop {
        let line = match rl.readline(&format!("{}> ", current)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rl.add_history_entry(line)?;

        if let Some(command) = line.strip_prefix('.') {
            let mut words = command.split_whitespace();
            match (words.next(), words.next()) {
                (Some("quit"), _) | (Some("exit"), _) => break,
                (Some("open"), Some(name)) => match name.parse::<DatabaseId>() {
                    Ok(id) => current = id,
                    Err(e) => println!("{}", e.red()),
                },
                (Some("reset"), _) => {
                    databases.close(current);
                    println!("{} reloaded on next query", current);
                }
                (Some("tables"), _) => match databases.load(current) {
                    Ok(db) => println!("{}", db.catalog().table_names().join("  ")),
                    Err(e) => println!("{}", e.to_string().red()),
                },
                _ => print_repl_help(),
            }
            continue;
        }

        match databases.load(current).and_then(|db| db.execute(line)) {
            Ok(Some(result_set)) => {
                println!("{}", result_set);
                println!("{}", output::row_count_line(result_set.row_count()));
            }
            Ok(None) => println!("{}", "OK".green()),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    databases.close_all();
    Ok(())
}

fn print_repl_help() {
    println!(".open <db>   switch to salesman, nobel, tutor or university");
    println!(".tables      list tables of the current database");
    println!(".reset       discard changes to the current database");
    println!(".quit        leave the shell");
}

pub fn handle_run(config: &Config, database: DatabaseId, sql: &str) -> CliResult {
    let mut databases = SampleDatabases::new(config.max_result_rows);
    match databases.load(database)?.execute(sql)? {
        Some(result_set) => {
            println!("{}", result_set);
            println!("{}", output::row_count_line(result_set.row_count()));
        }
        None => println!("{}", "OK".green()),
    }
    Ok(())
}

pub fn handle_check_sql(
    config: &Config,
    database: Option<DatabaseId>,
    query: &str,
    reference: Option<String>,
    problem: Option<String>,
    json: bool,
) -> CliResult {
    let (database, reference) = match (problem, reference) {
        (Some(part_id), _) => {
            let curriculum = Curriculum::bundled()?;
            let (problem, part) = curriculum
                .sql_part(&part_id)
                .ok_or_else(|| format!("no SQL problem part with id '{}'", part_id))?;
            (problem.database, part.solution.clone())
        }
        (None, Some(reference)) => (database.unwrap_or(config.default_database), reference),
        (None, None) => return Err("either --reference or --problem is required".into()),
    };

    let mut databases = SampleDatabases::new(config.max_result_rows);
    let verdict = validate_sql(&mut databases, query, &reference, database);

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict.report())?);
    } else {
        print!("{}", output::format_sql_verdict(&verdict));
    }
    Ok(())
}

pub fn handle_check_erd(
    submission: &Path,
    reference: Option<PathBuf>,
    problem: Option<String>,
    json: bool,
) -> CliResult {
    let user = read_model(submission)?;
    let reference = match (problem, reference) {
        (Some(problem_id), _) => {
            let curriculum = Curriculum::bundled()?;
            curriculum
                .erd_problem(&problem_id)
                .map(|problem| problem.solution.clone())
                .ok_or_else(|| format!("no ERD problem with id '{}'", problem_id))?
        }
        (None, Some(path)) => read_model(&path)?,
        (None, None) => return Err("either --reference or --problem is required".into()),
    };

    let verdict = validate_erd(&user, &reference);

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict.report())?);
    } else {
        print!("{}", output::format_erd_verdict(&verdict));
    }
    Ok(())
}

fn read_model(path: &Path) -> Result<ErdModel, Box<dyn StdError>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("could not read {}: {}", path.display(), e))?;
    Ok(ErdModel::from_json(&contents)?)
}

pub fn handle_problems() -> CliResult {
    let curriculum = Curriculum::bundled()?;
    print!("{}", output::format_curriculum(&curriculum));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_sql_database_conflicts_with_problem() {
        let parsed = Cli::try_parse_from([
            "dbtutor", "check-sql", "-q", "SELECT 1", "--problem", "sql-q1-1", "-d", "nobel",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_check_sql_accepts_database_with_reference() {
        let cli = Cli::try_parse_from([
            "dbtutor", "check-sql", "-q", "SELECT 1", "--reference", "SELECT 1", "-d", "nobel",
        ])
        .unwrap();

        match cli.command {
            Commands::CheckSql {
                database, problem, ..
            } => {
                assert_eq!(database, Some(DatabaseId::Nobel));
                assert_eq!(problem, None);
            }
            _ => panic!("expected check-sql"),
        }
    }
}
