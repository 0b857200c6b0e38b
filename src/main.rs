use clap::Parser;

mod cli;
use cli::{Cli, Commands};

use dbtutor::config::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Repl { database } => {
            cli::handle_repl(&config, database.unwrap_or(config.default_database))
        }
        Commands::Run { database, sql } => {
            cli::handle_run(&config, database.unwrap_or(config.default_database), &sql)
        }
        Commands::CheckSql {
            database,
            query,
            reference,
            problem,
            json,
        } => cli::handle_check_sql(&config, database, &query, reference, problem, json),
        Commands::CheckErd {
            submission,
            reference,
            problem,
            json,
        } => cli::handle_check_erd(&submission, reference, problem, json),
        Commands::Problems => cli::handle_problems(),
    }
}
