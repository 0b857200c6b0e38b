//! Plain-text rendering of verdicts and the problem list.

use colored::*;
use tabled::{builder::Builder, settings::Style};

use dbtutor::curriculum::Curriculum;
use dbtutor::validate::erd::ErdVerdict;
use dbtutor::validate::sql::SqlVerdict;
use dbtutor::validate::tabular::TabularResult;

pub fn row_count_line(count: usize) -> String {
    match count {
        1 => "1 row".dimmed().to_string(),
        n => format!("{} rows", n).dimmed().to_string(),
    }
}

fn format_table(result: &TabularResult) -> String {
    let mut builder = Builder::default();
    builder.set_header(result.columns.clone());

    for row in &result.rows {
        builder.push_record(row.iter().map(|cell| cell.to_string()));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

pub fn format_sql_verdict(verdict: &SqlVerdict) -> String {
    let mut output = String::new();

    match verdict.error_reason() {
        None => output.push_str(&format!("{}\n", "Correct!".bold().green())),
        Some(reason) => output.push_str(&format!("{} {}\n", "Incorrect:".bold().red(), reason)),
    }

    if let Some(result) = &verdict.user_result {
        output.push_str(&format!("\n{}\n{}\n", "Your result".bold(), format_table(result)));
    }
    if let Some(result) = &verdict.reference_result {
        output.push_str(&format!(
            "\n{}\n{}\n",
            "Expected result".bold(),
            format_table(result)
        ));
    }

    output
}

pub fn format_erd_verdict(verdict: &ErdVerdict) -> String {
    if verdict.is_correct() {
        return format!("{}\n", "Correct!".bold().green());
    }

    let mut output = format!("{}\n", "Incorrect:".bold().red());
    for error in verdict.errors() {
        output.push_str(&format!("  - {}\n", error));
    }
    output
}

pub fn format_curriculum(curriculum: &Curriculum) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "SQL".bold().green()));
    for problem in &curriculum.sql {
        output.push_str(&format!(
            "  {} {} [{}]\n",
            problem.id.cyan(),
            problem.title,
            problem.database
        ));
        for part in &problem.parts {
            output.push_str(&format!("    {}  {}\n", part.id.cyan(), part.question));
        }
    }

    output.push_str(&format!("\n{}\n", "ERD".bold().green()));
    for problem in &curriculum.erd {
        output.push_str(&format!("  {} {}\n", problem.id.cyan(), problem.title));
    }

    output
}
