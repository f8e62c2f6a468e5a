use std::fmt::Write as _;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::api::{ProjectArgs, ProjectResponse, build_projection};
use crate::config::ServeConfig;
use crate::core::{MonthlySnapshot, ProjectionSummary};

#[derive(Parser, Debug)]
#[command(
    name = "compound",
    about = "Compound interest projector with monthly and one-off contributions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the projection and advice API over HTTP
    Serve(ServeConfig),
    /// Print a month-by-month projection
    Project(ProjectCommand),
}

#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(flatten)]
    pub args: ProjectArgs,
    #[arg(long, help = "Only show the December row of each year")]
    pub year_end: bool,
    #[arg(long, help = "Print JSON instead of a table")]
    pub json: bool,
}

pub fn run_project(command: &ProjectCommand) -> anyhow::Result<String> {
    let projection = build_projection(&command.args).map_err(anyhow::Error::msg)?;
    tracing::debug!(
        months = projection.snapshots.len(),
        extras = projection.schedule.len(),
        "projection computed"
    );

    if command.json {
        let rendered = if command.year_end {
            serde_json::to_string_pretty(&projection.year_end())
        } else {
            serde_json::to_string_pretty(&ProjectResponse::from(&projection))
        };
        return rendered.context("failed to serialize projection");
    }

    let rows = if command.year_end {
        projection.year_end()
    } else {
        projection.snapshots.clone()
    };
    Ok(render_table(&rows, &projection.summary()))
}

fn money(value: Decimal) -> String {
    format!("{value:.2}")
}

pub fn render_table(rows: &[MonthlySnapshot], summary: &ProjectionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} {:>5} {:>14} {:>14} {:>16} {:>12} {:>16}",
        "Year", "Month", "Contribution", "Additional", "Start", "Interest", "End"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>4} {:>5} {:>14} {:>14} {:>16} {:>12} {:>16}",
            row.year,
            row.month,
            money(row.regular_contribution),
            money(row.additional_contribution),
            money(row.capital_at_start),
            money(row.interest_generated),
            money(row.capital_at_end),
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Final capital:     {}", money(summary.final_capital));
    let _ = writeln!(out, "Total contributed: {}", money(summary.total_contributed));
    let _ = write!(out, "Total interest:    {}", money(summary.total_interest));
    out
}
