use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use thiserror::Error;

use super::schedule::ContributionSchedule;
use super::types::{MONTHS_PER_YEAR, MonthlySnapshot, ProjectionParameters};

const MONEY_DP: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("projected capital exceeds the representable range in year {year}, month {month}")]
    CapitalOverflow { year: u32, month: u32 },
}

/// Runs the full monthly projection from scratch.
///
/// Contributions are deposited at the start of the month and earn that month's interest.
/// Capital is rounded to cents every month and the rounded value is what carries forward.
/// Growth that leaves the `Decimal` range is reported as [`ProjectionError::CapitalOverflow`].
pub fn project(
    params: &ProjectionParameters,
    schedule: &ContributionSchedule,
) -> Result<Vec<MonthlySnapshot>, ProjectionError> {
    let monthly_rate = monthly_rate(params.annual_return_percent());
    let regular_contribution = params.monthly_contribution();
    let mut capital = params.initial_capital();
    let mut snapshots = Vec::with_capacity(params.total_months());

    for year in 1..=params.time_horizon_years() {
        for month in 1..=MONTHS_PER_YEAR {
            let capital_at_start = capital;
            let additional_contribution = schedule.amount_for(year, month);
            let (interest_generated, capital_at_end) = step(
                capital_at_start,
                regular_contribution,
                additional_contribution,
                monthly_rate,
            )
            .ok_or(ProjectionError::CapitalOverflow { year, month })?;

            let capital_at_end = round_money(capital_at_end);
            capital = capital_at_end;

            snapshots.push(MonthlySnapshot {
                year,
                month,
                capital_at_start: round_money(capital_at_start),
                regular_contribution,
                additional_contribution,
                interest_generated: round_money(interest_generated),
                capital_at_end,
                label: month_label(year, month),
            });
        }
    }

    Ok(snapshots)
}

/// Interest and unrounded end capital for one month, or `None` on overflow.
fn step(
    capital_at_start: Decimal,
    regular_contribution: Decimal,
    additional_contribution: Decimal,
    monthly_rate: Decimal,
) -> Option<(Decimal, Decimal)> {
    let total_contribution = regular_contribution.checked_add(additional_contribution)?;
    let invested = capital_at_start.checked_add(total_contribution)?;
    let interest_generated = invested.checked_mul(monthly_rate)?;
    let capital_at_end = invested.checked_add(interest_generated)?;
    Some((interest_generated, capital_at_end))
}

pub fn monthly_rate(annual_return_percent: Decimal) -> Decimal {
    annual_return_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

/// Cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn month_label(year: u32, month: u32) -> String {
    if month == 6 || month == MONTHS_PER_YEAR {
        format!("Year {year} / Month {month}")
    } else {
        format!("Month {month}")
    }
}
