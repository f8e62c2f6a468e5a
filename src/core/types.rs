use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;

pub const MONTHS_PER_YEAR: u32 = 12;
pub const MAX_HORIZON_YEARS: u32 = 1000;
/// Upper bound for any single monetary input.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("initial capital must be >= 0, got {0}")]
    NegativeInitialCapital(Decimal),
    #[error("monthly contribution must be >= 0, got {0}")]
    NegativeMonthlyContribution(Decimal),
    #[error("annual return must be >= 0 percent, got {0}")]
    NegativeAnnualReturn(Decimal),
    #[error("time horizon must be at least 1 year")]
    EmptyHorizon,
    #[error("time horizon must be at most {max} years, got {years}")]
    HorizonTooLong { years: u32, max: u32 },
    #[error("{field} must be at most {max}, got {amount}")]
    AmountTooLarge {
        field: &'static str,
        amount: Decimal,
        max: Decimal,
    },
}

/// Inputs to a projection. Only constructible through [`ProjectionParameters::new`], so every
/// value reaching the engine already satisfies the sign, magnitude and horizon constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionParameters {
    #[serde(with = "rust_decimal::serde::float")]
    initial_capital: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    monthly_contribution: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    annual_return_percent: Decimal,
    time_horizon_years: u32,
}

impl ProjectionParameters {
    pub fn new(
        initial_capital: Decimal,
        monthly_contribution: Decimal,
        annual_return_percent: Decimal,
        time_horizon_years: u32,
    ) -> Result<Self, ParameterError> {
        if initial_capital < Decimal::ZERO {
            return Err(ParameterError::NegativeInitialCapital(initial_capital));
        }
        if monthly_contribution < Decimal::ZERO {
            return Err(ParameterError::NegativeMonthlyContribution(
                monthly_contribution,
            ));
        }
        if annual_return_percent < Decimal::ZERO {
            return Err(ParameterError::NegativeAnnualReturn(annual_return_percent));
        }
        if time_horizon_years < 1 {
            return Err(ParameterError::EmptyHorizon);
        }
        if time_horizon_years > MAX_HORIZON_YEARS {
            return Err(ParameterError::HorizonTooLong {
                years: time_horizon_years,
                max: MAX_HORIZON_YEARS,
            });
        }
        for (field, amount) in [
            ("initial capital", initial_capital),
            ("monthly contribution", monthly_contribution),
        ] {
            if amount > MAX_AMOUNT {
                return Err(ParameterError::AmountTooLarge {
                    field,
                    amount,
                    max: MAX_AMOUNT,
                });
            }
        }

        Ok(Self {
            initial_capital,
            monthly_contribution,
            annual_return_percent,
            time_horizon_years,
        })
    }

    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    pub fn monthly_contribution(&self) -> Decimal {
        self.monthly_contribution
    }

    pub fn annual_return_percent(&self) -> Decimal {
        self.annual_return_percent
    }

    pub fn time_horizon_years(&self) -> u32 {
        self.time_horizon_years
    }

    pub fn total_months(&self) -> usize {
        self.time_horizon_years as usize * MONTHS_PER_YEAR as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionEntry {
    pub year: u32,
    pub month: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl ContributionEntry {
    pub fn new(year: u32, month: u32, amount: Decimal) -> Self {
        Self {
            year,
            month,
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySnapshot {
    pub year: u32,
    pub month: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub capital_at_start: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub regular_contribution: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub additional_contribution: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub interest_generated: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub capital_at_end: Decimal,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub final_capital: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_contributed: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_interest: Decimal,
}
