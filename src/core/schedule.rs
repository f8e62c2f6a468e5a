use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{ContributionEntry, MAX_AMOUNT, MONTHS_PER_YEAR};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("contribution amount must be > 0, got {amount}")]
    NonPositiveAmount { amount: Decimal },
    #[error("contribution amount must be at most {max}, got {amount}")]
    AmountTooLarge { amount: Decimal, max: Decimal },
    #[error("contribution month must be between 1 and 12, got {month}")]
    MonthOutOfRange { month: u32 },
    #[error("contribution year must be between 1 and {horizon_years}, got {year}")]
    YearOutOfRange { year: u32, horizon_years: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("no contribution at index {index} (schedule has {len} entries)")]
    OutOfBounds { index: usize, len: usize },
}

/// One-off contributions in insertion order. Entries for the same month are kept separate and
/// summed on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionSchedule {
    entries: Vec<ContributionEntry>,
}

impl ContributionSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` after checking it against the horizon in force right now.
    pub fn add(
        &mut self,
        entry: ContributionEntry,
        horizon_years: u32,
    ) -> Result<(), ValidationError> {
        if entry.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount {
                amount: entry.amount,
            });
        }
        if entry.amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge {
                amount: entry.amount,
                max: MAX_AMOUNT,
            });
        }
        if !(1..=MONTHS_PER_YEAR).contains(&entry.month) {
            return Err(ValidationError::MonthOutOfRange { month: entry.month });
        }
        if !(1..=horizon_years).contains(&entry.year) {
            return Err(ValidationError::YearOutOfRange {
                year: entry.year,
                horizon_years,
            });
        }

        self.entries.push(entry);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<ContributionEntry, IndexError> {
        if index >= self.entries.len() {
            return Err(IndexError::OutOfBounds {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn amount_for(&self, year: u32, month: u32) -> Decimal {
        self.entries
            .iter()
            .filter(|entry| entry.year == year && entry.month == month)
            .map(|entry| entry.amount)
            .sum()
    }

    pub fn entries(&self) -> &[ContributionEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContributionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
