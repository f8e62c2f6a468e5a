mod engine;
mod schedule;
mod types;
mod view;

pub use engine::{ProjectionError, monthly_rate, project, round_money};
pub use schedule::{ContributionSchedule, IndexError, ValidationError};
pub use types::{
    ContributionEntry, MAX_AMOUNT, MAX_HORIZON_YEARS, MONTHS_PER_YEAR, MonthlySnapshot,
    ParameterError, ProjectionParameters, ProjectionSummary,
};
pub use view::{final_capital, summarize, year_end_view};
