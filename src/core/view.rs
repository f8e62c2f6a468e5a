use rust_decimal::Decimal;

use super::types::{MONTHS_PER_YEAR, MonthlySnapshot, ProjectionParameters, ProjectionSummary};

/// December of every year, in order. Used for low-resolution charts.
pub fn year_end_view(snapshots: &[MonthlySnapshot]) -> Vec<MonthlySnapshot> {
    snapshots
        .iter()
        .filter(|snapshot| snapshot.month == MONTHS_PER_YEAR)
        .cloned()
        .collect()
}

/// Capital at the end of the projection, or the starting capital when nothing has been
/// projected yet.
pub fn final_capital(params: &ProjectionParameters, snapshots: &[MonthlySnapshot]) -> Decimal {
    snapshots
        .last()
        .map(|snapshot| snapshot.capital_at_end)
        .unwrap_or_else(|| params.initial_capital())
}

pub fn summarize(
    params: &ProjectionParameters,
    snapshots: &[MonthlySnapshot],
) -> ProjectionSummary {
    let final_capital = final_capital(params, snapshots);
    let total_contributed = params.initial_capital()
        + snapshots
            .iter()
            .map(|snapshot| snapshot.regular_contribution + snapshot.additional_contribution)
            .sum::<Decimal>();

    ProjectionSummary {
        final_capital,
        total_contributed,
        total_interest: final_capital - total_contributed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::project;
    use crate::core::schedule::ContributionSchedule;
    use crate::core::types::ContributionEntry;
    use proptest::prelude::{prop_assert_eq, proptest};
    use rust_decimal_macros::dec;

    #[test]
    fn year_end_view_picks_december_rows() {
        let params = ProjectionParameters::new(dec!(1000), dec!(100), dec!(7), 3).expect("valid");
        let snapshots = project(&params, &ContributionSchedule::new()).expect("in range");
        let view = year_end_view(&snapshots);

        assert_eq!(view.len(), 3);
        for (i, snapshot) in view.iter().enumerate() {
            assert_eq!(snapshot.month, 12);
            assert_eq!(snapshot.year, i as u32 + 1);
            assert_eq!(snapshot, &snapshots[12 * (i + 1) - 1]);
        }
    }

    #[test]
    fn year_end_view_of_empty_sequence_is_empty() {
        assert!(year_end_view(&[]).is_empty());
    }

    #[test]
    fn summary_without_projection_uses_initial_capital() {
        let params = ProjectionParameters::new(dec!(750), dec!(0), dec!(5), 1).expect("valid");
        let summary = summarize(&params, &[]);
        assert_eq!(summary.final_capital, dec!(750));
        assert_eq!(summary.total_contributed, dec!(750));
        assert_eq!(summary.total_interest, Decimal::ZERO);
    }

    #[test]
    fn summary_splits_final_capital_into_contributions_and_interest() {
        let params = ProjectionParameters::new(dec!(1000), dec!(100), dec!(12), 1).expect("valid");
        let mut schedule = ContributionSchedule::new();
        schedule
            .add(ContributionEntry::new(1, 6, dec!(300)), 1)
            .expect("valid");
        let snapshots = project(&params, &schedule).expect("in range");
        let summary = summarize(&params, &snapshots);

        assert_eq!(summary.final_capital, snapshots[11].capital_at_end);
        assert_eq!(summary.total_contributed, dec!(2500));
        let interest = snapshots
            .iter()
            .map(|s| s.interest_generated)
            .sum::<Decimal>();
        assert_eq!(summary.total_interest, interest);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_year_end_view_has_one_entry_per_year(
            initial in 0u32..1_000_000,
            rate_bp in 0u32..1_500,
            years in 1u32..30
        ) {
            let params = ProjectionParameters::new(
                Decimal::new(initial as i64, 2),
                dec!(50),
                Decimal::new(rate_bp as i64, 2),
                years,
            ).expect("valid");
            let snapshots = project(&params, &ContributionSchedule::new()).expect("in range");
            let view = year_end_view(&snapshots);

            prop_assert_eq!(view.len(), years as usize);
            for (i, snapshot) in view.iter().enumerate() {
                prop_assert_eq!(snapshot, &snapshots[12 * (i + 1) - 1]);
            }
        }
    }
}
