use serde::Serialize;

/// Summary statistics shown under every score matrix, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKind {
    Max,
    Min,
    Average,
    StdDev,
}

impl StatKind {
    pub const ALL: [StatKind; 4] = [
        StatKind::Max,
        StatKind::Min,
        StatKind::Average,
        StatKind::StdDev,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Max => "Max",
            StatKind::Min => "Min",
            StatKind::Average => "Average",
            StatKind::StdDev => "Std Dev",
        }
    }
}

/// One-decimal rounding, ties away from zero (`f64::round`).
pub fn round_1_decimal(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Computes `kind` over `scores`, rounded to one decimal.
///
/// Callers must not pass an empty list; builders emit a blank cell instead.
pub fn compute_statistic(scores: &[f64], kind: StatKind) -> f64 {
    assert!(
        !scores.is_empty(),
        "compute_statistic called with an empty score list"
    );
    let n = scores.len() as f64;
    let value = match kind {
        StatKind::Max => scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        StatKind::Min => scores.iter().copied().fold(f64::INFINITY, f64::min),
        StatKind::Average => scores.iter().sum::<f64>() / n,
        StatKind::StdDev => {
            let mean = scores.iter().sum::<f64>() / n;
            // Population variance: divide by n, not n - 1.
            let variance = scores.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            variance.sqrt()
        }
    };
    round_1_decimal(value)
}

/// `round1(100 * correct / total)`, or `None` when there is nothing to divide by.
pub fn percent_score(correct: i64, total: i64) -> Option<f64> {
    if total <= 0 {
        return None;
    }
    Some(round_1_decimal(100.0 * correct as f64 / total as f64))
}

/// Whole-percent display; the fractional part is truncated, not rounded.
pub fn percent_display(score: f64) -> String {
    format!("{}%", score.trunc() as i64)
}

/// Two-decimal ratio used by the mastery report (`mastered * 100 / n`).
pub fn ratio_display(numerator: f64, denominator: f64) -> String {
    if denominator <= 0.0 {
        return "0.00".to_string();
    }
    format!("{:.2}", numerator / denominator)
}

/// All four statistics for one score list, `None` for each when the list is empty.
pub fn summarize(scores: &[f64]) -> Vec<(StatKind, Option<f64>)> {
    StatKind::ALL
        .iter()
        .map(|&kind| {
            let value = if scores.is_empty() {
                None
            } else {
                Some(compute_statistic(scores, kind))
            };
            (kind, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Non-empty lists of one-decimal scores in [0, 100].
    fn score_lists() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec((0u32..=1000).prop_map(|t| f64::from(t) / 10.0), 1..40)
    }

    proptest! {
        #[test]
        fn max_and_min_bound_any_list(scores in score_lists()) {
            let max = compute_statistic(&scores, StatKind::Max);
            let min = compute_statistic(&scores, StatKind::Min);
            prop_assert!(scores.iter().all(|s| max >= *s));
            prop_assert!(scores.iter().all(|s| min <= *s));
        }

        #[test]
        fn average_stays_between_min_and_max(scores in score_lists()) {
            let avg = compute_statistic(&scores, StatKind::Average);
            prop_assert!(compute_statistic(&scores, StatKind::Min) <= avg);
            prop_assert!(avg <= compute_statistic(&scores, StatKind::Max));
        }

        #[test]
        fn std_dev_is_zero_for_singletons(t in 0u32..=1000) {
            let score = f64::from(t) / 10.0;
            prop_assert_eq!(compute_statistic(&[score], StatKind::StdDev), 0.0);
        }

        #[test]
        fn std_dev_is_never_negative(scores in score_lists()) {
            prop_assert!(compute_statistic(&scores, StatKind::StdDev) >= 0.0);
        }
    }

    #[test]
    fn round_off_ties_away_from_zero() {
        assert_eq!(round_1_decimal(0.0), 0.0);
        assert_eq!(round_1_decimal(3.54), 3.5);
        assert_eq!(round_1_decimal(1.414_213_5), 1.4);
        assert_eq!(round_1_decimal(35.6818), 35.7);
        assert_eq!(round_1_decimal(66.666_666), 66.7);
    }

    #[test]
    fn max_and_min_bound_every_element() {
        let scores = [42.5, 100.0, 0.0, 73.3, 73.3];
        let max = compute_statistic(&scores, StatKind::Max);
        let min = compute_statistic(&scores, StatKind::Min);
        assert!(scores.iter().all(|s| max >= *s));
        assert!(scores.iter().all(|s| min <= *s));
        assert_eq!(max, 100.0);
        assert_eq!(min, 0.0);
    }

    #[test]
    fn average_lies_between_min_and_max() {
        for scores in [
            vec![80.0, 60.0, 100.0],
            vec![12.3],
            vec![33.3, 66.7, 50.0, 91.2],
        ] {
            let avg = compute_statistic(&scores, StatKind::Average);
            assert!(compute_statistic(&scores, StatKind::Min) <= avg);
            assert!(avg <= compute_statistic(&scores, StatKind::Max));
        }
        assert_eq!(compute_statistic(&[80.0, 60.0, 100.0], StatKind::Average), 80.0);
    }

    #[test]
    fn std_dev_uses_population_variance() {
        assert_eq!(compute_statistic(&[1.0, 2.0, 3.0, 4.0, 5.0], StatKind::StdDev), 1.4);
        assert_eq!(compute_statistic(&[57.0], StatKind::StdDev), 0.0);
        // Sample variance would give 28.3 here.
        assert_eq!(compute_statistic(&[60.0, 100.0], StatKind::StdDev), 20.0);
    }

    #[test]
    #[should_panic(expected = "empty score list")]
    fn empty_list_fails_fast() {
        compute_statistic(&[], StatKind::Average);
    }

    #[test]
    fn percent_score_guards_zero_totals() {
        assert_eq!(percent_score(3, 5), Some(60.0));
        assert_eq!(percent_score(2, 3), Some(66.7));
        assert_eq!(percent_score(0, 0), None);
        assert_eq!(percent_score(4, -1), None);
    }

    #[test]
    fn percent_display_truncates() {
        assert_eq!(percent_display(79.9), "79%");
        assert_eq!(percent_display(100.0), "100%");
        assert_eq!(percent_display(0.0), "0%");
    }

    #[test]
    fn summarize_blanks_empty_lists() {
        let empty = summarize(&[]);
        assert_eq!(empty.len(), 4);
        assert!(empty.iter().all(|(_, v)| v.is_none()));

        let filled = summarize(&[60.0, 100.0]);
        assert_eq!(filled[0], (StatKind::Max, Some(100.0)));
        assert_eq!(filled[1], (StatKind::Min, Some(60.0)));
        assert_eq!(filled[2], (StatKind::Average, Some(80.0)));
    }

    #[test]
    fn ratio_display_formats_two_decimals() {
        assert_eq!(ratio_display(200.0, 3.0), "66.67");
        assert_eq!(ratio_display(5.0, 0.0), "0.00");
    }
}
