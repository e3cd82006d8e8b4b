//! Trend annotation against a prior-period KPI set.
//!
//! The aggregator never computes trends; callers that kept an earlier
//! KPI list pass it here explicitly.

use crate::domain::{round2, Kpi, KpiTrend, TrendDirection};

/// Attach a trend to every KPI that has a same-category counterpart in
/// `previous`. KPIs without one are returned unchanged.
pub fn annotate_trends(current: Vec<Kpi>, previous: &[Kpi]) -> Vec<Kpi> {
    current
        .into_iter()
        .map(|kpi| {
            match previous.iter().find(|p| p.category == kpi.category) {
                Some(prior) => {
                    let trend = compare(kpi.value, prior.value);
                    kpi.with_trend(trend)
                }
                None => kpi,
            }
        })
        .collect()
}

/// Raw movement from `previous` to `current`.
pub fn compare(current: f64, previous: f64) -> KpiTrend {
    if previous == 0.0 {
        return if current == 0.0 {
            KpiTrend {
                direction: TrendDirection::Stable,
                percentage: 0.0,
            }
        } else {
            KpiTrend {
                direction: TrendDirection::Up,
                percentage: 100.0,
            }
        };
    }

    let percentage = round2(((current - previous) / previous * 100.0).abs());
    let direction = if percentage == 0.0 {
        TrendDirection::Stable
    } else if current > previous {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    KpiTrend {
        direction,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KpiCategory;
    use chrono::Utc;

    #[test]
    fn test_compare_directions() {
        let up = compare(60.0, 50.0);
        assert_eq!(up.direction, TrendDirection::Up);
        assert_eq!(up.percentage, 20.0);

        let down = compare(3.0, 4.0);
        assert_eq!(down.direction, TrendDirection::Down);
        assert_eq!(down.percentage, 25.0);

        assert_eq!(compare(12.5, 12.5).direction, TrendDirection::Stable);
    }

    #[test]
    fn test_compare_against_zero() {
        assert_eq!(compare(0.0, 0.0).direction, TrendDirection::Stable);

        let from_zero = compare(5.0, 0.0);
        assert_eq!(from_zero.direction, TrendDirection::Up);
        assert_eq!(from_zero.percentage, 100.0);
    }

    #[test]
    fn test_tiny_change_is_stable() {
        let trend = compare(100.0, 99.99999);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.percentage, 0.0);
    }

    #[test]
    fn test_annotate_matches_by_category() {
        let at = Utc::now();
        let current = vec![
            Kpi::from_value(KpiCategory::Frt, 3.0, 10, at),
            Kpi::from_value(KpiCategory::Escalations, 10.0, 10, at),
        ];
        let previous = vec![Kpi::from_value(KpiCategory::Frt, 2.0, 8, at)];

        let annotated = annotate_trends(current, &previous);

        let frt = annotated[0].trend.unwrap();
        assert_eq!(frt.direction, TrendDirection::Up);
        assert_eq!(frt.percentage, 50.0);
        assert!(annotated[1].trend.is_none());
    }
}
