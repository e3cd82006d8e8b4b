//! Reporting periods.
//!
//! Service desks don't run sprints, so analysis windows are virtual
//! seven-day periods counted back from "now".

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DateRange;

/// A named analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Period {
    pub id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_active: bool,
    pub is_closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

impl Period {
    /// Build a period, deriving active/closed from `now`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start,
            end,
            is_active: now >= start && now <= end,
            is_closed: now > end,
            goal: None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.is_active && !self.is_closed
    }

    /// Length in days, partial days rounded up.
    pub fn duration_days(&self) -> i64 {
        let millis = (self.end - self.start).num_milliseconds();
        let day = Duration::days(1).num_milliseconds();
        (millis + day - 1).div_euclid(day)
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }
}

/// `count` consecutive weekly periods, newest first.
pub fn weekly_periods(now: DateTime<Utc>, count: usize) -> Vec<Period> {
    (0..count)
        .map(|i| {
            let start = now - Duration::days(7 * (i as i64 + 1));
            // Closed weeks stop 1ms short of the next week's start
            let end = match i {
                0 => now,
                _ => now - Duration::days(7 * i as i64) - Duration::milliseconds(1),
            };
            let name = match i {
                0 => "Current week".to_string(),
                1 => "1 week ago".to_string(),
                n => format!("{} weeks ago", n),
            };
            Period::new(format!("week-{}", i), name, start, end, now)
        })
        .collect()
}

/// The first period containing `now`, if any.
pub fn active_period(periods: &[Period]) -> Option<&Period> {
    periods.iter().find(|p| p.is_active)
}

/// Up to `limit` closed periods, in the given order.
pub fn recent_closed(periods: &[Period], limit: usize) -> Vec<&Period> {
    periods.iter().filter(|p| p.is_closed).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_weekly_periods_layout() {
        let periods = weekly_periods(now(), 4);

        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0].id, "week-0");
        assert_eq!(periods[0].name, "Current week");
        assert_eq!(periods[1].name, "1 week ago");
        assert_eq!(periods[3].name, "3 weeks ago");
        assert_eq!(periods[0].end, now());
        assert_eq!(periods[1].end, periods[0].start - Duration::milliseconds(1));
        assert!(periods.iter().all(|p| p.duration_days() == 7));
    }

    #[test]
    fn test_week_boundary_belongs_to_one_period() {
        let periods = weekly_periods(now(), 4);
        let boundary = periods[0].start;

        let containing: Vec<_> = periods
            .iter()
            .filter(|p| p.date_range().contains(boundary))
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(containing, vec!["week-0"]);
    }

    #[test]
    fn test_only_current_week_is_active() {
        let periods = weekly_periods(now(), 4);

        assert!(periods[0].is_active);
        assert!(periods[0].is_in_progress());
        assert!(!periods[0].is_closed);
        assert!(periods[2].is_closed);

        assert_eq!(active_period(&periods).map(|p| p.id.as_str()), Some("week-0"));
    }

    #[test]
    fn test_recent_closed_respects_limit() {
        let periods = weekly_periods(now(), 4);
        let closed = recent_closed(&periods, 2);

        assert_eq!(closed.len(), 2);
        assert_eq!(closed[0].id, "week-1");
    }

    #[test]
    fn test_duration_rounds_partial_days_up() {
        let start = now();
        let period = Period::new("p", "p", start, start + Duration::hours(25), start);
        assert_eq!(period.duration_days(), 2);
    }
}
